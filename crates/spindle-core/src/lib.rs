//! # spindle-core
//!
//! Pure-safe contract logic for the spindle threading primitives.
//!
//! This crate holds everything that can be specified and tested without
//! touching a platform handle: the thread lifecycle transition contract,
//! deadline arithmetic for bounded waits, and errno naming. Actual platform
//! calls live in the `spindle` crate. No `unsafe` code is permitted here.

#![deny(unsafe_code)]

pub mod deadline;
pub mod errno;
pub mod lifecycle;
