//! Test utilities for the uniqra crates.
//!
//! - [`sample`]: a C-interface sample resource (`malloc`/`free` based, allocating
//!   through an output parameter) and handle types bound to it.
//! - [`tracker`]: allocate/release capabilities that record every call, for
//!   checking release counts and ordering.

pub mod sample;
pub mod tracker;

pub use sample::{DelayedSample, Sample, SampleHandle};
pub use tracker::{Event, Tracker};
