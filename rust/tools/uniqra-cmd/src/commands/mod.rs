//! Command implementations for uniqra-cmd

pub mod list;
pub mod run;
