//! Command implementations for the rearm CLI.

pub mod boot;
pub mod registration;
