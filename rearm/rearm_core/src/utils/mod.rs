//! Utility types shared by the rearm crates.

pub mod logging;

pub use logging::LogLevel;
