//! Data types used throughout rearm.
//!
//! This module contains the registration record, the resume request handed
//! to launchers, and the value type held by key-value stores.

pub mod registration;
pub mod value;

pub use registration::{PendingRegistration, ResumeRequest, DEFAULT_RESUME_DELAY};
pub use value::StoreValue;
