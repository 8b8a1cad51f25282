//! # rearm core
//!
//! `rearm_core` holds the building blocks shared by the rearm crates: the
//! error hierarchy, the registration data types, and the traits behind which
//! the host platform's collaborators live.
//!
//! rearm remembers which background synchronization service should resume
//! after the device restarts, and with what delay. The registry owning that
//! record lives in `rearm_registry`; storage backends live in `rearm_store`.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all rearm components
//! - **traits**: Key-value store, enablement hook and launcher interfaces
//! - **types**: Registration records and store values
//! - **utils**: Logging helpers

pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{LaunchError, RegistryError, StoreError};
pub use traits::{ComponentToggle, KeyValueStore, LaunchStyle, ServiceLauncher};
pub use types::{PendingRegistration, ResumeRequest, StoreValue, DEFAULT_RESUME_DELAY};
pub use utils::LogLevel;
