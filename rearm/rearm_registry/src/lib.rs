//! # rearm registry
//!
//! `rearm_registry` keeps a background synchronization service armed across
//! reboots. The owning application arms a restart with
//! [`RestartRegistry::prepare_registration`] and disarms it with
//! [`RestartRegistry::clear_registration`]; the host's boot signal is
//! handled by [`BootReceiver`], which asks the registry for a resume request
//! and hands it to a [`ServiceLauncher`](rearm_core::traits::ServiceLauncher).
//!
//! Key concepts:
//!
//! 1. **Registration**: the durable record of which service to resume and
//!    after what delay. Stored as two keys, written and removed together.
//!
//! 2. **Boot signal**: delivered once per startup. A pending registration
//!    yields the same resume request on every boot until it is cleared.
//!
//! 3. **Enablement hook**: switched on while a registration is armed so the
//!    host only listens for boot signals when there is something to resume.

pub mod boot;
pub mod config;
pub mod control;
pub mod keys;
pub mod launcher;
pub mod registry;
pub mod toggle;

pub use boot::{BootOutcome, BootReceiver};
pub use config::{ConfigError, RegistryConfig, RegistryOverrides};
pub use control::SyncControl;
pub use keys::RegistryKeys;
pub use launcher::{ProcessLauncher, RecordingLauncher};
pub use registry::RestartRegistry;
pub use toggle::{FlagToggle, MarkerFileToggle, NoopToggle};
