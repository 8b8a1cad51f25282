//! Collaborator interfaces of the restart registry.
//!
//! The registry itself is a thin policy layer. Everything that touches the
//! host lives behind one of these traits:
//!
//! - `KeyValueStore`: durable storage for the registration fields
//! - `ComponentToggle`: enables or disables listening for the boot signal
//! - `ServiceLauncher`: restarts a synchronization service on request

pub mod launcher;
pub mod store;
pub mod toggle;

pub use launcher::{LaunchStyle, ServiceLauncher, FOREGROUND_LAUNCH_MIN_LEVEL};
pub use store::KeyValueStore;
pub use toggle::ComponentToggle;
