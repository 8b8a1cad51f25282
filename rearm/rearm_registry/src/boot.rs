//! Boot-signal handling.
//!
//! The host delivers a boot signal once per device startup. `BootReceiver`
//! consults the registry and hands any pending resume request to a launcher.
//! Nothing here may fail the boot: every problem ends in a logged outcome and
//! synchronization stays dormant until the next boot or until the
//! application re-arms it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use rearm_core::traits::{KeyValueStore, LaunchStyle, ServiceLauncher};
use rearm_core::types::ResumeRequest;

use crate::registry::RestartRegistry;

/// What happened when a boot signal was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BootOutcome {
    /// No registration was pending (or it could not be read).
    Dormant,

    /// The service was handed to the launcher.
    Resumed {
        /// The request that was launched
        request: ResumeRequest,

        /// How the launcher started it
        style: LaunchStyle,
    },

    /// The launcher could not start the service. The registration is kept.
    LaunchFailed {
        /// The request that failed
        request: ResumeRequest,

        /// Why it failed
        reason: String,
    },
}

impl BootOutcome {
    /// Whether a service was resumed.
    pub fn is_resumed(&self) -> bool {
        matches!(self, Self::Resumed { .. })
    }
}

/// Handles boot signals by resuming the registered service.
pub struct BootReceiver<S: KeyValueStore> {
    registry: RestartRegistry<S>,
    launcher: Arc<dyn ServiceLauncher>,
}

impl<S: KeyValueStore> BootReceiver<S> {
    /// Create a receiver over `registry` that launches through `launcher`.
    pub fn new(registry: RestartRegistry<S>, launcher: Arc<dyn ServiceLauncher>) -> Self {
        Self { registry, launcher }
    }

    /// The registry consulted on boot.
    pub fn registry(&self) -> &RestartRegistry<S> {
        &self.registry
    }

    /// Handle one boot signal.
    pub async fn on_boot(&self) -> BootOutcome {
        let Some(request) = self.registry.on_boot_signal().await else {
            return BootOutcome::Dormant;
        };

        match self.launcher.launch(&request).await {
            Ok(style) => {
                info!("Boot resumed {} ({})", request, style);
                BootOutcome::Resumed { request, style }
            }
            Err(e) => {
                error!("Boot failed to resume {}: {}", request, e);
                BootOutcome::LaunchFailed {
                    request,
                    reason: e.to_string(),
                }
            }
        }
    }
}
