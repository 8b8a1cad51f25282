//! Application-side control over background synchronization.
//!
//! A `SyncControl` describes one synchronization service and the delay it
//! should resume with. Enabling it arms the restart registry for that
//! service; disabling it clears the registration.

use std::fmt;
use std::time::Duration;

use rearm_core::error::RegistryError;
use rearm_core::traits::KeyValueStore;

use crate::registry::RestartRegistry;

/// Arms and disarms background synchronization for one service.
pub struct SyncControl<S: KeyValueStore> {
    registry: RestartRegistry<S>,
    service_id: String,
    delay: Option<Duration>,
}

impl<S: KeyValueStore> SyncControl<S> {
    /// Create a control for `service_id` using the registry's default delay.
    pub fn new(registry: RestartRegistry<S>, service_id: impl Into<String>) -> Self {
        Self {
            registry,
            service_id: service_id.into(),
            delay: None,
        }
    }

    /// The service this control arms.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// The configured delay, or the registry default when unset.
    pub fn delay(&self) -> Duration {
        self.delay.unwrap_or(self.registry.default_delay())
    }

    /// Change the service this control arms.
    pub fn set_service_id(&mut self, service_id: impl Into<String>) {
        self.service_id = service_id.into();
    }

    /// Change the resume delay.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    /// A control is valid once it names a service.
    pub fn is_valid(&self) -> bool {
        !self.service_id.is_empty()
    }

    /// Whether the pending registration belongs to this control's service.
    pub async fn is_enabled(&self) -> Result<bool, RegistryError> {
        Ok(self
            .registry
            .pending()
            .await?
            .is_some_and(|registration| registration.service_id == self.service_id))
    }

    /// Arm or disarm background synchronization.
    ///
    /// Does nothing when the requested state is already in effect.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), RegistryError> {
        if !self.is_valid() {
            return Err(RegistryError::InvalidRegistration(
                "sync control has no service identifier".to_string(),
            ));
        }

        if enabled == self.is_enabled().await? {
            return Ok(());
        }

        if enabled {
            self.registry
                .prepare_registration(&self.service_id, self.delay)
                .await
        } else {
            self.registry.clear_registration().await
        }
    }
}

impl<S: KeyValueStore> PartialEq for SyncControl<S> {
    fn eq(&self, other: &Self) -> bool {
        self.service_id == other.service_id && self.delay() == other.delay()
    }
}

impl<S: KeyValueStore> fmt::Debug for SyncControl<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncControl")
            .field("service_id", &self.service_id)
            .field("delay", &self.delay())
            .finish()
    }
}
