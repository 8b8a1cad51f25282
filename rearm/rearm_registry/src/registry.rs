//! The restart registry.
//!
//! Remembers which synchronization service should resume after a reboot and
//! with what delay. Each operation is a single batch call on the underlying
//! store, so no observer ever sees half a registration.
//!
//! A registration is not consumed by a boot signal: it stays pending until
//! the owning application clears it, and every boot signal observed in the
//! meantime produces the same resume request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use rearm_core::error::RegistryError;
use rearm_core::traits::{ComponentToggle, KeyValueStore};
use rearm_core::types::{PendingRegistration, ResumeRequest, StoreValue, DEFAULT_RESUME_DELAY};

use crate::keys::RegistryKeys;
use crate::toggle::NoopToggle;

/// Stores, clears and resolves the pending restart registration.
pub struct RestartRegistry<S: KeyValueStore> {
    store: Arc<S>,
    toggle: Arc<dyn ComponentToggle>,
    keys: RegistryKeys,
    default_delay: Duration,
}

impl<S: KeyValueStore> RestartRegistry<S> {
    /// Create a registry over `store` with default keys, a 60 second default
    /// delay and no enablement hook.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            toggle: Arc::new(NoopToggle),
            keys: RegistryKeys::default(),
            default_delay: DEFAULT_RESUME_DELAY,
        }
    }

    /// Use `toggle` as the component-enablement hook.
    pub fn with_toggle(mut self, toggle: Arc<dyn ComponentToggle>) -> Self {
        self.toggle = toggle;
        self
    }

    /// Store the registration under `keys`.
    pub fn with_keys(mut self, keys: RegistryKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Delay applied when a registration does not specify one.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// The keys this registry reads and writes.
    pub fn keys(&self) -> &RegistryKeys {
        &self.keys
    }

    /// The delay used when none is given.
    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    /// Arm a restart of `service_id` after `resume_delay`.
    ///
    /// Replaces any previous registration. `None` means the delay was not
    /// specified and the default delay is stored. Delays are stored in whole
    /// seconds. On success the enablement hook is switched on.
    ///
    /// # Errors
    ///
    /// * `RegistryError::InvalidRegistration` - empty service id, a delay with
    ///   a sub-second part, or a delay too large to store.
    /// * `RegistryError::PersistenceWrite` - the store failed the write. The
    ///   hook is left untouched.
    pub async fn prepare_registration(
        &self,
        service_id: &str,
        resume_delay: Option<Duration>,
    ) -> Result<(), RegistryError> {
        if service_id.is_empty() {
            return Err(RegistryError::InvalidRegistration(
                "service identifier must not be empty".to_string(),
            ));
        }

        let delay = resume_delay.unwrap_or(self.default_delay);
        if delay.subsec_nanos() != 0 {
            return Err(RegistryError::InvalidRegistration(format!(
                "resume delay of {:?} is not a whole number of seconds",
                delay
            )));
        }
        let delay_secs = i64::try_from(delay.as_secs()).map_err(|_| {
            RegistryError::InvalidRegistration(format!(
                "resume delay of {}s is out of range",
                delay.as_secs()
            ))
        })?;

        self.store
            .set(vec![
                (
                    self.keys.service_id.clone(),
                    StoreValue::from(service_id),
                ),
                (
                    self.keys.resume_delay.clone(),
                    StoreValue::from(delay_secs),
                ),
            ])
            .await
            .map_err(RegistryError::PersistenceWrite)?;

        info!("Armed restart of {} after {}s", service_id, delay_secs);
        self.toggle.set_component_state(true);

        Ok(())
    }

    /// Remove the pending registration, if any.
    ///
    /// Clearing an empty registry succeeds. On success the enablement hook is
    /// switched off.
    ///
    /// # Errors
    ///
    /// * `RegistryError::PersistenceWrite` - the store failed the removal.
    pub async fn clear_registration(&self) -> Result<(), RegistryError> {
        self.store
            .remove(&self.keys.as_pair())
            .await
            .map_err(RegistryError::PersistenceWrite)?;

        info!("Cleared restart registration");
        self.toggle.set_component_state(false);

        Ok(())
    }

    /// Handle a boot signal.
    ///
    /// Returns the resume request for the pending registration, or `None` if
    /// nothing is pending. Read failures and malformed records are logged and
    /// treated as "nothing pending", so a broken store never takes the boot
    /// path down with it. The registration is left in place.
    pub async fn on_boot_signal(&self) -> Option<ResumeRequest> {
        match self.pending().await {
            Ok(Some(registration)) => {
                info!(
                    "Boot signal: resuming {} after {}s",
                    registration.service_id,
                    registration.resume_delay.as_secs()
                );
                Some(registration.to_resume_request())
            }
            Ok(None) => {
                debug!("Boot signal: no registration pending");
                None
            }
            Err(e) => {
                warn!("Boot signal: skipping resume, {}", e);
                None
            }
        }
    }

    /// Whether a registration is pending, failing safe to `false`.
    pub async fn is_pending(&self) -> bool {
        match self.pending().await {
            Ok(registration) => registration.is_some(),
            Err(e) => {
                debug!("Registration unreadable, reporting none pending: {}", e);
                false
            }
        }
    }

    /// Read the pending registration.
    ///
    /// Unlike [`on_boot_signal`](Self::on_boot_signal), failures are reported.
    /// A record holding a service id but no delay gets the default delay.
    ///
    /// # Errors
    ///
    /// * `RegistryError::PersistenceRead` - the store failed the read.
    /// * `RegistryError::MalformedRecord` - the stored values have the wrong
    ///   shape.
    pub async fn pending(&self) -> Result<Option<PendingRegistration>, RegistryError> {
        let values = self
            .store
            .get_many(&self.keys.as_pair())
            .await
            .map_err(RegistryError::PersistenceRead)?;

        let mut values = values.into_iter();
        let service = values.next().flatten();
        let delay = values.next().flatten();

        self.decode(service, delay)
    }

    fn decode(
        &self,
        service: Option<StoreValue>,
        delay: Option<StoreValue>,
    ) -> Result<Option<PendingRegistration>, RegistryError> {
        let service_id = match service {
            None => return Ok(None),
            Some(StoreValue::Text(id)) if !id.is_empty() => id,
            Some(StoreValue::Text(_)) => {
                return Err(RegistryError::MalformedRecord(format!(
                    "{} is empty",
                    self.keys.service_id
                )))
            }
            Some(other) => {
                return Err(RegistryError::MalformedRecord(format!(
                    "{} holds {} instead of text",
                    self.keys.service_id,
                    other.kind()
                )))
            }
        };

        let resume_delay = match delay {
            None => {
                debug!(
                    "Registration for {} has no delay, using {}s",
                    service_id,
                    self.default_delay.as_secs()
                );
                self.default_delay
            }
            Some(StoreValue::Integer(secs)) => {
                let secs = u64::try_from(secs).map_err(|_| {
                    RegistryError::MalformedRecord(format!(
                        "{} is negative ({})",
                        self.keys.resume_delay, secs
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Some(other) => {
                return Err(RegistryError::MalformedRecord(format!(
                    "{} holds {} instead of an integer",
                    self.keys.resume_delay,
                    other.kind()
                )))
            }
        };

        Ok(Some(PendingRegistration::new(service_id, resume_delay)))
    }
}

impl<S: KeyValueStore> Clone for RestartRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            toggle: self.toggle.clone(),
            keys: self.keys.clone(),
            default_delay: self.default_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::FlagToggle;
    use rearm_store::MemoryStore;

    fn registry() -> (Arc<MemoryStore>, RestartRegistry<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), RestartRegistry::new(store))
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test]
    async fn test_prepare_then_boot_yields_request() {
        let (_, registry) = registry();
        registry
            .prepare_registration("svcA", Some(secs(15)))
            .await
            .unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(15)))
        );
    }

    #[tokio::test]
    async fn test_zero_delay_is_kept() {
        let (_, registry) = registry();
        registry
            .prepare_registration("svcA", Some(secs(0)))
            .await
            .unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(0)))
        );
    }

    #[tokio::test]
    async fn test_sub_second_delay_rejected() {
        let (store, registry) = registry();

        for delay in [Duration::from_millis(1500), Duration::from_millis(500)] {
            let result = registry.prepare_registration("svcA", Some(delay)).await;
            assert!(matches!(
                result,
                Err(RegistryError::InvalidRegistration(_))
            ));
        }

        assert!(store.is_empty().await);
        assert_eq!(registry.on_boot_signal().await, None);
    }

    #[tokio::test]
    async fn test_sub_second_default_delay_rejected() {
        let (store, registry) = registry();
        let registry = registry.with_default_delay(Duration::from_millis(2500));

        assert!(matches!(
            registry.prepare_registration("svcA", None).await,
            Err(RegistryError::InvalidRegistration(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_is_pending_fails_safe() {
        let (store, registry) = registry();
        assert!(!registry.is_pending().await);

        registry.prepare_registration("svcA", None).await.unwrap();
        assert!(registry.is_pending().await);

        store.fail_reads(true);
        assert!(!registry.is_pending().await);

        store.fail_reads(false);
        store
            .set(vec![(
                registry.keys().resume_delay.clone(),
                StoreValue::from("later"),
            )])
            .await
            .unwrap();
        assert!(!registry.is_pending().await);
    }

    #[tokio::test]
    async fn test_boot_without_registration_yields_nothing() {
        let (_, registry) = registry();
        assert_eq!(registry.on_boot_signal().await, None);
        assert!(!registry.is_pending().await);
    }

    #[tokio::test]
    async fn test_clear_then_boot_yields_nothing() {
        let (store, registry) = registry();
        registry
            .prepare_registration("svcA", Some(secs(10)))
            .await
            .unwrap();
        registry.clear_registration().await.unwrap();

        assert_eq!(registry.on_boot_signal().await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_empty_registry_is_noop() {
        let (store, registry) = registry();
        registry.clear_registration().await.unwrap();
        registry.clear_registration().await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(registry.on_boot_signal().await, None);
    }

    #[tokio::test]
    async fn test_boot_does_not_consume_registration() {
        let (_, registry) = registry();
        registry
            .prepare_registration("svcA", Some(secs(30)))
            .await
            .unwrap();

        let first = registry.on_boot_signal().await;
        let second = registry.on_boot_signal().await;
        assert_eq!(first, Some(ResumeRequest::new("svcA", secs(30))));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_prepare_overwrites_previous() {
        let (store, registry) = registry();
        registry
            .prepare_registration("svcA", Some(secs(10)))
            .await
            .unwrap();
        registry
            .prepare_registration("svcB", Some(secs(20)))
            .await
            .unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcB", secs(20)))
        );
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unspecified_delay_defaults_to_sixty() {
        let (store, registry) = registry();
        registry.prepare_registration("svcA", None).await.unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(60)))
        );

        // The default is written, not synthesized on read
        let keys = registry.keys().clone();
        assert_eq!(
            store.get(&keys.resume_delay).await.unwrap(),
            Some(StoreValue::from(60))
        );
    }

    #[tokio::test]
    async fn test_custom_default_delay() {
        let (_, registry) = registry();
        let registry = registry.with_default_delay(secs(300));
        registry.prepare_registration("svcA", None).await.unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(300)))
        );
    }

    #[tokio::test]
    async fn test_empty_service_id_rejected() {
        let (store, registry) = registry();
        let result = registry.prepare_registration("", Some(secs(5))).await;

        assert!(matches!(
            result,
            Err(RegistryError::InvalidRegistration(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_oversized_delay_rejected() {
        let (_, registry) = registry();
        let result = registry
            .prepare_registration("svcA", Some(Duration::from_secs(u64::MAX)))
            .await;

        assert!(matches!(
            result,
            Err(RegistryError::InvalidRegistration(_))
        ));
    }

    #[tokio::test]
    async fn test_hook_follows_registration_state() {
        let toggle = Arc::new(FlagToggle::new(false));
        let (_, registry) = registry();
        let registry = registry.with_toggle(toggle.clone());

        registry.prepare_registration("svcA", None).await.unwrap();
        assert!(toggle.is_enabled());

        registry.clear_registration().await.unwrap();
        assert!(!toggle.is_enabled());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_and_leaves_hook() {
        let toggle = Arc::new(FlagToggle::new(false));
        let (store, registry) = registry();
        let registry = registry.with_toggle(toggle.clone());

        store.fail_writes(true);
        let result = registry.prepare_registration("svcA", None).await;
        assert!(matches!(result, Err(RegistryError::PersistenceWrite(_))));
        assert!(!toggle.is_enabled());
        assert_eq!(toggle.flips(), 0);

        store.fail_writes(false);
        registry.prepare_registration("svcA", None).await.unwrap();

        store.fail_writes(true);
        let result = registry.clear_registration().await;
        assert!(matches!(result, Err(RegistryError::PersistenceWrite(_))));
        assert!(toggle.is_enabled());
    }

    #[tokio::test]
    async fn test_read_failure_fails_safe() {
        let (store, registry) = registry();
        registry.prepare_registration("svcA", None).await.unwrap();

        store.fail_reads(true);
        assert_eq!(registry.on_boot_signal().await, None);
        assert!(matches!(
            registry.pending().await,
            Err(RegistryError::PersistenceRead(_))
        ));

        store.fail_reads(false);
        assert!(registry.on_boot_signal().await.is_some());
    }

    #[tokio::test]
    async fn test_missing_delay_defaults_on_read() {
        let (store, registry) = registry();
        store
            .set(vec![(
                registry.keys().service_id.clone(),
                StoreValue::from("svcA"),
            )])
            .await
            .unwrap();

        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(60)))
        );
    }

    #[tokio::test]
    async fn test_delay_without_service_is_not_pending() {
        let (store, registry) = registry();
        store
            .set(vec![(
                registry.keys().resume_delay.clone(),
                StoreValue::from(10),
            )])
            .await
            .unwrap();

        assert_eq!(registry.pending().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_records() {
        let (store, registry) = registry();
        let keys = registry.keys().clone();

        store
            .set(vec![
                (keys.service_id.clone(), StoreValue::from("svcA")),
                (keys.resume_delay.clone(), StoreValue::from("soon")),
            ])
            .await
            .unwrap();
        assert!(matches!(
            registry.pending().await,
            Err(RegistryError::MalformedRecord(_))
        ));
        assert_eq!(registry.on_boot_signal().await, None);

        store
            .set(vec![(keys.resume_delay.clone(), StoreValue::from(-5))])
            .await
            .unwrap();
        assert!(matches!(
            registry.pending().await,
            Err(RegistryError::MalformedRecord(_))
        ));

        store
            .set(vec![
                (keys.service_id.clone(), StoreValue::from(7)),
                (keys.resume_delay.clone(), StoreValue::from(5)),
            ])
            .await
            .unwrap();
        assert!(matches!(
            registry.pending().await,
            Err(RegistryError::MalformedRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_legacy_keys() {
        let (store, registry) = registry();
        let registry = registry.with_keys(RegistryKeys::legacy());
        registry
            .prepare_registration("svcA", Some(secs(900)))
            .await
            .unwrap();

        assert_eq!(
            store.get("rearm.boot.interval").await.unwrap(),
            Some(StoreValue::from(900))
        );
        assert_eq!(
            registry.on_boot_signal().await,
            Some(ResumeRequest::new("svcA", secs(900)))
        );
    }
}
