//! Store keys used by the registry.

use serde::{Deserialize, Serialize};

/// The pair of store keys holding a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryKeys {
    /// Key holding the service identifier
    pub service_id: String,

    /// Key holding the resume delay, in seconds
    pub resume_delay: String,
}

impl RegistryKeys {
    /// Create a key pair with custom names.
    pub fn new(service_id: impl Into<String>, resume_delay: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            resume_delay: resume_delay.into(),
        }
    }

    /// Keys written by the older boot receiver, which stored a sync interval
    /// rather than a delay.
    pub fn legacy() -> Self {
        Self::new("rearm.boot.service_name", "rearm.boot.interval")
    }

    /// Both keys, service identifier first.
    pub fn as_pair(&self) -> [&str; 2] {
        [self.service_id.as_str(), self.resume_delay.as_str()]
    }
}

impl Default for RegistryKeys {
    fn default() -> Self {
        Self::new("rearm.registry.service_id", "rearm.registry.resume_delay")
    }
}
