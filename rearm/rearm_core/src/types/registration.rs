//! Registration records.
//!
//! A `PendingRegistration` is the durable record of which synchronization
//! service should resume after a reboot and after what delay. Consulting the
//! registry on a boot signal turns it into a `ResumeRequest`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Delay used when a registration does not specify one.
pub const DEFAULT_RESUME_DELAY: Duration = Duration::from_secs(60);

/// A registration that is waiting for the next boot signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    /// The synchronization service to resume.
    pub service_id: String,

    /// How long the service should wait before resuming.
    pub resume_delay: Duration,
}

impl PendingRegistration {
    /// Create a new pending registration.
    pub fn new(service_id: impl Into<String>, resume_delay: Duration) -> Self {
        Self {
            service_id: service_id.into(),
            resume_delay,
        }
    }

    /// Turn this registration into the request a launcher acts on.
    pub fn to_resume_request(&self) -> ResumeRequest {
        ResumeRequest {
            service_id: self.service_id.clone(),
            resume_delay: self.resume_delay,
        }
    }
}

/// Instruction to restart a specific synchronization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRequest {
    /// The synchronization service to resume.
    pub service_id: String,

    /// Delay before the service resumes, in whole seconds on the wire.
    #[serde(rename = "resume_delay_secs", with = "duration_secs")]
    pub resume_delay: Duration,
}

impl ResumeRequest {
    /// Create a new resume request.
    pub fn new(service_id: impl Into<String>, resume_delay: Duration) -> Self {
        Self {
            service_id: service_id.into(),
            resume_delay,
        }
    }
}

impl fmt::Display for ResumeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {}s",
            self.service_id,
            self.resume_delay.as_secs()
        )
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
