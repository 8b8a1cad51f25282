//! Service launcher trait.
//!
//! Launchers turn a `ResumeRequest` into a running synchronization service.
//! Whether the service starts in the foreground or the background depends on
//! what the host platform supports, and that choice belongs here rather than
//! in the registry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LaunchError;
use crate::types::ResumeRequest;

/// First platform level that requires services to be started in the foreground.
pub const FOREGROUND_LAUNCH_MIN_LEVEL: u32 = 26;

/// How a service is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStyle {
    /// The launcher supervises the service until it finishes.
    Foreground,

    /// The service is started and left to run on its own.
    Background,
}

impl LaunchStyle {
    /// Pick the launch style for the given platform capability level.
    pub fn for_platform_level(level: u32) -> Self {
        if level >= FOREGROUND_LAUNCH_MIN_LEVEL {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

impl fmt::Display for LaunchStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreground => write!(f, "foreground"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// Restarts synchronization services.
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Launch the service named in `request`.
    ///
    /// # Returns
    ///
    /// * `Ok(LaunchStyle)` - The style the service was started with.
    /// * `Err(LaunchError)` - If the service could not be started.
    async fn launch(&self, request: &ResumeRequest) -> Result<LaunchStyle, LaunchError>;
}
