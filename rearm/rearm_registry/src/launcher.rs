//! Service launchers.
//!
//! `ProcessLauncher` resumes a service by running it as a program, the
//! service identifier naming the executable. `RecordingLauncher` only
//! remembers what it was asked to launch.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

use rearm_core::error::LaunchError;
use rearm_core::traits::{LaunchStyle, ServiceLauncher};
use rearm_core::types::ResumeRequest;

/// Launches services as child processes.
///
/// The program is invoked as `<service_id> --resume-delay <secs>`. In the
/// foreground style the launcher waits for the program and reports a
/// non-zero exit as a failure; in the background style it returns as soon
/// as the process has started.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    style: LaunchStyle,
    service_dir: Option<PathBuf>,
}

impl ProcessLauncher {
    /// Create a launcher using `style`.
    pub fn new(style: LaunchStyle) -> Self {
        Self {
            style,
            service_dir: None,
        }
    }

    /// Create a launcher whose style fits the given platform level.
    pub fn for_platform_level(level: u32) -> Self {
        Self::new(LaunchStyle::for_platform_level(level))
    }

    /// Resolve service identifiers relative to `dir` instead of `PATH`.
    pub fn with_service_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.service_dir = Some(dir.into());
        self
    }

    /// The style this launcher starts services with.
    pub fn style(&self) -> LaunchStyle {
        self.style
    }

    fn command(&self, request: &ResumeRequest) -> Command {
        let program = match &self.service_dir {
            Some(dir) => dir.join(&request.service_id),
            None => PathBuf::from(&request.service_id),
        };

        let mut command = Command::new(program);
        command
            .arg("--resume-delay")
            .arg(request.resume_delay.as_secs().to_string());
        command
    }
}

#[async_trait]
impl ServiceLauncher for ProcessLauncher {
    async fn launch(&self, request: &ResumeRequest) -> Result<LaunchStyle, LaunchError> {
        let mut command = self.command(request);
        let spawn_failed = |e: std::io::Error| LaunchError::SpawnFailed {
            service: request.service_id.clone(),
            reason: e.to_string(),
        };

        match self.style {
            LaunchStyle::Foreground => {
                debug!("Running {} in the foreground", request.service_id);
                let status = command.status().await.map_err(spawn_failed)?;
                if !status.success() {
                    return Err(LaunchError::ExitFailure {
                        service: request.service_id.clone(),
                        code: status.code(),
                    });
                }
            }
            LaunchStyle::Background => {
                let child = command.spawn().map_err(spawn_failed)?;
                debug!(
                    "Started {} in the background (pid {:?})",
                    request.service_id,
                    child.id()
                );
            }
        }

        info!("Resumed {} ({})", request, self.style);
        Ok(self.style)
    }
}

/// Launcher that records requests instead of starting anything.
#[derive(Debug)]
pub struct RecordingLauncher {
    style: LaunchStyle,
    fail: bool,
    requests: Mutex<Vec<ResumeRequest>>,
}

impl RecordingLauncher {
    /// Create a launcher that accepts every request.
    pub fn new(style: LaunchStyle) -> Self {
        Self {
            style,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a launcher that records and then rejects every request.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(LaunchStyle::Background)
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ResumeRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ServiceLauncher for RecordingLauncher {
    async fn launch(&self, request: &ResumeRequest) -> Result<LaunchStyle, LaunchError> {
        self.requests.lock().await.push(request.clone());
        if self.fail {
            return Err(LaunchError::Rejected(format!(
                "refusing to start {}",
                request.service_id
            )));
        }
        Ok(self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_recording_launcher() {
        let launcher = RecordingLauncher::new(LaunchStyle::Foreground);
        let request = ResumeRequest::new("svcA", Duration::from_secs(5));

        let style = launcher.launch(&request).await.unwrap();
        assert_eq!(style, LaunchStyle::Foreground);
        assert_eq!(launcher.requests().await, vec![request]);
    }

    #[tokio::test]
    async fn test_failing_launcher_still_records() {
        let launcher = RecordingLauncher::failing();
        let request = ResumeRequest::new("svcA", Duration::from_secs(5));

        assert!(matches!(
            launcher.launch(&request).await,
            Err(LaunchError::Rejected(_))
        ));
        assert_eq!(launcher.requests().await.len(), 1);
    }

    #[test]
    fn test_process_launcher_style() {
        assert_eq!(
            ProcessLauncher::for_platform_level(21).style(),
            LaunchStyle::Background
        );
        assert_eq!(
            ProcessLauncher::for_platform_level(30).style(),
            LaunchStyle::Foreground
        );
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let launcher =
            ProcessLauncher::new(LaunchStyle::Foreground).with_service_dir(temp_dir.path());
        let request = ResumeRequest::new("no-such-service", Duration::from_secs(1));

        assert!(matches!(
            launcher.launch(&request).await,
            Err(LaunchError::SpawnFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_foreground_exit_status() {
        let launcher = ProcessLauncher::new(LaunchStyle::Foreground);

        let ok = ResumeRequest::new("true", Duration::from_secs(1));
        assert_eq!(
            launcher.launch(&ok).await.unwrap(),
            LaunchStyle::Foreground
        );

        let failing = ResumeRequest::new("false", Duration::from_secs(1));
        assert!(matches!(
            launcher.launch(&failing).await,
            Err(LaunchError::ExitFailure { code: Some(1), .. })
        ));
    }
}
