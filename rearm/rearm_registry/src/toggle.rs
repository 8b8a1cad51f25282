//! Component-enablement hooks.
//!
//! The registry switches the hook on when a registration is armed and off
//! when it is cleared. Hooks never fail the registry operation that flipped
//! them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, warn};

use rearm_core::traits::ComponentToggle;

/// Hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToggle;

impl ComponentToggle for NoopToggle {
    fn set_component_state(&self, enabled: bool) {
        debug!("Component state change to {} ignored", enabled);
    }
}

/// Hook backed by an atomic flag that can be queried.
#[derive(Debug)]
pub struct FlagToggle {
    /// Current state
    enabled: AtomicBool,

    /// Number of times the state was set
    flips: AtomicUsize,
}

impl FlagToggle {
    /// Create a flag with the given initial state.
    pub fn new(initial_state: bool) -> Self {
        Self {
            enabled: AtomicBool::new(initial_state),
            flips: AtomicUsize::new(0),
        }
    }

    /// Whether the boot listener is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// How many times the registry has set the state.
    pub fn flips(&self) -> usize {
        self.flips.load(Ordering::SeqCst)
    }
}

impl Default for FlagToggle {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ComponentToggle for FlagToggle {
    fn set_component_state(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        self.flips.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hook that keeps a marker file present exactly while the listener is
/// enabled.
///
/// A host boot script can test for the marker and skip invoking the boot
/// handler altogether when nothing is armed.
#[derive(Debug, Clone)]
pub struct MarkerFileToggle {
    path: PathBuf,
}

impl MarkerFileToggle {
    /// Create a hook managing the marker at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the marker file currently exists.
    pub fn is_enabled(&self) -> bool {
        self.path.exists()
    }

    fn enable(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, b"")
    }

    fn disable(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl ComponentToggle for MarkerFileToggle {
    fn set_component_state(&self, enabled: bool) {
        let result = if enabled {
            self.enable()
        } else {
            self.disable()
        };

        match result {
            Ok(()) => debug!("Boot marker {:?} enabled={}", self.path, enabled),
            Err(e) => warn!(
                "Failed to set boot marker {:?} to enabled={}: {}",
                self.path, enabled, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flag_toggle() {
        let toggle = FlagToggle::default();
        assert!(!toggle.is_enabled());

        toggle.set_component_state(true);
        assert!(toggle.is_enabled());
        toggle.set_component_state(false);
        assert!(!toggle.is_enabled());
        assert_eq!(toggle.flips(), 2);
    }

    #[test]
    fn test_marker_file_toggle() {
        let temp_dir = TempDir::new().unwrap();
        let toggle = MarkerFileToggle::new(temp_dir.path().join("run").join("boot.enabled"));
        assert!(!toggle.is_enabled());

        toggle.set_component_state(true);
        assert!(toggle.is_enabled());

        toggle.set_component_state(false);
        assert!(!toggle.is_enabled());

        // Disabling twice is harmless
        toggle.set_component_state(false);
        assert!(!toggle.is_enabled());
    }
}
