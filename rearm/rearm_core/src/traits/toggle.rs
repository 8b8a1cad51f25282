//! Component-enablement hook.

/// On/off switch for the host's boot-signal listener.
///
/// The registry flips it on when a registration is armed and off when it is
/// cleared, so the host only wakes up on boot while something is pending.
/// Implementations must not fail the caller; problems are logged instead.
///
/// # Examples
///
/// ```
/// use rearm_core::traits::ComponentToggle;
///
/// struct Silent;
///
/// impl ComponentToggle for Silent {
///     fn set_component_state(&self, _enabled: bool) {}
/// }
///
/// Silent.set_component_state(true);
/// ```
pub trait ComponentToggle: Send + Sync {
    /// Enable or disable the boot-signal listener.
    fn set_component_state(&self, enabled: bool);
}
