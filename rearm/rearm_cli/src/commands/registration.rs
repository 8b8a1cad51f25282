//! Registration commands
//!
//! Arm, disarm and inspect the pending restart registration.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use rearm_registry::RestartRegistry;
use rearm_store::FileStore;

/// Arguments for the arm command
#[derive(Args)]
pub struct ArmArgs {
    /// Service to resume after a reboot
    #[clap(long)]
    pub service: String,

    /// Seconds to wait before resuming; the configured default when omitted
    #[clap(long)]
    pub delay: Option<u64>,
}

/// Implementation of the arm command
pub async fn execute_arm(registry: &RestartRegistry<FileStore>, args: &ArmArgs) -> Result<()> {
    let delay = args.delay.map(Duration::from_secs);

    registry
        .prepare_registration(&args.service, delay)
        .await
        .context(format!("Failed to arm {}", args.service))?;

    let stored = delay.unwrap_or(registry.default_delay());
    println!("armed {} {}s", args.service, stored.as_secs());
    Ok(())
}

/// Implementation of the disarm command
pub async fn execute_disarm(registry: &RestartRegistry<FileStore>) -> Result<()> {
    registry
        .clear_registration()
        .await
        .context("Failed to disarm")?;

    println!("disarmed");
    Ok(())
}

/// Implementation of the status command
pub async fn execute_status(registry: &RestartRegistry<FileStore>) -> Result<()> {
    let pending = registry
        .pending()
        .await
        .context("Failed to read registration")?;

    match pending {
        Some(registration) => println!(
            "pending {} {}s",
            registration.service_id,
            registration.resume_delay.as_secs()
        ),
        None => println!("none"),
    }
    Ok(())
}
