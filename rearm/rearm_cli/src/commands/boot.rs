//! Boot command
//!
//! Invoked by the host once per startup. Never fails: whatever goes wrong is
//! logged, and synchronization stays dormant.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::error;

use rearm_registry::{BootReceiver, RegistryConfig, RestartRegistry};
use rearm_store::FileStore;

/// Arguments for the boot command
#[derive(Args)]
pub struct BootArgs {
    /// Start the registered service instead of only printing the request
    #[clap(long)]
    pub launch: bool,
}

/// Implementation of the boot command
pub async fn execute_boot(
    config: &RegistryConfig,
    registry: RestartRegistry<FileStore>,
    args: &BootArgs,
) -> Result<()> {
    if args.launch {
        let receiver = BootReceiver::new(registry, Arc::new(config.launcher()));
        let outcome = receiver.on_boot().await;
        print_json(&outcome);
        return Ok(());
    }

    match registry.on_boot_signal().await {
        Some(request) => print_json(&request),
        None => println!("dormant"),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to encode boot result: {}", e),
    }
}
