use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

use rearm_core::LogLevel;
use rearm_registry::{RegistryConfig, RegistryOverrides};

mod commands;

use commands::boot::{execute_boot, BootArgs};
use commands::registration::{execute_arm, execute_disarm, execute_status, ArmArgs};

/// rearm: keep background synchronization armed across reboots
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[clap(long, global = true)]
    config: Option<String>,

    /// Store document, overriding the configured path
    #[clap(long, global = true)]
    store: Option<String>,

    /// Delay in seconds stored when `arm` is given none
    #[clap(long, global = true)]
    default_delay: Option<u64>,

    /// Host platform capability level
    #[clap(long, global = true)]
    platform_level: Option<u32>,

    /// Use the legacy store keys (true or false)
    #[clap(long, global = true)]
    legacy_keys: Option<bool>,

    /// Marker file kept present while a registration is armed
    #[clap(long, global = true)]
    marker: Option<String>,

    /// Directory holding service executables
    #[clap(long, global = true)]
    service_dir: Option<String>,

    /// Maximum log level written to stderr
    #[clap(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Arm a restart of a synchronization service
    Arm(ArmArgs),

    /// Remove the pending registration
    Disarm,

    /// Handle a boot signal
    Boot(BootArgs),

    /// Show the pending registration
    Status,
}

fn init_logging(level: LogLevel) {
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::from(level))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

impl Cli {
    fn overrides(&self) -> RegistryOverrides {
        RegistryOverrides {
            store_path: self.store.clone(),
            default_delay_secs: self.default_delay,
            legacy_keys: self.legacy_keys,
            platform_level: self.platform_level,
            marker_path: self.marker.clone(),
            service_dir: self.service_dir.clone(),
        }
    }
}

async fn load_config(path: Option<&str>, overrides: RegistryOverrides) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::load(path).await?;
    if !overrides.is_empty() {
        config.merge(overrides);
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = match load_config(cli.config.as_deref(), cli.overrides()).await {
        Ok(config) => config,
        // boot always exits cleanly
        Err(e) if matches!(cli.command, Commands::Boot(_)) => {
            error!("Boot skipped, configuration unusable: {:#}", e);
            println!("dormant");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let registry = config.open_registry();

    match cli.command {
        Commands::Arm(args) => execute_arm(&registry, &args).await,
        Commands::Disarm => execute_disarm(&registry).await,
        Commands::Boot(args) => execute_boot(&config, registry, &args).await,
        Commands::Status => execute_status(&registry).await,
    }
}
