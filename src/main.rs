//! # EMS Bridge - Main Entry Point
//!
//! Connects a Buderus EMS heating bus (serial adapter or TCP tunnel) with a
//! line-oriented TCP command interface. Configuration comes from an optional
//! YAML file merged with `EMSBRIDGE_` environment variables; command line
//! flags override both.
//!
//! ```bash
//! # Serial adapter, command port from the config file
//! emsbridge --device /dev/ttyUSB0
//!
//! # Remote bus adapter, custom command port
//! emsbridge --host heater.local --port 5000 --command-port 7777
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use emsbridge::config::{BridgeConfig, BusTarget, LoggingConfig};
use emsbridge::utils::{BridgeError, Result};

/// Command line arguments
#[derive(Parser)]
#[command(
    name = "emsbridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Command bridge for Buderus EMS heating systems"
)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TCP port for the command interface; 0 disables it
    #[arg(long)]
    command_port: Option<u16>,

    /// Serial device of the bus adapter
    #[arg(long, conflicts_with_all = ["host", "port"])]
    device: Option<String>,

    /// Serial baud rate
    #[arg(long, requires = "device")]
    baud: Option<u32>,

    /// Host of a remote bus adapter (TCP tunnel)
    #[arg(long, requires = "port")]
    host: Option<String>,

    /// Port of the remote bus adapter
    #[arg(long, requires = "host")]
    port: Option<u16>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

fn apply_overrides(config: &mut BridgeConfig, args: &Args) {
    if let Some(port) = args.command_port {
        config.command_port = port;
    }
    if let Some(device) = &args.device {
        config.bus = BusTarget::Serial {
            device: device.clone(),
            baud: args.baud.unwrap_or(9600),
        };
    } else if let (Some(host), Some(port)) = (&args.host, args.port) {
        config.bus = BusTarget::Tcp {
            host: host.clone(),
            port,
        };
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

/// Initialize tracing; the returned guard must stay alive for file output
fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| BridgeError::ConfigError(format!("Invalid log level: {}", e)))?;

    let console = tracing_subscriber::fmt::layer().with_target(false);

    match &config.file {
        Some(file) => {
            let path = std::path::Path::new(file);
            let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("emsbridge.log");
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = BridgeConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    let _log_guard = init_logging(&config.logging)?;

    info!("starting emsbridge v{}", env!("CARGO_PKG_VERSION"));
    match &config.bus {
        BusTarget::Tcp { host, port } => info!("bus adapter: tcp {}:{}", host, port),
        BusTarget::Serial { device, baud } => info!("bus adapter: serial {} @ {}", device, baud),
    }

    if let Err(e) = emsbridge::runtime::run(config).await {
        error!("bridge failed: {}", e);
        return Err(e);
    }
    Ok(())
}
