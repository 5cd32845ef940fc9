//! Faultline CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use faultline_config::load_config;
use faultline_runtime::{ServerBuilder, SignalHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "faultline")]
#[command(about = "Configurable HTTP mock and fault-injection server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "faultline.yaml")]
        config: PathBuf,

        /// Override the configured listen address
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short = 'L', long, default_value = "info")]
        log_level: String,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "faultline.yaml")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            listen,
            log_level,
        } => {
            init_tracing(&log_level)?;

            tracing::info!("Starting Faultline");
            tracing::info!("Config file: {}", config.display());

            let mut config = load_config(&config)?;

            if let Some(listen) = listen {
                config.server.listen = listen;
            }

            tracing::info!(
                listen = %config.server.listen,
                endpoints = config.endpoints.len(),
                "Configuration loaded"
            );

            let server = ServerBuilder::new().config(config).build()?;

            let shutdown_signal = server.shutdown_signal();
            tokio::spawn(async move {
                let handler = SignalHandler::new(shutdown_signal);
                handler.run().await;
            });

            server.run().await?;

            tracing::info!("Server stopped");
            Ok(())
        }

        Commands::Validate { config } => {
            tracing_subscriber::fmt().with_target(false).init();

            tracing::info!("Validating configuration: {}", config.display());

            match load_config(&config) {
                Ok(cfg) => {
                    tracing::info!("Configuration is valid");
                    tracing::info!("  Listen: {}", cfg.server.listen);
                    tracing::info!("  Endpoints: {}", cfg.endpoints.len());
                    tracing::info!("  Ignored paths: {}", cfg.ignore.len());
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Configuration validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Faultline");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()),
        )
        .init();

    Ok(())
}
