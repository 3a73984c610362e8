use crate::commands::replay::Replay;
use crate::commands::tools::Tools;
use anyhow::Context;
use clap::Parser;
use dogebridge_primitives::BridgeConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Replay a file of serialized headers through the header relay.
    Replay(Replay),

    /// Validate a bridge configuration file.
    CheckConfig {
        /// Path to the JSON configuration.
        #[arg(long, short)]
        config: PathBuf,
    },

    /// Utility tools.
    #[command(subcommand)]
    Tools(Tools),
}

#[derive(Debug, Parser)]
#[clap(version, about = "Dogecoin to Ethereum bridge tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter directives, overriding `RUST_LOG`.
    ///
    /// Defaults to `info` when neither is set.
    #[arg(long, global = true, value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,
}

fn init_logging(log_filter: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter: {directives}"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Parse and run command line arguments.
pub fn run() -> anyhow::Result<()> {
    let Cli {
        command,
        log_filter,
    } = Cli::parse();

    init_logging(log_filter.as_deref())?;

    match command {
        Command::Replay(replay) => {
            let summary = replay.run()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::CheckConfig { config } => {
            let config = BridgeConfig::from_json_file(&config)
                .with_context(|| format!("Failed to load {}", config.display()))?;
            tracing::info!(
                "Config is valid: network {}, genesis at height {}",
                config.network,
                config.genesis.height
            );
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Tools(tools) => tools.run()?,
    }

    Ok(())
}
