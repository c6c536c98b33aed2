use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod workload;

use commands::*;
use config::Config;

#[derive(Parser)]
#[command(name = "shard")]
#[command(author, version, about = "Shard Store - fragmented, replicated tables on a simulated network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Greet the coordinator and its nodes
    Hello {
        /// Name to greet with
        #[arg(short, long, default_value = "shard-cli")]
        visitor: String,
    },

    /// Build tables, write rows and run joins from a workload file
    Run {
        /// Workload JSON file
        #[arg(short, long)]
        workload: PathBuf,

        /// Drop and delay messages on the network
        #[arg(short, long)]
        unreliable: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = if let Some(config_path) = cli.config {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    print_banner();

    match cli.command {
        Commands::Hello { visitor } => {
            say_hello(&config, &visitor).await?;
        }
        Commands::Run {
            workload,
            unreliable,
        } => {
            run_workload(&config, &workload, unreliable).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        "shard_cli=debug,shard_core=debug,shard_network=debug,shard_node=debug,shard_coordinator=debug"
    } else {
        "shard_cli=info,shard_coordinator=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        r#"
  ____  _                   _
 / ___|| |__   __ _ _ __ __| |
 \___ \| '_ \ / _` | '__/ _` |
  ___) | | | | (_| | | | (_| |
 |____/|_| |_|\__,_|_|  \__,_|
    "#
        .bright_cyan()
    );
    println!(
        "{}",
        "Fragmented Table Store v0.1.0".bright_yellow()
    );
}
