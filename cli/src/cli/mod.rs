pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heartbeat-relay")]
#[command(author, version, about = "Heartbeat relay - forward time-tracking heartbeats to a caller-specified upstream")]
pub struct Cli {
    /// Path to config file (checked in order: ./heartbeat-relay.toml, ~/.config/heartbeat-relay/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Start {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show relay status
    Status,

    /// Print the effective configuration
    Config,
}
