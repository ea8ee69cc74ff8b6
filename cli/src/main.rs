use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heartbeat_relay=info".parse()?)
                .add_directive("heartbeat_relay_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { host, port } => {
            cli::commands::start::run(cli.config, host, port).await?;
        }
        Commands::Status => {
            cli::commands::status::run(cli.config).await?;
        }
        Commands::Config => {
            cli::commands::show_config::run(cli.config)?;
        }
    }

    Ok(())
}
