use std::path::PathBuf;

use heartbeat_relay_core::config::load_config;
use heartbeat_relay_core::relay::RelayServer;

pub async fn run(
    config_path: Option<PathBuf>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_config(config_path)?;

    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    tracing::info!("Starting heartbeat relay...");
    tracing::info!("  Listen: {}", config.bind_address());
    match config.timeouts.request_timeout {
        0 => tracing::info!("  Upstream timeout: none"),
        secs => tracing::info!("  Upstream timeout: {}s", secs),
    }
    tracing::info!("  Max body: {} bytes", config.limits.max_body_bytes);

    let server = RelayServer::new(&config)?;

    tracing::info!("Press Ctrl+C to stop");

    // Run server (blocks until shutdown)
    server.run().await?;

    Ok(())
}
