use std::path::PathBuf;
use std::time::Duration;

use heartbeat_relay_core::config::{default_config_path, load_config};

pub async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    println!("Heartbeat Relay Status");
    println!("======================");
    println!();
    println!("Configuration:");
    println!("  Default config file: {:?}", default_config_path());
    println!("  Listen address: {}", config.bind_address());
    println!("  Upstream timeout: {}s", config.timeouts.request_timeout);
    println!();

    // A running relay answers any preflight with 204
    let url = format!("http://{}/heartbeat", config.bind_address());
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(3))
        .build()?;

    match client.request(reqwest::Method::OPTIONS, &url).send().await {
        Ok(resp) if resp.status() == reqwest::StatusCode::NO_CONTENT => {
            println!("Server: RUNNING ✓");
        }
        Ok(resp) => {
            println!("Server: UNEXPECTED RESPONSE ({})", resp.status());
        }
        Err(_) => {
            println!("Server: NOT RUNNING");
        }
    }

    Ok(())
}
