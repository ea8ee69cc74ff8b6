use std::path::PathBuf;

use heartbeat_relay_core::config::load_config;

pub fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
