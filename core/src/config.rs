use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Outbound call timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Total time allowed for one upstream call. `0` disables the limit.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest inbound heartbeat body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 53128 }
fn default_request_timeout() -> u64 { 120 }
fn default_connect_timeout() -> u64 { 20 }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }

const LOCAL_CONFIG_FILE: &str = "heartbeat-relay.toml";

/// Get default config file path (~/.config/heartbeat-relay/config.toml)
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("heartbeat-relay")
        .join("config.toml")
}

/// Load config from file, or return defaults if not found.
///
/// Loading order:
/// 1. Specified path (if provided, must exist)
/// 2. ./heartbeat-relay.toml (if exists)
/// 3. default_config_path()
pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    if let Some(config_path) = path {
        if !config_path.exists() {
            anyhow::bail!("Specified config file not found: {:?}", config_path);
        }
        let config = read_config(&config_path)?;
        tracing::info!("Loaded config from specified path {:?}", config_path);
        return Ok(config);
    }

    let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
    if local_config.exists() {
        match read_config(&local_config) {
            Ok(config) => {
                tracing::info!("Loaded config from current directory {:?}", local_config);
                return Ok(config);
            }
            Err(e) => {
                tracing::error!("Failed to load ./{}: {:#}. Falling back to default path.", LOCAL_CONFIG_FILE, e);
            }
        }
    }

    let default_path = default_config_path();
    if default_path.exists() {
        let config = read_config(&default_path)?;
        tracing::info!("Loaded config from default path {:?}", default_path);
        Ok(config)
    } else {
        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }
}

fn read_config(path: &std::path::Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
