//! Relay module - heartbeat forwarding server

pub mod cors;
pub mod error;
pub mod handlers;
pub mod server;
pub mod upstream;

pub use error::RelayError;
pub use handlers::heartbeat::HeartbeatTarget;
pub use server::{AppState, BoundRelay, RelayServer};
pub use upstream::{UpstreamClient, UpstreamReply};
