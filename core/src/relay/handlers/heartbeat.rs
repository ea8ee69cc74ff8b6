//! Heartbeat forwarding handler
//! Handles POST /heartbeat

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::relay::error::RelayError;
use crate::relay::handlers::fallback;
use crate::relay::server::AppState;

pub const PROXY_URL_HEADER: &str = "x-proxy-url";
pub const API_KEY_HEADER: &str = "api-key";
pub const MACHINE_NAME_HEADER: &str = "x-machine-name";

const HEARTBEATS_PATH: &str = "/users/current/heartbeats";

/// Where and as whom a single heartbeat is forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatTarget {
    pub base_url: String,
    pub api_key: String,
    pub machine_name: HeaderValue,
    pub user_agent: HeaderValue,
}

impl HeartbeatTarget {
    /// Extract the forwarding target from inbound headers.
    ///
    /// `HeaderMap` lookups are case-insensitive, so any casing the client
    /// sends is accepted.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, RelayError> {
        let base_url = required(headers, PROXY_URL_HEADER);
        let api_key = required(headers, API_KEY_HEADER);
        let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
            return Err(RelayError::MissingRoutingHeaders);
        };

        Ok(Self {
            base_url,
            api_key,
            machine_name: optional(headers, MACHINE_NAME_HEADER),
            user_agent: optional(headers, header::USER_AGENT.as_str()),
        })
    }

    /// `{base_url}/users/current/heartbeats?api_key={api_key}`
    pub fn url(&self) -> String {
        format!("{}{}?api_key={}", self.base_url, HEARTBEATS_PATH, self.api_key)
    }
}

fn required(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}

fn optional(headers: &HeaderMap, name: &str) -> HeaderValue {
    headers
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("Unknown"))
}

/// Forward one heartbeat upstream and relay the reply.
///
/// The `Bytes` extractor has already drained the inbound stream, so the
/// full body is in hand before any validation or outbound work.
/// Only the bare path is served; `/heartbeat?...` is unmatched.
pub async fn handle(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    if uri.query().is_some() {
        return Ok(fallback::not_found().await.into_response());
    }

    let target = HeartbeatTarget::from_headers(&headers)?;

    tracing::debug!(
        upstream = %target.base_url,
        bytes = body.len(),
        "Forwarding heartbeat"
    );

    let reply = state.upstream.forward(&target, body).await?;

    tracing::info!(
        upstream = %target.base_url,
        status = reply.status.as_u16(),
        "Heartbeat relayed"
    );

    Ok(reply.into_response())
}
