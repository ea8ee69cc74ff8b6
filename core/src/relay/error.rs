//! Request-scoped failures and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as StdError;

const UPSTREAM_FAILURE_BODY: &str = "Error processing request";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// X-Proxy-Url or API-Key absent or empty
    #[error("Missing headers X-Proxy-Url and API-Key are required")]
    MissingRoutingHeaders,

    /// The upstream call itself failed: bad URL, connect error, timeout, broken response
    #[error("upstream request failed: {0}")]
    Upstream(reqwest::Error),
}

impl From<reqwest::Error> for RelayError {
    /// The outbound URL carries the API key in its query, so it is stripped
    /// before the error can reach a log line.
    fn from(err: reqwest::Error) -> Self {
        RelayError::Upstream(err.without_url())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::MissingRoutingHeaders => {
                tracing::warn!("Rejected heartbeat: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            RelayError::Upstream(e) => {
                tracing::error!(
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    "Heartbeat forwarding failed: {}",
                    error_chain(e)
                );
                (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE_BODY).into_response()
            }
        }
    }
}

/// Render an error followed by every source beneath it.
fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
