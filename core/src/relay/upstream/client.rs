//! Upstream client for the time-tracking heartbeats API

use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};
use tokio::time::Duration;

use crate::config::TimeoutsConfig;
use crate::relay::error::RelayError;
use crate::relay::handlers::heartbeat::{HeartbeatTarget, MACHINE_NAME_HEADER};

/// Upstream answer, fully read.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Client,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutsConfig) -> anyhow::Result<Self> {
        // Caller-supplied upstreams are contacted directly, never through
        // an environment-configured proxy.
        let mut builder = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(timeouts.connect_timeout))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60));

        if timeouts.request_timeout > 0 {
            builder = builder.timeout(Duration::from_secs(timeouts.request_timeout));
        } else {
            tracing::warn!("Upstream request timeout disabled; a stalled upstream holds its caller open");
        }

        let http_client = builder.build()?;
        Ok(Self { http_client })
    }

    fn build_headers(target: &HeartbeatTarget, body_len: usize) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(MACHINE_NAME_HEADER, target.machine_name.clone());
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
        headers.insert(header::USER_AGENT, target.user_agent.clone());
        headers
    }

    /// Send one heartbeat upstream. Exactly one attempt is made.
    ///
    /// Any upstream status, success or not, is an `Ok` reply; only a failed
    /// exchange is an error.
    pub async fn forward(
        &self,
        target: &HeartbeatTarget,
        body: Bytes,
    ) -> Result<UpstreamReply, RelayError> {
        let headers = Self::build_headers(target, body.len());

        let response = self.http_client
            .post(target.url())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamReply { status, headers, body })
    }
}
