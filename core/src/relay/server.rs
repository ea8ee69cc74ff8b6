//! Relay Server - Axum HTTP server
//! Owns the listening socket and the routing table for heartbeat forwarding

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Config, LimitsConfig};
use crate::relay::cors;
use crate::relay::handlers::{fallback, heartbeat};
use crate::relay::upstream::UpstreamClient;

pub const HEARTBEAT_PATH: &str = "/heartbeat";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

/// Build the routing table.
///
/// `OPTIONS` on any path is a preflight, `POST /heartbeat` is forwarded and
/// everything else, including other methods on `/heartbeat`, is a 404.
pub fn router(state: AppState, limits: &LimitsConfig) -> Router {
    Router::new()
        .route(
            HEARTBEAT_PATH,
            post(heartbeat::handle).fallback(fallback::not_found),
        )
        .fallback(fallback::not_found)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(middleware::from_fn(cors::preflight))
        .layer(cors::allow_any_origin())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Relay server instance, configured but not yet listening
pub struct RelayServer {
    addr: String,
    router: Router,
}

impl RelayServer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config.timeouts)?),
        };

        Ok(Self {
            addr: config.bind_address(),
            router: router(state, &config.limits),
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the listening socket.
    pub async fn bind(self) -> anyhow::Result<BoundRelay> {
        let listener = TcpListener::bind(&self.addr).await?;
        Ok(BoundRelay {
            listener,
            router: self.router,
        })
    }

    /// Bind and serve until Ctrl+C or SIGTERM (blocking)
    pub async fn run(self) -> anyhow::Result<()> {
        self.bind().await?.serve(shutdown_signal()).await
    }
}

/// A relay holding its listening socket
pub struct BoundRelay {
    listener: TcpListener,
    router: Router,
}

impl BoundRelay {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until `shutdown` resolves, then stop accepting and let
    /// in-flight requests drain.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        tracing::info!("Heartbeat relay listening on http://{}", addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Heartbeat relay stopped");
        Ok(())
    }
}

/// Shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
