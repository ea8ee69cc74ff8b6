//! Shared utilities for relay integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use heartbeat_relay_core::config::Config;
use heartbeat_relay_core::relay::RelayServer;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Captured {
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Default)]
pub struct Captures(Arc<Mutex<Vec<Captured>>>);

#[allow(dead_code)]
impl Captures {
    pub fn all(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct MockState {
    captures: Captures,
    delay: Duration,
}

/// Start a mock heartbeats API answering 201 `{"ok":true}` with a couple of
/// extra headers, recording everything it receives.
pub async fn start_mock_upstream(delay: Duration) -> (SocketAddr, Captures) {
    let captures = Captures::default();
    let state = MockState {
        captures: captures.clone(),
        delay,
    };

    let app = Router::new()
        .route("/users/current/heartbeats", post(record))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captures)
}

async fn record(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.captures.0.lock().unwrap().push(Captured {
        uri: uri.to_string(),
        headers,
        body,
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        StatusCode::CREATED,
        [
            ("x-upstream-trace", "trace-42"),
            ("access-control-allow-origin", "https://upstream.example"),
            ("content-type", "application/json"),
        ],
        r#"{"ok":true}"#,
    )
        .into_response()
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a mock heartbeats API that refuses every heartbeat with 401 and
/// two `set-cookie` values.
#[allow(dead_code)]
pub async fn start_rejecting_upstream() -> SocketAddr {
    let app = Router::new().route(
        "/users/current/heartbeats",
        post(|| async {
            Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header("set-cookie", "session=expired; Path=/")
                .header("set-cookie", "csrf=reset; Path=/")
                .header("content-type", "text/plain")
                .body(Body::from("invalid api key"))
                .unwrap()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// A running relay on an ephemeral port.
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    served: Option<JoinHandle<()>>,
}

impl TestRelay {
    pub async fn start(mut config: Config) -> Self {
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;

        let bound = RelayServer::new(&config).unwrap().bind().await.unwrap();
        let addr = bound.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let served = tokio::spawn(async move {
            let _ = bound
                .serve(async {
                    let _ = rx.await;
                })
                .await;
        });

        Self {
            addr,
            shutdown: Some(tx),
            served: Some(served),
        }
    }

    /// Signal shutdown without waiting for it to finish.
    #[allow(dead_code)]
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the serve loop has returned.
    #[allow(dead_code)]
    pub async fn stopped(&mut self) {
        if let Some(served) = self.served.take() {
            tokio::time::timeout(Duration::from_secs(5), served)
                .await
                .expect("relay did not stop")
                .unwrap();
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
