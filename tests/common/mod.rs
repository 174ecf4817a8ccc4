//! Shared utilities for integration tests: a recording mock backend and
//! gateway constructors pointed at it.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use edge_gateway::{GatewayConfig, HttpServer, Shutdown};

/// What the mock backend saw for one call.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Handle on a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.calls().pop().expect("backend was never called")
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(respond: F) -> MockBackend
where
    F: Fn(Recorded) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve_backend(listener, respond)
}

/// Start a mock backend on a fixed address, e.g. one handed out by
/// [`unused_addr`] earlier.
pub async fn start_mock_backend_at(
    addr: SocketAddr,
    status: StatusCode,
    body: &'static str,
) -> MockBackend {
    let listener = TcpListener::bind(addr).await.unwrap();
    serve_backend(listener, move |_| async move {
        (status, [("content-type", "application/json")], body).into_response()
    })
}

fn serve_backend<F, Fut>(listener: TcpListener, respond: F) -> MockBackend
where
    F: Fn(Recorded) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorder = calls.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let recorder = recorder.clone();
        let respond = respond.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            let recorded = Recorded {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            };
            recorder.lock().unwrap().push(recorded.clone());
            respond(recorded).await
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, calls }
}

/// Start a mock backend that always answers with `status` and a JSON body.
pub async fn start_mock_backend(status: StatusCode, body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move {
        (status, [("content-type", "application/json")], body).into_response()
    })
    .await
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway configuration pointed at `backend_url`.
pub fn gateway_config(backend_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.url = backend_url.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// In-process gateway router for `oneshot` tests.
pub fn gateway(backend_url: &str) -> Router {
    HttpServer::new(gateway_config(backend_url)).unwrap().router()
}

/// Serve a gateway over TCP; trigger the returned `Shutdown` to stop it.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}
