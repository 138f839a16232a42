//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;

use hive_bridge::config::{parse_config, ServiceConfig};
use hive_bridge::fabric::{Fabric, Request, Response};
use hive_bridge::Application;

/// One request seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Raw (still percent-encoded) path.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

type Responder = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct MockState {
    recorded: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

/// Programmable stand-in for TheHive, bound to an ephemeral port.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    /// Start a mock that answers every request through `responder`.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
    {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            recorded: recorded.clone(),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    /// Start a mock that always answers `status` with `body`.
    pub async fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone())).await
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    };
    let (status, body) = (state.responder)(&recorded);
    state.recorded.lock().unwrap().push(recorded);
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Config pointing at `127.0.0.1:<port>` over plain HTTP with every operation enabled.
///
/// `extra` is appended to the `[general]` table.
pub fn bridge_config(port: u16, extra: &str) -> ServiceConfig {
    parse_config(&format!(
        r#"
        [general]
        host = "127.0.0.1"
        port = {port}
        use_ssl = false
        api_names = [
            "create_case", "create_case_task", "create_case_observable",
            "get_case", "get_case_task", "get_case_observable",
            "search_case", "search_case_task", "search_case_observable",
            "create_alert", "get_alert", "search_alert",
        ]
        api_principal = "test-api-key"
        {extra}

        [timeouts]
        connect_secs = 2
        request_secs = 5

        [fabric]
        request_timeout_secs = 10
        "#
    ))
    .unwrap()
}

/// Build a bridge on its own in-process fabric.
pub fn bridge(port: u16, extra: &str) -> Application {
    Application::build(bridge_config(port, extra)).unwrap()
}

/// Send `payload` on `topic` and wait for the reply.
pub async fn call(app: &Application, topic: &str, payload: &str) -> Response {
    app.fabric()
        .sync_request(Request::new(topic.to_string(), payload.to_string()), Duration::from_secs(10))
        .await
        .unwrap()
}
