//! HTTP ingress setup.
//!
//! # Responsibilities
//! - Create the Axum router fronting the in-process fabric
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Bind the server to a listener and stop on the shutdown broadcast
//!
//! # Routes
//! ```text
//! GET  /health      liveness and version
//! GET  /services    registered services with their topics
//! POST /{*topic}    synchronous fabric request on "/" + topic
//! ```

use std::io;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::HeaderMap,
    response::Response as HttpResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::fabric::{Fabric, MemoryFabric};
use crate::http::request::to_fabric_request;
use crate::http::response::{render, render_fabric_error};

/// Slack between the fabric timeout and the outer HTTP timeout.
const TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct IngressState {
    pub fabric: MemoryFabric,
    pub request_timeout: Duration,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// One entry of `GET /services`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service_type: String,
    pub topics: Vec<String>,
}

/// HTTP front door onto the fabric.
pub struct IngressServer {
    router: Router,
}

impl IngressServer {
    pub fn new(fabric: MemoryFabric, config: &ServiceConfig) -> Self {
        let state = IngressState {
            fabric,
            request_timeout: Duration::from_secs(config.fabric.request_timeout_secs),
        };
        let router = Self::build_router(state, config.ingress.max_body_bytes);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: IngressState, max_body_bytes: usize) -> Router {
        let timeout = state.request_timeout + TIMEOUT_MARGIN;
        Router::new()
            .route("/health", get(health))
            .route("/services", get(services))
            .route("/{*topic}", post(fabric_request))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(max_body_bytes))
                    .layer(TimeoutLayer::new(timeout)),
            )
    }

    /// The router, for serving on a caller-owned listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the shutdown broadcast fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP ingress starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP ingress stopped");
        Ok(())
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn services(State(state): State<IngressState>) -> Json<Vec<ServiceInfo>> {
    let services = state
        .fabric
        .services()
        .into_iter()
        .map(|(service_type, topics)| ServiceInfo { service_type, topics })
        .collect();
    Json(services)
}

async fn fabric_request(
    State(state): State<IngressState>,
    Path(topic): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResponse {
    let request = to_fabric_request(&topic, &headers, body);
    tracing::debug!(
        message_id = %request.message_id,
        topic = %request.destination_topic,
        "Forwarding ingress request to fabric"
    );

    match state.fabric.sync_request(request, state.request_timeout).await {
        Ok(response) => render(response),
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "Fabric request failed");
            render_fabric_error(&e)
        }
    }
}
