//! HTTP ingress subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP POST /{*topic}
//!     → server.rs (Axum setup, request ID, limits, timeout)
//!     → request.rs (path → topic, request ID → message id)
//!     → MemoryFabric::sync_request
//!     → response.rs (success bytes or structured error)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Ingress is a thin shell; all semantics live behind the fabric
//! - Fabric failures and upstream errors share one JSON error shape

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ErrorBody;
pub use server::{HealthStatus, IngressServer, ServiceInfo};
