//! Message fabric subsystem.
//!
//! # Data Flow
//! ```text
//! Requester
//!     → Fabric::sync_request(Request, timeout)
//!     → topic lookup (memory.rs)
//!     → RequestCallback::on_request (one task per request)
//!     → Response (success or structured error)
//!     → back to the requester
//! ```
//!
//! # Design Decisions
//! - The fabric is a trait seam; `MemoryFabric` is the in-process binding
//! - A callback's return value is its reply, so every request gets one reply
//! - Fabric-level failures (no service, timeout) are `FabricError`, never a
//!   `Response`

pub mod memory;
pub mod message;
pub mod service;

pub use memory::MemoryFabric;
pub use message::{Request, Response};
pub use service::{Fabric, FabricError, RequestCallback, ServiceRegistration};
