//! Case-management service: routing and request translation.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     api_names (config)
//!     → registrar.rs (resolve names, compute topics)
//!     → one OperationHandler per topic
//!     → Fabric::register_service
//!
//! Per request:
//!     Request on topic
//!     → handler.rs (log, extract.rs pops path parameter)
//!     → operation.rs (verb + rendered path)
//!     → upstream client
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Operations are a closed enum; no name-based dynamic dispatch
//! - Handlers are stateless; the only shared object is the upstream client

pub mod extract;
pub mod handler;
pub mod operation;
pub mod registrar;

pub use extract::ExtractError;
pub use handler::OperationHandler;
pub use operation::{Operation, OperationDescriptor, UnknownOperation, Verb};
pub use registrar::{resolve_operations, topic_for, Binding, ServiceRegistrar, SERVICE_TYPE};
