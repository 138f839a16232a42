//! Bridge between a request/response messaging fabric and TheHive's REST API.

pub mod config;
pub mod fabric;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod upstream;

pub use config::ServiceConfig;
pub use fabric::{Fabric, MemoryFabric, Request, Response};
pub use http::IngressServer;
pub use lifecycle::{Application, Shutdown};
pub use service::Operation;
pub use upstream::TheHiveClient;
