//! Upstream (case-management REST API) subsystem.
//!
//! # Data Flow
//! ```text
//! OperationHandler
//!     → client.rs (build URL, attach auth.rs credentials, send via reqwest)
//!     → tls.rs policy applied once at client construction
//!     → outcome.rs (2xx → success, else → structured error)
//!     → fabric::Response
//! ```

pub mod auth;
pub mod client;
pub mod outcome;
pub mod tls;

use std::path::PathBuf;

use thiserror::Error;

pub use auth::Credentials;
pub use client::{TheHiveClient, UpstreamPath, UpstreamSettings};
pub use outcome::FALLBACK_ERROR_MESSAGE;
pub use tls::CertificateVerification;

/// Errors raised while talking to the upstream server.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured base URL cannot be used.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The trust bundle could not be read.
    #[error("Unable to read certificate bundle {path:?}: {source}")]
    CertificateBundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trust bundle could not be parsed.
    #[error("Invalid certificate bundle {path:?}: {source}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    /// The trust bundle holds no certificates.
    #[error("Certificate bundle {0:?} contains no certificates")]
    EmptyBundle(PathBuf),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection, TLS, timeout or body read failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A body that should be JSON is not.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
