//! Certificate verification policy for upstream connections.

use std::path::{Path, PathBuf};

use reqwest::{Certificate, ClientBuilder};

use crate::upstream::UpstreamError;

/// How the upstream server certificate is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateVerification {
    /// Verify against the system trust store.
    Enabled,
    /// Accept any certificate.
    Disabled,
    /// Verify against the PEM bundle at this path only.
    Bundle(PathBuf),
}

impl CertificateVerification {
    /// Build the policy from the `verify_certificate` flag and optional bundle path.
    pub fn from_config(verify: bool, bundle: Option<&str>) -> Self {
        match bundle.filter(|path| !path.is_empty()) {
            _ if !verify => CertificateVerification::Disabled,
            Some(path) => CertificateVerification::Bundle(PathBuf::from(path)),
            None => CertificateVerification::Enabled,
        }
    }

    /// Configure `builder` with this policy.
    pub fn apply(&self, builder: ClientBuilder) -> Result<ClientBuilder, UpstreamError> {
        match self {
            CertificateVerification::Enabled => Ok(builder),
            CertificateVerification::Disabled => {
                tracing::warn!("Upstream certificate verification is disabled");
                Ok(builder.danger_accept_invalid_certs(true))
            }
            CertificateVerification::Bundle(path) => {
                let certs = load_bundle(path)?;
                tracing::info!(path = ?path, certificates = certs.len(), "Loaded upstream trust bundle");
                let builder = certs
                    .into_iter()
                    .fold(builder.tls_built_in_root_certs(false), |builder, cert| {
                        builder.add_root_certificate(cert)
                    });
                Ok(builder)
            }
        }
    }
}

fn load_bundle(path: &Path) -> Result<Vec<Certificate>, UpstreamError> {
    let pem = std::fs::read(path).map_err(|source| UpstreamError::CertificateBundle {
        path: path.to_path_buf(),
        source,
    })?;
    let certs = Certificate::from_pem_bundle(&pem).map_err(|source| UpstreamError::Certificate {
        path: path.to_path_buf(),
        source,
    })?;
    if certs.is_empty() {
        return Err(UpstreamError::EmptyBundle(path.to_path_buf()));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        assert_eq!(CertificateVerification::from_config(true, None), CertificateVerification::Enabled);
        assert_eq!(CertificateVerification::from_config(true, Some("")), CertificateVerification::Enabled);
        assert_eq!(
            CertificateVerification::from_config(true, Some("/etc/ca.pem")),
            CertificateVerification::Bundle(PathBuf::from("/etc/ca.pem"))
        );
        assert_eq!(
            CertificateVerification::from_config(false, Some("/etc/ca.pem")),
            CertificateVerification::Disabled
        );
    }

    #[test]
    fn test_missing_bundle() {
        let policy = CertificateVerification::Bundle(PathBuf::from("/nonexistent/hive-ca.pem"));
        let err = policy.apply(reqwest::Client::builder()).unwrap_err();
        assert!(matches!(err, UpstreamError::CertificateBundle { .. }));
    }

    #[test]
    fn test_bundle_without_certificates() {
        let path = std::env::temp_dir().join(format!("hive-bridge-{}.pem", uuid::Uuid::new_v4()));
        std::fs::write(&path, "not a certificate").unwrap();

        let result = CertificateVerification::Bundle(path.clone()).apply(reqwest::Client::builder());
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_disabled_builds() {
        let builder = CertificateVerification::Disabled.apply(reqwest::Client::builder()).unwrap();
        assert!(builder.build().is_ok());
    }
}
