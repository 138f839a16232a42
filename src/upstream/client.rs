//! HTTP client for the case-management (TheHive) REST API.
//!
//! # Responsibilities
//! - Own the connection pool, credentials and TLS policy for the upstream
//! - Issue GET/POST calls on behalf of fabric requests
//! - Produce exactly one fabric `Response` per call, whatever happens
//!
//! # Design Decisions
//! - Constructed once at startup and shared by `Arc`; no global client
//! - Paths are appended segment-wise, so ids are percent-encoded
//! - Transport and decoding failures become code-less error responses

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::IgnoredAny;
use serde_json::Value;
use url::Url;

use crate::config::ServiceConfig;
use crate::fabric::{Request, Response};
use crate::upstream::auth::Credentials;
use crate::upstream::outcome;
use crate::upstream::tls::CertificateVerification;
use crate::upstream::UpstreamError;

/// Everything needed to build a [`TheHiveClient`].
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// e.g. `https://thehive.example.com:9443`.
    pub base_url: String,
    pub credentials: Credentials,
    pub verification: CertificateVerification,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl UpstreamSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        let general = &config.general;
        Self {
            base_url: general.base_url(),
            credentials: Credentials::from_principal(&general.api_principal, &general.api_password),
            verification: CertificateVerification::from_config(
                general.verify_certificate,
                general.verify_cert_bundle.as_deref(),
            ),
            connect_timeout: Duration::from_secs(config.timeouts.connect_secs),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }
}

/// A REST path relative to the upstream base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPath {
    segments: Vec<String>,
}

impl UpstreamPath {
    /// Split a literal path such as `/api/case/_search`.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Append one segment. It is encoded as a unit when the URL is built.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for UpstreamPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Client for the upstream REST API.
#[derive(Clone)]
pub struct TheHiveClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl TheHiveClient {
    /// Build the client. Fails on a malformed base URL or unusable trust bundle.
    pub fn new(settings: UpstreamSettings) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| UpstreamError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidBaseUrl {
                url: settings.base_url,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout);
        let http = settings
            .verification
            .apply(builder)?
            .build()
            .map_err(UpstreamError::ClientBuild)?;

        tracing::info!(
            base_url = %base_url,
            auth = settings.credentials.scheme(),
            verification = ?settings.verification,
            "Upstream client initialized"
        );

        Ok(Self {
            http,
            base_url,
            credentials: settings.credentials,
        })
    }

    /// GET `path` on behalf of `request`.
    pub async fn get(&self, request: &Request, path: &UpstreamPath) -> Response {
        self.dispatch(request, Method::GET, path, None).await
    }

    /// POST `body` to `path` on behalf of `request`.
    ///
    /// With no `body`, the request payload itself is forwarded unchanged.
    pub async fn post(&self, request: &Request, path: &UpstreamPath, body: Option<Value>) -> Response {
        let body = match encode_body(request, body) {
            Ok(body) => body,
            Err(e) => return self.failure(request, &Method::POST, path, e),
        };
        self.dispatch(request, Method::POST, path, Some(body)).await
    }

    /// Absolute URL for `path`.
    pub fn url_for(&self, path: &UpstreamPath) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn dispatch(&self, request: &Request, method: Method, path: &UpstreamPath, body: Option<Bytes>) -> Response {
        match self.send(request, method.clone(), path, body).await {
            Ok(response) => response,
            Err(e) => self.failure(request, &method, path, e),
        }
    }

    async fn send(
        &self,
        request: &Request,
        method: Method,
        path: &UpstreamPath,
        body: Option<Bytes>,
    ) -> Result<Response, UpstreamError> {
        let url = self.url_for(path)?;
        tracing::debug!(
            message_id = %request.message_id,
            method = %method,
            url = %url,
            "Sending upstream request"
        );

        let mut builder = self.credentials.apply(self.http.request(method, url));
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        outcome::translate(request, status, body)
    }

    fn failure(&self, request: &Request, method: &Method, path: &UpstreamPath, error: UpstreamError) -> Response {
        tracing::error!(
            topic = %request.destination_topic,
            message_id = %request.message_id,
            method = %method,
            path = %path,
            error = %error,
            "Error handling request: {}",
            error
        );
        Response::error(request, None, error.to_string())
    }
}

impl std::fmt::Debug for TheHiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TheHiveClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

fn encode_body(request: &Request, body: Option<Value>) -> Result<Bytes, UpstreamError> {
    match body {
        Some(value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
        None => {
            serde_json::from_slice::<IgnoredAny>(&request.payload)?;
            Ok(request.payload.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::tls::CertificateVerification;

    fn settings(base_url: &str) -> UpstreamSettings {
        UpstreamSettings {
            base_url: base_url.to_string(),
            credentials: Credentials::None,
            verification: CertificateVerification::Enabled,
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_path_display() {
        let path = UpstreamPath::new("/api/case").push("123456").push("task");
        assert_eq!(path.to_string(), "/api/case/123456/task");
        assert_eq!(UpstreamPath::new("api//alert/_search/").to_string(), "/api/alert/_search");
    }

    #[test]
    fn test_url_for() {
        let client = TheHiveClient::new(settings("https://127.0.0.1:443")).unwrap();
        let url = client.url_for(&UpstreamPath::new("/api/case/_search")).unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1/api/case/_search");

        let client = TheHiveClient::new(settings("http://hive:9000/thehive/")).unwrap();
        let url = client.url_for(&UpstreamPath::new("/api/alert").push("a1")).unwrap();
        assert_eq!(url.as_str(), "http://hive:9000/thehive/api/alert/a1");
    }

    #[test]
    fn test_ids_are_encoded() {
        let client = TheHiveClient::new(settings("http://hive:9000")).unwrap();
        let url = client.url_for(&UpstreamPath::new("/api/case").push("a/b?c")).unwrap();
        assert_eq!(url.path(), "/api/case/a%2Fb%3Fc");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = TheHiveClient::new(settings("not a url")).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }));

        let err = TheHiveClient::new(settings("mailto:ops@example.com")).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn test_post_rejects_invalid_payload_before_sending() {
        // Port 9 (discard) would fail at transport level; the payload check comes first.
        let client = TheHiveClient::new(settings("http://127.0.0.1:9")).unwrap();
        let request = Request::new("/t", "{not json");
        let response = client.post(&request, &UpstreamPath::new("/api/case"), None).await;
        assert_eq!(response.error_code(), None);
        assert!(response.error_message().unwrap().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_code() {
        let client = TheHiveClient::new(settings("http://127.0.0.1:1")).unwrap();
        let request = Request::new("/t", r#"{"id":"1"}"#);
        let response = client.get(&request, &UpstreamPath::new("/api/case/1")).await;
        assert!(response.is_error());
        assert_eq!(response.error_code(), None);
        assert_eq!(response.request_message_id(), request.message_id);
    }
}
