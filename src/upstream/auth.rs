//! Upstream authentication.

use reqwest::RequestBuilder;

/// Credentials attached to every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication headers.
    None,
    /// `Authorization: Bearer <key>`.
    Bearer(String),
    /// HTTP Basic authentication.
    Basic { user: String, password: String },
}

impl Credentials {
    /// Select the scheme from the configured principal and password.
    ///
    /// A non-empty password means the principal is a user name (Basic);
    /// otherwise the principal is an API key (Bearer).
    pub fn from_principal(principal: &str, password: &str) -> Self {
        match (principal.is_empty(), password.is_empty()) {
            (true, _) => Credentials::None,
            (false, true) => Credentials::Bearer(principal.to_string()),
            (false, false) => Credentials::Basic {
                user: principal.to_string(),
                password: password.to_string(),
            },
        }
    }

    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::None => builder,
            Credentials::Bearer(key) => builder.bearer_auth(key),
            Credentials::Basic { user, password } => builder.basic_auth(user, Some(password)),
        }
    }

    /// Scheme name for logging.
    pub fn scheme(&self) -> &'static str {
        match self {
            Credentials::None => "none",
            Credentials::Bearer(_) => "bearer",
            Credentials::Basic { .. } => "basic",
        }
    }
}

// Never print secrets.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => f.write_str("None"),
            Credentials::Bearer(_) => f.write_str("Bearer(***)"),
            Credentials::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    #[test]
    fn test_scheme_selection() {
        assert_eq!(Credentials::from_principal("", ""), Credentials::None);
        assert_eq!(Credentials::from_principal("", "pw"), Credentials::None);
        assert_eq!(
            Credentials::from_principal("key", ""),
            Credentials::Bearer("key".to_string())
        );
        assert_eq!(
            Credentials::from_principal("user", "pw"),
            Credentials::Basic { user: "user".to_string(), password: "pw".to_string() }
        );
    }

    #[test]
    fn test_headers_applied() {
        let client = reqwest::Client::new();

        let req = Credentials::Bearer("myspecialkey".into())
            .apply(client.get("http://localhost/"))
            .build()
            .unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer myspecialkey");

        let req = Credentials::Basic { user: "u".into(), password: "p".into() }
            .apply(client.get("http://localhost/"))
            .build()
            .unwrap();
        // base64("u:p")
        assert_eq!(req.headers()[AUTHORIZATION], "Basic dTpw");

        let req = Credentials::None.apply(client.get("http://localhost/")).build().unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_debug_redacts() {
        let text = format!("{:?}", Credentials::Basic { user: "u".into(), password: "secret".into() });
        assert!(!text.contains("secret"));
        assert!(!format!("{:?}", Credentials::Bearer("secret".into())).contains("secret"));
    }
}
