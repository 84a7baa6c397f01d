//! Authentication header handling for registry requests.
//!
//! Credential storage and lookup are out of scope for this crate; callers
//! obtain credentials elsewhere and hand them in. This module only renders
//! them into the Authorization header the HTTP client attaches.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;


/// Credentials for registry authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (anonymous access)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic { username: String, password: String },

    /// Bearer token authentication (OAuth2-style)
    Bearer { token: String },
}

impl Credentials {
    /// Creates anonymous credentials.
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::auth::Credentials;
    ///
    /// let creds = Credentials::basic("user", "secret");
    /// assert!(creds.to_header_value().unwrap().starts_with("Basic "));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates Bearer token credentials.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Renders the Authorization header value, or `None` for anonymous
    /// access.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", encoded))
            }
            Self::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }
}
