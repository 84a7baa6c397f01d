//! Error types for libimage
//!
//! This module provides comprehensive error handling for reference parsing,
//! transport resolution, policy scope validation, and registry fetch
//! operations. All errors implement the standard Error trait and carry
//! context-rich messages.

use thiserror::Error;

#[cfg(test)]
mod tests;

/// Main error type for libimage operations
#[derive(Error, Debug)]
pub enum ImageError {
    /// Malformed transport-qualified string, malformed repository name,
    /// or disallowed character set
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A reference state the backend cannot satisfy, e.g. neither tag nor
    /// digest where one is required
    #[error("Unsupported combination: {message}")]
    UnsupportedCombination { message: String },

    /// No registered transport matches the given prefix
    #[error("Unknown transport {name:?}")]
    UnknownTransport { name: String },

    /// Transport registration collision at startup
    #[error("Transport {name:?} is already registered")]
    DuplicateTransport { name: String },

    /// A policy scope string failed a transport's validation rule
    #[error("Invalid scope {scope:?}: {message}")]
    InvalidScope { scope: String, message: String },

    /// Endpoint discovery produced nothing, or no endpoint was ever attempted
    #[error("No suitable endpoints found for {repository}")]
    NoSuitableEndpoint { repository: String },

    /// An endpoint confirmed that the attempted protocol version does not
    /// support this operation
    #[error("Protocol not supported by {endpoint}: {message}")]
    ProtocolNotSupported { endpoint: String, message: String },

    /// Terminal fetch error after all endpoints were exhausted
    #[error("Failed to fetch manifest for {repository} (last endpoint: {endpoint}): {message}")]
    FetchFailed {
        repository: String,
        endpoint: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation's deadline expired or it was explicitly canceled
    #[error("Operation canceled: {message}")]
    Canceled { message: String },

    /// Resource not found errors (404)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Network-related errors (connection, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403, token issues)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Server errors (500, 503)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Filesystem errors from the directory transport
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for libimage operations
pub type Result<T> = std::result::Result<T, ImageError>;

impl ImageError {
    /// Creates a new invalid-input error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::error::ImageError;
    ///
    /// let err = ImageError::invalid_input("uppercase characters are not allowed");
    /// assert!(matches!(err, ImageError::InvalidInput { .. }));
    /// ```
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new invalid-input error with a source error.
    pub fn invalid_input_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidInput {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new unsupported-combination error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::error::ImageError;
    ///
    /// let err = ImageError::unsupported_combination("reference has neither a tag nor a digest");
    /// assert!(matches!(err, ImageError::UnsupportedCombination { .. }));
    /// ```
    pub fn unsupported_combination<S: Into<String>>(message: S) -> Self {
        Self::UnsupportedCombination {
            message: message.into(),
        }
    }

    /// Creates a new unknown-transport error.
    pub fn unknown_transport<S: Into<String>>(name: S) -> Self {
        Self::UnknownTransport { name: name.into() }
    }

    /// Creates a new duplicate-transport error.
    pub fn duplicate_transport<S: Into<String>>(name: S) -> Self {
        Self::DuplicateTransport { name: name.into() }
    }

    /// Creates a new invalid-scope error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::error::ImageError;
    ///
    /// let err = ImageError::invalid_scope("relative/path", "must be an absolute path");
    /// assert!(matches!(err, ImageError::InvalidScope { .. }));
    /// ```
    pub fn invalid_scope<S: Into<String>>(scope: S, message: S) -> Self {
        Self::InvalidScope {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Creates a new no-suitable-endpoint error.
    pub fn no_suitable_endpoint<S: Into<String>>(repository: S) -> Self {
        Self::NoSuitableEndpoint {
            repository: repository.into(),
        }
    }

    /// Creates a new protocol-not-supported error.
    pub fn protocol_not_supported<S: Into<String>>(endpoint: S, message: S) -> Self {
        Self::ProtocolNotSupported {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a new terminal fetch error carrying the repository and the
    /// last attempted endpoint for diagnosis.
    pub fn fetch_failed<S: Into<String>>(repository: S, endpoint: S, message: S) -> Self {
        Self::FetchFailed {
            repository: repository.into(),
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new terminal fetch error with a source error.
    pub fn fetch_failed_with_source<S, E>(
        repository: S,
        endpoint: S,
        message: S,
        source: E,
    ) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FetchFailed {
            repository: repository.into(),
            endpoint: endpoint.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new cancellation error.
    pub fn canceled<S: Into<String>>(message: S) -> Self {
        Self::Canceled {
            message: message.into(),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found<S: Into<String>>(resource_type: S, name: S) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::error::ImageError;
    ///
    /// let err = ImageError::network("connection refused");
    /// assert!(matches!(err, ImageError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new I/O error with a source error.
    pub fn io_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
