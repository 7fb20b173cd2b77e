//! Error types for loaders and transports.
//!
//! Two families of errors exist and they never mix:
//!
//! - [`LoaderError`] is an *operational* failure. It is never returned from a
//!   call; it travels inside [`LoaderEvent::Fail`](crate::LoaderEvent::Fail).
//! - [`UsageError`] is a programming error (for example loading without a
//!   URL). It is returned synchronously and no event is emitted.

/// Classification of an operational failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network error reported by the transport, or a missing local file.
    Io,
    /// The transport refused to issue the request.
    Security,
    /// The received content could not be decoded into the loader's type.
    Decode,
}

/// Reason carried by a `Fail` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// Transport-level network error, or a local file that does not exist.
    #[error("I/O error: {message}")]
    Io {
        /// Human readable description, including the path for file errors.
        message: String,
    },
    /// The transport rejected the request synchronously.
    #[error("Security error: {message}")]
    Security {
        /// Description of the rejection.
        message: String,
    },
    /// The content arrived but does not decode into the requested type.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl LoaderError {
    /// Create an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a security error.
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// The failure classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Io { .. } => FailureKind::Io,
            Self::Security { .. } => FailureKind::Security,
            Self::Decode { .. } => FailureKind::Decode,
        }
    }

    /// The message without the classification prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Io { message } | Self::Security { message } | Self::Decode { message } => {
                message
            }
        }
    }
}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<quick_xml::DeError> for LoaderError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::decode(err.to_string())
    }
}

impl From<TransportError> for LoaderError {
    fn from(err: TransportError) -> Self {
        Self::security(err.to_string())
    }
}

/// Programming errors detected before a load cycle starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// `load` or `send` was called while no URL is configured.
    #[error("No URL set on the loader")]
    MissingUrl,
}

/// Synchronous failure raised by a transport while issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// `request` was called before `set_url`.
    #[error("No URL staged on the transport")]
    MissingUrl,
    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// The environment refused the request (origin or sandbox restriction).
    #[error("Request rejected: {0}")]
    Rejected(String),
    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for TransportError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for TransportError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(err.to_string())
    }
}

/// Errors raised while building an outbound payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// The value could not be serialized to JSON.
    #[error("JSON serialization failed: {0}")]
    Json(String),
    /// The value could not be serialized to XML.
    #[error("XML serialization failed: {0}")]
    Xml(String),
    /// The markup text is not well-formed.
    #[error("Malformed markup: {0}")]
    Markup(String),
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<quick_xml::SeError> for PayloadError {
    fn from(err: quick_xml::SeError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::Error> for PayloadError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Markup(err.to_string())
    }
}

/// A specialized Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(LoaderError::io("x").kind(), FailureKind::Io);
        assert_eq!(LoaderError::security("x").kind(), FailureKind::Security);
        assert_eq!(LoaderError::decode("x").kind(), FailureKind::Decode);
    }

    #[test]
    fn test_transport_error_becomes_security() {
        let err: LoaderError = TransportError::Rejected("cross-origin".into()).into();
        assert_eq!(err.kind(), FailureKind::Security);
        assert!(err.message().contains("cross-origin"));
    }

    #[test]
    fn test_display_includes_message() {
        let err = LoaderError::io("File not found: data/a.txt");
        assert_eq!(err.to_string(), "I/O error: File not found: data/a.txt");
    }
}
