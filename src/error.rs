//! Error types and classification shared across the crate.

use thiserror::Error;

use crate::transport::ResponseEnvelope;

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque error type carried by failed work items.
///
/// Work items run arbitrary caller code, so their error type is a boxed
/// trait object rather than [`Error`]; use [`classify_boxed`] to recover a
/// category from one.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the transport, settings, and scheduling layers.
#[derive(Debug, Error)]
pub enum Error {
    /// The request path could not be combined into a valid URL.
    #[error("invalid request url `{path}`: {detail}")]
    InvalidUrl { path: String, detail: String },

    /// The request never produced a response (connect, DNS, socket timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A checked request finished with a status outside 200-299.
    ///
    /// Carries the full envelope so the caller can map status and body to
    /// its own error vocabulary.
    #[error("upstream responded with status {}", .envelope.status)]
    UpstreamStatus { envelope: Box<ResponseEnvelope> },

    /// The operation was interrupted by a cancellation signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Runtime settings could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Coarse failure classification used in log fields and caller-side triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Worth retrying: rate limits, gateway hiccups, socket timeouts.
    Transient,
    /// Retrying will not help.
    Permanent,
    /// Interrupted by an explicit cancellation signal.
    Cancelled,
}

impl ErrorCategory {
    /// Stable label for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
            ErrorCategory::Cancelled => "cancelled",
        }
    }
}

impl Error {
    /// Classify this error for logging and triage.
    pub fn classify(&self) -> ErrorCategory {
        match self {
            Error::Transport(e) if e.is_timeout() || e.is_connect() => ErrorCategory::Transient,
            Error::Transport(_) => ErrorCategory::Permanent,
            Error::UpstreamStatus { envelope } => match envelope.status {
                429 | 502 | 503 | 504 => ErrorCategory::Transient,
                _ => ErrorCategory::Permanent,
            },
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::InvalidUrl { .. } | Error::Config(_) => ErrorCategory::Permanent,
        }
    }
}

/// Classify an opaque item error, falling back to `Permanent` for foreign types.
pub fn classify_boxed(error: &BoxError) -> ErrorCategory {
    match error.downcast_ref::<Error>() {
        Some(e) => e.classify(),
        None => ErrorCategory::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn envelope(status: u16) -> Box<ResponseEnvelope> {
        Box::new(ResponseEnvelope {
            status,
            headers: BTreeMap::new(),
            body: serde_json::Value::Null,
        })
    }

    #[test]
    fn test_upstream_status_classification() {
        for status in [429, 502, 503, 504] {
            let err = Error::UpstreamStatus { envelope: envelope(status) };
            assert_eq!(err.classify(), ErrorCategory::Transient, "status {status}");
        }
        for status in [400, 404, 500, 501] {
            let err = Error::UpstreamStatus { envelope: envelope(status) };
            assert_eq!(err.classify(), ErrorCategory::Permanent, "status {status}");
        }
    }

    #[test]
    fn test_cancelled_classification() {
        assert_eq!(Error::Cancelled.classify(), ErrorCategory::Cancelled);
    }

    #[test]
    fn test_invalid_url_is_permanent() {
        let err = Error::InvalidUrl {
            path: "::".to_string(),
            detail: "relative URL without a base".to_string(),
        };
        assert_eq!(err.classify(), ErrorCategory::Permanent);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ErrorCategory::Transient.as_str(), "transient");
        assert_eq!(ErrorCategory::Permanent.as_str(), "permanent");
        assert_eq!(ErrorCategory::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_classify_boxed_foreign_error() {
        let err: BoxError = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(classify_boxed(&err), ErrorCategory::Permanent);
    }

    #[test]
    fn test_classify_boxed_crate_error() {
        let err: BoxError = Box::new(Error::Cancelled);
        assert_eq!(classify_boxed(&err), ErrorCategory::Cancelled);
    }

    #[test]
    fn test_display_includes_status() {
        let err = Error::UpstreamStatus { envelope: envelope(502) };
        assert!(err.to_string().contains("502"));
    }
}
