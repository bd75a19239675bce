//! Error taxonomy for price conversion lookups

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller cancelled the call before it completed
#[derive(Error, Debug)]
#[error("request cancelled")]
pub struct Cancelled;

/// Classified failure of a single conversion call.
///
/// Every variant is terminal for the call that produced it; nothing is retried.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The outbound request could not be built (bad URL, bad header, cancelled token)
    #[error("query construction failed: {0}")]
    QueryConstructionFailed(#[source] BoxError),

    /// Transport failure or a non-200 response
    #[error("query failed: {reason}")]
    QueryFailed {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Body was not the expected JSON shape
    #[error("response unmarshal failed: {0}")]
    ResponseUnmarshalFailed(#[from] serde_json::Error),

    /// Provider reported an error through its status envelope
    #[error("status error {code}: {message}")]
    StatusError { code: i64, message: String },

    #[error("response has no requested symbol: {0}")]
    SymbolNotFound(String),
}

impl ConversionError {
    pub(crate) fn construction(err: impl Into<BoxError>) -> Self {
        ConversionError::QueryConstructionFailed(err.into())
    }

    pub(crate) fn query(err: impl Into<BoxError>) -> Self {
        let source = err.into();
        ConversionError::QueryFailed {
            reason: source.to_string(),
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_query_failed_keeps_cause() {
        let err = ConversionError::query("connection refused");
        assert_eq!(err.to_string(), "query failed: connection refused");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("connection refused".to_string())
        );
    }

    #[test]
    fn test_status_and_symbol_messages() {
        let err = ConversionError::StatusError {
            code: 1001,
            message: "This API Key is invalid.".to_string(),
        };
        assert_eq!(err.to_string(), "status error 1001: This API Key is invalid.");
        assert!(err.source().is_none());

        let err = ConversionError::SymbolNotFound("ETH".to_string());
        assert_eq!(err.to_string(), "response has no requested symbol: ETH");
    }
}
