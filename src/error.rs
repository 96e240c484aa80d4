//! Error types for multi-fetch
//!
//! Per-request failures (transport errors and validator rejections) never abort a
//! dispatch. They are carried on [`Outcome::Failure`](crate::Outcome::Failure) and folded
//! into an [`AggregateError`] at the end of the call. Only cancellation cuts a dispatch
//! short.

use std::fmt;
use thiserror::Error;

/// Result type alias for multi-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for multi-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed to produce a response at all
    #[error("transport error: {0}")]
    Transport(String),

    /// Network error from the reqwest-backed transport
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A validator rejected the response status
    #[error("invalid status {status}")]
    InvalidStatus {
        /// Status code of the rejected response
        status: u16,
    },

    /// A validator rejected the response for any other reason
    #[error("validation failed: {0}")]
    Validation(String),

    /// The dispatch was cancelled before every outcome was received
    #[error("dispatch cancelled")]
    Cancelled,

    /// One or more requests of a dispatch failed
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "user_agent")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True if this error was produced by a validator rather than the transport
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidStatus { .. } | Error::Validation(_))
    }

    /// True if this error reports cancellation of the dispatch
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Composite error holding every per-request failure of one dispatch call.
///
/// Errors keep the order in which they were encountered. An empty aggregate means
/// "no error"; use [`AggregateError::into_result`] to turn it into a `Result`.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error, keeping encounter order
    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if no error has been collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collected errors in encounter order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Iterate over the collected errors
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Consume the aggregate and return the collected errors
    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> std::result::Result<(), AggregateError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no errors occurred"),
            [only] => write!(f, "1 error occurred:\n\t* {only}"),
            errors => {
                write!(f, "{} errors occurred:", errors.len())?;
                for error in errors {
                    write!(f, "\n\t* {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl Extend<Error> for AggregateError {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl FromIterator<Error> for AggregateError {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AggregateError {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_resolves_to_no_error() {
        let agg = AggregateError::new();

        assert!(agg.is_empty());
        assert!(agg.into_result().is_ok());
    }

    #[test]
    fn aggregate_preserves_encounter_order() {
        let mut agg = AggregateError::new();
        agg.push(Error::Transport("first".into()));
        agg.push(Error::InvalidStatus { status: 404 });
        agg.push(Error::Transport("third".into()));

        let messages: Vec<String> = agg.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "transport error: first",
                "invalid status 404",
                "transport error: third"
            ]
        );
        assert_eq!(agg.into_result().unwrap_err().len(), 3);
    }

    #[test]
    fn display_single_error() {
        let agg: AggregateError = vec![Error::InvalidStatus { status: 500 }]
            .into_iter()
            .collect();

        assert_eq!(agg.to_string(), "1 error occurred:\n\t* invalid status 500");
    }

    #[test]
    fn display_lists_every_error() {
        let agg: AggregateError = vec![
            Error::Transport("connection refused".into()),
            Error::Validation("empty body".into()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            agg.to_string(),
            "2 errors occurred:\n\t* transport error: connection refused\n\t* validation failed: empty body"
        );
    }

    #[test]
    fn source_points_at_first_error() {
        use std::error::Error as _;

        let agg: AggregateError = vec![
            Error::InvalidStatus { status: 418 },
            Error::Transport("later".into()),
        ]
        .into_iter()
        .collect();

        let source = agg.source().expect("source should be the first error");
        assert_eq!(source.to_string(), "invalid status 418");
    }

    #[test]
    fn classifiers_match_taxonomy() {
        assert!(Error::InvalidStatus { status: 404 }.is_validation());
        assert!(Error::Validation("nope".into()).is_validation());
        assert!(!Error::Transport("down".into()).is_validation());
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::Aggregate(AggregateError::new()).is_cancelled());
    }

    #[test]
    fn aggregate_converts_into_error_transparently() {
        let agg: AggregateError = vec![Error::Transport("boom".into())].into_iter().collect();
        let err: Error = agg.into();

        assert!(matches!(err, Error::Aggregate(ref a) if a.len() == 1));
        assert_eq!(err.to_string(), "1 error occurred:\n\t* transport error: boom");
    }
}
