//! # multi-fetch
//!
//! Concurrent HTTP request dispatcher with bounded parallelism, pluggable response
//! validation and aggregated error reporting.
//!
//! ## Design Philosophy
//!
//! multi-fetch is designed to be:
//! - **Bounded** - A batch never runs more transport calls at once than the configured limit
//! - **Failure-tolerant** - One failed request never aborts the rest of its batch
//! - **Transport-agnostic** - Anything implementing [`Transport`] can carry the requests
//! - **Library-first** - No CLI, purely a Rust crate for embedding
//!
//! Two flavours share the same worker pool:
//! - [`Dispatcher`] returns a live [`OutcomeStream`] and honours a cancellation token;
//!   [`drain`] folds that stream into a single result.
//! - [`Collector`] runs a batch to completion and returns every successful response
//!   together with an [`AggregateError`] for the failures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use multi_fetch::{Collector, Config, build_transport, validate_status_ok};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let transport = build_transport::<String>(&config.transport)?;
//!     let collector = Collector::from_config(transport, &config.dispatch);
//!
//!     let urls = vec![
//!         "https://example.com/one".to_string(),
//!         "https://example.com/two".to_string(),
//!     ];
//!     let (responses, errors) = collector.fetch_all(urls, &[validate_status_ok]).await;
//!
//!     println!("{} responses", responses.len());
//!     if let Err(errors) = errors {
//!         eprintln!("{errors}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Bounded fan-out dispatch and fan-in of outcomes
pub mod dispatch;
/// Error types
pub mod error;
/// Transport trait and implementations
pub mod transport;
/// Request, response and outcome types
pub mod types;
/// Response validators
pub mod validate;

// Re-export commonly used types
pub use config::{Config, DispatchConfig, TransportConfig};
pub use dispatch::{Collected, Collector, Dispatcher, OutcomeStream, TaskSource, drain};
pub use error::{AggregateError, Error, Result};
pub use transport::{DebugTransport, MockTransport, ReqwestTransport, Transport, build_transport};
pub use types::{HttpRequest, HttpResponse, Outcome};
pub use validate::{
    Validator, run_validators, validate_non_empty_body, validate_status_ok,
    validate_status_success,
};
