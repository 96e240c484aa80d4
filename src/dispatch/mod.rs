//! Dispatch pipeline -- bounded fan-out of requests to fetch workers and fan-in of outcomes.
//!
//! Split into focused submodules:
//! - [`source`] - Shared task source with exactly-once claims
//! - [`worker`] - Fetch worker: issue, validate, publish
//! - [`pool`] - Worker pool sizing and spawning
//! - [`merge`] - Fan-in of worker outcomes into one stream
//! - [`dispatcher`] - Async variant returning a live stream, and its drain
//! - [`collector`] - Batch variant that waits for every outcome

mod collector;
mod dispatcher;
mod merge;
mod pool;
mod source;
mod worker;


pub use collector::{Collected, Collector};
pub use dispatcher::{Dispatcher, drain};
pub use merge::OutcomeStream;
pub use source::TaskSource;
