//! Transport collaborators -- the capability that turns one request into one response.
//!
//! Split into focused submodules:
//! - [`http`] - Production transport backed by `reqwest`
//! - [`debug`] - Decorator that mirrors request/response dumps to a byte sink
//! - [`mock`] - Canned-response test double with invocation tracking
//!
//! The dispatch core only ever sees [`Transport::issue`]. Retries, redirects, TLS and
//! connection pooling all live behind this trait.

mod debug;
mod http;
mod mock;

use std::sync::Arc;

use crate::config::TransportConfig;
use crate::error::Result;
use crate::types::HttpResponse;

pub use debug::{DebugTransport, DumpRequest, dump_response};
pub use http::ReqwestTransport;
pub use mock::MockTransport;

/// Issue one request and return one response or error.
///
/// `R` is either a fully-formed [`HttpRequest`](crate::HttpRequest) or a bare URL
/// `String`; one dispatch call always uses a single form.
#[async_trait::async_trait]
pub trait Transport<R>: Send + Sync
where
    R: Send + 'static,
{
    /// Issue `request` and wait for the response
    async fn issue(&self, request: R) -> Result<HttpResponse>;
}

#[async_trait::async_trait]
impl<R, T> Transport<R> for Arc<T>
where
    R: Send + 'static,
    T: Transport<R> + ?Sized,
{
    async fn issue(&self, request: R) -> Result<HttpResponse> {
        (**self).issue(request).await
    }
}

/// Build the production transport described by `config`.
///
/// With `config.debug` set, the reqwest transport is wrapped in a [`DebugTransport`]
/// writing to stderr.
pub fn build_transport<R>(config: &TransportConfig) -> Result<Arc<dyn Transport<R>>>
where
    R: DumpRequest + Send + 'static,
    ReqwestTransport: Transport<R>,
{
    let transport = ReqwestTransport::from_config(config)?;
    if config.debug {
        tracing::debug!("request/response dumps enabled on stderr");
        Ok(Arc::new(DebugTransport::new(transport, std::io::stderr())))
    } else {
        Ok(Arc::new(transport))
    }
}
