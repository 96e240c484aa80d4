//! Request/response dump decorator for diagnosing traffic.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::types::{HttpRequest, HttpResponse};

use super::Transport;

/// Requests that can be rendered as an HTTP/1.1 wire dump
pub trait DumpRequest {
    /// Render the request line, headers and body
    fn dump_request(&self) -> Result<Vec<u8>>;
}

impl DumpRequest for HttpRequest {
    fn dump_request(&self) -> Result<Vec<u8>> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| Error::Other(format!("invalid URL '{}': {}", self.url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Other(format!("URL '{}' has no host", self.url)))?;

        let mut out = Vec::with_capacity(128 + self.body.len());
        write!(out, "{} {}", self.method, url.path())?;
        if let Some(query) = url.query() {
            write!(out, "?{query}")?;
        }
        write!(out, " HTTP/1.1\r\nHost: {host}")?;
        if let Some(port) = url.port() {
            write!(out, ":{port}")?;
        }
        write!(out, "\r\n")?;
        for (name, value) in &self.headers {
            write!(out, "{name}: {value}\r\n")?;
        }
        write!(out, "\r\n")?;
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

impl DumpRequest for String {
    fn dump_request(&self) -> Result<Vec<u8>> {
        HttpRequest::get(self.as_str()).dump_request()
    }
}

/// Render a response as an HTTP/1.1 wire dump
pub fn dump_response(response: &HttpResponse) -> Vec<u8> {
    let reason = reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");

    let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason).into_bytes();
    for (name, value) in &response.headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&response.body);
    out
}

/// Transport decorator that writes every outgoing request and incoming response to a sink.
///
/// A request that cannot be dumped still goes out; the dump error is written to the
/// sink in its place. Sink write failures are logged and never fail the request.
pub struct DebugTransport<T, W> {
    inner: T,
    sink: Arc<Mutex<W>>,
}

impl<T, W: Write> DebugTransport<T, W> {
    /// Wrap `inner`, writing dumps to `sink`
    pub fn new(inner: T, sink: W) -> Self {
        Self::with_shared_sink(inner, Arc::new(Mutex::new(sink)))
    }

    /// Wrap `inner` with a sink the caller keeps a handle to
    pub fn with_shared_sink(inner: T, sink: Arc<Mutex<W>>) -> Self {
        Self { inner, sink }
    }

    fn write(&self, bytes: &[u8]) {
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = sink.write_all(bytes).and_then(|()| sink.flush()) {
            tracing::warn!(error = %e, len = bytes.len(), "Failed to write debug dump");
        }
    }

    fn write_error(&self, context: &str, error: &Error) {
        self.write(format!("{context}: {error}\n").as_bytes());
    }
}

#[async_trait::async_trait]
impl<R, T, W> Transport<R> for DebugTransport<T, W>
where
    R: DumpRequest + Send + 'static,
    T: Transport<R>,
    W: Write + Send + 'static,
{
    async fn issue(&self, request: R) -> Result<HttpResponse> {
        match request.dump_request() {
            Ok(dump) => self.write(&dump),
            Err(e) => self.write_error("dump request", &e),
        }

        let response = self.inner.issue(request).await?;
        self.write(&dump_response(&response));
        Ok(response)
    }
}
