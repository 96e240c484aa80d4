//! Production transport using reqwest.

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::types::{HttpRequest, HttpResponse};

use super::Transport;

/// Production transport that makes real HTTP requests.
///
/// Responses are buffered in full before being handed to validators.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest's default client settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from [`TransportConfig`] (timeouts and user agent)
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<HttpResponse> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "HTTP request failed");
            e
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            url = %url,
            status = status,
            response_len = body.len(),
            "HTTP request completed"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport<HttpRequest> for ReqwestTransport {
    async fn issue(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            Error::Transport(format!("invalid HTTP method '{}': {}", request.method, e))
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        self.send(builder, &request.url).await
    }
}

#[async_trait::async_trait]
impl Transport<String> for ReqwestTransport {
    async fn issue(&self, url: String) -> Result<HttpResponse> {
        self.send(self.client.get(&url), &url).await
    }
}
