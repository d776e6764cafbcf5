//! reqwest-backed HTTP transport

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ProgressFn};
use async_trait::async_trait;
use bugline_config::NetworkConfig;
use bugline_errors::{Error, NetworkError};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use std::time::Duration;

/// Size of the chunks a request body is streamed in
pub const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&NetConfig::default())
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for NetClient {
    async fn send(
        &self,
        request: HttpRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse, Error> {
        let url = crate::parse_url(&request.url)?;
        let length = request.body.len();

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.content_type)
            .header(CONTENT_LENGTH, length)
            .body(streamed_body(request.body, progress))
            .send()
            .await
            .map_err(|e| map_request_error(&e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(&e))?;

        Ok(HttpResponse { status, body })
    }
}

// Slices share the original buffer; the callback fires as each chunk is
// pulled by the connection.
fn streamed_body(body: Bytes, progress: Option<ProgressFn>) -> Body {
    let chunks: Vec<Bytes> = (0..body.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| body.slice(start..(start + UPLOAD_CHUNK_SIZE).min(body.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(progress) = &progress {
            progress(sent);
        }
        Ok::<_, std::io::Error>(chunk)
    });

    Body::wrap_stream(stream)
}

fn map_request_error(error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: error
                .url()
                .map(std::string::ToString::to_string)
                .unwrap_or_default(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(error.to_string()).into()
    } else {
        NetworkError::RequestFailed(error.to_string()).into()
    }
}
