//! The HTTP capability used by report submission

use crate::multipart::MultipartBody;
use async_trait::async_trait;
use bugline_errors::Error;
use bytes::Bytes;
use std::sync::Arc;

/// Receives the cumulative number of request body bytes handed to the connection
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

/// A `POST` request with a fully built body
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub content_type: String,
    pub body: Bytes,
}

impl HttpRequest {
    #[must_use]
    pub fn json(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            content_type: "application/json".to_string(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn multipart(url: impl Into<String>, body: MultipartBody) -> Self {
        Self {
            url: url.into(),
            content_type: body.content_type(),
            body: body.into_bytes(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    /// 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and waits for the complete response
///
/// Implementations must not retry. A non-2xx status is a response, not an
/// error; `Err` is reserved for transport failures.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse, Error>;
}
