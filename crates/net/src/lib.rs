#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network layer for bugline
//!
//! Provides the `HttpTransport` capability the report pipeline talks to, a
//! reqwest implementation of it, and the multipart encoder used for uploads.

mod client;
pub mod multipart;
pub mod transport;

pub use client::{NetClient, NetConfig, UPLOAD_CHUNK_SIZE};
pub use multipart::{FilePart, MultipartBody};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ProgressFn};

use bugline_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL is malformed or is not http(s).
pub fn parse_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::InvalidUrl(format!("unsupported scheme '{other}' in {url}")).into()),
    }
}
