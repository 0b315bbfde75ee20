use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Request;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// Failure raised by a transport before any response was produced.
///
/// Kept boxed and untouched so callers can downcast to the concrete error
/// (e.g. [`reqwest::Error`]).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A fully read response as handed back by a transport.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// `None` when the transport produced something that is not an HTTP response.
    pub status: Option<u16>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn without_status(body: impl Into<Bytes>) -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The `Content-Type` header, if present and readable as text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// Reads a `reqwest` response to the end.
    pub async fn read(resp: reqwest::Response) -> reqwest::Result<Self> {
        let status = Some(resp.status().as_u16());
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

/// Performs one HTTP round-trip. Implementations must be safe to share
/// between concurrent calls.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for &C {
    async fn execute(&self, req: Request) -> Result<RawResponse, TransportError> {
        (**self).execute(req).await
    }
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    async fn execute(&self, req: Request) -> Result<RawResponse, TransportError> {
        (**self).execute(req).await
    }
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> Result<RawResponse, TransportError> {
        (**self).execute(req).await
    }
}
