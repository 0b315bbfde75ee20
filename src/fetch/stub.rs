//! Recording transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request};
use url::Url;

use super::client::{HttpClient, RawResponse, TransportError};

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub(crate) struct Captured {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

type Reply = Box<dyn Fn() -> Result<RawResponse, TransportError> + Send + Sync>;

pub(crate) struct StubClient {
    reply: Reply,
    seen: Mutex<Vec<Captured>>,
}

impl StubClient {
    pub fn new(reply: impl Fn() -> Result<RawResponse, TransportError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `status` with `body`.
    pub fn replying(status: u16, body: &'static str) -> Self {
        Self::new(move || Ok(RawResponse::new(status, body)))
    }

    pub fn seen(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.seen().pop().expect("no request reached the stub")
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: Request) -> Result<RawResponse, TransportError> {
        let captured = Captured {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body: req.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
        };
        self.seen.lock().unwrap().push(captured);
        (self.reply)()
    }
}
