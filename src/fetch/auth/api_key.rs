use crate::fetch::client::{HttpClient, RawResponse, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// `header_name` is the header field to set (e.g. `"Authorization"` or a
/// provider-specific name such as `"X-API-Key"`). `key` is the raw value
/// written into that header and replaces any value already on the request.
pub struct ApiKey<C> {
    pub inner: C,
    pub header_name: String,
    pub key: String,
}

impl<C> ApiKey<C> {
    /// Convenience constructor that uses `Authorization: Bearer <key>`, the
    /// most common pattern for OAuth-style tokens.
    pub fn bearer(inner: C, key: String) -> Self {
        Self {
            inner,
            header_name: "Authorization".to_string(),
            key: format!("Bearer {key}"),
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> Result<RawResponse, TransportError> {
        let header_name = HeaderName::from_bytes(self.header_name.as_bytes())?;
        let mut value = HeaderValue::from_str(&self.key)?;
        value.set_sensitive(true);
        req.headers_mut().insert(header_name, value);
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubClient;
    use reqwest::{Method, Request};

    fn request() -> Request {
        Request::new(Method::GET, "https://api.example.com/items".parse().unwrap())
    }

    #[tokio::test]
    async fn test_bearer_sets_authorization() {
        let client = ApiKey::bearer(StubClient::replying(200, "{}"), "tok".to_string());
        client.execute(request()).await.unwrap();

        let seen = client.inner.last();
        assert_eq!(seen.headers["authorization"], "Bearer tok");
    }

    #[tokio::test]
    async fn test_custom_header_replaces_existing() {
        let client = ApiKey {
            inner: StubClient::replying(200, "{}"),
            header_name: "X-API-Key".to_string(),
            key: "secret".to_string(),
        };
        let mut req = request();
        req.headers_mut()
            .insert("x-api-key", HeaderValue::from_static("stale"));
        client.execute(req).await.unwrap();

        let seen = client.inner.last();
        assert_eq!(seen.headers.get_all("x-api-key").iter().count(), 1);
        assert_eq!(seen.headers["x-api-key"], "secret");
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_a_transport_error() {
        let client = ApiKey {
            inner: StubClient::replying(200, "{}"),
            header_name: "bad header".to_string(),
            key: "secret".to_string(),
        };
        let result = client.execute(request()).await;

        assert!(result.is_err());
        assert!(client.inner.seen().is_empty());
    }
}
