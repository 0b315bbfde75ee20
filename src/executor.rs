//! The typed request executor.
//!
//! [`ResourceClient`] turns a [`Resource<T>`] into a wire request, hands it to
//! its transport, classifies the status, and decodes the body as `T`. It holds
//! no per-call state, so one client can serve any number of concurrent calls.

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Request, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ErrorEnvelope, NetworkError};
use crate::fetch::HttpClient;
use crate::resource::{HttpMethod, Resource};

/// Executes [`Resource`] descriptors against a transport.
///
/// ```no_run
/// # async fn run() -> Result<(), typed_fetch::NetworkError> {
/// use typed_fetch::{BasicClient, ClientConfig, HttpMethod, Resource, ResourceClient};
/// use url::Url;
///
/// #[derive(serde::Deserialize)]
/// struct Item {
///     id: u64,
///     name: String,
/// }
///
/// let client = ResourceClient::new(BasicClient::new(), ClientConfig::default());
/// let url = Url::parse("https://api.example.com/items").unwrap();
/// let items: Vec<Item> = client
///     .execute(&Resource::new(url, HttpMethod::query([("limit", "10")])))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceClient<C> {
    transport: C,
    config: ClientConfig,
}

impl<C: HttpClient> ResourceClient<C> {
    pub fn new(transport: C, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the wire request for `resource` without sending it.
    ///
    /// Default headers from the [`ClientConfig`] go on first; the descriptor's
    /// headers are then inserted over them.
    ///
    /// # Errors
    ///
    /// [`NetworkError::BadRequest`] if the URL cannot be resolved or a header
    /// name or value is not valid HTTP.
    pub fn build_request<T>(&self, resource: &Resource<T>) -> Result<Request, NetworkError> {
        let url = resource.resolved_url()?;
        let mut request = Request::new(resource.method().to_reqwest(), url);

        if let Some(body) = resource.method().body() {
            *request.body_mut() = Some(body.clone().into());
        }

        let headers = request.headers_mut();
        for (name, value) in self.config.default_headers() {
            headers.append(name.clone(), value.clone());
        }

        for (name, value) in resource.headers().into_iter().flatten() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                debug!(header = %name, error = %e, "Rejected header name");
                NetworkError::BadRequest
            })?;
            let header_value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| {
                debug!(header = %name, error = %e, "Rejected header value");
                NetworkError::BadRequest
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(request)
    }

    /// Performs exactly one call for `resource` and decodes the body as `T`.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::BadRequest`]: the request could not be built; nothing was sent.
    /// - [`NetworkError::Transport`]: the transport failed; its error is passed through.
    /// - [`NetworkError::InvalidResponse`]: no usable status code came back.
    /// - [`NetworkError::Server`]: non-2xx with an [`ErrorEnvelope`] body.
    /// - [`NetworkError::MalformedErrorBody`]: non-2xx with any other body.
    /// - [`NetworkError::Decode`]: 2xx but the body is not a `T`.
    #[instrument(
        name = "resource_request",
        skip(self, resource),
        fields(
            http.method = %resource.method(),
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn execute<T>(&self, resource: &Resource<T>) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
    {
        let request = self.build_request(resource)?;
        Span::current().record("http.url", request.url().as_str());

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(NetworkError::Transport)?;

        let status = response
            .status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or(NetworkError::InvalidResponse)?;
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            debug!(bytes = response.body.len(), "Decoding error envelope");
            let envelope: ErrorEnvelope =
                serde_json::from_slice(&response.body).map_err(|source| {
                    debug!(
                        content_type = response.content_type().unwrap_or("<none>"),
                        error = %source,
                        "Error body is not an envelope"
                    );
                    NetworkError::MalformedErrorBody {
                        status: status.as_u16(),
                        source,
                    }
                })?;
            return Err(NetworkError::Server(envelope));
        }

        debug!(
            bytes = response.body.len(),
            target_type = std::any::type_name::<T>(),
            "Decoding response body"
        );
        serde_json::from_slice(&response.body).map_err(NetworkError::Decode)
    }

    /// `GET url` with `query` merged in, decoded as `T`.
    pub async fn get_json<T>(&self, url: Url, query: &[(&str, &str)]) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
    {
        let resource = Resource::new(url, HttpMethod::query(query.iter().copied()));
        self.execute(&resource).await
    }
}
