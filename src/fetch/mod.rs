mod client;
mod basic;
pub mod auth;
#[cfg(test)]
pub(crate) mod stub;

pub use client::{HttpClient, RawResponse, TransportError};
pub use basic::BasicClient;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::NetworkError;
use crate::executor::ResourceClient;
use crate::resource::Resource;

/// One-off `GET` of `url`, decoded as `T`, using the default [`ClientConfig`].
///
/// Use `T = serde_json::Value` when the document shape is not known up front.
///
/// # Errors
///
/// [`NetworkError::BadRequest`] if `url` does not parse; otherwise whatever
/// [`ResourceClient::execute`] returns.
pub async fn fetch_json<C, T>(client: &C, url: &str) -> Result<T, NetworkError>
where
    C: HttpClient,
    T: DeserializeOwned,
{
    let url = Url::parse(url).map_err(|_| NetworkError::BadRequest)?;
    ResourceClient::new(client, ClientConfig::default())
        .execute(&Resource::get(url))
        .await
}
