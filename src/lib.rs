//! Typed HTTP resource client.
//!
//! Describe a call as a [`Resource<T>`], hand it to a [`ResourceClient`], and
//! get back a `T` decoded from the JSON body or a classified [`NetworkError`].
//! The network itself sits behind the [`HttpClient`] trait.

pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod output;
pub mod resource;

pub use config::{ClientConfig, TransportConfig};
pub use error::{ErrorEnvelope, NetworkError};
pub use executor::ResourceClient;
pub use fetch::{BasicClient, HttpClient, RawResponse, TransportError};
pub use resource::{HttpMethod, Resource};
