//! Declarative request descriptors.
//!
//! A [`Resource<T>`] names everything needed to perform one call: the target
//! URL, an [`HttpMethod`] carrying its payload, optional headers, and the type
//! `T` the response body decodes into. Descriptors are plain values; they are
//! only turned into wire requests by [`ResourceClient`](crate::ResourceClient).

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use url::Url;
use url::form_urlencoded;

use crate::error::NetworkError;

/// HTTP method plus the payload shape that method carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    /// Query parameters, in order, merged into the target URL.
    Get(Vec<(String, String)>),
    /// Raw, already-serialized request body.
    Post(Option<Bytes>),
    /// Raw, already-serialized request body.
    Put(Option<Bytes>),
    Delete,
}

impl HttpMethod {
    /// Builds a `Get` from any sequence of name/value pairs.
    pub fn query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        HttpMethod::Get(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            HttpMethod::Get(_) => "GET",
            HttpMethod::Post(_) => "POST",
            HttpMethod::Put(_) => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// The body to attach, if this method carries one.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            HttpMethod::Post(body) | HttpMethod::Put(body) => body.as_ref(),
            HttpMethod::Get(_) | HttpMethod::Delete => None,
        }
    }

    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get(_) => reqwest::Method::GET,
            HttpMethod::Post(_) => reqwest::Method::POST,
            HttpMethod::Put(_) => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request descriptor whose response decodes into `T`.
///
/// Builder methods consume the descriptor and return a new one; there is no
/// way to mutate a descriptor in place.
///
/// ```
/// use typed_fetch::{HttpMethod, Resource};
/// use url::Url;
///
/// #[derive(serde::Deserialize)]
/// struct Item {
///     id: u64,
/// }
///
/// let url = Url::parse("https://api.example.com/items").unwrap();
/// let resource: Resource<Vec<Item>> =
///     Resource::new(url, HttpMethod::query([("limit", "10")])).with_header("X-Trace", "1");
/// assert_eq!(resource.method().name(), "GET");
/// ```
pub struct Resource<T> {
    url: Url,
    method: HttpMethod,
    headers: Option<Vec<(String, String)>>,
    model: PhantomData<fn() -> T>,
}

impl<T> Resource<T> {
    pub fn new(url: Url, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: None,
            model: PhantomData,
        }
    }

    /// A `GET` with no query parameters.
    pub fn get(url: Url) -> Self {
        Self::new(url, HttpMethod::Get(Vec::new()))
    }

    /// Adds one header. A later call with the same name, compared without
    /// regard to case, replaces the earlier entry.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let headers = self.headers.get_or_insert_with(Vec::new);
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value.into()));
        self
    }

    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |resource, (k, v)| resource.with_header(k, v))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// Caller headers in the order they were last set.
    pub fn headers(&self) -> Option<&[(String, String)]> {
        self.headers.as_deref()
    }

    /// The URL the request is actually sent to.
    ///
    /// For `Get`, supplied parameters replace any existing query items of the
    /// same name. Other existing items are kept exactly as written, as are the
    /// path and the fragment.
    ///
    /// # Errors
    ///
    /// [`NetworkError::BadRequest`] if the URL is not `http`/`https` or cannot
    /// carry a query.
    pub fn resolved_url(&self) -> Result<Url, NetworkError> {
        if self.url.cannot_be_a_base() || !matches!(self.url.scheme(), "http" | "https") {
            return Err(NetworkError::BadRequest);
        }

        match &self.method {
            HttpMethod::Get(query) if !query.is_empty() => Ok(merge_query(&self.url, query)),
            _ => Ok(self.url.clone()),
        }
    }
}

fn merge_query(url: &Url, query: &[(String, String)]) -> Url {
    let supplied = |segment: &str| {
        form_urlencoded::parse(segment.as_bytes())
            .next()
            .is_some_and(|(name, _)| query.iter().any(|(k, _)| name == k.as_str()))
    };

    let mut segments: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && !supplied(*segment))
        .collect();

    let appended = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    segments.push(&appended);

    let mut merged = url.clone();
    merged.set_query(Some(&segments.join("&")));
    merged
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            model: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url.as_str())
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("model", &std::any::type_name::<T>())
            .finish()
    }
}
