//! Delivery of a built request to the gateway.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::NetworkError;

/// A boxed future that is `Send` and bound to lifetime `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches a fully built gateway URL and returns the response body.
///
/// Implementations must give up once their timeout elapses and must not
/// retry. The HTTP status is not inspected: the gateway reports errors in the
/// body.
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` and returns the body with surrounding
    /// whitespace removed.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, NetworkError>>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client that fails requests after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps a pre-configured client. Its timeout settings are used as is.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, NetworkError>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let body = response.text().await?;
            Ok(body.trim().to_owned())
        })
    }
}
