//! The gateway client.
//!
//! [`GatewayClient::send`] runs one transaction end to end: build and
//! validate the request, send it, parse the response. Validation failures
//! never reach the network. Every failure is logged with full detail under
//! the request's query identifier and then returned to the caller as a
//! coarse [`SendError`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use safecharge::query::{MAX_RANDOM_ID, QueryId, QueryIdSource, RandomQueryIds};
use safecharge::response;
use safecharge::{
    GatewaySettings, RequestBuilder, RequestError, RequestParameters, ResponseDocument,
    TransactionType,
};
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, debug, error, info, info_span};

use crate::constants::server_url;
use crate::error::{ClientBuildError, GatewayError, SendError};
use crate::logging::FileLog;
use crate::transport::{ReqwestTransport, Transport};

/// Configuration for [`GatewayClient`].
pub struct ClientConfig {
    /// Credentials, server selection, timeout and masking.
    pub settings: GatewaySettings,

    /// Append diagnostic records to this file instead of the global
    /// subscriber.
    pub log_path: Option<PathBuf>,

    /// Tag grouping this client's records in a shared log.
    pub instance_id: String,

    /// Endpoint used instead of the live or test server. The query string
    /// is appended to it directly.
    pub base_url: Option<String>,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<reqwest::Client>,

    /// Source of query identifiers (default: random).
    pub query_ids: Option<Arc<dyn QueryIdSource>>,
}

impl ClientConfig {
    /// Creates a config for `settings` with a random instance tag.
    #[must_use]
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings,
            log_path: None,
            instance_id: rand::random_range(1..=MAX_RANDOM_ID).to_string(),
            base_url: None,
            http_client: None,
            query_ids: None,
        }
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the instance tag.
    #[must_use]
    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = id.into();
        self
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the query identifier source.
    #[must_use]
    pub fn with_query_ids(mut self, source: impl QueryIdSource + 'static) -> Self {
        self.query_ids = Some(Arc::new(source));
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("settings", &self.settings)
            .field("log_path", &self.log_path)
            .field("instance_id", &self.instance_id)
            .field("base_url", &self.base_url)
            .field("has_http_client", &self.http_client.is_some())
            .field("has_query_ids", &self.query_ids.is_some())
            .finish()
    }
}

/// Async client for the SafeCharge gateway.
///
/// Cheap to clone; clones share settings, transport and log file. Settings
/// are never mutated after construction, so concurrent `send` calls need no
/// locking.
///
/// # Example
///
/// ```no_run
/// use safecharge::{GatewaySettings, RequestParameters, TransactionType};
/// use safecharge_http::client::{ClientConfig, GatewayClient};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = GatewaySettings::new("merchant", "secret");
/// let client = GatewayClient::try_new(
///     ClientConfig::new(settings).with_log_path("/var/log/gateway.log"),
/// )?;
///
/// let params = RequestParameters::new().with("sg_FirstName", "John");
/// match client.send(TransactionType::Auth, params).await {
///     Ok(document) => println!("{:?}", document.status()),
///     Err(err) if err.is_retryable() => eprintln!("try again: {err}"),
///     Err(err) => eprintln!("{err}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    settings: GatewaySettings,
    instance_id: String,
    base_url: String,
    transport: Box<dyn Transport>,
    query_ids: Arc<dyn QueryIdSource>,
    log: Option<FileLog>,
}

impl GatewayClient {
    /// Creates a client sending over HTTP.
    ///
    /// # Errors
    ///
    /// - [`ClientBuildError::InvalidTimeout`] if the timeout is zero
    /// - [`ClientBuildError::Http`] if the HTTP client cannot be built
    /// - [`ClientBuildError::LogFile`] if the log file cannot be opened
    pub fn try_new(mut config: ClientConfig) -> Result<Self, ClientBuildError> {
        if config.settings.timeout_seconds == 0 {
            return Err(ClientBuildError::InvalidTimeout);
        }
        let transport = match config.http_client.take() {
            Some(client) => ReqwestTransport::with_client(client),
            None => {
                ReqwestTransport::new(Duration::from_secs(config.settings.timeout_seconds))?
            }
        };
        Self::with_transport(config, transport)
    }

    /// Creates a client sending through `transport`.
    ///
    /// `config.http_client` is ignored.
    ///
    /// # Errors
    ///
    /// - [`ClientBuildError::InvalidTimeout`] if the timeout is zero
    /// - [`ClientBuildError::LogFile`] if the log file cannot be opened
    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ClientBuildError> {
        if config.settings.timeout_seconds == 0 {
            return Err(ClientBuildError::InvalidTimeout);
        }
        let log = config.log_path.as_deref().map(FileLog::open).transpose()?;
        let base_url = config
            .base_url
            .unwrap_or_else(|| server_url(config.settings.use_live_server).to_owned());

        let inner = ClientInner {
            settings: config.settings,
            instance_id: config.instance_id,
            base_url,
            transport: Box::new(transport),
            query_ids: config
                .query_ids
                .unwrap_or_else(|| Arc::new(RandomQueryIds)),
            log,
        };
        inner.in_log_scope(|| {
            info!(
                instance = %inner.instance_id,
                live = inner.settings.use_live_server,
                timeout_seconds = inner.settings.timeout_seconds,
                "Initialized"
            );
        });

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Sends one transaction and returns the parsed response.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] describing the category of failure. Details
    /// are only written to the log.
    pub async fn send(
        &self,
        transaction_type: TransactionType,
        params: RequestParameters,
    ) -> Result<ResponseDocument, SendError> {
        self.send_named(transaction_type.as_str(), params).await
    }

    /// Like [`send`](Self::send), with the transaction type given by its wire
    /// name. An unknown name fails with [`SendError::Internal`].
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] describing the category of failure.
    pub async fn send_named(
        &self,
        transaction_type: &str,
        params: RequestParameters,
    ) -> Result<ResponseDocument, SendError> {
        self.dispatch(transaction_type, params).await.1
    }

    /// Like [`send`](Self::send), also returning the identifier the query was
    /// logged under, so a failure can be matched with its log records.
    pub async fn send_with_query_id(
        &self,
        transaction_type: TransactionType,
        params: RequestParameters,
    ) -> (QueryId, Result<ResponseDocument, SendError>) {
        self.dispatch(transaction_type.as_str(), params).await
    }

    async fn dispatch(
        &self,
        transaction_type: &str,
        params: RequestParameters,
    ) -> (QueryId, Result<ResponseDocument, SendError>) {
        let inner = &*self.inner;
        match &inner.log {
            Some(log) => {
                inner
                    .send(transaction_type, params)
                    .with_subscriber(log.dispatch().clone())
                    .await
            }
            None => inner.send(transaction_type, params).await,
        }
    }

    /// Tag of this client in the log.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.inner.instance_id
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Settings this client was built with.
    #[must_use]
    pub fn settings(&self) -> &GatewaySettings {
        &self.inner.settings
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("instance_id", &self.inner.instance_id)
            .field("base_url", &self.inner.base_url)
            .field("settings", &self.inner.settings)
            .field("has_log", &self.inner.log.is_some())
            .finish_non_exhaustive()
    }
}

impl ClientInner {
    fn in_log_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.log {
            Some(log) => log.in_scope(f),
            None => f(),
        }
    }

    async fn send(
        &self,
        transaction_type: &str,
        params: RequestParameters,
    ) -> (QueryId, Result<ResponseDocument, SendError>) {
        let query = self.query_ids.next_id();
        let span = info_span!("query", instance = %self.instance_id, query = %query);

        let result = async move {
            info!(transaction_type, "Starting new query");
            match self.execute(transaction_type, params).await {
                Ok(document) => {
                    info!(result = ?document, "Result");
                    Ok(document)
                }
                Err(err) => {
                    error!(kind = err.kind(), error = %err, "Caught error");
                    Err(SendError::from(&err))
                }
            }
        }
        .instrument(span)
        .await;
        (query, result)
    }

    async fn execute(
        &self,
        transaction_type: &str,
        params: RequestParameters,
    ) -> Result<ResponseDocument, GatewayError> {
        let transaction_type: TransactionType =
            transaction_type.parse().map_err(RequestError::from)?;

        debug!("Checking query parameters");
        let request = RequestBuilder::new(&self.settings).build(transaction_type, params)?;
        let (full, masked) = request.into_parts();
        info!(url = %format_args!("{}{masked}", self.base_url), "Query URL");

        let body = self
            .transport
            .fetch(&format!("{}{full}", self.base_url))
            .await?;
        debug!(bytes = body.len(), "Received response");

        Ok(response::parse(&body)?)
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.in_log_scope(|| info!(instance = %self.instance_id, "Shutting down"));
    }
}
