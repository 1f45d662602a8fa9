//! Request construction: defaults, validation and query-string encoding.
//!
//! [`RequestBuilder`] merges caller parameters over the per-request defaults,
//! forces `sg_TransType`, validates the result and encodes it twice: once
//! verbatim for the wire and once with secrets masked for logs. Both strings
//! carry the same keys in the same order.

#[cfg(feature = "telemetry")]
use tracing::debug;
use url::form_urlencoded;

use crate::error::RequestError;
use crate::field::{
    CLIENT_LOGIN_ID, CLIENT_PASSWORD, CLIENT_UNIQUE_ID, IP_ADDRESS, IS_3D_TRANS, RESPONSE_FORMAT,
    TRANS_TYPE,
};
use crate::params::RequestParameters;
use crate::settings::GatewaySettings;
use crate::timestamp::UnixTimestamp;
use crate::transaction::TransactionType;
use crate::validate::validate;

/// Placeholder client IP sent unless the caller supplies one.
pub const DEFAULT_IP_ADDRESS: &str = "127.0.0.1";

/// Response format flag selecting the XML response.
pub const DEFAULT_RESPONSE_FORMAT: i64 = 4;

/// 3-D Secure is off unless the caller turns it on.
pub const DEFAULT_IS_3D_TRANS: i64 = 0;

/// A validated request in its two encodings.
#[derive(Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    transaction_type: TransactionType,
    full: String,
    masked: String,
}

impl BuiltRequest {
    /// Transaction type of the request.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Query string with every value verbatim. Send this, never log it.
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Query string with secrets masked. Safe to log.
    #[must_use]
    pub fn masked(&self) -> &str {
        &self.masked
    }

    /// Splits into `(full, masked)`.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.full, self.masked)
    }
}

impl std::fmt::Debug for BuiltRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltRequest")
            .field("transaction_type", &self.transaction_type)
            .field("masked", &self.masked)
            .finish_non_exhaustive()
    }
}

/// Builds gateway requests for one set of settings.
///
/// # Example
///
/// ```
/// use safecharge::{GatewaySettings, RequestBuilder, RequestParameters, TransactionType};
///
/// let settings = GatewaySettings::new("merchant", "secret");
/// let params = RequestParameters::new()
///     .with("sg_FirstName", "John")
///     .with("sg_LastName", "Smith")
///     .with("sg_Address", "Elm Street, 13")
///     .with("sg_City", "London")
///     .with("sg_State", "London")
///     .with("sg_Zip", "3031")
///     .with("sg_Country", "GB")
///     .with("sg_Phone", "123456790")
///     .with("sg_Email", "john@smith.com")
///     .with("sg_Currency", "GBP")
///     .with("sg_Amount", "99.99")
///     .with("sg_NameOnCard", "John Smith")
///     .with("sg_CardNumber", "4000021059386316")
///     .with("sg_ExpMonth", "12")
///     .with("sg_ExpYear", "13")
///     .with("sg_CVV2", "123");
///
/// let request = RequestBuilder::new(&settings).build(TransactionType::Auth, params)?;
/// assert!(request.full().contains("sg_TransType=Auth"));
/// assert!(request.masked().contains("sg_CardNumber=400002xxxxxx6316"));
/// # Ok::<(), safecharge::RequestError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    settings: &'a GatewaySettings,
    timestamp: Option<UnixTimestamp>,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder using `settings` for credentials and masking.
    #[must_use]
    pub const fn new(settings: &'a GatewaySettings) -> Self {
        Self {
            settings,
            timestamp: None,
        }
    }

    /// Pins the time used for `sg_ClientUniqueID` instead of the clock.
    #[must_use]
    pub const fn at(mut self, timestamp: UnixTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Default parameters every request starts from.
    #[must_use]
    pub fn defaults(&self) -> RequestParameters {
        let now = self.timestamp.unwrap_or_else(UnixTimestamp::now);
        let credentials = &self.settings.credentials;
        RequestParameters::new()
            .with(CLIENT_LOGIN_ID, credentials.username.as_str())
            .with(CLIENT_PASSWORD, credentials.password.as_str())
            .with(IP_ADDRESS, DEFAULT_IP_ADDRESS)
            .with(RESPONSE_FORMAT, DEFAULT_RESPONSE_FORMAT)
            .with(IS_3D_TRANS, DEFAULT_IS_3D_TRANS)
            .with(CLIENT_UNIQUE_ID, now.to_string())
    }

    /// Merges, validates and encodes a request.
    ///
    /// Caller values override defaults; `sg_TransType` is always set to
    /// `transaction_type`. Nothing is encoded unless validation passes.
    ///
    /// # Errors
    ///
    /// Returns the first [`RequestError`] reported by
    /// [`validate`](crate::validate::validate).
    pub fn build(
        &self,
        transaction_type: TransactionType,
        params: RequestParameters,
    ) -> Result<BuiltRequest, RequestError> {
        let mut merged = self.defaults();
        merged.merge(params);
        merged.insert(TRANS_TYPE, transaction_type.as_str());

        if let Err(err) = validate(&merged, transaction_type.as_str()) {
            #[cfg(feature = "telemetry")]
            debug!(error = %err, "Request rejected");
            return Err(err);
        }

        let masked = self.settings.masking.mask_parameters(&merged);

        #[cfg(feature = "telemetry")]
        debug!(
            transaction_type = %transaction_type,
            fields = merged.len(),
            "Request built"
        );

        Ok(BuiltRequest {
            transaction_type,
            full: encode(&merged),
            masked: encode(&masked),
        })
    }
}

/// Encodes parameters as `application/x-www-form-urlencoded`.
#[must_use]
pub fn encode(params: &RequestParameters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        serializer.append_pair(name, &value.to_string());
    }
    serializer.finish()
}
