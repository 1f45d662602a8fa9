//! Gateway settings shared by every request from one client.
//!
//! Settings are built once, then only read. They deserialize from the same
//! camelCase keys the gateway documentation uses for client options:
//!
//! ```json
//! {
//!   "username": "merchant",
//!   "password": "secret",
//!   "timeoutSeconds": 30,
//!   "useLiveServer": false,
//!   "maskingStart": 6,
//!   "maskingEnd": 4,
//!   "maskingChar": "x"
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mask::MaskingConfig;

/// Default network timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Merchant credentials sent with every request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Merchant login.
    pub username: String,
    /// Merchant password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a login and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("has_password", &!self.password.is_empty())
            .finish()
    }
}

/// Read-only configuration for one gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySettings {
    /// Merchant credentials.
    #[serde(flatten)]
    pub credentials: Credentials,

    /// Send to the live server instead of the test server.
    #[serde(default, alias = "live")]
    pub use_live_server: bool,

    /// Network timeout in seconds (default: `30`).
    #[serde(default = "default_timeout_seconds", alias = "timeout")]
    pub timeout_seconds: u64,

    /// Card-number masking used for log output.
    #[serde(flatten)]
    pub masking: MaskingConfig,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            use_live_server: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            masking: MaskingConfig::default(),
        }
    }
}

impl GatewaySettings {
    /// Creates test-server settings for the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            ..Self::default()
        }
    }

    /// Selects the live or test server.
    #[must_use]
    pub const fn with_live_server(mut self, live: bool) -> Self {
        self.use_live_server = live;
        self
    }

    /// Sets the network timeout.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the masking used for log output.
    #[must_use]
    pub const fn with_masking(mut self, masking: MaskingConfig) -> Self {
        self.masking = masking;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"username": "merchant", "password": "secret"}"#).unwrap();
        assert_eq!(settings.credentials, Credentials::new("merchant", "secret"));
        assert!(!settings.use_live_server);
        assert_eq!(settings.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(settings.masking, MaskingConfig::default());
    }

    #[test]
    fn test_deserialize_all_keys() {
        let settings: GatewaySettings = serde_json::from_str(
            r#"{
                "username": "merchant",
                "password": "secret",
                "timeoutSeconds": 5,
                "useLiveServer": true,
                "maskingStart": 2,
                "maskingEnd": 2,
                "maskingChar": "*"
            }"#,
        )
        .unwrap();
        assert!(settings.use_live_server);
        assert_eq!(settings.timeout_seconds, 5);
        assert_eq!(settings.masking.visible_start, 2);
        assert_eq!(settings.masking.mask_char, '*');
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = GatewaySettings::new("merchant", "hunter2");
        let debug = format!("{settings:?}");
        assert!(debug.contains("merchant"));
        assert!(!debug.contains("hunter2"));
    }
}
