#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP client for the SafeCharge card gateway.
//!
//! Wraps the request building and response parsing of the `safecharge`
//! crate with a `reqwest` transport, per-client file logging and the
//! caller-facing error categories.
//!
//! # Modules
//!
//! - [`client`] - [`GatewayClient`] and its configuration
//! - [`constants`] - Live and test endpoints
//! - [`error`] - Network, construction and caller-facing errors
//! - [`logging`] - Append-only per-client log file
//! - [`transport`] - The [`Transport`] seam and its `reqwest` implementation
//!
//! # Feature Flags
//!
//! - `telemetry` - Also records debug events from request building

pub mod client;
pub mod constants;
pub mod error;
pub mod logging;
pub mod transport;

pub use client::{ClientConfig, GatewayClient};
pub use error::{ClientBuildError, GatewayError, NetworkError, SendError};
pub use transport::{ReqwestTransport, Transport};
