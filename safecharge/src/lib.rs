#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core logic for the SafeCharge card gateway.
//!
//! This crate validates, builds and masks outbound transaction requests and
//! parses gateway responses. It performs no I/O; the HTTP client lives in
//! `safecharge-http`.
//!
//! # Overview
//!
//! A request is a [`TransactionType`] plus a [`RequestParameters`] mapping.
//! [`RequestBuilder`] layers the caller's parameters over per-request
//! defaults, checks them against the static [`field::FIELDS`] table and the
//! Luhn checksum, and encodes the result as two query strings: one to send
//! and one with secrets masked for logs. [`response::parse`] turns the body
//! the gateway returns into a [`ResponseDocument`].
//!
//! # Modules
//!
//! - [`card`] - Card number cleaning and Luhn validation
//! - [`error`] - Error taxonomy for validation, building and parsing
//! - [`field`] - The field table and per-field rules
//! - [`mask`] - Length-preserving masking for log output
//! - [`params`] - Parameter values and the parameter mapping
//! - [`query`] - Per-request correlation identifiers
//! - [`request`] - Request defaults, merging and encoding
//! - [`response`] - Strict XML validation and response parsing
//! - [`settings`] - Credentials, timeout and masking configuration
//! - [`timestamp`] - Unix timestamps for unique request tokens
//! - [`transaction`] - Supported transaction types
//! - [`validate`] - Request validation against the field table
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing of request building

pub mod card;
pub mod error;
pub mod field;
pub mod mask;
pub mod params;
pub mod query;
pub mod request;
pub mod response;
pub mod settings;
pub mod timestamp;
pub mod transaction;
pub mod validate;

pub use error::{CardNumberError, InternalError, RequestError, ResponseError, ValidationError};
pub use params::{ParamValue, RequestParameters};
pub use request::{BuiltRequest, RequestBuilder};
pub use response::{ResponseDocument, ResponseStatus, XmlDocument, XmlValue};
pub use settings::{Credentials, GatewaySettings};
pub use transaction::TransactionType;
