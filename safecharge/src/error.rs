//! Error types for request validation and response parsing.
//!
//! Each concern has its own enum so that the client can coarsen them into
//! caller-facing categories independently. None of the `Display` texts carry
//! a secret: card numbers are never echoed, and values of sensitive fields
//! are rendered fully masked.

use crate::field::FieldKind;
use crate::mask;

/// A card number failed the pre-flight gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardNumberError {
    /// The number still contains non-digit characters.
    #[error("Card number is not pre-processed")]
    NotPreCleaned,
    /// Fewer digits than any issuer uses.
    #[error("Card number is too short")]
    TooShort,
    /// More digits than any issuer uses.
    #[error("Card number is too long")]
    TooLong,
    /// The Luhn checksum does not add up.
    #[error("Invalid checksum")]
    ChecksumMismatch,
}

/// A request parameter violates its field specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A field required for the transaction type is absent.
    #[error("Parameter [{0}] is required, but not specified")]
    MissingRequired(String),

    /// A value is longer than the field allows.
    #[error(
        "Value [{}] in field [{field}] is over the size limit [{max_size}]",
        mask::redact(.field, .value)
    )]
    TooLong {
        /// Field name.
        field: String,
        /// Offending value, as serialized.
        value: String,
        /// Maximum serialized length.
        max_size: usize,
    },

    /// A value does not match the field kind.
    #[error(
        "Value [{}] in field [{field}] is not of expected type [{expected}]",
        mask::redact(.field, .value)
    )]
    WrongType {
        /// Field name.
        field: String,
        /// Offending value, as serialized.
        value: String,
        /// Kind the field requires.
        expected: FieldKind,
    },
}

/// A request the gateway could never accept, independent of caller data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// The transaction type is empty or not one of the supported types.
    #[error("{}", unsupported_type_message(.0))]
    UnsupportedType(String),

    /// A parameter name is not part of the field table.
    #[error("Field [{0}] is not supported")]
    UnsupportedField(String),
}

fn unsupported_type_message(transaction_type: &str) -> String {
    if transaction_type.is_empty() {
        "Transaction type required, but not specified".to_owned()
    } else {
        format!("Transaction type [{transaction_type}] is not supported")
    }
}

/// The gateway answered with something that is not usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// The body looks like XML but is not well-formed.
    ///
    /// Carries every well-formedness problem found.
    #[error("Failed to validate XML response: {}", .0.join("; "))]
    MalformedXml(Vec<String>),
}

/// Any failure raised while validating or building a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Unsupported transaction type or field.
    #[error("{0}")]
    Internal(#[from] InternalError),

    /// Caller data violates the field table.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The card number failed its checks.
    #[error("{0}")]
    CardNumber(#[from] CardNumberError),
}
