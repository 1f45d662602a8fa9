//! Request validation against the field table.
//!
//! Checks run in a fixed order so that the first reported error is
//! reproducible for a given request:
//!
//! 1. the transaction type is supported
//! 2. every field in the table is present when required, within its size
//!    limit, and of the right kind
//! 3. no parameter outside the table is present
//! 4. the card number passes [`card::validate`]

use std::sync::LazyLock;

use regex::Regex;

use crate::card;
use crate::error::{InternalError, RequestError, ValidationError};
use crate::field::{self, CARD_NUMBER, FieldKind, FieldSpec};
use crate::params::{ParamValue, RequestParameters};
use crate::transaction::TransactionType;

/// Text accepted by numeric-kind fields: optional sign, digits with an
/// optional fraction, optional exponent.
static NUMERIC_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("numeric pattern is valid")
});

/// Validates a complete, merged parameter mapping.
///
/// Returns the parsed transaction type on success.
///
/// # Errors
///
/// - [`InternalError::UnsupportedType`] if `transaction_type` is empty or unknown
/// - [`ValidationError`] for the first field that is missing, too long or of
///   the wrong kind
/// - [`InternalError::UnsupportedField`] for a parameter outside the table
/// - [`CardNumberError`](crate::error::CardNumberError) if the card number is invalid
pub fn validate(
    params: &RequestParameters,
    transaction_type: &str,
) -> Result<TransactionType, RequestError> {
    let transaction_type: TransactionType = transaction_type.parse()?;

    for spec in field::fields_for(transaction_type) {
        check_field(spec, params.get(spec.name), transaction_type)?;
    }

    check_no_extra(params)?;

    let card_number = params.get(CARD_NUMBER).map(ToString::to_string).unwrap_or_default();
    card::validate(&card_number)?;

    Ok(transaction_type)
}

fn check_field(
    spec: &FieldSpec,
    value: Option<&ParamValue>,
    transaction_type: TransactionType,
) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return if spec.is_required_for(transaction_type) {
            Err(ValidationError::MissingRequired(spec.name.to_owned()))
        } else {
            Ok(())
        };
    };

    let serialized = value.to_string();
    if serialized.len() > spec.max_size {
        return Err(ValidationError::TooLong {
            field: spec.name.to_owned(),
            value: serialized,
            max_size: spec.max_size,
        });
    }

    if !value.is_empty() && !matches_kind(value, spec.kind) {
        return Err(ValidationError::WrongType {
            field: spec.name.to_owned(),
            value: serialized,
            expected: spec.kind,
        });
    }

    Ok(())
}

fn check_no_extra(params: &RequestParameters) -> Result<(), InternalError> {
    match params.iter().find(|(name, _)| field::lookup(name).is_none()) {
        Some((name, _)) => Err(InternalError::UnsupportedField(name.clone())),
        None => Ok(()),
    }
}

/// Returns whether `value` is acceptable for a field of `kind`.
///
/// Integer fields take only [`ParamValue::Int`]; numeric text such as `"42"`
/// is rejected for them.
#[must_use]
pub fn matches_kind(value: &ParamValue, kind: FieldKind) -> bool {
    match (kind, value) {
        (FieldKind::Text, ParamValue::Text(_))
        | (FieldKind::Numeric, ParamValue::Int(_) | ParamValue::Decimal(_))
        | (FieldKind::Integer, ParamValue::Int(_)) => true,
        (FieldKind::Numeric, ParamValue::Text(text)) => NUMERIC_TEXT.is_match(text),
        _ => false,
    }
}
