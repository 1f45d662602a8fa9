//! Length-preserving masking of secrets for log output.
//!
//! Masking never changes the length of a value or the set of parameters, so
//! a masked query string has exactly the shape of the one sent on the wire.

use serde::{Deserialize, Serialize};

use crate::field::{CARD_NUMBER, CLIENT_PASSWORD, CVV2};
use crate::params::{ParamValue, RequestParameters};

/// Default number of leading card digits left visible.
pub const DEFAULT_VISIBLE_START: usize = 6;

/// Default number of trailing card digits left visible.
pub const DEFAULT_VISIBLE_END: usize = 4;

/// Default replacement character.
pub const DEFAULT_MASK_CHAR: char = 'x';

/// Fields whose values are secrets and must never reach a log unmasked.
pub const SENSITIVE_FIELDS: [&str; 3] = [CLIENT_PASSWORD, CVV2, CARD_NUMBER];

/// How card numbers are masked in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    /// Leading characters left visible.
    #[serde(rename = "maskingStart")]
    pub visible_start: usize,
    /// Trailing characters left visible.
    #[serde(rename = "maskingEnd")]
    pub visible_end: usize,
    /// Replacement character.
    #[serde(rename = "maskingChar")]
    pub mask_char: char,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            visible_start: DEFAULT_VISIBLE_START,
            visible_end: DEFAULT_VISIBLE_END,
            mask_char: DEFAULT_MASK_CHAR,
        }
    }
}

impl MaskingConfig {
    /// Masks all but the configured leading and trailing characters.
    ///
    /// A value no longer than the visible parts together is masked entirely.
    #[must_use]
    pub fn mask_partial(&self, value: &str) -> String {
        let visible = self.visible_start.saturating_add(self.visible_end);
        if value.chars().count() <= visible {
            return self.mask_full(value);
        }
        pad(value, self.visible_start, self.visible_end, self.mask_char)
    }

    /// Masks every character.
    #[must_use]
    pub fn mask_full(&self, value: &str) -> String {
        pad(value, 0, 0, self.mask_char)
    }

    /// Returns a copy of `params` with secret values masked.
    ///
    /// The password and CVV2 are masked entirely; the card number keeps its
    /// visible prefix and suffix. Empty values are left as they are.
    #[must_use]
    pub fn mask_parameters(&self, params: &RequestParameters) -> RequestParameters {
        params
            .iter()
            .map(|(name, value)| {
                let masked = match name.as_str() {
                    _ if value.is_empty() => value.clone(),
                    CLIENT_PASSWORD | CVV2 => ParamValue::Text(self.mask_full(&value.to_string())),
                    CARD_NUMBER => ParamValue::Text(self.mask_partial(&value.to_string())),
                    _ => value.clone(),
                };
                (name.clone(), masked)
            })
            .collect()
    }
}

/// Replaces the middle of `value` with `mask_char`, keeping its length.
///
/// The first `start` and last `end` characters stay visible. When nothing
/// would be left to hide the value is returned unchanged.
///
/// ```
/// use safecharge::mask::pad;
///
/// assert_eq!(pad("4000021059386316", 6, 4, 'x'), "400002xxxxxx6316");
/// assert_eq!(pad("secret", 0, 0, '*'), "******");
/// assert_eq!(pad("1234", 2, 2, 'x'), "1234");
/// ```
#[must_use]
pub fn pad(value: &str, start: usize, end: usize, mask_char: char) -> String {
    let length = value.chars().count();
    let hidden = length.saturating_sub(start.saturating_add(end));
    if hidden == 0 {
        return value.to_owned();
    }
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if (start..start + hidden).contains(&i) { mask_char } else { c })
        .collect()
}

/// Returns whether `field` holds a secret.
#[must_use]
pub fn is_sensitive(field: &str) -> bool {
    SENSITIVE_FIELDS.contains(&field)
}

/// Renders a field value for error messages, fully masking secrets.
pub(crate) fn redact(field: &str, value: &str) -> String {
    if is_sensitive(field) {
        pad(value, 0, 0, DEFAULT_MASK_CHAR)
    } else {
        value.to_owned()
    }
}
