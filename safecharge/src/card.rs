//! Card number normalization and checksum validation.
//!
//! [`clean`] strips formatting; [`validate`] is a pass/fail gate that expects
//! an already cleaned number and checks its length and Luhn checksum.

use crate::error::CardNumberError;

/// Fewest digits accepted in a card number.
pub const MIN_LENGTH: usize = 13;

/// Most digits accepted in a card number.
pub const MAX_LENGTH: usize = 19;

/// Removes every non-digit character.
///
/// ```
/// assert_eq!(safecharge::card::clean("4000 0210-5938 6316"), "4000021059386316");
/// ```
#[must_use]
pub fn clean(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Checks a cleaned card number.
///
/// Normalization is the caller's job: a number that still contains
/// non-digits is rejected rather than silently cleaned.
///
/// # Errors
///
/// - [`CardNumberError::NotPreCleaned`] if `number` contains non-digits
/// - [`CardNumberError::TooShort`] / [`CardNumberError::TooLong`] if the
///   length is outside `MIN_LENGTH..=MAX_LENGTH`
/// - [`CardNumberError::ChecksumMismatch`] if the Luhn sum is not a multiple of 10
pub fn validate(number: &str) -> Result<(), CardNumberError> {
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardNumberError::NotPreCleaned);
    }

    let length = number.len();
    if length < MIN_LENGTH {
        return Err(CardNumberError::TooShort);
    }
    if length > MAX_LENGTH {
        return Err(CardNumberError::TooLong);
    }

    if luhn_sum(number) % 10 == 0 {
        Ok(())
    } else {
        Err(CardNumberError::ChecksumMismatch)
    }
}

/// Luhn sum over an all-digit string.
///
/// Doubling starts at index `len % 2` so that the rightmost digit is never
/// doubled.
fn luhn_sum(digits: &str) -> u32 {
    let parity = digits.len() % 2;
    digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == parity {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gateway test cards known to pass the checksum.
    const VALID_CARDS: &[&str] = &[
        "4000021059386316",
        "4000024473425231",
        "4000037434826586",
        "4000046595404935",
        "4000050320287425",
        "4000065919262217",
        "4000097446238923",
        "4444419078717848",
        "4444426864550804",
        "4444436501403986",
        "4444458284615321",
        "4444465389525081",
        "4444470762656560",
        "4444480853526820",
        "4444499431371889",
        "5100260315810893",
        "5100270690090656",
        "5100286513996754",
        "5333305231532763",
        "5333314109355505",
        "5333326770941868",
        "4012001036275556",
        "4012001038443335",
        "4005559876540",
        "36000023818683",
        "36000097503567",
        "6331101999990016",
    ];

    /// Appends the one check digit that makes `body` Luhn-valid.
    fn with_check_digit(body: &str) -> String {
        let passing: Vec<String> = (0..=9)
            .map(|d| format!("{body}{d}"))
            .filter(|candidate| validate(candidate).is_ok())
            .collect();
        assert_eq!(passing.len(), 1, "exactly one check digit for {body}");
        passing.into_iter().next().unwrap()
    }

    #[test]
    fn test_known_test_cards_are_valid() {
        for card in VALID_CARDS {
            assert_eq!(validate(&clean(card)), Ok(()), "card {card}");
        }
    }

    #[test]
    fn test_generated_numbers_for_every_length() {
        let seed = "4539148803436467912";
        for length in MIN_LENGTH..=MAX_LENGTH {
            let number = with_check_digit(&seed[..length - 1]);
            assert_eq!(number.len(), length);
            assert_eq!(validate(&number), Ok(()));
        }
    }

    #[test]
    fn test_wrong_check_digit_is_checksum_mismatch() {
        for card in VALID_CARDS {
            let (body, last) = card.split_at(card.len() - 1);
            for d in 0..=9u8 {
                let candidate = format!("{body}{d}");
                if candidate.ends_with(last) {
                    continue;
                }
                assert_eq!(
                    validate(&candidate),
                    Err(CardNumberError::ChecksumMismatch),
                    "card {candidate}"
                );
            }
        }
    }

    #[test]
    fn test_formatted_numbers_are_not_pre_cleaned() {
        for raw in ["4000 0210 5938 6316", "4000-0210-5938-6316", " 4000021059386316", "40000210593863a6"] {
            assert_ne!(clean(raw), raw);
            assert_eq!(validate(raw), Err(CardNumberError::NotPreCleaned));
        }
    }

    #[test]
    fn test_clean_is_idempotent() {
        for raw in ["4000 0210-5938 6316", "abc", "", "١٢٣4", "12\t34\n56"] {
            let once = clean(raw);
            assert_eq!(clean(&once), once);
        }
        // Non-ASCII digits are not card digits.
        assert_eq!(clean("١٢٣4"), "4");
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(validate(""), Err(CardNumberError::TooShort));
        assert_eq!(validate("400000000000"), Err(CardNumberError::TooShort));
        assert_eq!(
            validate("40000000000000000000"),
            Err(CardNumberError::TooLong)
        );
    }
}
