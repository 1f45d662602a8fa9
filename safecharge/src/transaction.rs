//! Gateway transaction types.
//!
//! The transaction type selects the operation performed by the gateway and
//! decides which conditionally-required fields a request must carry.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InternalError;

/// Operation requested from the gateway.
///
/// Serialized with the exact wire names used in `sg_TransType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    /// Authorize funds without capturing them.
    Auth,
    /// Capture a previous authorization.
    Settle,
    /// Authorize and capture in one step.
    Sale,
    /// Refund a previous transaction.
    Credit,
    /// Cancel a previous transaction.
    Void,
    /// Address verification only, no funds move.
    #[serde(rename = "AVSOnly")]
    AvsOnly,
}

impl TransactionType {
    /// Every supported transaction type, in wire-table order.
    pub const ALL: [Self; 6] = [
        Self::Auth,
        Self::Settle,
        Self::Sale,
        Self::Credit,
        Self::Void,
        Self::AvsOnly,
    ];

    /// Returns the wire name sent in `sg_TransType`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "Auth",
            Self::Settle => "Settle",
            Self::Sale => "Sale",
            Self::Credit => "Credit",
            Self::Void => "Void",
            Self::AvsOnly => "AVSOnly",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = InternalError;

    /// Parses a wire name. Matching is exact, as the gateway is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| InternalError::UnsupportedType(s.to_owned()))
    }
}
