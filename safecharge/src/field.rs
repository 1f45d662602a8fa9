//! Declarative table of every gateway request field.
//!
//! Each [`FieldSpec`] names a field, its semantic [`FieldKind`], its maximum
//! serialized size and its [`Requirement`]. The table is fixed at build time
//! and mirrors the gateway's input parameter tables; validation walks it once
//! per request.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::transaction::TransactionType;

/// Transaction type of the request.
pub const TRANS_TYPE: &str = "sg_TransType";
/// Merchant login, filled from the gateway credentials.
pub const CLIENT_LOGIN_ID: &str = "sg_ClientLoginID";
/// Merchant password, filled from the gateway credentials.
pub const CLIENT_PASSWORD: &str = "sg_ClientPassword";
/// Merchant-side unique token for the request.
pub const CLIENT_UNIQUE_ID: &str = "sg_ClientUniqueID";
/// Card holder IP address.
pub const IP_ADDRESS: &str = "sg_IPAddress";
/// Response format flag.
pub const RESPONSE_FORMAT: &str = "sg_ResponseFormat";
/// 3-D Secure flag.
pub const IS_3D_TRANS: &str = "sg_Is3dTrans";
/// Primary account number.
pub const CARD_NUMBER: &str = "sg_CardNumber";
/// Card verification value.
pub const CVV2: &str = "sg_CVV2";

/// Semantic type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Any text value.
    Text,
    /// An integer, a decimal, or text that spells a number.
    Numeric,
    /// A true integer value; numeric text is not accepted.
    Integer,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
        })
    }
}

/// When a field must be present in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Required for every transaction type.
    Always,
    /// Never required.
    Never,
    /// Required only for the listed transaction types.
    RequiredFor(&'static [TransactionType]),
}

impl Requirement {
    /// Returns whether the field is required for `transaction_type`.
    #[must_use]
    pub fn applies_to(&self, transaction_type: TransactionType) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::RequiredFor(types) => types.contains(&transaction_type),
        }
    }
}

/// Specification of a single request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name, unique across the table.
    pub name: &'static str,
    /// Expected value kind.
    pub kind: FieldKind,
    /// Maximum serialized length in bytes.
    pub max_size: usize,
    /// Presence rule.
    pub requirement: Requirement,
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        kind: FieldKind,
        max_size: usize,
        requirement: Requirement,
    ) -> Self {
        Self {
            name,
            kind,
            max_size,
            requirement,
        }
    }

    /// Returns whether this field must be present for `transaction_type`.
    #[must_use]
    pub fn is_required_for(&self, transaction_type: TransactionType) -> bool {
        self.requirement.applies_to(transaction_type)
    }
}

use FieldKind::{Integer, Numeric, Text};
use Requirement::{Always, Never, RequiredFor};

const REFERENCED: &[TransactionType] = &[
    TransactionType::Settle,
    TransactionType::Credit,
    TransactionType::Void,
];
const CREDIT_ONLY: &[TransactionType] = &[TransactionType::Credit];

/// Every field the gateway accepts, in wire-table order.
pub static FIELDS: &[FieldSpec] = &[
    // Customer details
    FieldSpec::new("sg_FirstName", Text, 30, Always),
    FieldSpec::new("sg_LastName", Text, 40, Always),
    FieldSpec::new("sg_Address", Text, 60, Always),
    FieldSpec::new("sg_City", Text, 30, Always),
    FieldSpec::new("sg_State", Text, 30, Always),
    FieldSpec::new("sg_Zip", Text, 10, Always),
    FieldSpec::new("sg_Country", Text, 3, Always),
    FieldSpec::new("sg_Phone", Text, 18, Always),
    FieldSpec::new(IP_ADDRESS, Text, 15, Always),
    FieldSpec::new("sg_Email", Text, 100, Always),
    FieldSpec::new("sg_Ship_Country", Text, 2, Never),
    FieldSpec::new("sg_Ship_State", Text, 2, Never),
    FieldSpec::new("sg_Ship_City", Text, 30, Never),
    FieldSpec::new("sg_Ship_Address", Text, 60, Never),
    FieldSpec::new("sg_Ship_Zip", Text, 10, Never),
    // Transaction details
    FieldSpec::new(IS_3D_TRANS, Numeric, 1, Always),
    FieldSpec::new(TRANS_TYPE, Text, 20, Always),
    FieldSpec::new("sg_Currency", Text, 3, Always),
    FieldSpec::new("sg_Amount", Text, 10, Always),
    FieldSpec::new("sg_AuthCode", Text, 10, RequiredFor(REFERENCED)),
    FieldSpec::new(CLIENT_LOGIN_ID, Text, 24, Always),
    FieldSpec::new(CLIENT_PASSWORD, Text, 24, Always),
    FieldSpec::new(CLIENT_UNIQUE_ID, Text, 64, Never),
    FieldSpec::new("sg_TransactionID", Integer, 32, RequiredFor(REFERENCED)),
    FieldSpec::new("sg_AVS_Approves", Text, 10, Never),
    FieldSpec::new("sg_CustomData", Text, 255, Never),
    FieldSpec::new("sg_UserID", Text, 50, Never),
    FieldSpec::new("sg_CreditType", Integer, 1, RequiredFor(CREDIT_ONLY)),
    FieldSpec::new("sg_WebSite", Text, 50, Never),
    FieldSpec::new("sg_ProductID", Text, 50, Never),
    FieldSpec::new(RESPONSE_FORMAT, Numeric, 1, Always),
    FieldSpec::new("sg_Rebill", Text, 10, Never),
    FieldSpec::new("sg_ResponseURL", Text, 256, Never),
    FieldSpec::new("sg_TemplateID", Text, 10, Never),
    FieldSpec::new("sg_VIPCardHolder", Integer, 1, Never),
    // Credit / debit card details
    FieldSpec::new("sg_NameOnCard", Text, 70, Always),
    FieldSpec::new(CARD_NUMBER, Text, 20, Always),
    FieldSpec::new("sg_ExpMonth", Text, 2, Always),
    FieldSpec::new("sg_ExpYear", Text, 2, Always),
    FieldSpec::new(CVV2, Numeric, 4, Always),
    FieldSpec::new("sg_DC_Issue", Numeric, 2, Never),
    FieldSpec::new("sg_DC_StartMon", Text, 2, Never),
    FieldSpec::new("sg_DC_StartYear", Text, 2, Never),
    FieldSpec::new("sg_IssuingBankName", Text, 255, Never),
];

/// Returns the field table to check a `transaction_type` request against.
///
/// The whole table is returned; requirement is resolved per type by the
/// caller through [`FieldSpec::is_required_for`].
#[must_use]
pub fn fields_for(_transaction_type: TransactionType) -> &'static [FieldSpec] {
    FIELDS
}

/// Returns the names of all known fields.
#[must_use]
pub fn all_field_names() -> BTreeSet<&'static str> {
    FIELDS.iter().map(|field| field.name).collect()
}

/// Looks up a field by wire name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_44_unique_fields() {
        assert_eq!(FIELDS.len(), 44);
        assert_eq!(all_field_names().len(), 44);
    }

    #[test]
    fn test_sizes_are_positive() {
        assert!(FIELDS.iter().all(|field| field.max_size > 0));
    }

    #[test]
    fn test_lookup_known_fields() {
        let first_name = lookup("sg_FirstName").unwrap();
        assert_eq!(first_name.kind, FieldKind::Text);
        assert_eq!(first_name.max_size, 30);
        assert_eq!(first_name.requirement, Requirement::Always);

        let card = lookup(CARD_NUMBER).unwrap();
        assert_eq!(card.max_size, 20);

        assert!(lookup("sg_Unknown").is_none());
    }

    #[test]
    fn test_conditional_requirements() {
        let auth_code = lookup("sg_AuthCode").unwrap();
        assert!(auth_code.is_required_for(TransactionType::Settle));
        assert!(auth_code.is_required_for(TransactionType::Credit));
        assert!(auth_code.is_required_for(TransactionType::Void));
        assert!(!auth_code.is_required_for(TransactionType::Auth));
        assert!(!auth_code.is_required_for(TransactionType::Sale));
        assert!(!auth_code.is_required_for(TransactionType::AvsOnly));

        let credit_type = lookup("sg_CreditType").unwrap();
        assert!(credit_type.is_required_for(TransactionType::Credit));
        assert!(!credit_type.is_required_for(TransactionType::Void));

        let ship_zip = lookup("sg_Ship_Zip").unwrap();
        assert!(TransactionType::ALL
            .into_iter()
            .all(|kind| !ship_zip.is_required_for(kind)));
    }

    #[test]
    fn test_fields_for_returns_whole_table() {
        for kind in TransactionType::ALL {
            assert_eq!(fields_for(kind).len(), FIELDS.len());
        }
    }

    #[test]
    fn test_integer_fields() {
        let integers: Vec<_> = FIELDS
            .iter()
            .filter(|field| field.kind == FieldKind::Integer)
            .map(|field| field.name)
            .collect();
        assert_eq!(
            integers,
            ["sg_TransactionID", "sg_CreditType", "sg_VIPCardHolder"]
        );
    }
}
