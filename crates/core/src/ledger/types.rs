//! Ledger domain types for appending movements.
//!
//! This module defines the movement direction, the kinds of documents that
//! produce movements, and the input shape accepted by `Append`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{
    BranchId, CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId,
};

use super::entry::LedgerEntry;
use super::error::LedgerError;

/// Direction of a unit movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The unit arrives (on-hand quantity goes up).
    Inbound,
    /// The unit leaves (on-hand quantity goes down).
    Outbound,
}

impl Direction {
    /// Returns `+1` for inbound and `-1` for outbound.
    #[must_use]
    pub const fn signed(self) -> i64 {
        match self {
            Self::Inbound => 1,
            Self::Outbound => -1,
        }
    }

    /// Returns true for inbound movements.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::Inbound)
    }

    /// Builds a direction from the persisted `is_in` flag.
    #[must_use]
    pub const fn from_is_in(is_in: bool) -> Self {
        if is_in { Self::Inbound } else { Self::Outbound }
    }
}

/// Kind of business document that produced a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Goods receipt from a supplier.
    #[serde(rename = "GR")]
    GoodsReceipt,
    /// Delivery order to a customer.
    #[serde(rename = "DO")]
    DeliveryOrder,
    /// Return of received goods back to the supplier.
    #[serde(rename = "RR")]
    ReceiptReturn,
    /// Return of delivered goods from the customer.
    #[serde(rename = "DR")]
    DeliveryReturn,
}

impl TransactionType {
    /// All document kinds.
    pub const ALL: [Self; 4] = [
        Self::GoodsReceipt,
        Self::DeliveryOrder,
        Self::ReceiptReturn,
        Self::DeliveryReturn,
    ];

    /// Returns the two-letter code stored on ledger rows.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::GoodsReceipt => "GR",
            Self::DeliveryOrder => "DO",
            Self::ReceiptReturn => "RR",
            Self::DeliveryReturn => "DR",
        }
    }

    /// Returns the direction this kind of document moves stock in.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::GoodsReceipt | Self::DeliveryReturn => Direction::Inbound,
            Self::DeliveryOrder | Self::ReceiptReturn => Direction::Outbound,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::InvalidField {
                field: "transaction_type",
                reason: format!("unknown transaction type '{s}'"),
            })
    }
}

/// Input for appending one unit movement.
///
/// The company comes from the caller's tenant context; the id and creation
/// time are stamped on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// Branch where the movement happens.
    pub branch_id: BranchId,
    /// Shelf the unit is put on or taken from.
    pub shelf_id: ShelfId,
    /// Product the unit belongs to.
    pub product_id: ProductId,
    /// Unit identifier.
    pub barcode: String,
    /// Owning document id.
    pub transaction_id: DocumentId,
    /// Owning document code.
    pub transaction_code: String,
    /// Owning document kind.
    pub transaction_type: TransactionType,
    /// Business date of the movement.
    pub transaction_date: NaiveDate,
    /// Movement direction.
    pub direction: Direction,
}

impl NewLedgerEntry {
    /// Turns a validated input into a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` if a required field is empty.
    pub fn into_entry(
        self,
        company_id: CompanyId,
        created_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        if company_id.is_nil() {
            return Err(LedgerError::MissingField("company_id"));
        }
        super::validation::validate_new_entry(&self)?;

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            company_id,
            branch_id: self.branch_id,
            shelf_id: self.shelf_id,
            product_id: self.product_id,
            barcode: self.barcode.trim().to_string(),
            transaction_id: self.transaction_id,
            transaction_code: self.transaction_code.trim().to_string(),
            transaction_type: self.transaction_type,
            transaction_date: self.transaction_date,
            direction: self.direction,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionType::GoodsReceipt, "GR", Direction::Inbound)]
    #[case(TransactionType::DeliveryOrder, "DO", Direction::Outbound)]
    #[case(TransactionType::ReceiptReturn, "RR", Direction::Outbound)]
    #[case(TransactionType::DeliveryReturn, "DR", Direction::Inbound)]
    fn test_transaction_type_code_and_direction(
        #[case] kind: TransactionType,
        #[case] code: &str,
        #[case] direction: Direction,
    ) {
        assert_eq!(kind.code(), code);
        assert_eq!(kind.direction(), direction);
        assert_eq!(code.parse::<TransactionType>().unwrap(), kind);
        assert_eq!(kind.to_string(), code);
    }

    #[test]
    fn test_transaction_type_parse_is_case_insensitive() {
        assert_eq!(
            " do ".parse::<TransactionType>().unwrap(),
            TransactionType::DeliveryOrder
        );
        assert!("XX".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_serde_uses_codes() {
        let json = serde_json::to_string(&TransactionType::DeliveryReturn).unwrap();
        assert_eq!(json, "\"DR\"");
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Inbound.signed(), 1);
        assert_eq!(Direction::Outbound.signed(), -1);
        assert_eq!(Direction::from_is_in(true), Direction::Inbound);
        assert_eq!(Direction::from_is_in(false), Direction::Outbound);
    }
}
