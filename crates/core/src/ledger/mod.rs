//! Inventory ledger logic.
//!
//! This module implements the append-only movement log:
//! - Ledger entries (one per unit movement)
//! - Movement direction and document kinds
//! - Validation of new entries
//! - Barcode custody derived from the entry chain
//! - Error types for ledger operations

pub mod custody;
pub mod entry;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod custody_props;

pub use custody::CustodyService;
pub use entry::{ChronologyKey, LedgerEntry};
pub use error::{ErrorKind, LedgerError};
pub use types::{Direction, NewLedgerEntry, TransactionType};
pub use validation::{validate_barcode, validate_new_entry};
