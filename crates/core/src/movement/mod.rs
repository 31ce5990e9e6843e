//! Receipts, deliveries and returns as the ledger sees them.
//!
//! A movement document is expanded into one ledger entry per unit. The
//! database layer posts the entries in one transaction, checking custody for
//! every outbound unit first.

pub mod document;
pub mod service;

pub use document::{MovementDocument, MovementLine};
pub use service::{MovementService, document_code};
