//! Core inventory ledger logic for Stockledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and stock calculations live here; the
//! `stockledger-db` crate loads rows and hands them to these functions.
//!
//! # Modules
//!
//! - `ledger` - Ledger entries, validation and barcode custody
//! - `stock` - Stock periods, on-hand aggregation and period closing
//! - `movement` - Expansion of receipts, deliveries and returns into ledger entries

pub mod ledger;
pub mod movement;
pub mod stock;
