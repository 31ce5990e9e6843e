//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod closing;
pub mod error;
pub mod ledger;
pub mod movement;
pub mod stock;

mod snapshot;

#[cfg(test)]
mod inventory_integration_tests;

pub use closing::ClosingRepository;
pub use error::InventoryError;
pub use ledger::{EntryFilter, LedgerRepository};
pub use movement::MovementRepository;
pub use stock::{ProductStock, StockRepository};
