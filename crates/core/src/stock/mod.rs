//! Stock periods, on-hand aggregation and period closing.
//!
//! - `period` - Calendar-month periods that snapshots are labelled with
//! - `snapshot` - Materialized on-hand units and closing summaries
//! - `aggregate` - Current stock from a snapshot base plus later entries
//! - `closing` - The fold that produces the next period's snapshot

pub mod aggregate;
pub mod closing;
pub mod period;
pub mod snapshot;

#[cfg(test)]
mod closing_props;

pub use aggregate::StockService;
pub use closing::{ClosingPlan, ClosingService};
pub use period::StockPeriod;
pub use snapshot::{ClosingSummary, SnapshotLine};
