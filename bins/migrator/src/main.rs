//! Database migration runner for Stockledger.
//!
//! Usage:
//!   migrator up      - Create the ledger and snapshot tables
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Reads `DATABASE_URL` from the environment or a `.env` file.

use sea_orm_migration::prelude::*;
use stockledger_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The migrator CLI installs its own subscriber.
    cli::run_cli(Migrator).await;
}
