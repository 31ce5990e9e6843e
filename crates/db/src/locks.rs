//! Transaction-scoped advisory locks.
//!
//! Custody checks and period closing serialise on `PostgreSQL` advisory
//! locks taken with `pg_advisory_xact_lock`, so they are released when the
//! surrounding transaction commits or rolls back. Ledger writes hold the
//! company's closing lock in shared mode: many can run at once, but none
//! overlaps a closing. Other backends run with a single writer and skip the
//! lock.
//!
//! # Usage
//!
//! ```ignore
//! use stockledger_db::locks;
//!
//! let txn = db.begin().await?;
//! locks::lock_custody(&txn, company_id, "BC-0001").await?;
//! // Locate and append while holding the lock
//! txn.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use stockledger_shared::types::CompanyId;

/// Locks one barcode of a tenant until the transaction ends.
///
/// Two outbound movements of the same barcode queue here, so the second
/// one locates the first one's entry.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_custody<C>(conn: &C, company_id: CompanyId, barcode: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    advisory_xact_lock(conn, format!("custody:{company_id}:{barcode}"), LockMode::Exclusive).await
}

/// Locks period closing for a tenant until the transaction ends.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_closing<C>(conn: &C, company_id: CompanyId) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    advisory_xact_lock(conn, format!("closing:{company_id}"), LockMode::Exclusive).await
}

/// Holds off closing for a tenant while a ledger write is in flight.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn share_closing<C>(conn: &C, company_id: CompanyId) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    advisory_xact_lock(conn, format!("closing:{company_id}"), LockMode::Shared).await
}

#[derive(Clone, Copy)]
enum LockMode {
    Exclusive,
    Shared,
}

async fn advisory_xact_lock<C>(conn: &C, key: String, mode: LockMode) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if conn.get_database_backend() != DbBackend::Postgres {
        return Ok(());
    }

    let sql = match mode {
        LockMode::Exclusive => "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
        LockMode::Shared => "SELECT pg_advisory_xact_lock_shared(hashtextextended($1, 0))",
    };
    // Keys are hashed to the 64-bit lock space; collisions only over-serialise.
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [key.into()],
    ))
    .await?;
    Ok(())
}
