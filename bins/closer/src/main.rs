//! Stockledger month-end closer.
//!
//! Closes one stock period for every configured company and writes the
//! snapshot of the following month. Without a configured year and month it
//! closes the month before today, so a scheduler can run it shortly after
//! midnight on the first. Run it by hand to close a given period:
//!
//! ```text
//! STOCKLEDGER__CLOSING__COMPANIES=<uuid>,<uuid> \
//! STOCKLEDGER__CLOSING__YEAR=2024 STOCKLEDGER__CLOSING__MONTH=1 closer
//! ```
//!
//! Exits non-zero when any company fails to close.

use std::time::Duration;

use anyhow::bail;
use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockledger_core::stock::{ClosingSummary, StockPeriod};
use stockledger_db::{ClosingRepository, InventoryError, connect_with};
use stockledger_shared::types::CompanyId;
use stockledger_shared::{AppConfig, ClosingConfig, TenantContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockledger=debug,closer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    if config.closing.companies.is_empty() {
        warn!("No companies configured, nothing to close");
        return Ok(());
    }

    let target = StockPeriod::resolve_ended(
        config.closing.year,
        config.closing.month,
        Utc::now().date_naive(),
    )?;

    let db = connect_with(&config.database).await?;
    info!(
        companies = config.closing.companies.len(),
        period = %target,
        "Connected to database"
    );

    let closing = ClosingRepository::new(db);
    let runs = config
        .closing
        .companies
        .iter()
        .map(|id| close_company(&closing, &config.closing, target, CompanyId::from_uuid(*id)));
    let results = join_all(runs).await;

    let mut failed = 0usize;
    for (id, result) in config.closing.companies.iter().zip(results) {
        match result {
            Ok(summary) => info!(
                company_id = %id,
                period = %summary.closed_period,
                products = summary.products,
                units = summary.units,
                already_closed = summary.already_closed,
                "Company closed"
            ),
            Err(e) => {
                failed += 1;
                error!(
                    company_id = %id,
                    error_code = e.error_code(),
                    error = %e,
                    "Company failed to close"
                );
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} companies failed to close", config.closing.companies.len());
    }
    Ok(())
}

/// Closes one company, retrying transient database failures.
async fn close_company(
    closing: &ClosingRepository,
    settings: &ClosingConfig,
    target: StockPeriod,
    company_id: CompanyId,
) -> Result<ClosingSummary, InventoryError> {
    let ctx = TenantContext::system(company_id);
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match closing.close(&ctx, target).await {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    company_id = %company_id,
                    attempt,
                    error = %e,
                    "Transient closing failure, retrying"
                );
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
