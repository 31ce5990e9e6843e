//! Shared types, errors, and configuration for Stockledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The tenant/actor context threaded through every ledger operation
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::{AppConfig, ClosingConfig, DatabaseConfig};
pub use context::TenantContext;
pub use error::{AppError, AppResult};
