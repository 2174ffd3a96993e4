//! PostgreSQL adapters using Diesel.
//!
//! Adapters translate between Diesel row structs and domain types and map
//! database failures onto port errors. Row structs (`models`) and table
//! definitions (`schema`) stay private to this module.
//!
//! ```no_run
//! use std::time::Duration;
//! use journal::outbound::persistence::{DbPool, DieselEntryStore, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/journal")).await?;
//! let store = DieselEntryStore::new(pool, Duration::from_secs(5));
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_entry_store;
mod diesel_helpers;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_entry_store::DieselEntryStore;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
