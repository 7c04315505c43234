//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL, following the
//! Repository pattern:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐     ┌─────────────┐
//! │ Repositories│     │ FileStorage │  (document content)
//! └──────┬──────┘     └─────────────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations and storage backends
//! - [`models`]: Request and response records
//! - [`errors`]: Database-specific error types
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are embedded in the binary. They run on
//! startup through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;

use crate::config::DatabaseConfig;
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Open the main connection pool with the configured limits
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = &config.pool;
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.acquire_timeout())
        .idle_timeout(pool.idle_timeout())
        .max_lifetime(pool.max_lifetime())
        .connect(&config.url)
        .await
}
