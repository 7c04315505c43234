//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `PgConnection` (a pool connection or a transaction) and
//! implements the [`Repository`] trait for one table.
//!
//! # Available Repositories
//!
//! - [`InformatieObjecten`]: registered documents
//! - [`ZaakInformatieObjecten`]: links from documents to cases
//!
//! Document content does not live in the database; [`FileStorage`] backends hold it, keyed by
//! the `inhoud` column.
//!
//! # Common Pattern
//!
//! ```ignore
//! use drc::db::handlers::{InformatieObjecten, Repository};
//!
//! async fn example(pool: &sqlx::PgPool, id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!
//!     let mut repo = InformatieObjecten::new(&mut tx);
//!     let deleted = repo.delete(id).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod file_storage;
pub mod informatieobjecten;
pub mod repository;
pub mod zaakinformatieobjecten;

pub use file_storage::{FileStorage, LocalFileStorage};
pub use informatieobjecten::{InformatieObjectFilter, InformatieObjecten};
pub use repository::Repository;
pub use zaakinformatieobjecten::{ZaakInformatieObjectFilter, ZaakInformatieObjecten};
