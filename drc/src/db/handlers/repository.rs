//! The [`Repository`] trait implemented by every table-backed store.

use crate::db::errors::Result;
use std::collections::HashMap;

/// Data access for one table, on a borrowed connection or transaction.
///
/// Lookups take the public UUID; internal sequential keys never leave the repository.
/// Documents and links are immutable, so implementations answer `update` with
/// [`DbError::ProtectedEntity`](crate::db::errors::DbError::ProtectedEntity).
#[async_trait::async_trait]
pub trait Repository {
    type CreateRequest;
    type UpdateRequest;
    type Response;
    type Id: Send + Sync;
    type Filter: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// `None` when no row has this id
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Rows for the ids that exist; unknown ids are left out of the map
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// One page of rows matching `filter`, oldest first
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Total rows matching `filter`, skip and limit ignored
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64>;

    /// `false` when there was nothing to delete
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
