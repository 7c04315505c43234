//! Database repository for links between documents and cases.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::zaakinformatieobjecten::{ZaakInformatieObjectCreateDBRequest, ZaakInformatieObjectDBResponse},
};
use crate::types::{InformatieObjectId, ZaakInformatieObjectId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

// Rows are always read through the join so the document is reported by its public uuid
const SELECT_JOINED: &str = "SELECT z.uuid, e.uuid AS informatieobject, z.zaak, z.created_at \
     FROM zaakinformatieobjecten z \
     JOIN enkelvoudiginformatieobjecten e ON e.id = z.informatieobject_id";

/// Filter for listing links
#[derive(Debug, Clone)]
pub struct ZaakInformatieObjectFilter {
    pub skip: i64,
    pub limit: i64,
    /// Exact match on the case URL
    pub zaak: Option<String>,
    /// Only links to this document
    pub informatieobject: Option<InformatieObjectId>,
}

impl ZaakInformatieObjectFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            zaak: None,
            informatieobject: None,
        }
    }

    pub fn with_zaak(mut self, zaak: String) -> Self {
        self.zaak = Some(zaak);
        self
    }

    pub fn with_informatieobject(mut self, informatieobject: InformatieObjectId) -> Self {
        self.informatieobject = Some(informatieobject);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref zaak) = self.zaak {
            query.push(" AND z.zaak = ");
            query.push_bind(zaak.clone());
        }
        if let Some(informatieobject) = self.informatieobject {
            query.push(" AND e.uuid = ");
            query.push_bind(informatieobject);
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct ZaakInformatieObject {
    pub uuid: ZaakInformatieObjectId,
    pub informatieobject: InformatieObjectId,
    pub zaak: String,
    pub created_at: DateTime<Utc>,
}

impl From<ZaakInformatieObject> for ZaakInformatieObjectDBResponse {
    fn from(row: ZaakInformatieObject) -> Self {
        Self {
            id: row.uuid,
            informatieobject: row.informatieobject,
            zaak: row.zaak,
            created_at: row.created_at,
        }
    }
}

pub struct ZaakInformatieObjecten<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for ZaakInformatieObjecten<'c> {
    type CreateRequest = ZaakInformatieObjectCreateDBRequest;
    /// A link is replaced by deleting it and creating a new one
    type UpdateRequest = ();
    type Response = ZaakInformatieObjectDBResponse;
    type Id = ZaakInformatieObjectId;
    type Filter = ZaakInformatieObjectFilter;

    /// Returns [`DbError::NotFound`] when the referenced document does not exist.
    #[instrument(skip(self, request), fields(
        zaakinformatieobject_id = %abbrev_uuid(&request.id),
        informatieobject_id = %abbrev_uuid(&request.informatieobject)
    ), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Resolving the document inside the INSERT keeps the check and the write atomic
        let row = sqlx::query_as::<_, ZaakInformatieObject>(
            r#"
            INSERT INTO zaakinformatieobjecten (uuid, informatieobject_id, zaak)
            SELECT $1, e.id, $3 FROM enkelvoudiginformatieobjecten e WHERE e.uuid = $2
            RETURNING uuid, $2::uuid AS informatieobject, zaak, created_at
            "#,
        )
        .bind(request.id)
        .bind(request.informatieobject)
        .bind(&request.zaak)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(zaakinformatieobject_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("{SELECT_JOINED} WHERE z.uuid = $1");
        let row = sqlx::query_as::<_, ZaakInformatieObject>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(ZaakInformatieObjectDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!("{SELECT_JOINED} WHERE z.uuid = ANY($1)");
        let rows = sqlx::query_as::<_, ZaakInformatieObject>(&sql)
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.uuid, ZaakInformatieObjectDBResponse::from(row)))
            .collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(format!("{SELECT_JOINED} WHERE 1=1"));
        filter.push_conditions(&mut query);

        query.push(" ORDER BY z.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let rows = query.build_query_as::<ZaakInformatieObject>().fetch_all(&mut *self.db).await?;

        Ok(rows.into_iter().map(ZaakInformatieObjectDBResponse::from).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let mut query = QueryBuilder::new(
            "SELECT COUNT(*) FROM zaakinformatieobjecten z \
             JOIN enkelvoudiginformatieobjecten e ON e.id = z.informatieobject_id WHERE 1=1",
        );
        filter.push_conditions(&mut query);

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(zaakinformatieobject_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM zaakinformatieobjecten WHERE uuid = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, _request), fields(zaakinformatieobject_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, _request: &Self::UpdateRequest) -> Result<Self::Response> {
        Err(DbError::ProtectedEntity {
            operation: "update",
            reason: "links cannot be changed, delete and recreate instead".to_string(),
            entity_type: "ZaakInformatieObject".to_string(),
            entity_id: Some(id.to_string()),
        })
    }
}

impl<'c> ZaakInformatieObjecten<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::InformatieObjecten;
    use crate::db::models::informatieobjecten::InformatieObjectDBResponse;
    use crate::test_utils::document_request;
    use sqlx::PgPool;
    use uuid::Uuid;

    const ZAAK: &str = "https://zrc.example.com/api/v1/zaken/1b2c7f3e-6f5e-4c4f-9a1a-0f1e2d3c4b5a";

    async fn create_document(pool: &PgPool) -> InformatieObjectDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        InformatieObjecten::new(&mut conn).create(&document_request()).await.unwrap()
    }

    fn link_request(informatieobject: InformatieObjectId, zaak: &str) -> ZaakInformatieObjectCreateDBRequest {
        ZaakInformatieObjectCreateDBRequest {
            id: Uuid::new_v4(),
            informatieobject,
            zaak: zaak.to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_link(pool: PgPool) {
        let document = create_document(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ZaakInformatieObjecten::new(&mut conn);

        let request = link_request(document.id, ZAAK);
        let created = repo.create(&request).await.unwrap();
        assert_eq!(created.id, request.id);
        assert_eq!(created.informatieobject, document.id);
        assert_eq!(created.zaak, ZAAK);

        let fetched = repo.get_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_link_to_unknown_document(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ZaakInformatieObjecten::new(&mut conn);

        let result = repo.create(&link_request(Uuid::new_v4(), ZAAK)).await;
        assert!(matches!(result, Err(DbError::NotFound)));
        assert_eq!(repo.count(&ZaakInformatieObjectFilter::new(0, 10)).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters(pool: PgPool) {
        let first = create_document(&pool).await;
        let second = create_document(&pool).await;
        let other_zaak = "https://zrc.example.com/api/v1/zaken/other";

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ZaakInformatieObjecten::new(&mut conn);

        repo.create(&link_request(first.id, ZAAK)).await.unwrap();
        repo.create(&link_request(second.id, ZAAK)).await.unwrap();
        repo.create(&link_request(first.id, other_zaak)).await.unwrap();

        let all = repo.list(&ZaakInformatieObjectFilter::new(0, 10)).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_zaak = ZaakInformatieObjectFilter::new(0, 10).with_zaak(ZAAK.to_string());
        assert_eq!(repo.list(&by_zaak).await.unwrap().len(), 2);
        assert_eq!(repo.count(&by_zaak).await.unwrap(), 2);

        let by_document = ZaakInformatieObjectFilter::new(0, 10).with_informatieobject(first.id);
        let links = repo.list(&by_document).await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.informatieobject == first.id));

        let both = by_document.with_zaak(other_zaak.to_string());
        assert_eq!(repo.count(&both).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_bulk(pool: PgPool) {
        let document = create_document(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ZaakInformatieObjecten::new(&mut conn);

        let link = repo.create(&link_request(document.id, ZAAK)).await.unwrap();
        let bulk = repo.get_bulk(vec![link.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(bulk.len(), 1);
        assert_eq!(bulk[&link.id], link);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_document_cascades_to_links(pool: PgPool) {
        let doomed = create_document(&pool).await;
        let unrelated = create_document(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let doomed_link;
        let unrelated_link;
        {
            let mut repo = ZaakInformatieObjecten::new(&mut conn);
            doomed_link = repo.create(&link_request(doomed.id, ZAAK)).await.unwrap();
            unrelated_link = repo.create(&link_request(unrelated.id, ZAAK)).await.unwrap();
        }

        assert!(InformatieObjecten::new(&mut conn).delete(doomed.id).await.unwrap());

        let mut repo = ZaakInformatieObjecten::new(&mut conn);
        assert!(repo.get_by_id(doomed_link.id).await.unwrap().is_none());
        assert!(repo.get_by_id(unrelated_link.id).await.unwrap().is_some());
        assert!(InformatieObjecten::new(&mut conn).get_by_id(unrelated.id).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_link_keeps_document(pool: PgPool) {
        let document = create_document(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let link = ZaakInformatieObjecten::new(&mut conn)
            .create(&link_request(document.id, ZAAK))
            .await
            .unwrap();

        assert!(ZaakInformatieObjecten::new(&mut conn).delete(link.id).await.unwrap());
        assert!(InformatieObjecten::new(&mut conn).get_by_id(document.id).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_is_refused(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = ZaakInformatieObjecten::new(&mut conn).update(Uuid::new_v4(), &()).await;
        assert!(matches!(result, Err(DbError::ProtectedEntity { .. })));
    }
}
