//! Database repository for enkelvoudige informatieobjecten.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::informatieobjecten::{InformatieObjectCreateDBRequest, InformatieObjectDBResponse},
};
use crate::types::{InformatieObjectId, Vertrouwelijkheidaanduiding, abbrev_uuid};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

const COLUMNS: &str = "uuid, identificatie, bronorganisatie, creatiedatum, titel, vertrouwelijkaanduiding, auteur, \
     beschrijving, informatieobjecttype, formaat, taal, inhoud, link, created_at";

/// Filter for listing documents
#[derive(Debug, Clone)]
pub struct InformatieObjectFilter {
    pub skip: i64,
    pub limit: i64,
    /// Exact match on `identificatie`
    pub identificatie: Option<String>,
    /// Exact match on `bronorganisatie`
    pub bronorganisatie: Option<String>,
}

impl InformatieObjectFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            identificatie: None,
            bronorganisatie: None,
        }
    }

    pub fn with_identificatie(mut self, identificatie: String) -> Self {
        self.identificatie = Some(identificatie);
        self
    }

    pub fn with_bronorganisatie(mut self, bronorganisatie: String) -> Self {
        self.bronorganisatie = Some(bronorganisatie);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref identificatie) = self.identificatie {
            query.push(" AND identificatie = ");
            query.push_bind(identificatie.clone());
        }
        if let Some(ref bronorganisatie) = self.bronorganisatie {
            query.push(" AND bronorganisatie = ");
            query.push_bind(bronorganisatie.clone());
        }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct EnkelvoudigInformatieObject {
    pub uuid: InformatieObjectId,
    pub identificatie: String,
    pub bronorganisatie: String,
    pub creatiedatum: NaiveDate,
    pub titel: String,
    pub vertrouwelijkaanduiding: Option<String>,
    pub auteur: String,
    pub beschrijving: String,
    pub informatieobjecttype: String,
    pub formaat: String,
    pub taal: String,
    pub inhoud: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EnkelvoudigInformatieObject> for InformatieObjectDBResponse {
    type Error = DbError;

    fn try_from(row: EnkelvoudigInformatieObject) -> Result<Self> {
        let vertrouwelijkaanduiding = row
            .vertrouwelijkaanduiding
            .as_deref()
            .map(str::parse::<Vertrouwelijkheidaanduiding>)
            .transpose()
            .map_err(|e| DbError::Other(anyhow::anyhow!(e)))?;

        Ok(Self {
            id: row.uuid,
            identificatie: row.identificatie,
            bronorganisatie: row.bronorganisatie,
            creatiedatum: row.creatiedatum,
            titel: row.titel,
            vertrouwelijkaanduiding,
            auteur: row.auteur,
            beschrijving: row.beschrijving,
            informatieobjecttype: row.informatieobjecttype,
            formaat: row.formaat,
            taal: row.taal,
            inhoud: row.inhoud,
            link: row.link,
            created_at: row.created_at,
        })
    }
}

pub struct InformatieObjecten<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for InformatieObjecten<'c> {
    type CreateRequest = InformatieObjectCreateDBRequest;
    /// Documents are immutable once registered
    type UpdateRequest = ();
    type Response = InformatieObjectDBResponse;
    type Id = InformatieObjectId;
    type Filter = InformatieObjectFilter;

    #[instrument(skip(self, request), fields(informatieobject_id = %abbrev_uuid(&request.id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            INSERT INTO enkelvoudiginformatieobjecten (
                uuid, identificatie, bronorganisatie, creatiedatum, titel, vertrouwelijkaanduiding, auteur,
                beschrijving, informatieobjecttype, formaat, taal, inhoud, link
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, EnkelvoudigInformatieObject>(&sql)
            .bind(request.id)
            .bind(&request.identificatie)
            .bind(&request.bronorganisatie)
            .bind(request.creatiedatum)
            .bind(&request.titel)
            .bind(request.vertrouwelijkaanduiding.map(|v| v.as_str()))
            .bind(&request.auteur)
            .bind(&request.beschrijving)
            .bind(&request.informatieobjecttype)
            .bind(&request.formaat)
            .bind(&request.taal)
            .bind(&request.inhoud)
            .bind(&request.link)
            .fetch_one(&mut *self.db)
            .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(informatieobject_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let sql = format!("SELECT {COLUMNS} FROM enkelvoudiginformatieobjecten WHERE uuid = $1");
        let row = sqlx::query_as::<_, EnkelvoudigInformatieObject>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(InformatieObjectDBResponse::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!("SELECT {COLUMNS} FROM enkelvoudiginformatieobjecten WHERE uuid = ANY($1)");
        let rows = sqlx::query_as::<_, EnkelvoudigInformatieObject>(&sql)
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        let mut result = HashMap::with_capacity(rows.len());
        for row in rows {
            let document = InformatieObjectDBResponse::try_from(row)?;
            result.insert(document.id, document);
        }

        Ok(result)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM enkelvoudiginformatieobjecten WHERE 1=1"));
        filter.push_conditions(&mut query);

        // Registration order
        query.push(" ORDER BY id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let rows = query
            .build_query_as::<EnkelvoudigInformatieObject>()
            .fetch_all(&mut *self.db)
            .await?;

        tracing::debug!("Retrieved {} informatieobjecten", rows.len());

        rows.into_iter().map(InformatieObjectDBResponse::try_from).collect()
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM enkelvoudiginformatieobjecten WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: i64 = query.build_query_scalar().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Links to cases are removed by the `ON DELETE CASCADE` on `zaakinformatieobjecten`. Stored
    /// content is not touched here.
    #[instrument(skip(self), fields(informatieobject_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enkelvoudiginformatieobjecten WHERE uuid = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, _request), fields(informatieobject_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, _request: &Self::UpdateRequest) -> Result<Self::Response> {
        Err(DbError::ProtectedEntity {
            operation: "update",
            reason: "content and metadata are immutable after registration".to_string(),
            entity_type: "EnkelvoudigInformatieObject".to_string(),
            entity_id: Some(id.to_string()),
        })
    }
}

impl<'c> InformatieObjecten<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Internal key of a document, used to reference it from link rows
    #[instrument(skip(self), fields(informatieobject_id = %abbrev_uuid(&id)), err)]
    pub async fn get_internal_id(&mut self, id: InformatieObjectId) -> Result<Option<i64>> {
        let internal_id: Option<i64> = sqlx::query_scalar("SELECT id FROM enkelvoudiginformatieobjecten WHERE uuid = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(internal_id)
    }
}
