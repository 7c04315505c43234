//! HTTP handlers for enkelvoudige informatieobjecten.

use crate::AppState;
use crate::api::models::informatieobjecten::{
    EnkelvoudigInformatieObjectCreate, EnkelvoudigInformatieObjectResponse, ListInformatieObjectenQuery,
};
use crate::api::models::pagination::PaginatedResponse;
use crate::content::storage_key;
use crate::db::errors::DbError;
use crate::db::handlers::{FileStorage, InformatieObjectFilter, InformatieObjecten, Repository};
use crate::db::models::file_storage::FileStorageRequest;
use crate::db::models::informatieobjecten::InformatieObjectDBResponse;
use crate::errors::{Error, ErrorBody, Result};
use crate::types::{InformatieObjectId, abbrev_uuid};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

const RESOURCE: &str = "EnkelvoudigInformatieObject";

/// Unknown and malformed ids are both plain 404s
fn parse_id(raw: &str) -> Result<InformatieObjectId> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound {
        resource: RESOURCE.to_string(),
        id: raw.to_string(),
    })
}

fn not_found(id: InformatieObjectId) -> Error {
    Error::NotFound {
        resource: RESOURCE.to_string(),
        id: id.to_string(),
    }
}

/// Content of a registered document. A row whose file is gone is a server fault, not a 404.
async fn load_content(storage: &dyn FileStorage, document: &InformatieObjectDBResponse) -> Result<Vec<u8>> {
    storage.retrieve(&document.inhoud).await.map_err(|e| match e {
        DbError::NotFound => Error::Internal {
            operation: format!(
                "load content {} of informatieobject {}",
                document.inhoud,
                abbrev_uuid(&document.id)
            ),
        },
        other => Error::Database(other),
    })
}

#[utoipa::path(
    get,
    path = "/enkelvoudiginformatieobjecten",
    tag = "enkelvoudiginformatieobjecten",
    summary = "List documents",
    description = "Lists registered documents in registration order, content included.",
    params(ListInformatieObjectenQuery),
    responses(
        (status = 200, description = "Page of documents", body = PaginatedResponse<EnkelvoudigInformatieObjectResponse>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_informatieobjecten(
    State(state): State<AppState>,
    Query(query): Query<ListInformatieObjectenQuery>,
) -> Result<Json<PaginatedResponse<EnkelvoudigInformatieObjectResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut filter = InformatieObjectFilter::new(skip, limit);
    if let Some(identificatie) = query.identificatie {
        filter = filter.with_identificatie(identificatie);
    }
    if let Some(bronorganisatie) = query.bronorganisatie {
        filter = filter.with_bronorganisatie(bronorganisatie);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = InformatieObjecten::new(&mut conn);
    let documents = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    let mut data = Vec::with_capacity(documents.len());
    for document in documents {
        let content = load_content(state.storage.as_ref(), &document).await?;
        data.push(EnkelvoudigInformatieObjectResponse::new(document, &content, &state.links));
    }

    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

#[utoipa::path(
    post,
    path = "/enkelvoudiginformatieobjecten",
    tag = "enkelvoudiginformatieobjecten",
    summary = "Register a document",
    description = "Registers a document. `inhoud` is base64, plain or as a `data:` URI. Omitted `identificatie` \
        is generated. Nothing is stored when any field is invalid.",
    request_body = EnkelvoudigInformatieObjectCreate,
    responses(
        (status = 201, description = "Document registered", body = EnkelvoudigInformatieObjectResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_informatieobject(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EnkelvoudigInformatieObjectCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<EnkelvoudigInformatieObjectResponse>)> {
    let Json(body) = payload?;
    let content = body.validate_and_decode(&state.config.content)?;

    let id = Uuid::new_v4();
    let key = storage_key(id, Utc::now(), &state.config.content.stored_extension);
    let request = body.into_db_request(id, key.clone())?;

    // Content first: a row must never point at a missing file
    let stored = state
        .storage
        .store(FileStorageRequest {
            storage_key: key.clone(),
            content: content.bytes.clone(),
        })
        .await?;

    let inserted = async {
        let mut tx = state.db.begin().await?;
        let created = InformatieObjecten::new(&mut tx).create(&request).await?;
        tx.commit().await?;
        Ok::<_, DbError>(created)
    }
    .await;

    let created = match inserted {
        Ok(created) => created,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&key).await {
                tracing::warn!(storage_key = %key, "Failed to remove content of rejected informatieobject: {}", cleanup);
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        informatieobject_id = %abbrev_uuid(&created.id),
        storage_key = %stored.storage_key,
        size = stored.size_bytes,
        media_type = content.media_type.as_deref().unwrap_or("-"),
        "Registered informatieobject"
    );

    Ok((
        StatusCode::CREATED,
        Json(EnkelvoudigInformatieObjectResponse::new(created, &content.bytes, &state.links)),
    ))
}

#[utoipa::path(
    get,
    path = "/enkelvoudiginformatieobjecten/{uuid}",
    tag = "enkelvoudiginformatieobjecten",
    summary = "Get a document",
    params(("uuid" = String, Path, description = "Document uuid")),
    responses(
        (status = 200, description = "The document, content included", body = EnkelvoudigInformatieObjectResponse),
        (status = 404, description = "Document not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all, fields(informatieobject_id = %raw_id))]
pub async fn get_informatieobject(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<EnkelvoudigInformatieObjectResponse>> {
    let id = parse_id(&raw_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let document = InformatieObjecten::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let content = load_content(state.storage.as_ref(), &document).await?;
    Ok(Json(EnkelvoudigInformatieObjectResponse::new(document, &content, &state.links)))
}

#[utoipa::path(
    get,
    path = "/enkelvoudiginformatieobjecten/{uuid}/download",
    tag = "enkelvoudiginformatieobjecten",
    summary = "Download document content",
    description = "Returns the raw content bytes.",
    params(("uuid" = String, Path, description = "Document uuid")),
    responses(
        (status = 200, description = "Raw content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "Document not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all, fields(informatieobject_id = %raw_id))]
pub async fn download_informatieobject(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<impl IntoResponse> {
    let id = parse_id(&raw_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let document = InformatieObjecten::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let content = load_content(state.storage.as_ref(), &document).await?;
    let filename = document.inhoud.rsplit('/').next().unwrap_or(&document.inhoud).to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        content,
    ))
}

#[utoipa::path(
    delete,
    path = "/enkelvoudiginformatieobjecten/{uuid}",
    tag = "enkelvoudiginformatieobjecten",
    summary = "Delete a document",
    description = "Deletes the document, its content and every zaakinformatieobject that links to it.",
    params(("uuid" = String, Path, description = "Document uuid")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all, fields(informatieobject_id = %raw_id))]
pub async fn delete_informatieobject(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&raw_id)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let document;
    {
        let mut repo = InformatieObjecten::new(&mut tx);
        document = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
        repo.delete(id).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    // The row is gone, a leftover file is only wasted space
    if let Err(e) = state.storage.delete(&document.inhoud).await {
        tracing::warn!(storage_key = %document.inhoud, "Failed to remove content of deleted informatieobject: {}", e);
    }

    Ok(StatusCode::NO_CONTENT)
}
