//! HTTP handlers for links between documents and cases.
//!
//! Whether the document's informatieobjecttype belongs to the case's zaaktype is not checked;
//! neither the type catalogue nor the case registry is consulted.

use crate::AppState;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::zaakinformatieobjecten::{
    ListZaakInformatieObjectenQuery, ZaakInformatieObjectCreate, ZaakInformatieObjectResponse,
};
use crate::db::errors::DbError;
use crate::db::handlers::{InformatieObjecten, Repository, ZaakInformatieObjectFilter, ZaakInformatieObjecten};
use crate::db::models::zaakinformatieobjecten::ZaakInformatieObjectCreateDBRequest;
use crate::errors::{Error, ErrorBody, Result};
use crate::types::{ZaakInformatieObjectId, abbrev_uuid};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

const RESOURCE: &str = "ZaakInformatieObject";

fn parse_id(raw: &str) -> Result<ZaakInformatieObjectId> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound {
        resource: RESOURCE.to_string(),
        id: raw.to_string(),
    })
}

fn not_found(id: ZaakInformatieObjectId) -> Error {
    Error::NotFound {
        resource: RESOURCE.to_string(),
        id: id.to_string(),
    }
}

fn unknown_document() -> Error {
    Error::field(
        "informatieobject",
        ValidationError::new("does_not_exist").with_message(Cow::Borrowed("Invalid hyperlink - object does not exist")),
    )
}

#[utoipa::path(
    get,
    path = "/zaakinformatieobjecten",
    tag = "zaakinformatieobjecten",
    summary = "List links between documents and cases",
    params(ListZaakInformatieObjectenQuery),
    responses(
        (status = 200, description = "Page of links", body = PaginatedResponse<ZaakInformatieObjectResponse>),
        (status = 400, description = "Invalid informatieobject filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_zaakinformatieobjecten(
    State(state): State<AppState>,
    Query(query): Query<ListZaakInformatieObjectenQuery>,
) -> Result<Json<PaginatedResponse<ZaakInformatieObjectResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut filter = ZaakInformatieObjectFilter::new(skip, limit);
    if let Some(zaak) = query.zaak {
        filter = filter.with_zaak(zaak);
    }
    if let Some(ref hyperlink) = query.informatieobject {
        let document = state
            .links
            .resolve_document(hyperlink)
            .map_err(|e| Error::field("informatieobject", e))?;
        filter = filter.with_informatieobject(document);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ZaakInformatieObjecten::new(&mut conn);
    let links = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    let data = links
        .into_iter()
        .map(|link| ZaakInformatieObjectResponse::new(link, &state.links))
        .collect();

    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

#[utoipa::path(
    post,
    path = "/zaakinformatieobjecten",
    tag = "zaakinformatieobjecten",
    summary = "Link a document to a case",
    description = "`informatieobject` must be the hyperlink of a registered document. `zaak` is stored as given.",
    request_body = ZaakInformatieObjectCreate,
    responses(
        (status = 201, description = "Link created", body = ZaakInformatieObjectResponse),
        (status = 400, description = "Invalid input or unknown document", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_zaakinformatieobject(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ZaakInformatieObjectCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ZaakInformatieObjectResponse>)> {
    let Json(body) = payload?;

    let mut errors = body.validate().err().unwrap_or_else(ValidationErrors::new);
    let document = match body.informatieobject.as_deref().map(|hyperlink| state.links.resolve_document(hyperlink)) {
        Some(Ok(document)) => Some(document),
        Some(Err(e)) => {
            errors.add("informatieobject", e);
            None
        }
        None => None,
    };

    let (Some(document), Some(zaak)) = (document, body.zaak) else {
        return Err(Error::Validation(errors));
    };
    if !errors.errors().is_empty() {
        return Err(Error::Validation(errors));
    }

    let request = ZaakInformatieObjectCreateDBRequest {
        id: Uuid::new_v4(),
        informatieobject: document,
        zaak,
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let created;
    {
        if InformatieObjecten::new(&mut tx).get_internal_id(document).await?.is_none() {
            return Err(unknown_document());
        }

        // the document can still vanish between the check and the insert
        created = match ZaakInformatieObjecten::new(&mut tx).create(&request).await {
            Err(DbError::NotFound) => return Err(unknown_document()),
            other => other?,
        };
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(
        zaakinformatieobject_id = %abbrev_uuid(&created.id),
        informatieobject_id = %abbrev_uuid(&created.informatieobject),
        "Linked informatieobject to zaak"
    );

    Ok((StatusCode::CREATED, Json(ZaakInformatieObjectResponse::new(created, &state.links))))
}

#[utoipa::path(
    get,
    path = "/zaakinformatieobjecten/{uuid}",
    tag = "zaakinformatieobjecten",
    summary = "Get a link",
    params(("uuid" = String, Path, description = "Link uuid")),
    responses(
        (status = 200, description = "The link", body = ZaakInformatieObjectResponse),
        (status = 404, description = "Link not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all, fields(zaakinformatieobject_id = %raw_id))]
pub async fn get_zaakinformatieobject(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ZaakInformatieObjectResponse>> {
    let id = parse_id(&raw_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let link = ZaakInformatieObjecten::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(ZaakInformatieObjectResponse::new(link, &state.links)))
}

#[utoipa::path(
    delete,
    path = "/zaakinformatieobjecten/{uuid}",
    tag = "zaakinformatieobjecten",
    summary = "Delete a link",
    description = "Removes the link. The document itself is kept.",
    params(("uuid" = String, Path, description = "Link uuid")),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 404, description = "Link not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[tracing::instrument(skip_all, fields(zaakinformatieobject_id = %raw_id))]
pub async fn delete_zaakinformatieobject(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&raw_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !ZaakInformatieObjecten::new(&mut conn).delete(id).await? {
        return Err(not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
