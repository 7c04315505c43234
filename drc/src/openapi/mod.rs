//! OpenAPI document for the registration API, served at `/api-docs/openapi.json`.

use crate::api;
use crate::errors::{ErrorBody, InvalidParam};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Documentregistratiecomponent (DRC) API",
        description = "Registers documents (enkelvoudige informatieobjecten) with their binary content, and links between documents and cases."
    ),
    servers(
        (url = "/api/v1", description = "Document registration API")
    ),
    paths(
        api::handlers::informatieobjecten::list_informatieobjecten,
        api::handlers::informatieobjecten::create_informatieobject,
        api::handlers::informatieobjecten::get_informatieobject,
        api::handlers::informatieobjecten::download_informatieobject,
        api::handlers::informatieobjecten::delete_informatieobject,
        api::handlers::zaakinformatieobjecten::list_zaakinformatieobjecten,
        api::handlers::zaakinformatieobjecten::create_zaakinformatieobject,
        api::handlers::zaakinformatieobjecten::get_zaakinformatieobject,
        api::handlers::zaakinformatieobjecten::delete_zaakinformatieobject,
    ),
    components(
        schemas(
            api::models::informatieobjecten::EnkelvoudigInformatieObjectCreate,
            api::models::informatieobjecten::EnkelvoudigInformatieObjectResponse,
            api::models::zaakinformatieobjecten::ZaakInformatieObjectCreate,
            api::models::zaakinformatieobjecten::ZaakInformatieObjectResponse,
            ErrorBody,
            InvalidParam,
        )
    ),
    tags(
        (name = "enkelvoudiginformatieobjecten", description = "Documents and their binary content.

Content is sent as base64 in `inhoud`, optionally wrapped in a data URL (`data:application/pdf;base64,...`).
Documents are immutable once registered."),
        (name = "zaakinformatieobjecten", description = "Links between a registered document and a case in the case registry."),
    )
)]
pub struct ApiDoc;
