//! API request/response models for zaak-informatieobject links.

use super::pagination::Pagination;
use crate::api::links::ResourceLinks;
use crate::db::models::zaakinformatieobjecten::ZaakInformatieObjectDBResponse;
use crate::validation::validate_url;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing links
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListZaakInformatieObjectenQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only links to this case (exact URL match)
    pub zaak: Option<String>,

    /// Only links to this document (hyperlink)
    pub informatieobject: Option<String>,
}

/// Request body for linking a document to a case
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "zaak": "https://zrc.example.com/api/v1/zaken/1b2c7f3e-6f5e-4c4f-9a1a-0f1e2d3c4b5a",
    "informatieobject": "http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/550e8400-e29b-41d4-a716-446655440000"
}))]
pub struct ZaakInformatieObjectCreate {
    /// URL of the case in the case registry. Not checked for existence.
    #[validate(required, length(max = 200), custom(function = "validate_url"))]
    pub zaak: Option<String>,

    /// Hyperlink of a registered document
    #[validate(required)]
    pub informatieobject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZaakInformatieObjectResponse {
    /// Hyperlink to this link
    pub url: String,
    pub zaak: String,
    /// Hyperlink to the linked document
    pub informatieobject: String,
}

impl ZaakInformatieObjectResponse {
    pub fn new(db: ZaakInformatieObjectDBResponse, links: &ResourceLinks) -> Self {
        Self {
            url: links.zaakinformatieobject_url(db.id),
            zaak: db.zaak,
            informatieobject: links.document_url(db.informatieobject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_both_fields() {
        let errors = ZaakInformatieObjectCreate::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.keys().any(|k| k == "zaak"));
        assert!(fields.keys().any(|k| k == "informatieobject"));
    }

    #[test]
    fn test_zaak_must_be_a_url() {
        let request = ZaakInformatieObjectCreate {
            zaak: Some("zaak-1".into()),
            informatieobject: Some("http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/x".into()),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn test_response_uses_hyperlinks() {
        let links = ResourceLinks::new(&url::Url::parse("http://localhost:8000").unwrap());
        let db = ZaakInformatieObjectDBResponse {
            id: uuid::Uuid::new_v4(),
            informatieobject: uuid::Uuid::new_v4(),
            zaak: "https://zrc.example.com/api/v1/zaken/1".into(),
            created_at: chrono::Utc::now(),
        };

        let response = ZaakInformatieObjectResponse::new(db.clone(), &links);
        assert_eq!(response.url, links.zaakinformatieobject_url(db.id));
        assert_eq!(response.informatieobject, links.document_url(db.informatieobject));
        assert_eq!(response.zaak, db.zaak);
    }
}
