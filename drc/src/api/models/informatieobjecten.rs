//! API request/response models for enkelvoudige informatieobjecten.

use super::pagination::Pagination;
use crate::api::links::ResourceLinks;
use crate::config::ContentPolicy;
use crate::content::{DecodedContent, decode_base64_content, encode_base64_content};
use crate::db::models::informatieobjecten::{InformatieObjectCreateDBRequest, InformatieObjectDBResponse};
use crate::errors::{Error, Result};
use crate::types::{InformatieObjectId, Vertrouwelijkheidaanduiding};
use crate::validation::{
    validate_identificatie, validate_language, validate_optional_url, validate_rsin, validate_url,
    validate_vertrouwelijkheidaanduiding,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Query parameters for listing documents
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListInformatieObjectenQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only documents with exactly this identificatie
    pub identificatie: Option<String>,

    /// Only documents registered by this organisation (RSIN)
    pub bronorganisatie: Option<String>,
}

/// Request body for registering a document.
///
/// Every field is optional at the serde level so that a request with several problems reports
/// all of them at once. Required fields are enforced by `validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "identificatie": "DOC-2018-0001",
    "bronorganisatie": "517439943",
    "creatiedatum": "2018-06-27",
    "titel": "Aanvraag omgevingsvergunning",
    "vertrouwelijkaanduiding": "openbaar",
    "auteur": "Gemeente Utrecht",
    "taal": "dut",
    "inhoud": "aGVsbG8gd29ybGQ=",
    "informatieobjecttype": "https://ztc.example.com/api/v1/catalogussen/1/informatieobjecttypen/1"
}))]
pub struct EnkelvoudigInformatieObjectCreate {
    /// Business identification, unique within the source organisation. Generated when omitted.
    #[validate(length(max = 40), custom(function = "validate_identificatie"))]
    pub identificatie: Option<String>,

    /// RSIN of the organisation that created the document
    #[validate(length(max = 9), custom(function = "validate_rsin"))]
    pub bronorganisatie: Option<String>,

    #[validate(required)]
    pub creatiedatum: Option<NaiveDate>,

    #[validate(required, length(min = 1, max = 200))]
    pub titel: Option<String>,

    /// One of the confidentiality levels, or empty
    #[validate(custom(function = "validate_vertrouwelijkheidaanduiding"))]
    pub vertrouwelijkaanduiding: Option<String>,

    #[validate(required, length(min = 1, max = 200))]
    pub auteur: Option<String>,

    #[validate(length(max = 255))]
    pub formaat: Option<String>,

    /// ISO 639-2/B language code, e.g. `dut`
    #[validate(required, custom(function = "validate_language"))]
    pub taal: Option<String>,

    /// Base64 encoded content, optionally as a `data:` URI
    #[validate(required)]
    pub inhoud: Option<String>,

    /// URL where the content can also be found
    #[validate(length(max = 200), custom(function = "validate_optional_url"))]
    pub link: Option<String>,

    #[validate(length(max = 1000))]
    pub beschrijving: Option<String>,

    /// URL of the informatieobjecttype in the type catalogue
    #[validate(required, length(max = 200), custom(function = "validate_url"))]
    pub informatieobjecttype: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or_else(|| Error::field(field, ValidationError::new("required")))
}

impl EnkelvoudigInformatieObjectCreate {
    /// Validate every field and decode the content. All problems are reported together.
    pub fn validate_and_decode(&self, policy: &ContentPolicy) -> Result<DecodedContent> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        let decoded = match self.inhoud.as_deref().map(|raw| decode_base64_content(raw, policy)) {
            Some(Ok(decoded)) => Some(decoded),
            Some(Err(e)) => {
                errors.add("inhoud", e.into());
                None
            }
            None => None,
        };

        match decoded {
            Some(decoded) if errors.errors().is_empty() => Ok(decoded),
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Apply defaults and build the database request. Call after [`Self::validate_and_decode`].
    pub fn into_db_request(self, id: InformatieObjectId, storage_key: String) -> Result<InformatieObjectCreateDBRequest> {
        let vertrouwelijkaanduiding = match self.vertrouwelijkaanduiding.as_deref() {
            None | Some("") => None,
            Some(value) => Some(
                value
                    .parse::<Vertrouwelijkheidaanduiding>()
                    .map_err(|_| Error::field("vertrouwelijkaanduiding", ValidationError::new("invalid_choice")))?,
            ),
        };

        Ok(InformatieObjectCreateDBRequest {
            id,
            identificatie: self
                .identificatie
                .map(|identificatie| identificatie.trim().to_string())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            bronorganisatie: self.bronorganisatie.unwrap_or_default(),
            creatiedatum: required(self.creatiedatum, "creatiedatum")?,
            titel: required(self.titel, "titel")?,
            vertrouwelijkaanduiding,
            auteur: required(self.auteur, "auteur")?,
            beschrijving: self.beschrijving.unwrap_or_default(),
            informatieobjecttype: required(self.informatieobjecttype, "informatieobjecttype")?,
            formaat: self.formaat.unwrap_or_default(),
            taal: required(self.taal, "taal")?,
            inhoud: storage_key,
            link: self.link.unwrap_or_default(),
        })
    }
}

/// A registered document. `inhoud` carries the content base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnkelvoudigInformatieObjectResponse {
    /// Hyperlink to this document
    pub url: String,
    pub identificatie: String,
    pub bronorganisatie: String,
    pub creatiedatum: NaiveDate,
    pub titel: String,
    /// Empty when not classified
    pub vertrouwelijkaanduiding: String,
    pub auteur: String,
    pub formaat: String,
    pub taal: String,
    pub inhoud: String,
    pub link: String,
    pub beschrijving: String,
    pub informatieobjecttype: String,
}

impl EnkelvoudigInformatieObjectResponse {
    pub fn new(db: InformatieObjectDBResponse, content: &[u8], links: &ResourceLinks) -> Self {
        Self {
            url: links.document_url(db.id),
            identificatie: db.identificatie,
            bronorganisatie: db.bronorganisatie,
            creatiedatum: db.creatiedatum,
            titel: db.titel,
            vertrouwelijkaanduiding: db.vertrouwelijkaanduiding.map(|v| v.as_str().to_string()).unwrap_or_default(),
            auteur: db.auteur,
            formaat: db.formaat,
            taal: db.taal,
            inhoud: encode_base64_content(content),
            link: db.link,
            beschrijving: db.beschrijving,
            informatieobjecttype: db.informatieobjecttype,
        }
    }
}
