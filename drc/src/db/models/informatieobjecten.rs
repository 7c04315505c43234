//! Database models for enkelvoudige informatieobjecten.

use crate::types::{InformatieObjectId, Vertrouwelijkheidaanduiding};
use chrono::{DateTime, NaiveDate, Utc};

/// Database request for registering a document. Defaults have already been applied: every
/// field here is written as is.
#[derive(Debug, Clone)]
pub struct InformatieObjectCreateDBRequest {
    pub id: InformatieObjectId,
    pub identificatie: String,
    pub bronorganisatie: String,
    pub creatiedatum: NaiveDate,
    pub titel: String,
    pub vertrouwelijkaanduiding: Option<Vertrouwelijkheidaanduiding>,
    pub auteur: String,
    pub beschrijving: String,
    pub informatieobjecttype: String,
    pub formaat: String,
    pub taal: String,
    /// Storage key of the already stored content
    pub inhoud: String,
    pub link: String,
}

/// Database response for a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformatieObjectDBResponse {
    pub id: InformatieObjectId,
    pub identificatie: String,
    pub bronorganisatie: String,
    pub creatiedatum: NaiveDate,
    pub titel: String,
    pub vertrouwelijkaanduiding: Option<Vertrouwelijkheidaanduiding>,
    pub auteur: String,
    pub beschrijving: String,
    pub informatieobjecttype: String,
    pub formaat: String,
    pub taal: String,
    /// Storage key, resolve through [`crate::db::handlers::FileStorage`]
    pub inhoud: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}
