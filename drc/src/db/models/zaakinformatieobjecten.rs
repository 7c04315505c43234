//! Database models for links between documents and cases.

use crate::types::{InformatieObjectId, ZaakInformatieObjectId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ZaakInformatieObjectCreateDBRequest {
    pub id: ZaakInformatieObjectId,
    /// Public id of the linked document
    pub informatieobject: InformatieObjectId,
    pub zaak: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZaakInformatieObjectDBResponse {
    pub id: ZaakInformatieObjectId,
    pub informatieobject: InformatieObjectId,
    pub zaak: String,
    pub created_at: DateTime<Utc>,
}
