//! Hyperlinks between resources.
//!
//! Resources are identified on the wire by absolute URLs built from the configured
//! `public_url`. Incoming hyperlinks are matched on their path only, so a client may reach the
//! service through a different host name than the one it was registered under.

use crate::types::{InformatieObjectId, ZaakInformatieObjectId};
use std::borrow::Cow;
use url::Url;
use uuid::Uuid;
use validator::ValidationError;

/// Mount point of the resource routes
pub const API_PREFIX: &str = "/api/v1";
pub const INFORMATIEOBJECTEN: &str = "enkelvoudiginformatieobjecten";
pub const ZAAKINFORMATIEOBJECTEN: &str = "zaakinformatieobjecten";

#[derive(Debug, Clone)]
pub struct ResourceLinks {
    /// `public_url` without trailing slash
    base: String,
    /// Path component of `public_url` without trailing slash, empty when served at the root
    base_path: String,
}

fn hyperlink_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

impl ResourceLinks {
    pub fn new(public_url: &Url) -> Self {
        Self {
            base: public_url.as_str().trim_end_matches('/').to_string(),
            base_path: public_url.path().trim_end_matches('/').to_string(),
        }
    }

    fn resource_url(&self, collection: &str, id: Uuid) -> String {
        format!("{}{API_PREFIX}/{collection}/{id}", self.base)
    }

    pub fn document_url(&self, id: InformatieObjectId) -> String {
        self.resource_url(INFORMATIEOBJECTEN, id)
    }

    pub fn zaakinformatieobject_url(&self, id: ZaakInformatieObjectId) -> String {
        self.resource_url(ZAAKINFORMATIEOBJECTEN, id)
    }

    /// Resolve a document hyperlink to the document's id.
    ///
    /// Accepts an absolute http(s) URL or an absolute path. Fails with code `invalid` when the
    /// value is not a URL, and `no_match` when it does not point at a document. Whether the
    /// document exists is for the caller to check.
    pub fn resolve_document(&self, hyperlink: &str) -> Result<InformatieObjectId, ValidationError> {
        let path: Cow<'_, str> = if hyperlink.starts_with('/') {
            Cow::Borrowed(hyperlink)
        } else {
            let url = Url::parse(hyperlink).map_err(|_| hyperlink_error("invalid", "Invalid hyperlink - not a URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(hyperlink_error("invalid", "Invalid hyperlink - not an http(s) URL"));
            }
            Cow::Owned(url.path().to_string())
        };

        let prefix = format!("{}{API_PREFIX}/{INFORMATIEOBJECTEN}/", self.base_path);
        let no_match = || hyperlink_error("no_match", "Invalid hyperlink - no URL match");

        let id = path
            .strip_prefix(prefix.as_str())
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|rest| !rest.contains('/'))
            .ok_or_else(no_match)?;

        Uuid::parse_str(id).map_err(|_| no_match())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn links(public_url: &str) -> ResourceLinks {
        ResourceLinks::new(&Url::parse(public_url).unwrap())
    }

    #[test]
    fn test_builds_urls() {
        let id = Uuid::parse_str(ID).unwrap();
        let links = links("http://localhost:8000");

        assert_eq!(
            links.document_url(id),
            format!("http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/{ID}")
        );
        assert_eq!(
            links.zaakinformatieobject_url(id),
            format!("http://localhost:8000/api/v1/zaakinformatieobjecten/{ID}")
        );
    }

    #[test]
    fn test_builds_urls_under_a_path_prefix() {
        let id = Uuid::parse_str(ID).unwrap();
        let links = links("https://gemeente.example.nl/drc/");

        assert_eq!(
            links.document_url(id),
            format!("https://gemeente.example.nl/drc/api/v1/enkelvoudiginformatieobjecten/{ID}")
        );
    }

    #[test]
    fn test_resolves_own_urls() {
        let id = Uuid::new_v4();
        for public_url in ["http://localhost:8000", "https://gemeente.example.nl/drc/"] {
            let links = links(public_url);
            assert_eq!(links.resolve_document(&links.document_url(id)).unwrap(), id);
        }
    }

    #[test]
    fn test_resolve_ignores_host_and_trailing_slash() {
        let links = links("http://localhost:8000");
        let expected = Uuid::parse_str(ID).unwrap();

        let other_host = format!("https://drc.internal:9000/api/v1/enkelvoudiginformatieobjecten/{ID}/");
        assert_eq!(links.resolve_document(&other_host).unwrap(), expected);

        let path_only = format!("/api/v1/enkelvoudiginformatieobjecten/{ID}");
        assert_eq!(links.resolve_document(&path_only).unwrap(), expected);
    }

    #[test]
    fn test_resolve_rejects_non_urls() {
        let links = links("http://localhost:8000");
        assert_eq!(links.resolve_document("not a url").unwrap_err().code, "invalid");
        assert_eq!(
            links.resolve_document(&format!("ftp://localhost/api/v1/enkelvoudiginformatieobjecten/{ID}")).unwrap_err().code,
            "invalid"
        );
    }

    #[test]
    fn test_resolve_rejects_other_resources() {
        let links = links("http://localhost:8000");

        for hyperlink in [
            format!("http://localhost:8000/api/v1/zaakinformatieobjecten/{ID}"),
            "http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/not-a-uuid".to_string(),
            format!("http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/{ID}/download"),
            "http://localhost:8000/api/v1/enkelvoudiginformatieobjecten/".to_string(),
        ] {
            assert_eq!(links.resolve_document(&hyperlink).unwrap_err().code, "no_match", "{hyperlink}");
        }
    }

    #[test]
    fn test_resolve_respects_path_prefix() {
        let links = links("https://gemeente.example.nl/drc");
        let without_prefix = format!("https://gemeente.example.nl/api/v1/enkelvoudiginformatieobjecten/{ID}");
        assert_eq!(links.resolve_document(&without_prefix).unwrap_err().code, "no_match");
    }
}
