//! Wire codec for document content (`inhoud`).
//!
//! Clients send file content as base64, either bare or wrapped in a `data:` URI. Content is
//! stored as raw bytes under a generated key; the stored extension comes from configuration and
//! is never derived from the payload.

use crate::config::ContentPolicy;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationError;

/// Directory (relative to the storage root) that holds uploaded content
pub const UPLOAD_DIR: &str = "uploads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub bytes: Vec<u8>,
    /// Media type declared by a `data:` URI, if the client sent one
    pub media_type: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("No file content was submitted")]
    Empty,

    #[error("The submitted content is not valid base64")]
    InvalidBase64,

    #[error("The submitted data URI is malformed")]
    MalformedDataUri,

    #[error("Content type {0} is not accepted")]
    DisallowedContentType(String),
}

impl ContentError {
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::Empty => "required",
            ContentError::InvalidBase64 | ContentError::MalformedDataUri => "invalid",
            ContentError::DisallowedContentType(_) => "invalid_content_type",
        }
    }
}

impl From<ContentError> for ValidationError {
    fn from(err: ContentError) -> Self {
        ValidationError::new(err.code()).with_message(err.to_string().into())
    }
}

/// Split a `data:<media type>[;params];base64,<payload>` URI into media type and payload.
/// Anything not starting with `data:` is treated as a bare base64 payload.
fn split_data_uri(raw: &str) -> Result<(Option<String>, &str), ContentError> {
    let Some(rest) = raw.strip_prefix("data:") else {
        return Ok((None, raw));
    };

    let (header, payload) = rest.split_once(',').ok_or(ContentError::MalformedDataUri)?;
    let header = header.strip_suffix(";base64").ok_or(ContentError::MalformedDataUri)?;
    let media_type = header.split(';').next().map(str::trim).filter(|m| !m.is_empty()).map(str::to_lowercase);

    Ok((media_type, payload))
}

/// Decode submitted content according to the configured policy.
pub fn decode_base64_content(raw: &str, policy: &ContentPolicy) -> Result<DecodedContent, ContentError> {
    let (media_type, payload) = split_data_uri(raw.trim())?;

    // Line-wrapped base64 is common for larger payloads
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.is_empty() {
        return Err(ContentError::Empty);
    }

    let bytes = STANDARD.decode(payload.as_bytes()).map_err(|_| ContentError::InvalidBase64)?;
    if bytes.is_empty() {
        return Err(ContentError::Empty);
    }

    if !policy.accept_any_content_type {
        let allowed = media_type
            .as_deref()
            .is_some_and(|m| policy.allowed_content_types.iter().any(|a| a.eq_ignore_ascii_case(m)));
        if !allowed {
            return Err(ContentError::DisallowedContentType(
                media_type.unwrap_or_else(|| "(undeclared)".to_string()),
            ));
        }
    }

    Ok(DecodedContent { bytes, media_type })
}

pub fn encode_base64_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Storage key for new content: `uploads/<YYYY>/<MM>/<uuid>.<extension>`.
pub fn storage_key(id: Uuid, uploaded_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{UPLOAD_DIR}/{:04}/{:02}/{}.{}",
        uploaded_at.year(),
        uploaded_at.month(),
        id,
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn any_type() -> ContentPolicy {
        ContentPolicy::default()
    }

    #[test]
    fn test_decode_plain_base64() {
        let decoded = decode_base64_content("aGVsbG8gd29ybGQ=", &any_type()).unwrap();
        assert_eq!(decoded.bytes, b"hello world");
        assert_eq!(decoded.media_type, None);
    }

    #[test]
    fn test_decode_data_uri() {
        let decoded = decode_base64_content("data:text/plain;charset=utf-8;base64,aGVsbG8gd29ybGQ=", &any_type()).unwrap();
        assert_eq!(decoded.bytes, b"hello world");
        assert_eq!(decoded.media_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_decode_ignores_line_wrapping() {
        let decoded = decode_base64_content("aGVsbG8g\nd29ybGQ=\n", &any_type()).unwrap();
        assert_eq!(decoded.bytes, b"hello world");
    }

    #[test]
    fn test_decode_binary_content_is_byte_identical() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = encode_base64_content(&bytes);
        assert_eq!(decode_base64_content(&encoded, &any_type()).unwrap().bytes, bytes);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert_eq!(decode_base64_content("not base64!!", &any_type()), Err(ContentError::InvalidBase64));
        assert_eq!(decode_base64_content("aGVsbG8", &any_type()), Err(ContentError::InvalidBase64));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert_eq!(decode_base64_content("", &any_type()), Err(ContentError::Empty));
        assert_eq!(decode_base64_content("   ", &any_type()), Err(ContentError::Empty));
        assert_eq!(decode_base64_content("data:text/plain;base64,", &any_type()), Err(ContentError::Empty));
    }

    #[test]
    fn test_decode_rejects_malformed_data_uri() {
        assert_eq!(
            decode_base64_content("data:text/plain,hello", &any_type()),
            Err(ContentError::MalformedDataUri)
        );
        assert_eq!(decode_base64_content("data:text/plain;base64", &any_type()), Err(ContentError::MalformedDataUri));
    }

    #[test]
    fn test_any_content_type_accepts_everything() {
        let decoded = decode_base64_content("data:application/x-msdownload;base64,TVo=", &any_type()).unwrap();
        assert_eq!(decoded.bytes, b"MZ");
    }

    #[test]
    fn test_restricted_policy_enforces_allowlist() {
        let policy = ContentPolicy {
            accept_any_content_type: false,
            allowed_content_types: vec!["application/pdf".to_string()],
            ..ContentPolicy::default()
        };

        assert!(decode_base64_content("data:application/pdf;base64,JVBERg==", &policy).is_ok());
        assert_eq!(
            decode_base64_content("data:text/plain;base64,aGk=", &policy),
            Err(ContentError::DisallowedContentType("text/plain".to_string()))
        );
        assert_eq!(
            decode_base64_content("aGk=", &policy),
            Err(ContentError::DisallowedContentType("(undeclared)".to_string()))
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ContentError::Empty.code(), "required");
        assert_eq!(ContentError::InvalidBase64.code(), "invalid");
        let err: ValidationError = ContentError::DisallowedContentType("text/html".into()).into();
        assert_eq!(err.code, "invalid_content_type");
    }

    #[test]
    fn test_storage_key_is_partitioned_by_year_and_month() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let at = Utc.with_ymd_and_hms(2018, 6, 27, 12, 0, 0).unwrap();
        assert_eq!(
            storage_key(id, at, "bin"),
            "uploads/2018/06/550e8400-e29b-41d4-a716-446655440000.bin"
        );
    }
}
