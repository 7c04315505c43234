use crate::db::errors::DbError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data that is not tied to a single field
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body exceeds the configured upload limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// One or more fields failed validation
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single rejected field in an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InvalidParam {
    /// Field name
    pub name: String,
    /// Stable machine readable error code, e.g. `max_length` or `no_diacritics`
    pub code: String,
    /// Human readable explanation
    pub reason: String,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_params: Vec<InvalidParam>,
}

impl Error {
    /// Validation failure on a single field
    pub fn field(name: &'static str, error: ValidationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(name, error);
        Error::Validation(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation(_) => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation(_) | DbError::CheckViolation(_) => StatusCode::BAD_REQUEST,
                DbError::ProtectedEntity { .. } => StatusCode::METHOD_NOT_ALLOWED,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Validation(_) => "Invalid input".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation(constraint) => match constraint.table.as_deref() {
                    Some("enkelvoudiginformatieobjecten") => "An informatieobject with this uuid already exists".to_string(),
                    Some("zaakinformatieobjecten") => "A zaakinformatieobject with this uuid already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation(_) => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation(_) => "Invalid data provided".to_string(),
                DbError::ProtectedEntity {
                    operation,
                    entity_type,
                    reason,
                    ..
                } => {
                    format!("Cannot {operation} {entity_type}: {reason}")
                }
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Per-field details, sorted by field name so responses are stable
    pub fn invalid_params(&self) -> Vec<InvalidParam> {
        let Error::Validation(errors) = self else {
            return Vec::new();
        };

        let mut params: Vec<InvalidParam> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(name, field_errors)| {
                let name = name.to_string();
                field_errors.iter().map(move |err| InvalidParam {
                    name: name.clone(),
                    code: err.code.to_string(),
                    reason: err.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        params.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        params
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::BadRequest { .. } | Error::PayloadTooLarge { .. } | Error::NotFound { .. } | Error::Validation(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = ErrorBody {
            message: self.user_message(),
            invalid_params: self.invalid_params(),
        };

        (status, Json(body)).into_response()
    }
}

/// Body that is not JSON, or JSON of the wrong shape
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Error::PayloadTooLarge {
                message: rejection.body_text(),
            };
        }
        Error::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
