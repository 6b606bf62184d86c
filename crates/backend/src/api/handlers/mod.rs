use axum::http::{HeaderMap, StatusCode};
use contracts::fields::FieldAdminError;

use crate::domain::ServiceError;

pub mod a101_user_type;
pub mod a102_user;

/// Map a service error to an HTTP response.
///
/// Validation failures of submitted field values are not errors and never
/// reach this function; they travel as a 200 with a result map.
pub fn error_response(err: ServiceError) -> (StatusCode, String) {
    let status = match &err {
        ServiceError::Field(field_err) => match field_err {
            FieldAdminError::DuplicateFieldName { .. } => StatusCode::CONFLICT,
            FieldAdminError::FieldNotFound { .. } => StatusCode::NOT_FOUND,
            FieldAdminError::InvalidFieldName { .. }
            | FieldAdminError::InvalidOverrideTarget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FieldAdminError::MalformedPersistedData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServiceError::OwnerNotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {}", err);
    }
    (status, err.to_string())
}

/// Identity of the person performing the request, taken from the
/// `x-actor` header. Mutating field operations record it in the audit
/// trail, so it is mandatory for them.
pub fn actor_from(headers: &HeaderMap) -> Result<String, (StatusCode, String)> {
    headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or((
            StatusCode::BAD_REQUEST,
            "Falta la cabecera x-actor".to_string(),
        ))
}

pub fn parse_uuid(id: &str) -> Result<uuid::Uuid, (StatusCode, String)> {
    uuid::Uuid::parse_str(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "ID no válido".to_string()))
}
