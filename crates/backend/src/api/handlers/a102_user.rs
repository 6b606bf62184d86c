use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use contracts::domain::a102_user::{User, UserDto};
use contracts::fields::definition::{FieldDraft, FieldPatch, FieldValue, PersonalField};
use contracts::fields::resolve::EffectiveFieldSet;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::a101_user_type::{DuplicateRequest, ReorderRequest, ToggleRequest};
use super::{actor_from, error_response, parse_uuid};
use crate::domain::a102_user;
use crate::domain::a102_user::service::SaveFieldValuesResult;

// ============================================================================
// Aggregate endpoints
// ============================================================================

/// GET /api/user
pub async fn list_all() -> Result<Json<Vec<User>>, (StatusCode, String)> {
    match a102_user::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/user/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<User>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "No encontrado".to_string())),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user
pub async fn upsert(
    Json(dto): Json<UserDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let result = if dto.id.is_some() {
        a102_user::service::update(dto)
            .await
            .map(|_| Uuid::nil().to_string())
    } else {
        a102_user::service::create(dto)
            .await
            .map(|id| id.to_string())
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/user/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err((StatusCode::NOT_FOUND, "No encontrado".to_string())),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// Personal field endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    #[serde(rename = "parentFieldId")]
    pub parent_field_id: Uuid,
    pub field: FieldDraft,
}

/// GET /api/user/:id/fields
pub async fn list_fields(
    Path(id): Path<String>,
) -> Result<Json<Vec<PersonalField>>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::list_personal_fields(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user/:id/fields
pub async fn create_field(
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<FieldDraft>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let actor = actor_from(&headers)?;
    match a102_user::service::add_personal_field(uuid, draft, &actor).await {
        Ok(field_id) => Ok(Json(json!({"id": field_id.to_string()}))),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user/:id/fields/override
pub async fn override_field(
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<OverrideRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let actor = actor_from(&headers)?;
    match a102_user::service::override_group_field(uuid, req.parent_field_id, req.field, &actor)
        .await
    {
        Ok(field_id) => Ok(Json(json!({"id": field_id.to_string()}))),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user/:id/fields/:field_id
pub async fn update_field(
    Path((id, field_id)): Path<(String, String)>,
    Json(patch): Json<FieldPatch>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a102_user::service::update_personal_field(uuid, field_uuid, patch).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/user/:id/fields/:field_id
///
/// For an override this resets the field back to the inherited
/// definition.
pub async fn delete_field(
    Path((id, field_id)): Path<(String, String)>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a102_user::service::delete_personal_field(uuid, field_uuid).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user/:id/fields/reorder
pub async fn reorder_fields(
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::reorder_personal_fields(uuid, req.ordered_ids).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user/:id/fields/:field_id/status
pub async fn toggle_field_status(
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<ToggleRequest>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a102_user::service::toggle_personal_field_status(uuid, field_uuid, req.is_active).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user/:id/fields/:field_id/duplicate
pub async fn duplicate_field(
    Path((id, field_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<DuplicateRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    let actor = actor_from(&headers)?;
    match a102_user::service::duplicate_personal_field(uuid, field_uuid, req.new_name, &actor).await
    {
        Ok(new_id) => Ok(Json(json!({"id": new_id.to_string()}))),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// Effective set and value endpoints
// ============================================================================

/// GET /api/user/:id/fields/effective
pub async fn effective_fields(
    Path(id): Path<String>,
) -> Result<Json<EffectiveFieldSet>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::effective_fields(uuid).await {
        Ok(set) => Ok(Json(set)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/user/:id/values
pub async fn get_field_values(
    Path(id): Path<String>,
) -> Result<Json<Vec<FieldValue>>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::get_field_values(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user/:id/values
///
/// Always a 200 when the request itself is well formed: the body carries
/// `saved` plus the per-field validation results for the form to render.
pub async fn save_field_values(
    Path(id): Path<String>,
    Json(values): Json<Map<String, Value>>,
) -> Result<Json<SaveFieldValuesResult>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a102_user::service::save_field_values(uuid, values).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(error_response(e)),
    }
}
