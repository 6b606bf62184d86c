use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use contracts::domain::a101_user_type::{UserType, UserTypeDto};
use contracts::fields::definition::{FieldDraft, FieldPatch, GroupField};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{actor_from, error_response, parse_uuid};
use crate::domain::a101_user_type;

// ============================================================================
// Aggregate endpoints
// ============================================================================

/// GET /api/user_type
pub async fn list_all() -> Result<Json<Vec<UserType>>, (StatusCode, String)> {
    match a101_user_type::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/user_type/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<UserType>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a101_user_type::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "No encontrado".to_string())),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user_type
pub async fn upsert(
    Json(dto): Json<UserTypeDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let result = if dto.id.is_some() {
        a101_user_type::service::update(dto)
            .await
            .map(|_| Uuid::nil().to_string())
    } else {
        a101_user_type::service::create(dto)
            .await
            .map(|id| id.to_string())
    };
    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/user_type/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a101_user_type::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err((StatusCode::NOT_FOUND, "No encontrado".to_string())),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// Group field endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "orderedIds")]
    pub ordered_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    #[serde(rename = "newName")]
    pub new_name: Option<String>,
}

/// GET /api/user_type/:id/fields
pub async fn list_fields(
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupField>>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a101_user_type::service::list_fields(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user_type/:id/fields
pub async fn create_field(
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<FieldDraft>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let actor = actor_from(&headers)?;
    match a101_user_type::service::create_field(uuid, draft, &actor).await {
        Ok(field_id) => Ok(Json(json!({"id": field_id.to_string()}))),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user_type/:id/fields/:field_id
pub async fn update_field(
    Path((id, field_id)): Path<(String, String)>,
    Json(patch): Json<FieldPatch>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a101_user_type::service::update_field(uuid, field_uuid, patch).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/user_type/:id/fields/:field_id
pub async fn delete_field(
    Path((id, field_id)): Path<(String, String)>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a101_user_type::service::delete_field(uuid, field_uuid).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user_type/:id/fields/reorder
pub async fn reorder_fields(
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    match a101_user_type::service::reorder_fields(uuid, req.ordered_ids).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /api/user_type/:id/fields/:field_id/status
pub async fn toggle_field_status(
    Path((id, field_id)): Path<(String, String)>,
    Json(req): Json<ToggleRequest>,
) -> Result<(), (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    match a101_user_type::service::toggle_field_status(uuid, field_uuid, req.is_active).await {
        Ok(()) => Ok(()),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/user_type/:id/fields/:field_id/duplicate
pub async fn duplicate_field(
    Path((id, field_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<DuplicateRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let uuid = parse_uuid(&id)?;
    let field_uuid = parse_uuid(&field_id)?;
    let actor = actor_from(&headers)?;
    match a101_user_type::service::duplicate_field(uuid, field_uuid, req.new_name, &actor).await {
        Ok(new_id) => Ok(Json(json!({"id": new_id.to_string()}))),
        Err(e) => Err(error_response(e)),
    }
}
