//! User type service: aggregate CRUD plus administration of the
//! group-level dynamic fields stored in `additional_config`.
//!
//! Every field operation is one read-modify-write round trip: load the
//! owning aggregate, decode the whole field list, mutate it in memory,
//! write the whole list back. The surrounding bag keys are merged, never
//! replaced. Concurrent writers are last-writer-wins.

use contracts::domain::a101_user_type::{UserType, UserTypeDto};
use contracts::fields::definition::{FieldDraft, FieldPatch, GroupField};
use contracts::fields::{admin, storage};
use uuid::Uuid;

use super::repository;
use crate::domain::error::ServiceError;

// ============================================================================
// Aggregate CRUD
// ============================================================================

/// Create a new user type
pub async fn create(dto: UserTypeDto) -> Result<Uuid, ServiceError> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("UT-{}", Uuid::new_v4()));
    let mut aggregate = UserType::new_for_insert(code, dto.description.clone(), dto.comment.clone());

    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();

    repository::insert(&aggregate).await.map_err(ServiceError::from)
}

/// Update an existing user type. Does not touch the config bag.
pub async fn update(dto: UserTypeDto) -> Result<(), ServiceError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ServiceError::Invalid("ID no válido".into()))?;

    let mut aggregate = load_owner(id).await?;
    aggregate.update(&dto);
    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();

    repository::update(&aggregate).await.map_err(ServiceError::from)
}

/// Soft-delete a user type
pub async fn delete(id: Uuid) -> Result<bool, ServiceError> {
    repository::soft_delete(id).await.map_err(ServiceError::from)
}

pub async fn get_by_id(id: Uuid) -> Result<Option<UserType>, ServiceError> {
    repository::get_by_id(id).await.map_err(ServiceError::from)
}

pub async fn list_all() -> Result<Vec<UserType>, ServiceError> {
    repository::list_all().await.map_err(ServiceError::from)
}

// ============================================================================
// Group field administration
// ============================================================================

async fn load_owner(id: Uuid) -> Result<UserType, ServiceError> {
    repository::get_by_id(id)
        .await?
        .ok_or(ServiceError::OwnerNotFound {
            entity: "Tipo de usuario",
        })
}

/// Decode the group field list, failing closed: a corrupt bag is
/// reported and treated as empty rather than taking the caller down.
pub fn read_group_fields(aggregate: &UserType) -> Vec<GroupField> {
    match storage::read_from_bag(&aggregate.additional_config, storage::DYNAMIC_FIELDS_KEY) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(
                user_type = %aggregate.to_string_id(),
                "campos dinámicos corruptos, se usa lista vacía: {}",
                e
            );
            Vec::new()
        }
    }
}

async fn persist_fields(
    mut aggregate: UserType,
    fields: &[GroupField],
) -> Result<(), ServiceError> {
    if !aggregate.additional_config.is_null() && !aggregate.additional_config.is_object() {
        // a corrupt non-object bag cannot be merged into; start over
        tracing::warn!(
            user_type = %aggregate.to_string_id(),
            "additional_config no es un objeto, se restablece"
        );
        aggregate.additional_config = serde_json::Value::Null;
    }
    storage::write_to_bag(
        &mut aggregate.additional_config,
        storage::DYNAMIC_FIELDS_KEY,
        fields,
    )?;
    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(())
}

pub async fn list_fields(id: Uuid) -> Result<Vec<GroupField>, ServiceError> {
    let aggregate = load_owner(id).await?;
    Ok(read_group_fields(&aggregate))
}

/// Define a new group field. `actor` is recorded as the audit author.
pub async fn create_field(
    id: Uuid,
    draft: FieldDraft,
    actor: &str,
) -> Result<Uuid, ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    let field = GroupField::new_for_insert(id, draft, fields.len() as i32, actor);
    let new_id = admin::create_field(&mut fields, field)?;

    persist_fields(aggregate, &fields).await?;
    tracing::info!(user_type = %id, field = %new_id, actor, "campo de grupo creado");
    Ok(new_id)
}

pub async fn update_field(
    id: Uuid,
    field_id: Uuid,
    patch: FieldPatch,
) -> Result<(), ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    admin::update_field(&mut fields, field_id, patch)?;

    persist_fields(aggregate, &fields).await
}

pub async fn delete_field(id: Uuid, field_id: Uuid) -> Result<(), ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    // stored values on members are left alone; the resolver ignores them
    admin::delete_field(&mut fields, field_id)?;

    persist_fields(aggregate, &fields).await
}

pub async fn reorder_fields(id: Uuid, ordered_ids: Vec<Uuid>) -> Result<(), ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    admin::reorder_fields(&mut fields, &ordered_ids);

    persist_fields(aggregate, &fields).await
}

pub async fn toggle_field_status(
    id: Uuid,
    field_id: Uuid,
    is_active: bool,
) -> Result<(), ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    admin::toggle_field_status(&mut fields, field_id, is_active)?;

    persist_fields(aggregate, &fields).await
}

pub async fn duplicate_field(
    id: Uuid,
    field_id: Uuid,
    new_name: Option<String>,
    actor: &str,
) -> Result<Uuid, ServiceError> {
    let aggregate = load_owner(id).await?;
    let mut fields = read_group_fields(&aggregate);

    let new_id = admin::duplicate_field(&mut fields, field_id, new_name, actor)?;

    persist_fields(aggregate, &fields).await?;
    Ok(new_id)
}
