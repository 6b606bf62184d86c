//! User service: aggregate CRUD, personal dynamic fields stored in
//! `additional_data`, effective-set resolution against the user's type,
//! and validated saving of field values.

use std::collections::HashMap;

use chrono::Utc;
use contracts::domain::a102_user::{User, UserDto};
use contracts::fields::definition::{
    FieldDraft, FieldPatch, FieldValue, GroupField, PersonalField,
};
use contracts::fields::resolve::{resolve_effective_fields, EffectiveFieldSet};
use contracts::fields::validation::{
    are_all_fields_valid, validate_field_values, ValidationResult,
};
use contracts::fields::{admin, storage, FieldAdminError};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::repository;
use crate::domain::a101_user_type;
use crate::domain::error::ServiceError;

// ============================================================================
// Aggregate CRUD
// ============================================================================

/// Create a new user
pub async fn create(dto: UserDto) -> Result<Uuid, ServiceError> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("USR-{}", Uuid::new_v4()));
    let user_type_id = match dto.user_type_id.as_deref() {
        Some(s) => Some(
            Uuid::parse_str(s)
                .map_err(|_| ServiceError::Invalid("Tipo de usuario no válido".into()))?,
        ),
        None => None,
    };
    if let Some(type_id) = user_type_id {
        ensure_user_type_exists(type_id).await?;
    }

    let mut aggregate = User::new_for_insert(
        code,
        dto.full_name.clone(),
        dto.email.clone(),
        user_type_id.map(contracts::domain::a101_user_type::UserTypeId::new),
        dto.comment.clone(),
    );

    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();

    repository::insert(&aggregate).await.map_err(ServiceError::from)
}

/// Update an existing user. Does not touch the data bag.
pub async fn update(dto: UserDto) -> Result<(), ServiceError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ServiceError::Invalid("ID no válido".into()))?;

    let mut aggregate = load_owner(id).await?;
    aggregate.update(&dto);
    if let Some(type_id) = aggregate.user_type_id {
        ensure_user_type_exists(type_id.value()).await?;
    }
    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();

    repository::update(&aggregate).await.map_err(ServiceError::from)
}

/// Soft-delete a user
pub async fn delete(id: Uuid) -> Result<bool, ServiceError> {
    repository::soft_delete(id).await.map_err(ServiceError::from)
}

pub async fn get_by_id(id: Uuid) -> Result<Option<User>, ServiceError> {
    repository::get_by_id(id).await.map_err(ServiceError::from)
}

pub async fn list_all() -> Result<Vec<User>, ServiceError> {
    repository::list_all().await.map_err(ServiceError::from)
}

async fn ensure_user_type_exists(type_id: Uuid) -> Result<(), ServiceError> {
    a101_user_type::repository::get_by_id(type_id)
        .await?
        .map(|_| ())
        .ok_or(ServiceError::OwnerNotFound {
            entity: "Tipo de usuario",
        })
}

// ============================================================================
// Personal field administration
// ============================================================================

async fn load_owner(id: Uuid) -> Result<User, ServiceError> {
    repository::get_by_id(id)
        .await?
        .ok_or(ServiceError::OwnerNotFound { entity: "Usuario" })
}

/// Decode the personal field list, failing closed on a corrupt bag
pub fn read_personal_fields(aggregate: &User) -> Vec<PersonalField> {
    match storage::read_from_bag(&aggregate.additional_data, storage::DYNAMIC_FIELDS_KEY) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(
                user = %aggregate.to_string_id(),
                "campos dinámicos corruptos, se usa lista vacía: {}",
                e
            );
            Vec::new()
        }
    }
}

fn read_stored_values(aggregate: &User) -> Vec<FieldValue> {
    match storage::read_from_bag(&aggregate.additional_data, storage::FIELD_VALUES_KEY) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(
                user = %aggregate.to_string_id(),
                "valores de campos corruptos, se usa lista vacía: {}",
                e
            );
            Vec::new()
        }
    }
}

fn sanitize_bag(aggregate: &mut User) {
    if !aggregate.additional_data.is_null() && !aggregate.additional_data.is_object() {
        // a corrupt non-object bag cannot be merged into; start over
        tracing::warn!(
            user = %aggregate.to_string_id(),
            "additional_data no es un objeto, se restablece"
        );
        aggregate.additional_data = Value::Null;
    }
}

async fn persist_fields(
    mut aggregate: User,
    fields: &[PersonalField],
) -> Result<(), ServiceError> {
    sanitize_bag(&mut aggregate);
    storage::write_to_bag(
        &mut aggregate.additional_data,
        storage::DYNAMIC_FIELDS_KEY,
        fields,
    )?;
    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(())
}

/// Group fields this user inherits from its type (empty when no type is
/// assigned or the type record is gone)
async fn inherited_fields(aggregate: &User) -> Result<Vec<GroupField>, ServiceError> {
    let Some(type_id) = aggregate.user_type_id else {
        return Ok(Vec::new());
    };
    match a101_user_type::repository::get_by_id(type_id.value()).await? {
        Some(user_type) => Ok(a101_user_type::service::read_group_fields(&user_type)),
        None => {
            tracing::warn!(
                user = %aggregate.to_string_id(),
                user_type = %type_id.value(),
                "el tipo de usuario asignado ya no existe"
            );
            Ok(Vec::new())
        }
    }
}

pub async fn list_personal_fields(user_id: Uuid) -> Result<Vec<PersonalField>, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    Ok(read_personal_fields(&aggregate))
}

/// Add a personal field with no group counterpart. The name must be free
/// in both scopes so the effective set stays name-unique.
pub async fn add_personal_field(
    user_id: Uuid,
    draft: FieldDraft,
    actor: &str,
) -> Result<Uuid, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    let inherited = inherited_fields(&aggregate).await?;
    if inherited
        .iter()
        .any(|g| g.definition.is_active && g.definition.name == draft.name)
    {
        return Err(FieldAdminError::DuplicateFieldName { name: draft.name }.into());
    }

    let field = PersonalField::new_for_insert(user_id, draft, fields.len() as i32, actor);
    let new_id = admin::create_field(&mut fields, field)?;

    persist_fields(aggregate, &fields).await?;
    tracing::info!(user = %user_id, field = %new_id, actor, "campo personal creado");
    Ok(new_id)
}

/// Override an inherited group field for this user. The target must
/// exist, be active and be inheritable; the override keeps the parent's
/// machine key.
pub async fn override_group_field(
    user_id: Uuid,
    parent_field_id: Uuid,
    draft: FieldDraft,
    actor: &str,
) -> Result<Uuid, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let inherited = inherited_fields(&aggregate).await?;

    let parent = inherited
        .iter()
        .find(|g| g.definition.id == parent_field_id)
        .ok_or(FieldAdminError::InvalidOverrideTarget {
            parent_id: parent_field_id,
            reason: "no existe en el tipo de usuario".into(),
        })?;
    if !parent.definition.is_active {
        return Err(FieldAdminError::InvalidOverrideTarget {
            parent_id: parent_field_id,
            reason: "está inactivo".into(),
        }
        .into());
    }
    if !parent.is_inheritable {
        return Err(FieldAdminError::InvalidOverrideTarget {
            parent_id: parent_field_id,
            reason: "no es heredable".into(),
        }
        .into());
    }

    let mut fields = read_personal_fields(&aggregate);
    if fields
        .iter()
        .any(|p| p.parent_field_id == Some(parent_field_id))
    {
        return Err(FieldAdminError::DuplicateFieldName {
            name: parent.definition.name.clone(),
        }
        .into());
    }

    let field = PersonalField::new_override(user_id, parent, draft, actor);
    let new_id = admin::create_field(&mut fields, field)?;

    persist_fields(aggregate, &fields).await?;
    tracing::info!(user = %user_id, field = %new_id, parent = %parent_field_id, actor, "campo heredado personalizado");
    Ok(new_id)
}

pub async fn update_personal_field(
    user_id: Uuid,
    field_id: Uuid,
    patch: FieldPatch,
) -> Result<(), ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    admin::update_field(&mut fields, field_id, patch)?;

    persist_fields(aggregate, &fields).await
}

/// Remove a personal field. For an override this is "reset to the group
/// default": the inherited definition takes effect again.
pub async fn delete_personal_field(user_id: Uuid, field_id: Uuid) -> Result<(), ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    admin::delete_field(&mut fields, field_id)?;

    persist_fields(aggregate, &fields).await
}

pub async fn reorder_personal_fields(
    user_id: Uuid,
    ordered_ids: Vec<Uuid>,
) -> Result<(), ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    admin::reorder_fields(&mut fields, &ordered_ids);

    persist_fields(aggregate, &fields).await
}

pub async fn toggle_personal_field_status(
    user_id: Uuid,
    field_id: Uuid,
    is_active: bool,
) -> Result<(), ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    admin::toggle_field_status(&mut fields, field_id, is_active)?;

    persist_fields(aggregate, &fields).await
}

/// Duplicate a personal field. The copy never keeps a parent link: two
/// overrides of one group field would collide, so the copy becomes a
/// plain personal field.
pub async fn duplicate_personal_field(
    user_id: Uuid,
    field_id: Uuid,
    new_name: Option<String>,
    actor: &str,
) -> Result<Uuid, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let mut fields = read_personal_fields(&aggregate);

    let new_id = admin::duplicate_field(&mut fields, field_id, new_name, actor)?;
    if let Some(copy) = fields.iter_mut().find(|f| f.definition.id == new_id) {
        copy.parent_field_id = None;
        copy.is_override = false;
    }

    persist_fields(aggregate, &fields).await?;
    Ok(new_id)
}

// ============================================================================
// Effective set and values
// ============================================================================

async fn effective_set_for(aggregate: &User) -> Result<EffectiveFieldSet, ServiceError> {
    let group = inherited_fields(aggregate).await?;
    let personal = read_personal_fields(aggregate);
    let set = resolve_effective_fields(&group, &personal);
    for issue in &set.issues {
        tracing::warn!(
            user = %aggregate.to_string_id(),
            personal_field = %issue.personal_field_id,
            parent_field = %issue.parent_field_id,
            "personalización con destino inválido: {:?}",
            issue.kind
        );
    }
    Ok(set)
}

/// Resolve the user's effective field set (inherited + overrides +
/// personal additions, active only, ordered)
pub async fn effective_fields(user_id: Uuid) -> Result<EffectiveFieldSet, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    effective_set_for(&aggregate).await
}

pub async fn get_field_values(user_id: Uuid) -> Result<Vec<FieldValue>, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    Ok(read_stored_values(&aggregate))
}

/// Outcome of a value save. On validation failure nothing is persisted
/// and `results` carries every per-field error for the form to render.
#[derive(Debug, Serialize)]
pub struct SaveFieldValuesResult {
    pub saved: bool,
    pub results: HashMap<String, ValidationResult>,
}

/// Validate submitted values against the effective field set and, when
/// everything passes, upsert them into the stored value list. Values of
/// previously deleted fields survive untouched; submitted names with no
/// effective definition are ignored with a warning.
pub async fn save_field_values(
    user_id: Uuid,
    values: Map<String, Value>,
) -> Result<SaveFieldValuesResult, ServiceError> {
    let aggregate = load_owner(user_id).await?;
    let set = effective_set_for(&aggregate).await?;
    let definitions = set.definitions();

    let results = validate_field_values(&values, &definitions);
    if !are_all_fields_valid(&results) {
        return Ok(SaveFieldValuesResult {
            saved: false,
            results,
        });
    }

    for name in values.keys() {
        if !definitions.iter().any(|d| d.name == *name) {
            tracing::warn!(user = %user_id, field = %name, "valor para un campo sin definición, ignorado");
        }
    }

    let mut stored = read_stored_values(&aggregate);
    let now = Utc::now();
    for def in &definitions {
        let Some(value) = values.get(&def.name) else {
            continue;
        };
        match stored.iter_mut().find(|v| v.field_name == def.name) {
            Some(entry) => {
                entry.field_id = def.id;
                entry.value = value.clone();
                entry.kind = def.kind;
                entry.last_updated = now;
            }
            None => stored.push(FieldValue {
                field_id: def.id,
                field_name: def.name.clone(),
                value: value.clone(),
                kind: def.kind,
                last_updated: now,
            }),
        }
    }

    let mut aggregate = aggregate;
    sanitize_bag(&mut aggregate);
    storage::write_to_bag(
        &mut aggregate.additional_data,
        storage::FIELD_VALUES_KEY,
        &stored,
    )?;
    aggregate.before_write();
    repository::update(&aggregate).await?;

    Ok(SaveFieldValuesResult {
        saved: true,
        results,
    })
}
