//! Field-set administration operations
//!
//! Pure list mutations, generic over the scope through [`DynamicField`].
//! The backend services wrap each one in a read-modify-write round trip
//! against the owning aggregate's JSON bag: read the whole list, mutate
//! in memory, write the whole list back. That cycle is last-writer-wins
//! against concurrent writers; see `EntityMetadata::version`.

use uuid::Uuid;

use super::definition::{is_valid_field_name, DynamicField, FieldPatch};
use super::error::FieldAdminError;

/// Append a constructed field after checking its machine key: must be
/// identifier-safe and unused within the scope. Returns the new id.
pub fn create_field<T: DynamicField>(
    fields: &mut Vec<T>,
    field: T,
) -> Result<Uuid, FieldAdminError> {
    let name = field.definition().name.clone();
    if !is_valid_field_name(&name) {
        return Err(FieldAdminError::InvalidFieldName { name });
    }
    if fields.iter().any(|f| f.definition().name == name) {
        return Err(FieldAdminError::DuplicateFieldName { name });
    }
    let id = field.definition().id;
    fields.push(field);
    Ok(id)
}

/// Merge a patch into the field with `id` and refresh its update
/// timestamp. A rename collides exactly like a creation would.
pub fn update_field<T: DynamicField>(
    fields: &mut [T],
    id: Uuid,
    patch: FieldPatch,
) -> Result<(), FieldAdminError> {
    if let Some(new_name) = &patch.name {
        if !is_valid_field_name(new_name) {
            return Err(FieldAdminError::InvalidFieldName {
                name: new_name.clone(),
            });
        }
        if fields
            .iter()
            .any(|f| f.definition().id != id && f.definition().name == *new_name)
        {
            return Err(FieldAdminError::DuplicateFieldName {
                name: new_name.clone(),
            });
        }
    }

    let field = fields
        .iter_mut()
        .find(|f| f.definition().id == id)
        .ok_or(FieldAdminError::FieldNotFound { id })?;

    let def = field.definition_mut();
    if let Some(name) = patch.name {
        def.name = name;
    }
    if let Some(label) = patch.label {
        def.label = label;
    }
    if let Some(description) = patch.description {
        def.description = Some(description);
    }
    if let Some(validation) = patch.validation {
        def.validation = validation;
    }
    if let Some(options) = patch.options {
        def.options = options;
    }
    if let Some(default_value) = patch.default_value {
        def.default_value = Some(default_value);
    }
    if let Some(placeholder) = patch.placeholder {
        def.placeholder = Some(placeholder);
    }
    if let Some(order) = patch.order {
        def.order = order;
    }
    if let Some(is_active) = patch.is_active {
        def.is_active = is_active;
    }
    field.touch();
    Ok(())
}

/// Remove the field with `id`, returning it. Removal is not idempotent:
/// a repeated delete fails with `FieldNotFound`. Stored values for the
/// field are left alone; the resolver ignores them from now on.
pub fn delete_field<T: DynamicField>(
    fields: &mut Vec<T>,
    id: Uuid,
) -> Result<T, FieldAdminError> {
    let index = fields
        .iter()
        .position(|f| f.definition().id == id)
        .ok_or(FieldAdminError::FieldNotFound { id })?;
    Ok(fields.remove(index))
}

/// Reassign `order` = position for every listed id. Ids not present in
/// the scope are skipped on purpose: partial reorders are tolerated.
pub fn reorder_fields<T: DynamicField>(fields: &mut [T], ordered_ids: &[Uuid]) {
    for (index, id) in ordered_ids.iter().enumerate() {
        if let Some(field) = fields.iter_mut().find(|f| f.definition().id == *id) {
            field.definition_mut().order = index as i32;
            field.touch();
        }
    }
}

/// Flip the activation flag. Inactive fields drop out of effective sets
/// but keep their definition and stored values.
pub fn toggle_field_status<T: DynamicField>(
    fields: &mut [T],
    id: Uuid,
    is_active: bool,
) -> Result<(), FieldAdminError> {
    let field = fields
        .iter_mut()
        .find(|f| f.definition().id == id)
        .ok_or(FieldAdminError::FieldNotFound { id })?;
    field.definition_mut().is_active = is_active;
    field.touch();
    Ok(())
}

/// Clone a field under a new name (`<original>_copy` by default), with a
/// fresh id, fresh audit trail attributed to `actor`, appended at the
/// end of the list. Returns the new id.
pub fn duplicate_field<T: DynamicField + Clone>(
    fields: &mut Vec<T>,
    id: Uuid,
    new_name: Option<String>,
    actor: &str,
) -> Result<Uuid, FieldAdminError> {
    let index = fields
        .iter()
        .position(|f| f.definition().id == id)
        .ok_or(FieldAdminError::FieldNotFound { id })?;

    let mut copy = fields[index].clone();
    let name =
        new_name.unwrap_or_else(|| format!("{}_copy", copy.definition().name));
    if !is_valid_field_name(&name) {
        return Err(FieldAdminError::InvalidFieldName { name });
    }
    if fields.iter().any(|f| f.definition().name == name) {
        return Err(FieldAdminError::DuplicateFieldName { name });
    }

    let order = fields.len() as i32;
    {
        let def = copy.definition_mut();
        def.id = Uuid::new_v4();
        def.name = name;
        def.order = order;
    }
    copy.reset_audit(actor);

    let new_id = copy.definition().id;
    fields.push(copy);
    Ok(new_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::definition::{FieldDraft, GroupField};

    fn draft(name: &str) -> FieldDraft {
        FieldDraft {
            name: name.into(),
            label: name.to_uppercase(),
            ..FieldDraft::default()
        }
    }

    fn scope_with(names: &[&str]) -> Vec<GroupField> {
        let group_id = Uuid::new_v4();
        let mut fields = Vec::new();
        for name in names {
            let order = fields.len() as i32;
            let field = GroupField::new_for_insert(group_id, draft(name), order, "admin@test");
            create_field(&mut fields, field).unwrap();
        }
        fields
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let mut fields = scope_with(&["phone"]);
        let dup = GroupField::new_for_insert(Uuid::new_v4(), draft("phone"), 1, "admin@test");
        let err = create_field(&mut fields, dup).unwrap_err();
        assert!(matches!(err, FieldAdminError::DuplicateFieldName { .. }));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_name() {
        let mut fields = scope_with(&[]);
        let bad = GroupField::new_for_insert(Uuid::new_v4(), draft("tele fono"), 0, "admin@test");
        let err = create_field(&mut fields, bad).unwrap_err();
        assert!(matches!(err, FieldAdminError::InvalidFieldName { .. }));
    }

    #[test]
    fn test_update_patch_and_rename_collision() {
        let mut fields = scope_with(&["phone", "email"]);
        let id = fields[0].definition.id;

        update_field(
            &mut fields,
            id,
            FieldPatch {
                label: Some("Teléfono".into()),
                ..FieldPatch::default()
            },
        )
        .unwrap();
        assert_eq!(fields[0].definition.label, "Teléfono");
        assert_eq!(fields[0].definition.name, "phone");

        let err = update_field(
            &mut fields,
            id,
            FieldPatch {
                name: Some("email".into()),
                ..FieldPatch::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, FieldAdminError::DuplicateFieldName { .. }));

        // renaming to its own name is not a collision
        update_field(
            &mut fields,
            id,
            FieldPatch {
                name: Some("phone".into()),
                ..FieldPatch::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_update_missing_id() {
        let mut fields = scope_with(&["phone"]);
        let err = update_field(&mut fields, Uuid::new_v4(), FieldPatch::default()).unwrap_err();
        assert!(matches!(err, FieldAdminError::FieldNotFound { .. }));
    }

    #[test]
    fn test_delete_is_not_idempotent() {
        let mut fields = scope_with(&["phone"]);
        let id = fields[0].definition.id;
        delete_field(&mut fields, id).unwrap();
        let err = delete_field(&mut fields, id).unwrap_err();
        assert!(matches!(err, FieldAdminError::FieldNotFound { .. }));
    }

    #[test]
    fn test_reorder_assigns_index_and_skips_unknown() {
        let mut fields = scope_with(&["a", "b", "c"]);
        let (id_a, id_b, id_c) = (
            fields[0].definition.id,
            fields[1].definition.id,
            fields[2].definition.id,
        );

        reorder_fields(&mut fields, &[id_c, Uuid::new_v4(), id_a, id_b]);

        let order_of = |id: Uuid| {
            fields
                .iter()
                .find(|f| f.definition.id == id)
                .unwrap()
                .definition
                .order
        };
        assert_eq!(order_of(id_c), 0);
        // the unknown id consumed position 1
        assert_eq!(order_of(id_a), 2);
        assert_eq!(order_of(id_b), 3);
    }

    #[test]
    fn test_toggle_status() {
        let mut fields = scope_with(&["phone"]);
        let id = fields[0].definition.id;
        let before = fields[0].updated_at;
        toggle_field_status(&mut fields, id, false).unwrap();
        assert!(!fields[0].definition.is_active);
        assert!(fields[0].updated_at >= before);
    }

    #[test]
    fn test_duplicate_default_name_and_position() {
        let mut fields = scope_with(&["phone", "email"]);
        let id = fields[0].definition.id;
        let new_id = duplicate_field(&mut fields, id, None, "admin@test").unwrap();

        assert_eq!(fields.len(), 3);
        let copy = &fields[2];
        assert_eq!(copy.definition.id, new_id);
        assert_ne!(copy.definition.id, id);
        assert_eq!(copy.definition.name, "phone_copy");
        assert_eq!(copy.definition.order, 2);
        assert_eq!(copy.created_by, "admin@test");
    }

    #[test]
    fn test_duplicate_explicit_name_collision() {
        let mut fields = scope_with(&["phone", "email"]);
        let id = fields[0].definition.id;
        let err = duplicate_field(&mut fields, id, Some("email".into()), "admin@test").unwrap_err();
        assert!(matches!(err, FieldAdminError::DuplicateFieldName { .. }));
        assert_eq!(fields.len(), 2);
    }
}
