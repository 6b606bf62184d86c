//! Merge/inheritance resolver
//!
//! Combines a user type's group fields with one user's personal fields
//! into the effective, ordered field set for that user. Pure function of
//! its inputs: resolving the same snapshot twice yields identical sets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::definition::{FieldDefinition, GroupField, PersonalField};

/// Where an effective entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldProvenance {
    /// Group field taken as-is
    Inherited,
    /// Personal override substituted for its parent group field
    Overridden,
    /// Personal field with no group counterpart
    Personal,
}

/// One entry of the effective field set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveField {
    #[serde(flatten)]
    pub definition: FieldDefinition,
    pub provenance: FieldProvenance,
}

/// Why a personal field could not take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverrideIssueKind {
    /// `parent_field_id` matches no group field
    MissingParent,
    /// The parent exists but is inactive
    InactiveParent,
    /// The parent is marked non-inheritable
    NotInheritable,
    /// A personal-only field's machine key is already taken by an
    /// inherited entry; the inherited field stays in effect
    DuplicateName,
}

/// A personal field that could not be applied: an override referencing
/// an invalid parent, or a personal-only field shadowing an inherited
/// name. Reported to the caller, never silently dropped; the inherited
/// field (when there is one) stays in effect.
///
/// For `DuplicateName`, `parent_field_id` carries the inherited field
/// holding the contested name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideIssue {
    pub personal_field_id: Uuid,
    pub parent_field_id: Uuid,
    pub kind: OverrideIssueKind,
}

/// The resolved, per-user field list plus any configuration problems
/// found on the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveFieldSet {
    pub fields: Vec<EffectiveField>,
    pub issues: Vec<OverrideIssue>,
}

impl EffectiveFieldSet {
    /// Borrow the bare definitions, for batch validation
    pub fn definitions(&self) -> Vec<FieldDefinition> {
        self.fields.iter().map(|f| f.definition.clone()).collect()
    }
}

/// Produce the effective field set for one user.
///
/// Group fields come first ordered by `order`; a personal field whose
/// `parent_field_id` matches an active, inheritable group field replaces
/// it in place; personal-only fields are appended unless their name is
/// already taken by an inherited entry; inactive entries are dropped;
/// the final list is stable-sorted by `order` so ties keep the
/// group-then-personal arrangement. Entry names are unique in the
/// result.
pub fn resolve_effective_fields(
    group: &[GroupField],
    personal: &[PersonalField],
) -> EffectiveFieldSet {
    let mut issues = Vec::new();
    let mut fields: Vec<EffectiveField> = Vec::new();

    let mut active_group: Vec<&GroupField> = group
        .iter()
        .filter(|g| g.definition.is_active)
        .collect();
    active_group.sort_by_key(|g| g.definition.order);

    for g in &active_group {
        let overriding = personal
            .iter()
            .find(|p| p.parent_field_id == Some(g.definition.id));
        match overriding {
            Some(p) if !g.is_inheritable => {
                issues.push(OverrideIssue {
                    personal_field_id: p.definition.id,
                    parent_field_id: g.definition.id,
                    kind: OverrideIssueKind::NotInheritable,
                });
                fields.push(EffectiveField {
                    definition: g.definition.clone(),
                    provenance: FieldProvenance::Inherited,
                });
            }
            Some(p) => fields.push(EffectiveField {
                definition: p.definition.clone(),
                provenance: FieldProvenance::Overridden,
            }),
            None => fields.push(EffectiveField {
                definition: g.definition.clone(),
                provenance: FieldProvenance::Inherited,
            }),
        }
    }

    // overrides pointing at parents outside the active set
    for p in personal {
        let Some(parent_id) = p.parent_field_id else {
            continue;
        };
        match group.iter().find(|g| g.definition.id == parent_id) {
            None => issues.push(OverrideIssue {
                personal_field_id: p.definition.id,
                parent_field_id: parent_id,
                kind: OverrideIssueKind::MissingParent,
            }),
            Some(g) if !g.definition.is_active => issues.push(OverrideIssue {
                personal_field_id: p.definition.id,
                parent_field_id: parent_id,
                kind: OverrideIssueKind::InactiveParent,
            }),
            Some(_) => {}
        }
    }

    // personal-only additions; a name already held by an inherited entry
    // keeps the inherited field and reports the shadowed personal one
    for p in personal.iter().filter(|p| p.parent_field_id.is_none()) {
        let taken = active_group
            .iter()
            .find(|g| g.definition.name == p.definition.name);
        if let Some(g) = taken {
            issues.push(OverrideIssue {
                personal_field_id: p.definition.id,
                parent_field_id: g.definition.id,
                kind: OverrideIssueKind::DuplicateName,
            });
            continue;
        }
        fields.push(EffectiveField {
            definition: p.definition.clone(),
            provenance: FieldProvenance::Personal,
        });
    }

    fields.retain(|f| f.definition.is_active);
    // stable: ties keep the group-then-personal arrangement built above
    fields.sort_by_key(|f| f.definition.order);

    EffectiveFieldSet { fields, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::definition::{FieldDraft, FieldOption};
    use crate::fields::field_type::FieldKind;

    fn group_field(name: &str, order: i32) -> GroupField {
        GroupField::new_for_insert(
            Uuid::new_v4(),
            FieldDraft {
                name: name.into(),
                label: name.to_uppercase(),
                order: Some(order),
                ..FieldDraft::default()
            },
            0,
            "admin@test",
        )
    }

    fn personal_field(name: &str, order: i32) -> PersonalField {
        PersonalField::new_for_insert(
            Uuid::new_v4(),
            FieldDraft {
                name: name.into(),
                label: name.to_uppercase(),
                order: Some(order),
                ..FieldDraft::default()
            },
            0,
            "user@test",
        )
    }

    #[test]
    fn test_inherited_only() {
        let group = vec![group_field("a", 1), group_field("b", 0)];
        let set = resolve_effective_fields(&group, &[]);
        let names: Vec<&str> = set.fields.iter().map(|f| f.definition.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(set.issues.is_empty());
        assert!(set
            .fields
            .iter()
            .all(|f| f.provenance == FieldProvenance::Inherited));
    }

    #[test]
    fn test_override_substitutes_in_place() {
        let mut dept = group_field("department", 0);
        dept.definition.kind = FieldKind::Select;
        dept.definition.options = vec![FieldOption::new("eng", "Engineering")];
        let other = group_field("other", 1);

        let over = PersonalField::new_override(
            Uuid::new_v4(),
            &dept,
            FieldDraft {
                name: "department".into(),
                label: "Área".into(),
                kind: FieldKind::Select,
                options: vec![FieldOption::new("eng", "Ingeniería")],
                ..FieldDraft::default()
            },
            "user@test",
        );

        let set = resolve_effective_fields(&[dept, other], &[over]);
        assert_eq!(set.fields.len(), 2);
        let dept_entry = &set.fields[0];
        assert_eq!(dept_entry.definition.name, "department");
        assert_eq!(dept_entry.definition.label, "Área");
        assert_eq!(dept_entry.definition.options[0].label, "Ingeniería");
        assert_eq!(dept_entry.provenance, FieldProvenance::Overridden);
        assert!(set.issues.is_empty());
    }

    #[test]
    fn test_non_inheritable_parent_reported_and_kept() {
        let mut dni = group_field("dni", 0);
        dni.is_inheritable = false;
        let over = PersonalField::new_override(
            Uuid::new_v4(),
            &dni,
            FieldDraft {
                name: "dni".into(),
                label: "Documento".into(),
                ..FieldDraft::default()
            },
            "user@test",
        );

        let set = resolve_effective_fields(&[dni], &[over]);
        assert_eq!(set.fields.len(), 1);
        assert_eq!(set.fields[0].provenance, FieldProvenance::Inherited);
        assert_eq!(set.issues.len(), 1);
        assert_eq!(set.issues[0].kind, OverrideIssueKind::NotInheritable);
    }

    #[test]
    fn test_missing_parent_reported() {
        let mut orphan = personal_field("orphan", 0);
        orphan.parent_field_id = Some(Uuid::new_v4());
        orphan.is_override = true;

        let set = resolve_effective_fields(&[], &[orphan]);
        assert!(set.fields.is_empty());
        assert_eq!(set.issues.len(), 1);
        assert_eq!(set.issues[0].kind, OverrideIssueKind::MissingParent);
    }

    #[test]
    fn test_inactive_parent_reported() {
        let mut dept = group_field("department", 0);
        let over = PersonalField::new_override(
            Uuid::new_v4(),
            &dept,
            FieldDraft {
                name: "department".into(),
                label: "Área".into(),
                ..FieldDraft::default()
            },
            "user@test",
        );
        dept.definition.is_active = false;

        let set = resolve_effective_fields(&[dept], &[over]);
        assert!(set.fields.is_empty());
        assert_eq!(set.issues.len(), 1);
        assert_eq!(set.issues[0].kind, OverrideIssueKind::InactiveParent);
    }

    #[test]
    fn test_personal_only_appended_and_inactive_dropped() {
        let group = vec![group_field("a", 0)];
        let extra = personal_field("extra", 5);
        let mut hidden = personal_field("hidden", 2);
        hidden.definition.is_active = false;

        let set = resolve_effective_fields(&group, &[extra, hidden]);
        let names: Vec<&str> = set.fields.iter().map(|f| f.definition.name.as_str()).collect();
        assert_eq!(names, vec!["a", "extra"]);
        assert_eq!(set.fields[1].provenance, FieldProvenance::Personal);
    }

    #[test]
    fn test_personal_only_shadowing_inherited_name_reported() {
        // same machine key, no parent link: the inherited field wins and
        // the shadowed personal field is reported, never a second entry
        let dept = group_field("department", 0);
        let dept_id = dept.definition.id;
        let shadow = personal_field("department", 3);
        let shadow_id = shadow.definition.id;

        let set = resolve_effective_fields(&[dept], &[shadow]);
        let names: Vec<&str> = set.fields.iter().map(|f| f.definition.name.as_str()).collect();
        assert_eq!(names, vec!["department"]);
        assert_eq!(set.fields[0].provenance, FieldProvenance::Inherited);
        assert_eq!(set.issues.len(), 1);
        assert_eq!(set.issues[0].kind, OverrideIssueKind::DuplicateName);
        assert_eq!(set.issues[0].personal_field_id, shadow_id);
        assert_eq!(set.issues[0].parent_field_id, dept_id);
    }

    #[test]
    fn test_reactivated_group_field_reclaims_shadowed_name() {
        // a personal-only field created while the group field was
        // inactive loses the name once the group field is active again
        let dept = group_field("department", 0);
        let personal = personal_field("department", 1);
        let extra = personal_field("extra", 2);

        let set = resolve_effective_fields(&[dept], &[personal, extra]);
        let names: Vec<&str> = set.fields.iter().map(|f| f.definition.name.as_str()).collect();
        assert_eq!(names, vec!["department", "extra"]);
        assert_eq!(set.issues.len(), 1);
    }

    #[test]
    fn test_order_ties_keep_group_then_personal() {
        let group = vec![group_field("g1", 0), group_field("g2", 0)];
        let personal = vec![personal_field("p1", 0)];
        let set = resolve_effective_fields(&group, &personal);
        let names: Vec<&str> = set.fields.iter().map(|f| f.definition.name.as_str()).collect();
        assert_eq!(names, vec!["g1", "g2", "p1"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let group = vec![group_field("a", 1), group_field("b", 0)];
        let personal = vec![personal_field("c", 2)];
        let first = resolve_effective_fields(&group, &personal);
        let second = resolve_effective_fields(&group, &personal);
        assert_eq!(first, second);
    }
}
