//! Schema model for dynamic field definitions

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::field_type::FieldKind;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("field name regex"));

/// Machine keys are identifier-safe: a letter first, then letters,
/// digits and underscore. Never empty.
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Building blocks
// ============================================================================

/// One selectable option of a select/multiselect/radio field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

/// Validation rules attached to a field definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Regex applied to string values after the kind-specific checks
    pub pattern: Option<String>,
    /// Overrides the generic pattern-mismatch error text
    pub custom_message: Option<String>,
}

impl ValidationRules {
    /// No constraints at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Required, nothing else
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

// ============================================================================
// Field definition
// ============================================================================

/// A dynamic field definition, scope-unaware.
///
/// `name` uniqueness within the owning scope is enforced by the
/// administration operations, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: Uuid,
    /// Machine key, unique within the owning scope
    pub name: String,
    /// Display text
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub validation: ValidationRules,
    /// Required non-empty for kinds with `has_options()`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Display sequence, ascending. Not necessarily unique; ties keep
    /// insertion order.
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Free-form extension bag
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl FieldDefinition {
    /// Materialize a draft. `default_order` is used when the draft does
    /// not pin an explicit position (callers pass the current list length).
    pub fn from_draft(draft: FieldDraft, default_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            label: draft.label,
            description: draft.description,
            kind: draft.kind,
            validation: draft.validation,
            options: draft.options,
            default_value: draft.default_value,
            placeholder: draft.placeholder,
            order: draft.order.unwrap_or(default_order),
            is_active: true,
            metadata: Map::new(),
        }
    }
}

// ============================================================================
// Scoped definitions
// ============================================================================

/// A field definition owned by a user type, inherited by its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupField {
    #[serde(flatten)]
    pub definition: FieldDefinition,
    pub group_id: Uuid,
    /// When false, members cannot override this field
    #[serde(default = "default_true")]
    pub is_inheritable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl GroupField {
    pub fn new_for_insert(
        group_id: Uuid,
        draft: FieldDraft,
        default_order: i32,
        created_by: &str,
    ) -> Self {
        let now = Utc::now();
        let is_inheritable = draft.is_inheritable.unwrap_or(true);
        Self {
            definition: FieldDefinition::from_draft(draft, default_order),
            group_id,
            is_inheritable,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
        }
    }
}

/// A field definition owned by one user.
///
/// Either a brand-new field (`parent_field_id` absent) or an override of
/// an inherited group field (`parent_field_id` set, `is_override` true,
/// `name` equal to the parent's name — enforced at creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalField {
    #[serde(flatten)]
    pub definition: FieldDefinition,
    pub owner_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_field_id: Option<Uuid>,
    #[serde(default)]
    pub is_override: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl PersonalField {
    /// A personal field with no group counterpart
    pub fn new_for_insert(
        owner_id: Uuid,
        draft: FieldDraft,
        default_order: i32,
        created_by: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            definition: FieldDefinition::from_draft(draft, default_order),
            owner_id,
            parent_field_id: None,
            is_override: false,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
        }
    }

    /// An override of an inherited group field. The machine key is taken
    /// from the parent, whatever the draft says; the display order
    /// defaults to the parent's.
    pub fn new_override(
        owner_id: Uuid,
        parent: &GroupField,
        mut draft: FieldDraft,
        created_by: &str,
    ) -> Self {
        draft.name = parent.definition.name.clone();
        let default_order = draft.order.unwrap_or(parent.definition.order);
        let now = Utc::now();
        Self {
            definition: FieldDefinition::from_draft(draft, default_order),
            owner_id,
            parent_field_id: Some(parent.definition.id),
            is_override: true,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
        }
    }
}

// ============================================================================
// Recorded values
// ============================================================================

/// A value recorded for one user against one field definition.
///
/// Values are never deleted on their own: when a definition is removed
/// its stored values stay in the bag and the resolver simply ignores
/// them from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub field_id: Uuid,
    pub field_name: String,
    pub value: Value,
    #[serde(rename = "fieldType")]
    pub kind: FieldKind,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Input for creating a field definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDraft {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub validation: ValidationRules,
    pub options: Vec<FieldOption>,
    pub default_value: Option<Value>,
    pub placeholder: Option<String>,
    /// Explicit position; appended at the end when absent
    pub order: Option<i32>,
    /// Group scope only; ignored for personal fields
    pub is_inheritable: Option<bool>,
}

/// Partial update of a field definition. `None` leaves the attribute
/// unchanged; optional attributes cannot be cleared through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    /// Rename; collides like a creation would
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub validation: Option<ValidationRules>,
    pub options: Option<Vec<FieldOption>>,
    pub default_value: Option<Value>,
    pub placeholder: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Scope seam
// ============================================================================

/// Seam shared by [`GroupField`] and [`PersonalField`] so the
/// administration operations are written once, generic over the scope.
pub trait DynamicField {
    fn definition(&self) -> &FieldDefinition;
    fn definition_mut(&mut self) -> &mut FieldDefinition;
    /// Refresh the update timestamp
    fn touch(&mut self);
    /// Fresh audit trail for a newly created copy
    fn reset_audit(&mut self, actor: &str);
}

impl DynamicField for GroupField {
    fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    fn definition_mut(&mut self) -> &mut FieldDefinition {
        &mut self.definition
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn reset_audit(&mut self, actor: &str) {
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
        self.created_by = actor.to_string();
    }
}

impl DynamicField for PersonalField {
    fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    fn definition_mut(&mut self) -> &mut FieldDefinition {
        &mut self.definition
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn reset_audit(&mut self, actor: &str) {
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
        self.created_by = actor.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_pattern() {
        assert!(is_valid_field_name("department"));
        assert!(is_valid_field_name("blood_type_2"));
        assert!(!is_valid_field_name("_internal"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("2fast"));
        assert!(!is_valid_field_name("with space"));
        assert!(!is_valid_field_name("acentué"));
    }

    #[test]
    fn test_draft_defaults() {
        let draft = FieldDraft {
            name: "department".into(),
            label: "Departamento".into(),
            ..FieldDraft::default()
        };
        let def = FieldDefinition::from_draft(draft, 4);
        assert!(def.is_active);
        assert_eq!(def.order, 4);
        assert_eq!(def.kind, FieldKind::Text);
        assert!(!def.validation.required);
    }

    #[test]
    fn test_draft_explicit_order_wins() {
        let draft = FieldDraft {
            name: "department".into(),
            label: "Departamento".into(),
            order: Some(0),
            ..FieldDraft::default()
        };
        let def = FieldDefinition::from_draft(draft, 7);
        assert_eq!(def.order, 0);
    }

    #[test]
    fn test_override_keeps_parent_name() {
        let group_id = Uuid::new_v4();
        let parent = GroupField::new_for_insert(
            group_id,
            FieldDraft {
                name: "department".into(),
                label: "Departamento".into(),
                ..FieldDraft::default()
            },
            0,
            "admin@test",
        );
        let over = PersonalField::new_override(
            Uuid::new_v4(),
            &parent,
            FieldDraft {
                name: "renamed_anyway".into(),
                label: "Área".into(),
                ..FieldDraft::default()
            },
            "user@test",
        );
        assert_eq!(over.definition.name, "department");
        assert_eq!(over.parent_field_id, Some(parent.definition.id));
        assert!(over.is_override);
        assert_eq!(over.definition.order, parent.definition.order);
    }

    #[test]
    fn test_definition_json_shape() {
        let draft = FieldDraft {
            name: "department".into(),
            label: "Departamento".into(),
            kind: FieldKind::Select,
            options: vec![FieldOption::new("eng", "Ingeniería")],
            ..FieldDraft::default()
        };
        let def = FieldDefinition::from_draft(draft, 0);
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["options"][0]["value"], "eng");
        // absent optionals are omitted, not nulled
        assert!(json.get("placeholder").is_none());

        let back: FieldDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }
}
