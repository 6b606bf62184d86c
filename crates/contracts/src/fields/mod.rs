//! Dynamic fields core
//!
//! Two-level dynamic field definitions for user records: group-level
//! fields owned by a user type, inherited by its members, and personal
//! fields owned by one user that override or extend the inherited set.
//!
//! The module is split the same way the runtime flows:
//! schema model ([`definition`]) → administration ops ([`admin`]) →
//! inheritance resolution ([`resolve`]) → value validation
//! ([`validation`]) → display/input conversion ([`format`]). The
//! [`storage`] module owns the JSON bag contract shared with external
//! collaborators.

pub mod field_type;
pub mod definition;
pub mod error;
pub mod validation;
pub mod resolve;
pub mod format;
pub mod admin;
pub mod storage;

pub use field_type::FieldKind;
pub use definition::{
    DynamicField, FieldDefinition, FieldDraft, FieldOption, FieldPatch, FieldValue, GroupField,
    PersonalField, ValidationRules, is_valid_field_name,
};
pub use error::FieldAdminError;
pub use resolve::{EffectiveField, EffectiveFieldSet, FieldProvenance, OverrideIssue, OverrideIssueKind};
pub use validation::{
    all_validation_errors, are_all_fields_valid, validate_field_value, validate_field_values,
    ValidationResult,
};
