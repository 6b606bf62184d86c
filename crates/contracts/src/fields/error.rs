//! Error taxonomy of the dynamic fields core
//!
//! Value validation failures are *not* errors: the engine returns
//! [`super::ValidationResult`] data so callers can show every field
//! problem at once. The kinds below cover administration and storage.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FieldAdminError {
    /// Creation or rename collides with an existing name in the scope
    #[error("ya existe un campo con el nombre '{name}'")]
    DuplicateFieldName { name: String },

    /// Operation targets an id absent from the scope
    #[error("no existe un campo con el id {id}")]
    FieldNotFound { id: Uuid },

    /// Machine key is not identifier-safe
    #[error("el nombre de campo '{name}' no es válido")]
    InvalidFieldName { name: String },

    /// A personal field names a parent that is missing, inactive or
    /// non-inheritable
    #[error("el campo heredado {parent_id} no admite personalización: {reason}")]
    InvalidOverrideTarget { parent_id: Uuid, reason: String },

    /// The persisted bag does not decode as a field list. Callers fail
    /// closed to an empty list and report the anomaly.
    #[error("datos de campos dinámicos corruptos: {detail}")]
    MalformedPersistedData { detail: String },
}
