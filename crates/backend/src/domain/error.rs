use contracts::fields::FieldAdminError;
use thiserror::Error;

/// Error surface of the domain services. Field-administration kinds keep
/// their identity so the API layer can map them to precise statuses;
/// everything infrastructural collapses into `Storage`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Field(#[from] FieldAdminError),

    #[error("{entity} no encontrado")]
    OwnerNotFound { entity: &'static str },

    /// Aggregate-level validation failure (empty code, bad email, ...)
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
