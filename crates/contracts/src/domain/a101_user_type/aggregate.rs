use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a user type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserTypeId(pub Uuid);

impl UserTypeId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for UserTypeId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(UserTypeId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A category of users ("Operario", "Supervisor", "Médico ocupacional").
///
/// Group-level dynamic field definitions live in `additional_config` under
/// the `dynamicFields` key. Every other key of that object belongs to
/// external collaborators and must survive writes untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserType {
    #[serde(flatten)]
    pub base: BaseAggregate<UserTypeId>,

    /// Opaque configuration bag shared with external collaborators
    #[serde(rename = "additionalConfig", default)]
    pub additional_config: Value,
}

impl UserType {
    /// Create a new user type for insertion
    pub fn new_for_insert(code: String, description: String, comment: Option<String>) -> Self {
        let mut base = BaseAggregate::new(UserTypeId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            additional_config: Value::Null,
        }
    }

    /// ID as a string
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Refresh the update timestamp
    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    /// Apply DTO data
    pub fn update(&mut self, dto: &UserTypeDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
    }

    /// Validate instance data
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("El nombre no puede estar vacío".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("El código no puede estar vacío".into());
        }
        Ok(())
    }

    /// Pre-write hook
    pub fn before_write(&mut self) {
        self.touch_updated();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for UserType {
    type Id = UserTypeId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a101"
    }

    fn collection_name() -> &'static str {
        "user_type"
    }

    fn element_name() -> &'static str {
        "Tipo de usuario"
    }

    fn list_name() -> &'static str {
        "Tipos de usuario"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating/updating a user type
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserTypeDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
}
