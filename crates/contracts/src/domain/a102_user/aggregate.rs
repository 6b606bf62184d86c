use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::a101_user_type::UserTypeId;
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a platform user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
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

impl AggregateId for UserId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(UserId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A platform user. `base.description` holds the full name.
///
/// Personal dynamic field definitions and recorded field values live in
/// `additional_data` under the `dynamicFields` and `fieldValues` keys.
/// Every other key of that object belongs to external collaborators and
/// must survive writes untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: BaseAggregate<UserId>,

    /// Contact e-mail
    pub email: String,

    /// User type this user belongs to (reference to a101_user_type)
    #[serde(rename = "userTypeId")]
    pub user_type_id: Option<UserTypeId>,

    /// Opaque data bag shared with external collaborators
    #[serde(rename = "additionalData", default)]
    pub additional_data: Value,
}

impl User {
    /// Create a new user for insertion
    pub fn new_for_insert(
        code: String,
        full_name: String,
        email: String,
        user_type_id: Option<UserTypeId>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(UserId::new_v4(), code, full_name);
        base.comment = comment;

        Self {
            base,
            email,
            user_type_id,
            additional_data: Value::Null,
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
    pub fn update(&mut self, dto: &UserDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.full_name.clone();
        self.base.comment = dto.comment.clone();
        self.email = dto.email.clone();
        self.user_type_id = dto
            .user_type_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(UserTypeId::new);
    }

    /// Validate instance data
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("El nombre no puede estar vacío".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("El código no puede estar vacío".into());
        }
        if self.email.trim().is_empty() {
            return Err("El correo electrónico no puede estar vacío".into());
        }
        if !self.email.contains('@') {
            return Err("El correo electrónico no es válido".into());
        }
        Ok(())
    }

    /// Pre-write hook
    pub fn before_write(&mut self) {
        self.touch_updated();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for User {
    type Id = UserId;

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
        "a102"
    }

    fn collection_name() -> &'static str {
        "user"
    }

    fn element_name() -> &'static str {
        "Usuario"
    }

    fn list_name() -> &'static str {
        "Usuarios"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating/updating a user
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserDto {
    pub id: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "userTypeId")]
    pub user_type_id: Option<String>,
    pub comment: Option<String>,
}
