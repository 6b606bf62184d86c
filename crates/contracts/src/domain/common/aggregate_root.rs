use super::EntityMetadata;

/// Aggregate root trait
///
/// Required accessors and class-level metadata for every aggregate in the
/// system.
pub trait AggregateRoot {
    /// Identifier type of the aggregate
    type Id;

    // ============================================================================
    // Instance accessors
    // ============================================================================

    /// Record ID
    fn id(&self) -> Self::Id;

    /// Business code ("UT-OPER-001")
    fn code(&self) -> &str;

    /// Display name / description
    fn description(&self) -> &str;

    /// Lifecycle metadata
    fn metadata(&self) -> &EntityMetadata;

    /// Mutable lifecycle metadata
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Class-level metadata
    // ============================================================================

    /// Aggregate index ("a101")
    fn aggregate_index() -> &'static str;

    /// Collection name for storage ("user_type")
    fn collection_name() -> &'static str;

    /// UI name, singular ("Tipo de usuario")
    fn element_name() -> &'static str;

    /// UI name, plural ("Tipos de usuario")
    fn list_name() -> &'static str;

    // ============================================================================
    // Default implementations
    // ============================================================================

    /// Full system name ("a101_user_type")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
