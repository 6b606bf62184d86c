//! Field type enumeration for the dynamic fields system

use serde::{Deserialize, Serialize};

/// Declared type of a dynamic field.
///
/// Closed set: the validation engine and the formatter match on it
/// exhaustively, so adding a kind is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Email,
    Phone,
    Date,
    DateTime,
    Textarea,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    Url,
    File,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Url => "url",
            Self::File => "file",
        }
    }

    /// Kinds whose values are constrained to a declared option list.
    /// Having a non-empty option list is a documented precondition for
    /// these kinds; the validation engine relies on it.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Radio)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
