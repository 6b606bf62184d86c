//! Validation engine for dynamic field values
//!
//! Pure functions from (definition, runtime value) to a structured
//! [`ValidationResult`]. Failures are data, never errors: the caller gets
//! every violation of every field so a form can render them all at once.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::definition::{FieldDefinition, FieldOption};
use super::field_type::FieldKind;
use super::format::parse_datetime;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Normalized phone: optional leading `+`, then 1–16 digits, first digit
/// non-zero. Spaces, hyphens and parentheses are stripped before matching.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone regex"));

/// Outcome of validating one value against one definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Null, absent or empty-string values count as empty everywhere in the
/// engine (and in the display formatter).
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Scalar coercion used where submitted JSON may carry a number or bool
/// in place of a string. Arrays and objects do not coerce.
fn as_scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_finite_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Validate one runtime value against one field definition.
///
/// Check order: required/empty first (empty + not required returns valid
/// immediately), then the kind-specific check, then the `pattern` rule.
/// Kind and pattern errors accumulate; a value can report several
/// violations at once.
pub fn validate_field_value(def: &FieldDefinition, value: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    if is_empty_value(value) {
        if def.validation.required {
            errors.push(format!("{} es requerido", def.label));
        }
        // empty + not required: no further checks apply
        return ValidationResult::from_errors(errors);
    }

    check_kind(def, value, &mut errors);
    check_pattern(def, value, &mut errors);

    ValidationResult::from_errors(errors)
}

fn check_kind(def: &FieldDefinition, value: &Value, errors: &mut Vec<String>) {
    let label = &def.label;
    match def.kind {
        FieldKind::Text | FieldKind::Textarea => match value {
            Value::String(s) => {
                let length = s.chars().count();
                if let Some(min) = def.validation.min_length {
                    if length < min {
                        errors.push(format!("{} debe tener al menos {} caracteres", label, min));
                    }
                }
                if let Some(max) = def.validation.max_length {
                    if length > max {
                        errors.push(format!("{} no debe exceder {} caracteres", label, max));
                    }
                }
            }
            _ => errors.push(format!("{} debe ser un texto", label)),
        },
        FieldKind::Number => match as_finite_number(value) {
            Some(n) => {
                if let Some(min) = def.validation.min {
                    if n < min {
                        errors.push(format!("{} debe ser mayor o igual a {}", label, min));
                    }
                }
                if let Some(max) = def.validation.max {
                    if n > max {
                        errors.push(format!("{} debe ser menor o igual a {}", label, max));
                    }
                }
            }
            None => errors.push(format!("{} debe ser un número", label)),
        },
        FieldKind::Email => {
            let ok = as_scalar_string(value).is_some_and(|s| EMAIL_RE.is_match(&s));
            if !ok {
                errors.push(format!("{} debe ser un correo electrónico válido", label));
            }
        }
        FieldKind::Phone => {
            let ok = as_scalar_string(value).is_some_and(|s| {
                let stripped: String = s
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                    .collect();
                PHONE_RE.is_match(&stripped)
            });
            if !ok {
                errors.push(format!("{} debe ser un número de teléfono válido", label));
            }
        }
        FieldKind::Date | FieldKind::DateTime => {
            let ok = as_scalar_string(value).is_some_and(|s| parse_datetime(&s).is_some());
            if !ok {
                errors.push(format!("{} debe ser una fecha válida", label));
            }
        }
        FieldKind::Url => {
            let ok = as_scalar_string(value).is_some_and(|s| url::Url::parse(&s).is_ok());
            if !ok {
                errors.push(format!("{} debe ser una URL válida", label));
            }
        }
        FieldKind::Select | FieldKind::Radio => match as_scalar_string(value) {
            Some(s) if option_allows(&def.options, &s) => {}
            Some(s) => errors.push(format!("{}: '{}' no es una opción válida", label, s)),
            None => errors.push(format!("{} debe ser una de las opciones", label)),
        },
        FieldKind::Multiselect => match value {
            Value::Array(items) => {
                let invalid: Vec<String> = items
                    .iter()
                    .map(|item| as_scalar_string(item).unwrap_or_else(|| item.to_string()))
                    .filter(|s| !option_allows(&def.options, s))
                    .collect();
                if !invalid.is_empty() {
                    errors.push(format!(
                        "{}: opciones no válidas: {}",
                        label,
                        invalid.join(", ")
                    ));
                }
            }
            _ => errors.push(format!("{} debe ser una lista de opciones", label)),
        },
        FieldKind::Checkbox => {
            if !value.is_boolean() {
                errors.push(format!("{} debe ser verdadero o falso", label));
            }
        }
        // file values are opaque references, nothing to check here
        FieldKind::File => {}
    }
}

fn option_allows(options: &[FieldOption], candidate: &str) -> bool {
    options
        .iter()
        .any(|o| !o.disabled && o.value == candidate)
}

fn check_pattern(def: &FieldDefinition, value: &Value, errors: &mut Vec<String>) {
    let Some(pattern) = &def.validation.pattern else {
        return;
    };
    let Value::String(s) = value else {
        return;
    };
    match Regex::new(pattern) {
        Ok(re) => {
            if !re.is_match(s) {
                let message = def
                    .validation
                    .custom_message
                    .clone()
                    .unwrap_or_else(|| format!("{} no tiene el formato requerido", def.label));
                errors.push(message);
            }
        }
        // an undecodable rule is reported against the value, never a panic
        Err(_) => errors.push(format!(
            "La regla de validación de {} no es válida",
            def.label
        )),
    }
}

// ============================================================================
// Batch form
// ============================================================================

/// Validate a bag of submitted values against a definition list. Every
/// definition gets an entry; values with no matching definition are
/// ignored.
pub fn validate_field_values(
    values: &Map<String, Value>,
    definitions: &[FieldDefinition],
) -> HashMap<String, ValidationResult> {
    definitions
        .iter()
        .map(|def| {
            let value = values.get(&def.name).cloned().unwrap_or(Value::Null);
            (def.name.clone(), validate_field_value(def, &value))
        })
        .collect()
}

pub fn are_all_fields_valid(results: &HashMap<String, ValidationResult>) -> bool {
    results.values().all(|r| r.is_valid)
}

/// Flatten every error string, ordered by field name for determinism
pub fn all_validation_errors(results: &HashMap<String, ValidationResult>) -> Vec<String> {
    let mut names: Vec<&String> = results.keys().collect();
    names.sort();
    names
        .into_iter()
        .flat_map(|name| results[name].errors.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::definition::{FieldDraft, ValidationRules};
    use serde_json::json;

    fn def(kind: FieldKind, validation: ValidationRules) -> FieldDefinition {
        FieldDefinition::from_draft(
            FieldDraft {
                name: "field".into(),
                label: "Campo".into(),
                kind,
                validation,
                ..FieldDraft::default()
            },
            0,
        )
    }

    fn select_def() -> FieldDefinition {
        let mut d = def(FieldKind::Select, ValidationRules::none());
        d.options = vec![FieldOption::new("a", "A"), FieldOption::new("b", "B")];
        d
    }

    #[test]
    fn test_required_rejects_empty_values() {
        let d = def(FieldKind::Text, ValidationRules::required());
        for value in [json!(null), json!("")] {
            let r = validate_field_value(&d, &value);
            assert!(!r.is_valid);
            assert!(r.errors.iter().any(|e| e.contains("Campo")), "{:?}", r);
        }
    }

    #[test]
    fn test_optional_empty_short_circuits() {
        // other rules must not fire on an empty optional value
        let d = def(
            FieldKind::Number,
            ValidationRules {
                min: Some(10.0),
                pattern: Some("^x$".into()),
                ..ValidationRules::none()
            },
        );
        let r = validate_field_value(&d, &json!(""));
        assert!(r.is_valid);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_number_bounds() {
        let d = def(
            FieldKind::Number,
            ValidationRules {
                min: Some(0.0),
                max: Some(100.0),
                ..ValidationRules::none()
            },
        );
        assert!(!validate_field_value(&d, &json!(150)).is_valid);
        assert!(!validate_field_value(&d, &json!(-1)).is_valid);
        assert!(validate_field_value(&d, &json!(50)).is_valid);
        // string coercion
        assert!(validate_field_value(&d, &json!("50")).is_valid);
        assert!(!validate_field_value(&d, &json!("abc")).is_valid);
    }

    #[test]
    fn test_text_length_bounds() {
        let d = def(
            FieldKind::Text,
            ValidationRules {
                min_length: Some(3),
                max_length: Some(5),
                ..ValidationRules::none()
            },
        );
        assert!(!validate_field_value(&d, &json!("ab")).is_valid);
        assert!(validate_field_value(&d, &json!("abc")).is_valid);
        assert!(validate_field_value(&d, &json!("ábcdé")).is_valid);
        assert!(!validate_field_value(&d, &json!("abcdef")).is_valid);
        assert!(!validate_field_value(&d, &json!(5)).is_valid);
    }

    #[test]
    fn test_email_shape() {
        let d = def(FieldKind::Email, ValidationRules::none());
        assert!(validate_field_value(&d, &json!("ana@empresa.pe")).is_valid);
        assert!(!validate_field_value(&d, &json!("ana@empresa")).is_valid);
        assert!(!validate_field_value(&d, &json!("ana empresa@x.pe")).is_valid);
        assert!(!validate_field_value(&d, &json!("a@b@c.pe")).is_valid);
    }

    #[test]
    fn test_phone_normalization() {
        let d = def(FieldKind::Phone, ValidationRules::none());
        assert!(validate_field_value(&d, &json!("+51 987 654 321")).is_valid);
        assert!(validate_field_value(&d, &json!("(51) 234-5678")).is_valid);
        // stripping does not rescue a leading zero
        assert!(!validate_field_value(&d, &json!("(01) 234-5678")).is_valid);
        assert!(!validate_field_value(&d, &json!("0123456")).is_valid);
        assert!(!validate_field_value(&d, &json!("+51 abc")).is_valid);
        assert!(!validate_field_value(&d, &json!("+12345678901234567")).is_valid);
    }

    #[test]
    fn test_date_parse() {
        let d = def(FieldKind::Date, ValidationRules::none());
        assert!(validate_field_value(&d, &json!("2026-08-25")).is_valid);
        assert!(validate_field_value(&d, &json!("2026-08-25T10:30:00Z")).is_valid);
        assert!(!validate_field_value(&d, &json!("2026-13-40")).is_valid);
        assert!(!validate_field_value(&d, &json!("no es fecha")).is_valid);
    }

    #[test]
    fn test_url_must_be_absolute() {
        let d = def(FieldKind::Url, ValidationRules::none());
        assert!(validate_field_value(&d, &json!("https://salud.example.com/x")).is_valid);
        assert!(!validate_field_value(&d, &json!("/relativa/ruta")).is_valid);
        assert!(!validate_field_value(&d, &json!("no url")).is_valid);
    }

    #[test]
    fn test_select_membership() {
        let d = select_def();
        assert!(validate_field_value(&d, &json!("a")).is_valid);
        let r = validate_field_value(&d, &json!("c"));
        assert!(!r.is_valid);
        assert!(r.errors[0].contains("'c'"));
    }

    #[test]
    fn test_select_disabled_option_rejected() {
        let mut d = select_def();
        d.options[1].disabled = true;
        assert!(!validate_field_value(&d, &json!("b")).is_valid);
    }

    #[test]
    fn test_multiselect_lists_invalid_values() {
        let mut d = select_def();
        d.kind = FieldKind::Multiselect;
        assert!(validate_field_value(&d, &json!(["a", "b"])).is_valid);
        let r = validate_field_value(&d, &json!(["a", "x", "y"]));
        assert!(!r.is_valid);
        assert!(r.errors[0].contains("x, y"));
        assert!(!validate_field_value(&d, &json!("a")).is_valid);
    }

    #[test]
    fn test_checkbox_strictly_boolean() {
        let d = def(FieldKind::Checkbox, ValidationRules::none());
        assert!(validate_field_value(&d, &json!(true)).is_valid);
        assert!(validate_field_value(&d, &json!(false)).is_valid);
        assert!(!validate_field_value(&d, &json!("true")).is_valid);
        assert!(!validate_field_value(&d, &json!(1)).is_valid);
    }

    #[test]
    fn test_pattern_custom_message() {
        let d = def(
            FieldKind::Text,
            ValidationRules {
                pattern: Some(r"^\d{8}$".into()),
                custom_message: Some("El DNI debe tener 8 dígitos".into()),
                ..ValidationRules::none()
            },
        );
        assert!(validate_field_value(&d, &json!("12345678")).is_valid);
        let r = validate_field_value(&d, &json!("123"));
        assert_eq!(r.errors, vec!["El DNI debe tener 8 dígitos".to_string()]);
    }

    #[test]
    fn test_unparsable_pattern_reported_not_panicking() {
        let d = def(
            FieldKind::Text,
            ValidationRules {
                pattern: Some("(".into()),
                ..ValidationRules::none()
            },
        );
        let r = validate_field_value(&d, &json!("hola"));
        assert!(!r.is_valid);
    }

    #[test]
    fn test_errors_accumulate() {
        // length violation and pattern violation reported together
        let d = def(
            FieldKind::Text,
            ValidationRules {
                min_length: Some(5),
                pattern: Some(r"^\d+$".into()),
                ..ValidationRules::none()
            },
        );
        let r = validate_field_value(&d, &json!("ab"));
        assert_eq!(r.errors.len(), 2);
    }

    #[test]
    fn test_batch_validation() {
        let mut required = def(FieldKind::Text, ValidationRules::required());
        required.name = "dni".into();
        let mut optional = def(FieldKind::Number, ValidationRules::none());
        optional.name = "edad".into();
        let defs = vec![required, optional];

        let mut values = Map::new();
        values.insert("edad".into(), json!(42));
        // "dni" deliberately missing

        let results = validate_field_values(&values, &defs);
        assert_eq!(results.len(), 2);
        assert!(!results["dni"].is_valid);
        assert!(results["edad"].is_valid);
        assert!(!are_all_fields_valid(&results));
        assert_eq!(all_validation_errors(&results).len(), 1);
    }
}
