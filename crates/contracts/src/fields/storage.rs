//! JSON bag storage contract
//!
//! Field definitions and recorded values are persisted inside a larger
//! object (`additionalConfig` on user types, `additionalData` on users)
//! whose other keys belong to external collaborators. Writes merge into
//! that object; they never replace it, so unknown keys survive every
//! round trip untouched.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::error::FieldAdminError;

/// Key holding the field definition list
pub const DYNAMIC_FIELDS_KEY: &str = "dynamicFields";
/// Key holding the recorded values (users only)
pub const FIELD_VALUES_KEY: &str = "fieldValues";

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode the list stored under `key`. A missing or null key is an empty
/// list; anything that does not decode as the expected array is
/// `MalformedPersistedData` (callers fail closed to empty and report it).
pub fn read_from_bag<T: DeserializeOwned>(
    bag: &Value,
    key: &str,
) -> Result<Vec<T>, FieldAdminError> {
    let object = match bag {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(FieldAdminError::MalformedPersistedData {
                detail: format!("se esperaba un objeto, se encontró {}", json_kind(other)),
            })
        }
    };
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .cloned()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    FieldAdminError::MalformedPersistedData {
                        detail: format!("entrada de '{}' no válida: {}", key, e),
                    }
                })
            })
            .collect(),
        Some(other) => Err(FieldAdminError::MalformedPersistedData {
            detail: format!(
                "se esperaba una lista en '{}', se encontró {}",
                key,
                json_kind(other)
            ),
        }),
    }
}

/// Serialize `items` under `key`, merging into the existing bag. A null
/// bag becomes a fresh object; every other key is preserved as-is.
pub fn write_to_bag<T: Serialize>(
    bag: &mut Value,
    key: &str,
    items: &[T],
) -> Result<(), FieldAdminError> {
    let serialized: Vec<Value> = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| FieldAdminError::MalformedPersistedData {
            detail: format!("no se pudo serializar '{}': {}", key, e),
        })?;

    if bag.is_null() {
        *bag = Value::Object(Map::new());
    }
    let kind = json_kind(bag);
    let object = bag
        .as_object_mut()
        .ok_or_else(|| FieldAdminError::MalformedPersistedData {
            detail: format!("se esperaba un objeto, se encontró {}", kind),
        })?;
    object.insert(key.to_string(), Value::Array(serialized));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::definition::{FieldDraft, GroupField};
    use serde_json::json;
    use uuid::Uuid;

    fn sample_field() -> GroupField {
        GroupField::new_for_insert(
            Uuid::new_v4(),
            FieldDraft {
                name: "department".into(),
                label: "Departamento".into(),
                ..FieldDraft::default()
            },
            0,
            "admin@test",
        )
    }

    #[test]
    fn test_missing_key_is_empty() {
        let bag = json!({ "theme": "dark" });
        let fields: Vec<GroupField> = read_from_bag(&bag, DYNAMIC_FIELDS_KEY).unwrap();
        assert!(fields.is_empty());

        let fields: Vec<GroupField> = read_from_bag(&Value::Null, DYNAMIC_FIELDS_KEY).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_foreign_keys_survive_write() {
        let mut bag = json!({
            "theme": "dark",
            "notifications": { "email": true },
        });
        write_to_bag(&mut bag, DYNAMIC_FIELDS_KEY, &[sample_field()]).unwrap();

        assert_eq!(bag["theme"], "dark");
        assert_eq!(bag["notifications"]["email"], true);
        assert_eq!(bag[DYNAMIC_FIELDS_KEY].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_null_bag_becomes_object() {
        let mut bag = Value::Null;
        write_to_bag(&mut bag, DYNAMIC_FIELDS_KEY, &[sample_field()]).unwrap();
        assert!(bag.is_object());
    }

    #[test]
    fn test_round_trip() {
        let field = sample_field();
        let mut bag = Value::Null;
        write_to_bag(&mut bag, DYNAMIC_FIELDS_KEY, std::slice::from_ref(&field)).unwrap();
        let back: Vec<GroupField> = read_from_bag(&bag, DYNAMIC_FIELDS_KEY).unwrap();
        assert_eq!(back, vec![field]);
    }

    #[test]
    fn test_write_into_non_object_bag_reported() {
        let mut bag = json!("no soy un objeto");
        let err = write_to_bag(&mut bag, DYNAMIC_FIELDS_KEY, &[sample_field()]).unwrap_err();
        assert!(matches!(err, FieldAdminError::MalformedPersistedData { .. }));
        // the bag itself is left as it was
        assert_eq!(bag, json!("no soy un objeto"));
    }

    #[test]
    fn test_malformed_bag_reported() {
        let bag = json!("no soy un objeto");
        let err = read_from_bag::<GroupField>(&bag, DYNAMIC_FIELDS_KEY).unwrap_err();
        assert!(matches!(err, FieldAdminError::MalformedPersistedData { .. }));

        let bag = json!({ "dynamicFields": 42 });
        let err = read_from_bag::<GroupField>(&bag, DYNAMIC_FIELDS_KEY).unwrap_err();
        assert!(matches!(err, FieldAdminError::MalformedPersistedData { .. }));

        let bag = json!({ "dynamicFields": [{ "corrupto": true }] });
        let err = read_from_bag::<GroupField>(&bag, DYNAMIC_FIELDS_KEY).unwrap_err();
        assert!(matches!(err, FieldAdminError::MalformedPersistedData { .. }));
    }
}
