//! Property merge contract (§4.3): instance values checked and defaulted
//! against a schema merged along a type hierarchy.

use crate::hierarchy::ResolvedType;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::error::DocumentError;
use tosca_core::functions::FunctionRegistry;
use tosca_core::path::ElementPath;
use tosca_core::value::Location;

pub const ERR_UNDEFINED_PROPERTY: u32 = 50;
pub const ERR_MISSING_PROPERTY: u32 = 80;
pub const ERR_TYPE_MISMATCH: u32 = 50;

/// Merges `instance_properties` onto `schema_properties`
/// (`{name: {type?, default?, description?}}`), recursing into
/// `data_types` for declared complex types.
pub fn merge_properties(
    schema_properties: &Map<String, Value>,
    instance_properties: &Map<String, Value>,
    data_types: &HashMap<String, ResolvedType>,
    functions: &FunctionRegistry,
    path: &ElementPath,
) -> Result<Map<String, Value>, DocumentError> {
    for key in instance_properties.keys() {
        if !schema_properties.contains_key(key) {
            return Err(DocumentError::logic(
                ERR_UNDEFINED_PROPERTY,
                format!("undefined property '{key}'"),
                path.child(key),
                Location::NONE,
            ));
        }
    }

    let mut merged = Map::new();
    for (name, schema) in schema_properties {
        let schema_obj = schema.as_object();
        let default = schema_obj.and_then(|o| o.get("default"));
        let declared_type = schema_obj.and_then(|o| o.get("type")).and_then(Value::as_str);

        let value = match instance_properties.get(name) {
            Some(v) => v.clone(),
            None => match default {
                Some(v) => v.clone(),
                None => {
                    return Err(DocumentError::logic(
                        ERR_MISSING_PROPERTY,
                        format!("missing mandatory property '{name}'"),
                        path.child(name),
                        Location::NONE,
                    ));
                }
            },
        };

        if !functions.is_intrinsic(&value) {
            if let Some(declared_type) = declared_type {
                check_type(name, declared_type, &value, data_types, functions, path)?;
            }
        }

        merged.insert(name.clone(), value);
    }
    Ok(merged)
}

fn check_type(
    name: &str,
    declared_type: &str,
    value: &Value,
    data_types: &HashMap<String, ResolvedType>,
    functions: &FunctionRegistry,
    path: &ElementPath,
) -> Result<(), DocumentError> {
    let matches = match declared_type {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "float" => value.is_f64() || value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "list" => value.is_array(),
        "dict" => value.is_object(),
        custom => {
            let Some(data_type) = data_types.get(custom) else {
                return Err(DocumentError::logic(
                    ERR_TYPE_MISMATCH,
                    format!("unknown declared type '{custom}' for property '{name}'"),
                    path.child(name),
                    Location::NONE,
                ));
            };
            let Some(instance) = value.as_object() else {
                return Err(DocumentError::logic(
                    ERR_TYPE_MISMATCH,
                    format!("property '{name}' expected a dict matching type '{custom}'"),
                    path.child(name),
                    Location::NONE,
                ));
            };
            merge_properties(&data_type.properties, instance, data_types, functions, &path.child(name))?;
            return Ok(());
        }
    };
    if matches {
        Ok(())
    } else {
        Err(DocumentError::logic(
            ERR_TYPE_MISMATCH,
            format!("property '{name}' expected type '{declared_type}'"),
            path.child(name),
            Location::NONE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_missing_instance_values() {
        let mut schema = Map::new();
        schema.insert("k".to_string(), json!({"type": "string", "default": "d"}));
        let merged = merge_properties(
            &schema,
            &Map::new(),
            &HashMap::new(),
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
        )
        .unwrap();
        assert_eq!(merged["k"], "d");
    }

    #[test]
    fn undefined_instance_property_is_rejected() {
        let schema = Map::new();
        let mut instance = Map::new();
        instance.insert("nope".to_string(), json!("x"));
        let err = merge_properties(
            &schema,
            &instance,
            &HashMap::new(),
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_mandatory_property_is_rejected() {
        let mut schema = Map::new();
        schema.insert("k".to_string(), json!({"type": "string"}));
        let err = merge_properties(
            &schema,
            &Map::new(),
            &HashMap::new(),
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn intrinsic_function_values_bypass_type_check() {
        let mut schema = Map::new();
        schema.insert("k".to_string(), json!({"type": "integer"}));
        let mut instance = Map::new();
        instance.insert("k".to_string(), json!({"get_input": "port"}));
        let merged = merge_properties(
            &schema,
            &instance,
            &HashMap::new(),
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
        )
        .unwrap();
        assert_eq!(merged["k"], json!({"get_input": "port"}));
    }
}
