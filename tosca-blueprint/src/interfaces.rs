//! Interface merge contract (§4.3): type-level interface declarations
//! combined with per-instance overrides, ahead of operation compilation.

use serde_json::{Map, Value};

/// Normalizes a raw operation declaration (string shorthand or mapping
/// form) to `{implementation, inputs, executor?, max_retries?,
/// retry_interval?}`.
fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let mut m = Map::new();
            m.insert("implementation".to_string(), Value::String(s.clone()));
            m.insert("inputs".to_string(), Value::Object(Map::new()));
            Value::Object(m)
        }
        Value::Object(o) => {
            let mut m = o.clone();
            m.entry("inputs".to_string()).or_insert_with(|| Value::Object(Map::new()));
            Value::Object(m)
        }
        other => other.clone(),
    }
}

/// Merges a type-side and an instance-side declaration of the same
/// operation: instance `implementation` replaces the type's, inputs
/// merge with instance taking precedence, and executor/retry settings
/// carry from whichever side overrides them (§4.3).
pub fn merge_operation(type_side: Option<&Value>, instance_side: Option<&Value>) -> Value {
    let type_norm = type_side.map(normalize).unwrap_or_else(|| Value::Object(Map::new()));
    let Some(instance_side) = instance_side else { return type_norm };
    let instance_norm = normalize(instance_side);

    let mut merged = type_norm.as_object().cloned().unwrap_or_default();
    let instance_obj = instance_norm.as_object().cloned().unwrap_or_default();

    if let Some(implementation) = instance_obj.get("implementation") {
        merged.insert("implementation".to_string(), implementation.clone());
    }

    let mut inputs = merged.get("inputs").and_then(Value::as_object).cloned().unwrap_or_default();
    if let Some(instance_inputs) = instance_obj.get("inputs").and_then(Value::as_object) {
        for (k, v) in instance_inputs {
            inputs.insert(k.clone(), v.clone());
        }
    }
    merged.insert("inputs".to_string(), Value::Object(inputs));

    for field in ["executor", "max_retries", "retry_interval"] {
        if let Some(v) = instance_obj.get(field) {
            merged.insert(field.to_string(), v.clone());
        }
    }
    Value::Object(merged)
}

/// Merges two whole interface maps (`{interface_name: {op_name: decl}}`),
/// type-side as the base, instance-side overriding per operation.
pub fn merge_interface_maps(
    type_interfaces: &Map<String, Value>,
    instance_interfaces: &Map<String, Value>,
) -> Map<String, Value> {
    let mut names: Vec<&String> = type_interfaces.keys().collect();
    for k in instance_interfaces.keys() {
        if !names.contains(&k) {
            names.push(k);
        }
    }

    let mut result = Map::new();
    for interface_name in names {
        let type_ops = type_interfaces.get(interface_name).and_then(Value::as_object);
        let instance_ops = instance_interfaces.get(interface_name).and_then(Value::as_object);

        let mut op_names: Vec<&String> = type_ops.map(|o| o.keys().collect()).unwrap_or_default();
        if let Some(instance_ops) = instance_ops {
            for k in instance_ops.keys() {
                if !op_names.contains(&k) {
                    op_names.push(k);
                }
            }
        }

        let mut ops = Map::new();
        for op_name in op_names {
            let type_decl = type_ops.and_then(|o| o.get(op_name));
            let instance_decl = instance_ops.and_then(|o| o.get(op_name));
            ops.insert(op_name.clone(), merge_operation(type_decl, instance_decl));
        }
        result.insert(interface_name.clone(), Value::Object(ops));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_shorthand_normalizes() {
        let merged = merge_operation(Some(&json!("plugin.task")), None);
        assert_eq!(merged["implementation"], "plugin.task");
        assert_eq!(merged["inputs"], json!({}));
    }

    #[test]
    fn instance_inputs_override_type_inputs() {
        let type_side = json!({"implementation": "p.t", "inputs": {"a": 1, "b": 2}});
        let instance_side = json!({"inputs": {"b": 3}});
        let merged = merge_operation(Some(&type_side), Some(&instance_side));
        assert_eq!(merged["inputs"], json!({"a": 1, "b": 3}));
        assert_eq!(merged["implementation"], "p.t");
    }

    #[test]
    fn merging_with_empty_override_equals_type_interfaces() {
        let mut type_ifaces = Map::new();
        type_ifaces.insert("lifecycle".to_string(), json!({"create": "p.create"}));
        let merged = merge_interface_maps(&type_ifaces, &Map::new());
        assert_eq!(merged["lifecycle"]["create"]["implementation"], "p.create");
    }
}
