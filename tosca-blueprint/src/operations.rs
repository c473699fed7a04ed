//! Operation compilation (§4.5): turns one already-merged interface
//! operation declaration into an executable [`Operation`] record.

use serde_json::{Map, Value};
use tosca_core::error::DocumentError;
use tosca_core::functions::FunctionRegistry;
use tosca_core::path::ElementPath;
use tosca_core::value::Location;

/// Name under which script-backed implementations (no declared plugin,
/// a path ending in a recognized script extension) are recorded.
pub const SCRIPT_PLUGIN_NAME: &str = "script";
pub const DEFAULT_EXECUTOR: &str = "local";
const SCRIPT_EXTENSIONS: &[&str] = &["py", "sh", "rb", "ps1"];

/// Default "unknown plugin" code for a context that is neither a node
/// template's own interfaces nor a relationship's (e.g. workflows) —
/// node-template and relationship contexts instead thread their own
/// contracted code (10, 19) in through `unknown_plugin_code`.
pub const ERR_UNKNOWN_PLUGIN: u32 = 13;
pub const ERR_MALFORMED_IMPLEMENTATION: u32 = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub plugin: Option<String>,
    pub operation: String,
    pub inputs: Map<String, Value>,
    pub executor: String,
    pub max_retries: Option<i64>,
    pub retry_interval: Option<f64>,
    pub has_intrinsic_functions: bool,
    pub script_path: Option<String>,
}

impl Operation {
    fn noop() -> Self {
        Self {
            plugin: None,
            operation: String::new(),
            inputs: Map::new(),
            executor: DEFAULT_EXECUTOR.to_string(),
            max_retries: None,
            retry_interval: None,
            has_intrinsic_functions: false,
            script_path: None,
        }
    }
}

/// Compiles a normalized operation declaration (already merged type ⊕
/// instance via [`crate::interfaces::merge_operation`]).
pub fn compile(
    declaration: &Value,
    known_plugins: &[String],
    is_workflow: bool,
    functions: &FunctionRegistry,
    path: &ElementPath,
    unknown_plugin_code: u32,
) -> Result<Operation, DocumentError> {
    let obj = declaration.as_object().cloned().unwrap_or_default();
    let implementation = obj.get("implementation").and_then(Value::as_str).unwrap_or("");
    if implementation.is_empty() {
        return Ok(Operation::noop());
    }

    let inputs = obj.get("inputs").and_then(Value::as_object).cloned().unwrap_or_default();
    let has_intrinsic_functions = inputs.values().any(|v| functions.is_intrinsic(v));
    let executor = obj.get("executor").and_then(Value::as_str).unwrap_or(DEFAULT_EXECUTOR).to_string();
    let max_retries = obj.get("max_retries").and_then(Value::as_i64);
    let retry_interval = obj.get("retry_interval").and_then(Value::as_f64);

    let is_script = implementation
        .rsplit('.')
        .next()
        .map(|ext| SCRIPT_EXTENSIONS.contains(&ext))
        .unwrap_or(false);

    if is_script {
        let run_task = if is_workflow { "execute_workflow" } else { "run" };
        return Ok(Operation {
            plugin: Some(SCRIPT_PLUGIN_NAME.to_string()),
            operation: run_task.to_string(),
            inputs,
            executor,
            max_retries,
            retry_interval,
            has_intrinsic_functions,
            script_path: Some(implementation.to_string()),
        });
    }

    let Some(dot) = implementation.rfind('.') else {
        return Err(DocumentError::logic(
            ERR_MALFORMED_IMPLEMENTATION,
            format!("implementation '{implementation}' must be of the form 'plugin.task'"),
            path.clone(),
            Location::NONE,
        ));
    };
    let plugin_name = &implementation[..dot];
    let task_name = &implementation[dot + 1..];

    if !known_plugins.iter().any(|p| p == plugin_name) {
        return Err(DocumentError::logic(
            unknown_plugin_code,
            format!("unknown plugin '{plugin_name}'"),
            path.clone(),
            Location::NONE,
        ));
    }

    Ok(Operation {
        plugin: Some(plugin_name.to_string()),
        operation: task_name.to_string(),
        inputs,
        executor,
        max_retries,
        retry_interval,
        has_intrinsic_functions,
        script_path: None,
    })
}

/// Compiles every operation in a merged interface map, emitting each
/// record under its qualified `interface.operation` key always, and
/// additionally under its bare `operation` key unless that bare name is
/// ambiguous across interfaces (§3, §4.5, §8).
pub fn compile_interface_map(
    interfaces: &Map<String, Value>,
    known_plugins: &[String],
    is_workflow: bool,
    functions: &FunctionRegistry,
    path: &ElementPath,
    unknown_plugin_code: u32,
) -> Result<Map<String, Value>, DocumentError> {
    let mut qualified: Vec<(String, String, Operation)> = Vec::new();
    for (interface_name, ops) in interfaces {
        let Some(ops) = ops.as_object() else { continue };
        for (op_name, decl) in ops {
            let compiled = compile(
                decl,
                known_plugins,
                is_workflow,
                functions,
                &path.child(interface_name).child(op_name),
                unknown_plugin_code,
            )?;
            qualified.push((interface_name.clone(), op_name.clone(), compiled));
        }
    }

    let mut bare_counts: Map<String, Value> = Map::new();
    for (_, op_name, _) in &qualified {
        let count = bare_counts.entry(op_name.clone()).or_insert_with(|| Value::from(0));
        *count = Value::from(count.as_i64().unwrap_or(0) + 1);
    }

    let mut result = Map::new();
    for (interface_name, op_name, compiled) in &qualified {
        let serialized = operation_to_value(compiled);
        result.insert(format!("{interface_name}.{op_name}"), serialized.clone());
        if bare_counts.get(op_name).and_then(Value::as_i64) == Some(1) {
            result.insert(op_name.clone(), serialized);
        }
    }
    Ok(result)
}

fn operation_to_value(op: &Operation) -> Value {
    let mut m = Map::new();
    m.insert("plugin".to_string(), op.plugin.clone().map_or(Value::Null, Value::String));
    m.insert("operation".to_string(), Value::String(op.operation.clone()));
    m.insert("inputs".to_string(), Value::Object(op.inputs.clone()));
    m.insert("executor".to_string(), Value::String(op.executor.clone()));
    m.insert("max_retries".to_string(), op.max_retries.map_or(Value::Null, Value::from));
    m.insert("retry_interval".to_string(), op.retry_interval.map_or(Value::Null, Value::from));
    m.insert("has_intrinsic_functions".to_string(), Value::Bool(op.has_intrinsic_functions));
    m.insert("script_path".to_string(), op.script_path.clone().map_or(Value::Null, Value::String));
    Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_implementation_is_a_noop() {
        let op = compile(
            &json!({"implementation": ""}),
            &[],
            false,
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
            ERR_UNKNOWN_PLUGIN,
        )
        .unwrap();
        assert!(op.plugin.is_none());
    }

    #[test]
    fn unknown_plugin_is_rejected_with_the_threaded_code() {
        let err = compile(
            &json!({"implementation": "nope.task"}),
            &[],
            false,
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
            19,
        )
        .unwrap_err();
        assert_eq!(err.code, 19);
    }

    #[test]
    fn script_implementation_fills_script_path() {
        let op = compile(
            &json!({"implementation": "scripts/configure.py"}),
            &[],
            false,
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
            ERR_UNKNOWN_PLUGIN,
        )
        .unwrap();
        assert_eq!(op.plugin.as_deref(), Some(SCRIPT_PLUGIN_NAME));
        assert_eq!(op.script_path.as_deref(), Some("scripts/configure.py"));
        assert_eq!(op.operation, "run");
    }

    #[test]
    fn bare_name_collision_across_interfaces_drops_bare_entry() {
        let mut interfaces = Map::new();
        interfaces.insert("lifecycle".to_string(), json!({"start": "p.start"}));
        interfaces.insert("custom".to_string(), json!({"start": "p.start2"}));
        let plugins = vec!["p".to_string()];
        let compiled = compile_interface_map(
            &interfaces,
            &plugins,
            false,
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
            ERR_UNKNOWN_PLUGIN,
        )
        .unwrap();
        assert!(compiled.contains_key("lifecycle.start"));
        assert!(compiled.contains_key("custom.start"));
        assert!(!compiled.contains_key("start"));
    }

    #[test]
    fn unique_bare_name_survives() {
        let mut interfaces = Map::new();
        interfaces.insert("lifecycle".to_string(), json!({"start": "p.start"}));
        let plugins = vec!["p".to_string()];
        let compiled = compile_interface_map(
            &interfaces,
            &plugins,
            false,
            &FunctionRegistry::with_builtins(),
            &ElementPath::root(),
            ERR_UNKNOWN_PLUGIN,
        )
        .unwrap();
        assert!(compiled.contains_key("start"));
        assert!(compiled.contains_key("lifecycle.start"));
    }
}
