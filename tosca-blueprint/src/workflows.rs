//! `workflows` (§4.3): workflow declarations, surfaced verbatim; their
//! `mapping` entry is compiled the same way node operations are,
//! anchored to the deployment rather than a node (§4.5 "workflow
//! context").

use crate::interfaces::merge_operation;
use crate::operations::{compile, ERR_UNKNOWN_PLUGIN};
use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::functions::FunctionRegistry;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct WorkflowsElement;

impl ElementBehavior for WorkflowsElement {
    fn id(&self) -> ElementId {
        ElementId::Workflows
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn requires(&self) -> &'static [ElementId] {
        &[ElementId::Plugins]
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        if node.as_mapping().is_none() {
            return Err(DocumentError::format(
                1,
                "workflows must be a mapping",
                ElementPath::root().child("workflows"),
                node.location().clone(),
            ));
        }
        Ok(())
    }

    fn parse(&self, node: Option<&Node>, bindings: &Bindings) -> Result<Value, DocumentError> {
        let Some(node) = node else { return Ok(Value::Object(Map::new())) };
        let known_plugins = crate::plugins::plugin_names(bindings);
        let functions = FunctionRegistry::with_builtins();
        let mut out = Map::new();
        let Some(mapping) = node.as_mapping() else { return Ok(Value::Object(out)) };
        for (name, entry) in mapping {
            let declaration = merge_operation(Some(&entry.restore()), None);
            let path = ElementPath::root().child("workflows").child(name);
            let op = compile(&declaration, &known_plugins, true, &functions, &path, ERR_UNKNOWN_PLUGIN)?;
            let mut record = Map::new();
            record.insert("plugin".to_string(), op.plugin.map_or(Value::Null, Value::String));
            record.insert("operation".to_string(), Value::String(op.operation));
            record.insert("inputs".to_string(), Value::Object(op.inputs));
            record.insert("executor".to_string(), Value::String(op.executor));
            out.insert(name.clone(), Value::Object(record));
        }
        Ok(Value::Object(out))
    }
}
