//! `plugins` (§4.3): declared plugin packages, surfaced as a flat name
//! list for operation compilation and as a verbatim dict on the plan.

use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct PluginsElement;

impl ElementBehavior for PluginsElement {
    fn id(&self) -> ElementId {
        ElementId::Plugins
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        if node.as_mapping().is_none() {
            return Err(DocumentError::format(
                1,
                "plugins must be a mapping",
                ElementPath::root().child("plugins"),
                node.location().clone(),
            ));
        }
        Ok(())
    }

    fn calculate_provided(&self, node: Option<&Node>, _bindings: &Bindings) -> Value {
        let names: Vec<Value> = node
            .and_then(Node::as_mapping)
            .map(|m| m.keys().cloned().map(Value::String).collect())
            .unwrap_or_default();
        Value::Array(names)
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        Ok(node.map(Node::restore).unwrap_or_else(|| Value::Object(Map::new())))
    }
}

/// Reads the flat list of declared plugin names out of the provided
/// binding for [`ElementId::Plugins`].
#[must_use]
pub fn plugin_names(bindings: &Bindings) -> Vec<String> {
    bindings
        .get(ElementId::Plugins.key())
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}
