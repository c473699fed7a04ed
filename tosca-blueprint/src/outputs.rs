//! `outputs` (§4.3): a dict of `{value, description?}`.

use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct OutputsElement;

impl ElementBehavior for OutputsElement {
    fn id(&self) -> ElementId {
        ElementId::Outputs
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        let Some(mapping) = node.as_mapping() else {
            return Err(DocumentError::format(
                1,
                "outputs must be a mapping",
                ElementPath::root().child("outputs"),
                node.location().clone(),
            ));
        };
        for (name, entry) in mapping {
            let has_value = entry.as_mapping().map(|m| m.contains_key("value")).unwrap_or(false);
            if !has_value {
                return Err(DocumentError::format(
                    1,
                    format!("output '{name}' must declare 'value'"),
                    ElementPath::root().child("outputs").child(name),
                    entry.location().clone(),
                ));
            }
        }
        Ok(())
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        Ok(node.map(Node::restore).unwrap_or_else(|| Value::Object(Map::new())))
    }
}
