//! `inputs` (§4.3): a dict of `{type?, default?, description?}` schemas,
//! validated against caller-supplied input values when `parse` runs.

use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::{Location, Node};

pub const ERR_MISSING_REQUIRED_INPUT: u32 = 107;

#[derive(Debug, Default)]
pub struct InputsElement;

impl ElementBehavior for InputsElement {
    fn id(&self) -> ElementId {
        ElementId::Inputs
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        let Some(mapping) = node.as_mapping() else {
            return Err(DocumentError::format(
                1,
                "inputs must be a mapping",
                ElementPath::root().child("inputs"),
                node.location().clone(),
            ));
        };
        for (name, entry) in mapping {
            if entry.as_mapping().is_none() && !entry.is_null() {
                return Err(DocumentError::format(
                    1,
                    format!("input '{name}' must be a mapping of type/default/description"),
                    ElementPath::root().child("inputs").child(name),
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

/// Checks caller-supplied input values against the `inputs` schema:
/// every input without a default must be supplied (§8 "required input
/// missing").
pub fn validate_supplied_inputs(
    schema: &Map<String, Value>,
    supplied: &Map<String, Value>,
) -> Result<(), DocumentError> {
    for (name, decl) in schema {
        let has_default = decl.as_object().map(|o| o.contains_key("default")).unwrap_or(false);
        if !has_default && !supplied.contains_key(name) {
            return Err(DocumentError::logic(
                ERR_MISSING_REQUIRED_INPUT,
                format!("required input '{name}' was not supplied"),
                ElementPath::root().child("inputs").child(name),
                Location::NONE,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_input_is_rejected() {
        let mut schema = Map::new();
        schema.insert("port".to_string(), json!({"type": "integer"}));
        let err = validate_supplied_inputs(&schema, &Map::new());
        assert!(err.is_err());
    }

    #[test]
    fn defaulted_input_need_not_be_supplied() {
        let mut schema = Map::new();
        schema.insert("port".to_string(), json!({"type": "integer", "default": 80}));
        assert!(validate_supplied_inputs(&schema, &Map::new()).is_ok());
    }
}
