//! `tosca_definitions_version` (§4.3): a required leaf scalar, parsed
//! into a numeric ordinal used by the version gate.

use serde_json::Value;
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::{as_version_ordinal, Node};

#[derive(Debug, Default)]
pub struct VersionElement;

impl ElementBehavior for VersionElement {
    fn id(&self) -> ElementId {
        ElementId::Version
    }

    fn shape(&self) -> Shape {
        Shape::Leaf
    }

    fn required(&self) -> bool {
        true
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        if as_version_ordinal(node).is_none() {
            return Err(DocumentError::format(
                1,
                "tosca_definitions_version must be a recognizable version identifier",
                ElementPath::root().child("tosca_definitions_version"),
                node.location().clone(),
            ));
        }
        Ok(())
    }

    fn calculate_provided(&self, node: Option<&Node>, _bindings: &Bindings) -> Value {
        node.and_then(as_version_ordinal).map(Value::from).unwrap_or(Value::Null)
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        Ok(node.map(Node::restore).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provides_the_parsed_ordinal() {
        let node = Node::from_object(&Value::from("1.1"));
        let behavior = VersionElement;
        let bindings = Bindings::new();
        assert_eq!(behavior.calculate_provided(Some(&node), &bindings), Value::from(1.1));
    }
}
