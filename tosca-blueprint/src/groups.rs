//! `groups` (§4.3): named groupings of node template members, surfaced
//! verbatim — no type hierarchy of their own in this dialect.

use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct GroupsElement;

impl ElementBehavior for GroupsElement {
    fn id(&self) -> ElementId {
        ElementId::Groups
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        if node.as_mapping().is_none() {
            return Err(DocumentError::format(
                1,
                "groups must be a mapping",
                ElementPath::root().child("groups"),
                node.location().clone(),
            ));
        }
        Ok(())
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        Ok(node.map(Node::restore).unwrap_or_else(|| Value::Object(Map::new())))
    }
}
