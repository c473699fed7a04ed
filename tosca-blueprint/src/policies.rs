//! `policies`, `policy_types`, `policy_triggers`: shape-only
//! dict-of-definition sections with no type-hierarchy merge of their
//! own, surfaced verbatim on the plan.
//!
//! Only `policies` participates in the element DAG as [`PoliciesElement`]
//! (so it takes part in the version gate); `policy_types` and
//! `policy_triggers` are read directly off the merged document by
//! [`read_verbatim_dict`] since they have no dependents and no
//! dependencies of their own.

use serde_json::{Map, Value};
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct PoliciesElement;

impl ElementBehavior for PoliciesElement {
    fn id(&self) -> ElementId {
        ElementId::Policies
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        let Some(node) = node else { return Ok(()) };
        if node.as_mapping().is_none() {
            return Err(DocumentError::format(
                1,
                "policies must be a mapping",
                ElementPath::root().child("policies"),
                node.location().clone(),
            ));
        }
        Ok(())
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        Ok(node.map(Node::restore).unwrap_or_else(|| Value::Object(Map::new())))
    }
}

/// Reads a top-level dict-shaped section straight off the merged
/// document tree, with no schema or hierarchy applied.
#[must_use]
pub fn read_verbatim_dict(node: Option<&Node>) -> Value {
    node.map(Node::restore).unwrap_or_else(|| Value::Object(Map::new()))
}
