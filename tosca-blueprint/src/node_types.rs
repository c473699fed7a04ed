//! `node_types` (§4.3): node type declarations, resolved via
//! [`crate::hierarchy`].

use crate::hierarchy::{read_raw_types, resolve_hierarchy, ResolvedType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

/// Node types within this ancestry are treated as compute/host nodes:
/// a template of this type (or a descendant) is its own `host_id`
/// (§4.4 step 4).
pub const HOST_NODE_TYPES: &[&str] = &["tosca.nodes.Compute"];

#[derive(Debug, Default)]
pub struct NodeTypesElement;

impl NodeTypesElement {
    fn resolve(&self, node: Option<&Node>) -> Result<HashMap<String, ResolvedType>, DocumentError> {
        let Some(node) = node else { return Ok(HashMap::new()) };
        let raw = read_raw_types(node);
        resolve_hierarchy(&raw, &ElementPath::root().child("node_types"))
    }
}

impl ElementBehavior for NodeTypesElement {
    fn id(&self) -> ElementId {
        ElementId::NodeTypes
    }

    fn shape(&self) -> Shape {
        Shape::Dict
    }

    fn validate(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
        self.resolve(node).map(|_| ())
    }

    fn calculate_provided(&self, node: Option<&Node>, _bindings: &Bindings) -> Value {
        let resolved = self.resolve(node).unwrap_or_default();
        serde_json::to_value(resolved).unwrap_or(Value::Null)
    }

    fn parse(&self, node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
        let resolved = self.resolve(node)?;
        let mut out = Map::new();
        for (name, t) in resolved {
            out.insert(name, serde_json::to_value(t).unwrap_or(Value::Null));
        }
        Ok(Value::Object(out))
    }
}

/// Whether `type_hierarchy` names this template a host/compute node
/// (§4.4 step 4).
#[must_use]
pub fn is_host_type(type_hierarchy: &[String]) -> bool {
    type_hierarchy.iter().any(|t| HOST_NODE_TYPES.contains(&t.as_str()))
}
