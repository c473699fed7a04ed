//! `relationships` (§4.3): relationship type declarations, resolved via
//! [`crate::hierarchy`].

use crate::hierarchy::{read_raw_types, resolve_hierarchy, ResolvedType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

/// The distinguished relationship type that makes its target the
/// hosting node of its source (§4.4, GLOSSARY "HostedOn").
pub const HOSTED_ON: &str = "tosca.relationships.HostedOn";

#[derive(Debug, Default)]
pub struct RelationshipsElement;

impl RelationshipsElement {
    fn resolve(&self, node: Option<&Node>) -> Result<HashMap<String, ResolvedType>, DocumentError> {
        let Some(node) = node else { return Ok(HashMap::new()) };
        let raw = read_raw_types(node);
        resolve_hierarchy(&raw, &ElementPath::root().child("relationships"))
    }
}

impl ElementBehavior for RelationshipsElement {
    fn id(&self) -> ElementId {
        ElementId::Relationships
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

/// Whether a relationship's resolved `type_hierarchy` is a `HostedOn`
/// relationship (§4.4 invariant: at most one per node).
#[must_use]
pub fn is_hosted_on(type_hierarchy: &[String]) -> bool {
    type_hierarchy.iter().any(|t| t == HOSTED_ON)
}
