//! `data_types` (§4.3): user-defined complex property types, resolved
//! via the shared [`crate::hierarchy`] machinery.

use crate::hierarchy::{read_raw_types, resolve_hierarchy, ResolvedType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::element::{Bindings, ElementBehavior, ElementId, Shape};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::Node;

#[derive(Debug, Default)]
pub struct DataTypesElement;

impl DataTypesElement {
    fn resolve(&self, node: Option<&Node>) -> Result<HashMap<String, ResolvedType>, DocumentError> {
        let Some(node) = node else { return Ok(HashMap::new()) };
        let raw = read_raw_types(node);
        resolve_hierarchy(&raw, &ElementPath::root().child("data_types"))
    }
}

impl ElementBehavior for DataTypesElement {
    fn id(&self) -> ElementId {
        ElementId::DataTypes
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
