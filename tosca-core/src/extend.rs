//! Extension descriptors for `extend()` (§4.2, §6): replacing a
//! registered element's behavior wholesale, or adding/removing/replacing
//! an intrinsic function.

use crate::element::{ElementBehavior, ElementId, Registry};
use crate::error::SchemaApiError;
use crate::functions::{Function, FunctionRegistry};

/// Replaces the [`ElementBehavior`] registered for `target` with
/// `replacement`. The only action supported at element granularity —
/// there is nothing to "add" or "remove" among a fixed set of top-level
/// sections.
pub struct ElementExtension {
    pub target: ElementId,
    pub replacement: Box<dyn ElementBehavior>,
}

impl ElementExtension {
    #[must_use]
    pub fn new(target: ElementId, replacement: Box<dyn ElementBehavior>) -> Self {
        Self { target, replacement }
    }

    pub fn apply(self, registry: &mut Registry) -> Result<(), SchemaApiError> {
        registry.replace(self.target, self.replacement)
    }
}

/// How a [`FunctionExtension`] changes the function registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionAction {
    Add,
    Remove,
    Replace,
}

/// Adds, removes, or replaces an intrinsic function recognized during
/// parsing (§4.7, §6).
pub struct FunctionExtension {
    pub action: FunctionAction,
    pub name: String,
    pub function: Option<Box<dyn Function>>,
}

impl FunctionExtension {
    #[must_use]
    pub fn add(name: impl Into<String>, function: Box<dyn Function>) -> Self {
        Self { action: FunctionAction::Add, name: name.into(), function: Some(function) }
    }

    #[must_use]
    pub fn remove(name: impl Into<String>) -> Self {
        Self { action: FunctionAction::Remove, name: name.into(), function: None }
    }

    #[must_use]
    pub fn replace(name: impl Into<String>, function: Box<dyn Function>) -> Self {
        Self { action: FunctionAction::Replace, name: name.into(), function: Some(function) }
    }

    pub fn apply(self, registry: &mut FunctionRegistry) {
        match self.action {
            FunctionAction::Add | FunctionAction::Replace => {
                registry.add(self.name, self.function.expect("add/replace carries a function"));
            }
            FunctionAction::Remove => registry.remove(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Bindings, Shape};
    use crate::error::DocumentError;
    use crate::value::Node;
    use serde_json::Value;

    #[derive(Debug)]
    struct Noop(ElementId);
    impl ElementBehavior for Noop {
        fn id(&self) -> ElementId {
            self.0
        }
        fn shape(&self) -> Shape {
            Shape::Dict
        }
        fn validate(&self, _node: Option<&Node>, _bindings: &Bindings) -> Result<(), DocumentError> {
            Ok(())
        }
        fn parse(&self, _node: Option<&Node>, _bindings: &Bindings) -> Result<Value, DocumentError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn replacing_an_unregistered_element_fails() {
        let mut registry = Registry::new();
        let ext = ElementExtension::new(ElementId::Inputs, Box::new(Noop(ElementId::Inputs)));
        assert!(ext.apply(&mut registry).is_err());
    }

    #[test]
    fn replacing_a_registered_element_succeeds() {
        let mut registry = Registry::new();
        registry.register(Box::new(Noop(ElementId::Inputs)));
        let ext = ElementExtension::new(ElementId::Inputs, Box::new(Noop(ElementId::Inputs)));
        assert!(ext.apply(&mut registry).is_ok());
    }

    #[test]
    fn function_extension_add_then_remove() {
        use crate::functions::AnyArgs;
        let mut registry = FunctionRegistry::with_builtins();
        FunctionExtension::add("custom_fn", Box::new(AnyArgs)).apply(&mut registry);
        assert!(registry.get("custom_fn").is_some());
        FunctionExtension::remove("custom_fn").apply(&mut registry);
        assert!(registry.get("custom_fn").is_none());
    }
}
