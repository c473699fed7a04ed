//! Registry of intrinsic-function names (`get_input`, `get_attribute`,
//! `concat`, …). The engine never evaluates these — it only recognizes
//! them so that property/input merging can preserve them verbatim
//! (§4.7, §9 "Deferred intrinsic functions").

use serde_json::Value;
use std::collections::HashMap;

/// A registered intrinsic function. `validate` is given the raw argument
/// value (whatever followed the function name in `{name: args}`) and may
/// reject malformed arguments; evaluation itself is out of scope (§1).
pub trait Function: std::fmt::Debug {
    fn validate(&self, args: &Value) -> Result<(), String>;
}

/// A function accepting any argument shape without validation — the
/// default used by built-in intrinsic function names unless an
/// extension replaces them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyArgs;
impl Function for AnyArgs {
    fn validate(&self, _args: &Value) -> Result<(), String> {
        Ok(())
    }
}

/// A registry mapping an intrinsic-function name to its descriptor.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn Function>>,
}

pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "get_input",
    "get_property",
    "get_attribute",
    "get_secret",
    "concat",
];

impl FunctionRegistry {
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        for name in BUILTIN_FUNCTIONS {
            registry.add(*name, Box::new(AnyArgs));
        }
        registry
    }

    pub fn add(&mut self, name: impl Into<String>, function: Box<dyn Function>) {
        self.functions.insert(name.into(), function);
    }

    pub fn remove(&mut self, name: &str) {
        self.functions.remove(name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(AsRef::as_ref)
    }

    /// If `value` is a single-entry mapping whose key names a registered
    /// function, returns that (name, args) pair. Otherwise returns `None`
    /// and the value should be treated as ordinary data.
    #[must_use]
    pub fn recognize<'v>(&self, value: &'v Value) -> Option<(&'v str, &'v Value)> {
        let obj = value.as_object()?;
        if obj.len() != 1 {
            return None;
        }
        let (name, args) = obj.iter().next()?;
        self.get(name).map(|_| (name.as_str(), args))
    }

    /// Whether `value` looks like an invocation of a known intrinsic
    /// function. Property/input merging uses this to skip type validation
    /// and defaulting over such values (§4.3, §9).
    #[must_use]
    pub fn is_intrinsic(&self, value: &Value) -> bool {
        self.recognize(value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_builtin_function_shape() {
        let registry = FunctionRegistry::with_builtins();
        let value = json!({"get_input": "port"});
        assert!(registry.is_intrinsic(&value));
        assert_eq!(registry.recognize(&value), Some(("get_input", &json!("port"))));
    }

    #[test]
    fn plain_data_is_not_intrinsic() {
        let registry = FunctionRegistry::with_builtins();
        assert!(!registry.is_intrinsic(&json!({"host": "localhost"})));
        assert!(!registry.is_intrinsic(&json!("a string")));
    }

    #[test]
    fn removed_function_is_no_longer_recognized() {
        let mut registry = FunctionRegistry::with_builtins();
        registry.remove("concat");
        assert!(!registry.is_intrinsic(&json!({"concat": []})));
    }
}
