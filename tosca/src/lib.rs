//! Public facade (§6): `parse` a blueprint document (text or a path to
//! one) into a fully-elaborated [`Plan`], optionally `extend`-ing the
//! engine with element/function replacements first.

pub mod loader;
pub mod resolver;

pub use tosca_blueprint::{NodeTemplateOutput, Plan, PluginRef, RelationshipOutput};
pub use tosca_core::error::Error;
pub use tosca_core::extend::{ElementExtension, FunctionAction, FunctionExtension};
pub use tosca_core::resolve::Resolve;

use loader::YamlLoader;
use resolver::DefaultResolver;
use std::path::Path;
use tosca_blueprint::imports::{merge_imports, Load};
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::{Location, Node};

/// Parses `text_or_path` (literal YAML text, or a path to a file
/// containing it) into a [`Plan`], applying no extensions.
pub fn parse(text_or_path: &str, resolver: Option<&dyn Resolve>, validate_version: bool) -> Result<Plan, Error> {
    parse_with_extensions(text_or_path, resolver, validate_version, Vec::new(), Vec::new())
}

/// Like [`parse`], additionally registering `element_extensions` and
/// `function_extensions` before traversal (§6 `extend`).
pub fn parse_with_extensions(
    text_or_path: &str,
    resolver: Option<&dyn Resolve>,
    validate_version: bool,
    element_extensions: Vec<ElementExtension>,
    function_extensions: Vec<FunctionExtension>,
) -> Result<Plan, Error> {
    let text = read_text(text_or_path)?;

    let loader = YamlLoader;
    let default_resolver = DefaultResolver;
    let resolver: &dyn Resolve = resolver.unwrap_or(&default_resolver);

    let root: Node = loader.load(&text, None)?;
    let merged = merge_imports(root, resolver, &loader)?;
    tosca_blueprint::elaborate(merged, element_extensions, function_extensions, validate_version)
}

fn read_text(text_or_path: &str) -> Result<String, Error> {
    if Path::new(text_or_path).is_file() {
        std::fs::read_to_string(text_or_path)
            .map_err(|e| DocumentError::format(1, format!("could not read '{text_or_path}': {e}"), ElementPath::root(), Location::NONE).into())
    } else {
        Ok(text_or_path.to_string())
    }
}
