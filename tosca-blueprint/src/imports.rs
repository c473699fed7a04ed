//! Import graph merging (§4.6): a pre-pass over raw document trees, run
//! before any element is instantiated. Not a DAG participant — by the
//! time the element framework sees a document, every `imports` entry
//! has already been resolved and folded in.

use serde_json::Value;
use std::collections::HashSet;
use tosca_core::error::{DocumentError, Error};
use tosca_core::path::ElementPath;
use tosca_core::resolve::Resolve;
use tosca_core::value::{Location, Node};

pub const ERR_VERSION_MISMATCH: u32 = 2;
pub const ERR_INCOMPATIBLE_REDEFINITION: u32 = 3;

/// A document loader: turns raw text into a location-aware tree. Kept
/// abstract here so the merge logic doesn't depend on a particular YAML
/// library (the facade crate supplies the real one).
pub trait Load {
    fn load(&self, text: &str, filename: Option<&str>) -> Result<Node, DocumentError>;
}

/// Recursively resolves and merges `imports`, starting from `root`,
/// detecting cycles by reference identity and rejecting documents whose
/// declared version disagrees with the root's.
pub fn merge_imports(root: Node, resolver: &dyn Resolve, loader: &dyn Load) -> Result<Node, Error> {
    let mut seen = HashSet::new();
    let root_version = root
        .as_mapping()
        .and_then(|m| m.get("tosca_definitions_version"))
        .map(Node::restore);
    merge_one(root, resolver, loader, &mut seen, &root_version, &[])
}

fn merge_one(
    mut doc: Node,
    resolver: &dyn Resolve,
    loader: &dyn Load,
    seen: &mut HashSet<String>,
    root_version: &Option<Value>,
    chain: &[String],
) -> Result<Node, Error> {
    let Node::Mapping(mapping, location) = doc.clone() else { return Ok(doc) };

    if let Some(version) = mapping.get("tosca_definitions_version") {
        if let Some(root_version) = root_version {
            let this_version = version.restore();
            if &this_version != root_version {
                return Err(DocumentError::logic(
                    ERR_VERSION_MISMATCH,
                    format!("imported document declares version {this_version} but root declares {root_version}"),
                    ElementPath::root().child("tosca_definitions_version"),
                    version.location().clone(),
                )
                .into());
            }
        }
    }

    let import_refs: Vec<String> = mapping
        .get("imports")
        .and_then(Node::as_sequence)
        .map(|seq| seq.iter().filter_map(Node::as_scalar).filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let mut merged = mapping.clone();
    merged.shift_remove("imports");

    for reference in import_refs {
        if chain.iter().any(|r| r == &reference) || reference == "<root>" {
            return Err(DocumentError::logic(
                4,
                format!("cyclic import: {} -> {reference}", chain.join(" -> ")),
                ElementPath::root().child("imports"),
                Location::NONE,
            )
            .into());
        }
        if !seen.insert(reference.clone()) {
            continue;
        }

        tracing::debug!(%reference, "resolving import");
        let text = resolver.resolve(&reference)?;
        let imported_doc = loader.load(&text, Some(&reference))?;
        let mut next_chain = chain.to_vec();
        next_chain.push(reference.clone());
        let imported = merge_one(imported_doc, resolver, loader, seen, root_version, &next_chain)?;

        let Node::Mapping(imported_mapping, _) = imported else { continue };
        for (key, value) in imported_mapping {
            merge_key(&mut merged, key, value)?;
        }
    }

    doc = Node::Mapping(merged, location);
    Ok(doc)
}

/// Folds one imported top-level key into the accumulator: disjoint keys
/// are unioned in; colliding Dict-of-definition keys merge entry by
/// entry, rejecting incompatible redefinitions while accepting
/// byte-identical ones (§9 "Open questions").
fn merge_key(into: &mut tosca_core::value::Mapping, key: String, value: Node) -> Result<(), Error> {
    let Some(existing) = into.get(&key).cloned() else {
        into.insert(key, value);
        return Ok(());
    };

    match (&existing, &value) {
        (Node::Mapping(existing_map, _), Node::Mapping(incoming_map, loc)) => {
            let mut merged = existing_map.clone();
            for (name, def) in incoming_map {
                match merged.get(name) {
                    None => {
                        merged.insert(name.clone(), def.clone());
                    }
                    Some(current) => {
                        if current.restore() != def.restore() {
                            return Err(DocumentError::logic(
                                ERR_INCOMPATIBLE_REDEFINITION,
                                format!("'{key}.{name}' is redefined incompatibly by an import"),
                                ElementPath::root().child(&key).child(name),
                                def.location().clone(),
                            )
                            .into());
                        }
                    }
                }
            }
            into.insert(key, Node::Mapping(merged, loc.clone()));
            Ok(())
        }
        (Node::Sequence(existing_seq, loc), Node::Sequence(incoming_seq, _)) => {
            let mut merged = existing_seq.clone();
            merged.extend(incoming_seq.iter().cloned());
            into.insert(key, Node::Sequence(merged, loc.clone()));
            Ok(())
        }
        _ => {
            if existing.restore() == value.restore() {
                Ok(())
            } else {
                Err(DocumentError::logic(
                    ERR_INCOMPATIBLE_REDEFINITION,
                    format!("'{key}' is redefined incompatibly by an import"),
                    ElementPath::root().child(&key),
                    value.location().clone(),
                )
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tosca_core::resolve::NotResolvable;

    struct StaticLoader;
    impl Load for StaticLoader {
        fn load(&self, text: &str, _filename: Option<&str>) -> Result<Node, DocumentError> {
            let value: Value = serde_json::from_str(text).unwrap();
            Ok(Node::from_object(&value))
        }
    }

    #[derive(Debug)]
    struct MapResolver(std::collections::HashMap<String, String>);
    impl Resolve for MapResolver {
        fn resolve(&self, reference: &str) -> Result<String, NotResolvable> {
            self.0.get(reference).cloned().ok_or_else(|| NotResolvable::new(reference, "not found"))
        }
    }

    #[test]
    fn disjoint_keys_are_unioned() {
        let root = Node::from_object(&json!({
            "tosca_definitions_version": "1.0",
            "imports": ["a.yaml"],
            "inputs": {"x": {}}
        }));
        let mut imports = std::collections::HashMap::new();
        imports.insert(
            "a.yaml".to_string(),
            json!({"tosca_definitions_version": "1.0", "outputs": {"y": {"value": 1}}}).to_string(),
        );
        let merged = merge_imports(root, &MapResolver(imports), &StaticLoader).unwrap();
        let restored = merged.restore();
        assert!(restored.get("inputs").is_some());
        assert!(restored.get("outputs").is_some());
    }

    #[test]
    fn import_cycle_is_rejected() {
        let root = Node::from_object(&json!({
            "tosca_definitions_version": "1.0",
            "imports": ["a.yaml"]
        }));
        let mut imports = std::collections::HashMap::new();
        imports.insert(
            "a.yaml".to_string(),
            json!({"tosca_definitions_version": "1.0", "imports": ["root.yaml"]}).to_string(),
        );
        imports.insert(
            "root.yaml".to_string(),
            json!({"tosca_definitions_version": "1.0", "imports": ["a.yaml"]}).to_string(),
        );
        let err = merge_imports(root, &MapResolver(imports), &StaticLoader);
        assert!(err.is_err());
    }

    #[test]
    fn incompatible_redefinition_is_rejected() {
        let root = Node::from_object(&json!({
            "tosca_definitions_version": "1.0",
            "imports": ["a.yaml"],
            "node_types": {"A": {"derived_from": "tosca.nodes.Root"}}
        }));
        let mut imports = std::collections::HashMap::new();
        imports.insert(
            "a.yaml".to_string(),
            json!({"tosca_definitions_version": "1.0", "node_types": {"A": {"derived_from": "tosca.nodes.Other"}}}).to_string(),
        );
        let err = merge_imports(root, &MapResolver(imports), &StaticLoader);
        assert!(err.is_err());
    }

    #[test]
    fn byte_identical_redefinition_is_accepted() {
        let root = Node::from_object(&json!({
            "tosca_definitions_version": "1.0",
            "imports": ["a.yaml"],
            "node_types": {"A": {"derived_from": "tosca.nodes.Root"}}
        }));
        let mut imports = std::collections::HashMap::new();
        imports.insert(
            "a.yaml".to_string(),
            json!({"tosca_definitions_version": "1.0", "node_types": {"A": {"derived_from": "tosca.nodes.Root"}}}).to_string(),
        );
        let merged = merge_imports(root, &MapResolver(imports), &StaticLoader).unwrap();
        assert!(merged.restore().get("node_types").is_some());
    }
}
