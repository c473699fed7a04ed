//! The element framework: a registry of [`ElementBehavior`]s for the
//! top-level sections of a blueprint document (`version`, `inputs`,
//! `node_types`, `node_templates`, …), wired together by a dependency
//! DAG and driven through validate → calculate_provided → parse phases
//! in topological order (§4.2).
//!
//! Intra-section structure (a node template's relationships, interfaces,
//! properties, …) is not modeled through this generic machinery — the
//! cross-references and the `extend`-ability the spec actually exercises
//! (§4.2's extension hooks, demonstrated by replacing a whole top-level
//! section) live at this granularity. See `tosca_blueprint::node_templates`
//! for the concretely-typed elaboration pass that does the rest.

use crate::error::{DocumentError, SchemaApiError, UnknownElementCtx};
use crate::graph::Dag;
use crate::value::Node;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Identifies one of the fixed top-level sections of a blueprint
/// document. `Imports` is deliberately absent: import resolution is a
/// pre-pass over raw documents (§4.6), not a participant in this DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ElementId {
    Version,
    Inputs,
    Outputs,
    DataTypes,
    NodeTypes,
    Relationships,
    Plugins,
    Workflows,
    Groups,
    Policies,
    NodeTemplates,
}

impl ElementId {
    /// The document key this section is read from.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ElementId::Version => "tosca_definitions_version",
            ElementId::Inputs => "inputs",
            ElementId::Outputs => "outputs",
            ElementId::DataTypes => "data_types",
            ElementId::NodeTypes => "node_types",
            ElementId::Relationships => "relationships",
            ElementId::Plugins => "plugins",
            ElementId::Workflows => "workflows",
            ElementId::Groups => "groups",
            ElementId::Policies => "policies",
            ElementId::NodeTemplates => "node_templates",
        }
    }
}

/// The shallow shape expected for a top-level section's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Dict,
}

/// Keyword-style bindings resolved from a section's dependencies and
/// passed into `validate`/`parse`, mirroring the Python engine's
/// keyword-argument binding of `requires` fields.
#[derive(Debug, Default, Clone)]
pub struct Bindings(HashMap<&'static str, Value>);

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, value: Value) {
        self.0.insert(field, value);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// Setup and execution hooks for one top-level section, mirroring the
/// Python `Element` class's `schema`/`required`/`requires`/`provides`
/// class attributes plus its `validate`/`calculate_provided`/`parse`
/// instance methods (§4.2).
pub trait ElementBehavior: fmt::Debug {
    fn id(&self) -> ElementId;
    fn shape(&self) -> Shape {
        Shape::Dict
    }
    fn required(&self) -> bool {
        false
    }
    /// Other sections that must have run `calculate_provided` before this
    /// one's `validate`/`parse`.
    fn requires(&self) -> &'static [ElementId] {
        &[]
    }
    /// Minimum document version (as an ordinal comparable with
    /// `PartialOrd`) this section requires. `None` means no gate.
    fn supported_version(&self) -> Option<f64> {
        None
    }

    /// Checks the node for semantic errors. `bindings` holds the
    /// `calculate_provided` output of every dependency declared via
    /// [`ElementBehavior::requires`].
    fn validate(&self, node: Option<&Node>, bindings: &Bindings) -> Result<(), DocumentError>;

    /// Produces the fields this section exposes to its dependents. Runs
    /// after `validate`, before `parse`.
    fn calculate_provided(&self, _node: Option<&Node>, _bindings: &Bindings) -> Value {
        Value::Null
    }

    /// Produces this section's contribution to the plan.
    fn parse(&self, node: Option<&Node>, bindings: &Bindings) -> Result<Value, DocumentError>;
}

/// A registry of [`ElementBehavior`]s, one per [`ElementId`]. `extend`
/// (§4.2, §6) replaces entries here before `run` is called.
#[derive(Debug, Default)]
pub struct Registry {
    behaviors: HashMap<ElementId, Box<dyn ElementBehavior>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, behavior: Box<dyn ElementBehavior>) {
        self.behaviors.insert(behavior.id(), behavior);
    }

    /// Replaces the behavior registered for `target`. Fails if nothing
    /// was registered for that id yet.
    pub fn replace(
        &mut self,
        target: ElementId,
        behavior: Box<dyn ElementBehavior>,
    ) -> Result<(), SchemaApiError> {
        if !self.behaviors.contains_key(&target) {
            return UnknownElementCtx { element: id_name(target) }.fail();
        }
        self.behaviors.insert(target, behavior);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&dyn ElementBehavior> {
        self.behaviors.get(&id).map(AsRef::as_ref)
    }
}

fn id_name(id: ElementId) -> &'static str {
    id.key()
}

/// The outcome of running the pipeline over every registered section:
/// each section's `parse` output, keyed by [`ElementId`].
pub type ParsedSections = HashMap<ElementId, Value>;

/// Builds the dependency DAG from every registered behavior's `requires`,
/// then runs validate → calculate_provided → parse in topological order
/// (§4.2 `run`).
pub fn run(
    registry: &Registry,
    root: &std::collections::HashMap<&'static str, Option<Node>>,
    validate_version: bool,
) -> Result<ParsedSections, crate::error::Error> {
    let mut dag: Dag<ElementId> = Dag::new();
    for (&id, behavior) in &registry.behaviors {
        dag.add_node(id);
        for &dep in behavior.requires() {
            dag.add_edge(dep, id);
        }
    }
    let order = dag.topological_order()?;
    tracing::debug!(order = ?order, "element pipeline order resolved");

    let mut provided: HashMap<ElementId, Value> = HashMap::new();
    let mut parsed: ParsedSections = HashMap::new();
    let mut document_version: Option<f64> = None;

    for id in order {
        let Some(behavior) = registry.get(id) else { continue };
        let node = root.get(id.key()).cloned().flatten();
        tracing::trace!(element = %id, present = node.is_some(), "visiting element");

        if id == ElementId::Version {
            if let Some(v) = node.as_ref() {
                document_version = crate::value::as_version_ordinal(v);
                tracing::debug!(document_version, "parsed document version");
            }
        } else if validate_version {
            if let (Some(min), Some(doc_version)) = (behavior.supported_version(), document_version) {
                if doc_version < min {
                    return Err(DocumentError::logic(
                        0,
                        format!(
                            "element '{}' requires version {min} or newer, document declares {doc_version}",
                            id.key()
                        ),
                        crate::path::ElementPath::root().child(id.key()),
                        crate::value::Location::NONE,
                    )
                    .into());
                }
            }
        }

        if behavior.required() && node.is_none() {
            return Err(DocumentError::format(
                0,
                format!("missing required section '{}'", id.key()),
                crate::path::ElementPath::root().child(id.key()),
                crate::value::Location::NONE,
            )
            .into());
        }

        let mut bindings = Bindings::new();
        for &dep in behavior.requires() {
            if let Some(value) = provided.get(&dep) {
                bindings.insert(dep.key(), value.clone());
            }
        }

        behavior.validate(node.as_ref(), &bindings)?;
        let provides = behavior.calculate_provided(node.as_ref(), &bindings);
        provided.insert(id, provides);
        let value = behavior.parse(node.as_ref(), &bindings)?;
        parsed.insert(id, value);
    }

    tracing::debug!(sections = parsed.len(), "element pipeline complete");
    Ok(parsed)
}
