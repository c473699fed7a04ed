//! Plan assembly (§3, §4.2): registers the default section behaviors,
//! runs the dependency-ordered pipeline, elaborates node templates, and
//! folds everything into the final [`Plan`].

use crate::data_types::DataTypesElement;
use crate::groups::GroupsElement;
use crate::hierarchy::ResolvedType;
use crate::inputs::InputsElement;
use crate::node_templates::{self, NodeTemplateOutput};
use crate::node_types::NodeTypesElement;
use crate::outputs::OutputsElement;
use crate::plugins::PluginsElement;
use crate::policies::{self, PoliciesElement};
use crate::relationships::RelationshipsElement;
use crate::version::VersionElement;
use crate::workflows::WorkflowsElement;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::element::{self, ElementId, Registry};
use tosca_core::error::Error;
use tosca_core::extend::{ElementExtension, FunctionExtension};
use tosca_core::functions::FunctionRegistry;
use tosca_core::value::Node;

/// The fully-elaborated output of parsing a blueprint document (§3 "Plan").
#[derive(Debug, Clone)]
pub struct Plan {
    pub version: Value,
    pub inputs: Value,
    pub outputs: Value,
    pub data_types: Value,
    pub node_types: Value,
    pub relationships: Value,
    pub groups: Value,
    pub workflows: Value,
    pub policy_types: Value,
    pub policy_triggers: Value,
    pub policies: Value,
    pub plugins_to_install_per_node: Value,
    pub deployment_plugins_to_install: Value,
    pub workflow_plugins_to_install: Value,
    pub nodes: Vec<NodeTemplateOutput>,
}

fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(VersionElement));
    registry.register(Box::new(InputsElement));
    registry.register(Box::new(OutputsElement));
    registry.register(Box::new(DataTypesElement));
    registry.register(Box::new(NodeTypesElement));
    registry.register(Box::new(RelationshipsElement));
    registry.register(Box::new(PluginsElement));
    registry.register(Box::new(WorkflowsElement));
    registry.register(Box::new(GroupsElement));
    registry.register(Box::new(PoliciesElement));
    registry
}

/// Extracts each top-level key the element framework cares about from
/// the (already import-merged) root document.
fn root_fields(root: &Node) -> HashMap<&'static str, Option<Node>> {
    let mapping = root.as_mapping();
    let mut fields = HashMap::new();
    for id in [
        ElementId::Version,
        ElementId::Inputs,
        ElementId::Outputs,
        ElementId::DataTypes,
        ElementId::NodeTypes,
        ElementId::Relationships,
        ElementId::Plugins,
        ElementId::Workflows,
        ElementId::Groups,
        ElementId::Policies,
        ElementId::NodeTemplates,
    ] {
        let value = mapping.and_then(|m| m.get(id.key())).cloned();
        fields.insert(id.key(), value);
    }
    fields
}

fn resolved_types_from(value: &Value) -> HashMap<String, ResolvedType> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// Runs the full pipeline over an already import-merged document.
#[tracing::instrument(skip_all)]
pub fn elaborate(
    root: Node,
    element_extensions: Vec<ElementExtension>,
    function_extensions: Vec<FunctionExtension>,
    validate_version: bool,
) -> Result<Plan, Error> {
    let mut registry = default_registry();
    for ext in element_extensions {
        ext.apply(&mut registry)?;
    }

    let mut functions = FunctionRegistry::with_builtins();
    for ext in function_extensions {
        ext.apply(&mut functions);
    }

    let fields = root_fields(&root);
    let sections = element::run(&registry, &fields, validate_version)?;
    tracing::info!(sections = sections.len(), "top-level sections elaborated");

    let version = sections.get(&ElementId::Version).cloned().unwrap_or(Value::Null);
    let inputs = sections.get(&ElementId::Inputs).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let outputs = sections.get(&ElementId::Outputs).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let data_types_value = sections.get(&ElementId::DataTypes).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let node_types_value = sections.get(&ElementId::NodeTypes).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let relationships_value = sections.get(&ElementId::Relationships).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let groups = sections.get(&ElementId::Groups).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let workflows = sections.get(&ElementId::Workflows).cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let policies = sections.get(&ElementId::Policies).cloned().unwrap_or_else(|| Value::Object(Map::new()));

    let policy_types = policies::read_verbatim_dict(root.as_mapping().and_then(|m| m.get("policy_types")));
    let policy_triggers = policies::read_verbatim_dict(root.as_mapping().and_then(|m| m.get("policy_triggers")));

    let data_types = resolved_types_from(&data_types_value);
    let node_types = resolved_types_from(&node_types_value);
    let relationship_types = resolved_types_from(&relationships_value);
    let known_plugins: Vec<String> = sections
        .get(&ElementId::Plugins)
        .and_then(Value::as_object)
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();

    let node_templates_node = root.as_mapping().and_then(|m| m.get("node_templates")).cloned();
    let nodes = node_templates::elaborate(
        node_templates_node.as_ref(),
        &node_types,
        &relationship_types,
        &data_types,
        &known_plugins,
    )?;

    let mut deployment_plugins: Vec<Value> = Vec::new();
    let mut plugins_to_install_per_node = Map::new();
    for node in &nodes {
        if !node.plugins_to_install.is_empty() {
            let list: Vec<Value> = node.plugins_to_install.iter().map(plugin_ref_to_value).collect();
            plugins_to_install_per_node.insert(node.name.clone(), Value::Array(list));
        }
        for plugin in &node.deployment_plugins_to_install {
            let value = plugin_ref_to_value(plugin);
            if !deployment_plugins.contains(&value) {
                deployment_plugins.push(value);
            }
        }
    }

    let workflow_plugins_to_install: Vec<Value> = workflows
        .as_object()
        .map(|map| {
            map.values()
                .filter_map(|w| {
                    let obj = w.as_object()?;
                    let executor = obj.get("executor").and_then(Value::as_str)?;
                    if executor != node_templates::CENTRAL_DEPLOYMENT_AGENT {
                        return None;
                    }
                    let name = obj.get("plugin").and_then(Value::as_str)?;
                    Some(Value::String(name.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Plan {
        version,
        inputs,
        outputs,
        data_types: data_types_value,
        node_types: node_types_value,
        relationships: relationships_value,
        groups,
        workflows,
        policy_types,
        policy_triggers,
        policies,
        plugins_to_install_per_node: Value::Object(plugins_to_install_per_node),
        deployment_plugins_to_install: Value::Array(deployment_plugins),
        workflow_plugins_to_install: Value::Array(workflow_plugins_to_install),
        nodes,
    })
}

fn plugin_ref_to_value(plugin: &node_templates::PluginRef) -> Value {
    let mut m = Map::new();
    m.insert("name".to_string(), Value::String(plugin.name.clone()));
    m.insert("executor".to_string(), Value::String(plugin.executor.clone()));
    Value::Object(m)
}
