//! `node_templates` (§4.4): the post-processing pass that classifies
//! relationships, propagates host containment, compiles interface
//! operations, and computes per-node and deployment-wide plugin sets.

use crate::hierarchy::ResolvedType;
use crate::interfaces::merge_interface_maps;
use crate::node_types::is_host_type;
use crate::operations::compile_interface_map;
use crate::properties::merge_properties;
use crate::relationships::is_hosted_on;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tosca_core::error::DocumentError;
use tosca_core::functions::FunctionRegistry;
use tosca_core::graph::Dag;
use tosca_core::path::ElementPath;
use tosca_core::value::{Location, Node};

pub const ERR_FORMAT_BAD_DEPLOY: u32 = 1;
pub const ERR_UNKNOWN_RELATIONSHIP_TYPE: u32 = 26;
pub const ERR_UNDEFINED_TARGET: u32 = 25;
pub const ERR_SELF_TARGET: u32 = 23;
pub const ERR_ORPHAN_HOST_AGENT: u32 = 24;
pub const ERR_DEPLOY_SCALABLE_CONFLICT: u32 = 31;
pub const ERR_DOUBLE_HOSTED_ON: u32 = 112;

/// Code for a plugin reference that can't be resolved inside a node
/// template's own interface operations (as opposed to a relationship's,
/// see `ERR_UNKNOWN_PLUGIN_IN_RELATIONSHIP`).
pub const ERR_UNKNOWN_PLUGIN_IN_NODE: u32 = 10;
/// Code for a plugin reference that can't be resolved inside a
/// relationship's source/target interface operations.
pub const ERR_UNKNOWN_PLUGIN_IN_RELATIONSHIP: u32 = 19;

pub const CENTRAL_DEPLOYMENT_AGENT: &str = "central_deployment_agent";
pub const HOST_AGENT: &str = "host_agent";
pub const LOCAL: &str = "local";

#[derive(Debug, Clone)]
struct RawRelationship {
    rel_type: String,
    target: String,
    properties: Map<String, Value>,
    source_interfaces: Map<String, Value>,
    target_interfaces: Map<String, Value>,
}

#[derive(Debug, Clone)]
struct RawTemplate {
    node_type: String,
    properties: Map<String, Value>,
    interfaces: Map<String, Value>,
    relationships: Vec<RawRelationship>,
    instances_deploy: i64,
    capabilities_scalable: bool,
}

/// A fully elaborated node instance (§3 "Node template").
#[derive(Debug, Clone)]
pub struct NodeTemplateOutput {
    pub name: String,
    pub node_type: String,
    pub type_hierarchy: Vec<String>,
    pub properties: Map<String, Value>,
    pub operations: Map<String, Value>,
    pub relationships: Vec<RelationshipOutput>,
    pub host_id: Option<String>,
    pub plugins: Vec<PluginRef>,
    pub plugins_to_install: Vec<PluginRef>,
    pub deployment_plugins_to_install: Vec<PluginRef>,
}

#[derive(Debug, Clone)]
pub struct RelationshipOutput {
    pub rel_type: String,
    pub type_hierarchy: Vec<String>,
    pub target_id: String,
    pub properties: Map<String, Value>,
    pub source_operations: Map<String, Value>,
    pub target_operations: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginRef {
    pub name: String,
    pub executor: String,
}

fn read_raw_template(node: &Node) -> Option<RawTemplate> {
    let mapping = node.as_mapping()?;
    let node_type = mapping.get("type")?.as_scalar()?.as_str()?.to_string();
    let properties = mapping.get("properties").map(Node::restore).and_then(|v| v.as_object().cloned()).unwrap_or_default();
    let interfaces = mapping.get("interfaces").map(Node::restore).and_then(|v| v.as_object().cloned()).unwrap_or_default();

    let instances_deploy = mapping
        .get("instances")
        .and_then(Node::as_mapping)
        .and_then(|m| m.get("deploy"))
        .and_then(Node::as_scalar)
        .and_then(Value::as_i64)
        .unwrap_or(1);

    let capabilities_scalable = mapping
        .get("capabilities")
        .and_then(Node::as_mapping)
        .map(|m| m.contains_key("scalable"))
        .unwrap_or(false);

    let mut relationships = Vec::new();
    if let Some(rel_nodes) = mapping.get("relationships").and_then(Node::as_sequence) {
        for rel_node in rel_nodes {
            let Some(rel_map) = rel_node.as_mapping() else { continue };
            let rel_type = rel_map.get("type").and_then(Node::as_scalar).and_then(Value::as_str).unwrap_or_default().to_string();
            let target = rel_map.get("target").and_then(Node::as_scalar).and_then(Value::as_str).unwrap_or_default().to_string();
            let properties = rel_map.get("properties").map(Node::restore).and_then(|v| v.as_object().cloned()).unwrap_or_default();
            let source_interfaces =
                rel_map.get("source_interfaces").map(Node::restore).and_then(|v| v.as_object().cloned()).unwrap_or_default();
            let target_interfaces =
                rel_map.get("target_interfaces").map(Node::restore).and_then(|v| v.as_object().cloned()).unwrap_or_default();
            relationships.push(RawRelationship { rel_type, target, properties, source_interfaces, target_interfaces });
        }
    }

    Some(RawTemplate { node_type, properties, interfaces, relationships, instances_deploy, capabilities_scalable })
}

/// Runs §4.4 validation + parse over every template in `node_templates`,
/// then propagates `host_id` and aggregates plugin sets across the whole
/// deployment.
#[tracing::instrument(skip_all)]
pub fn elaborate(
    node_templates: Option<&Node>,
    node_types: &HashMap<String, ResolvedType>,
    relationships_types: &HashMap<String, ResolvedType>,
    data_types: &HashMap<String, ResolvedType>,
    known_plugins: &[String],
) -> Result<Vec<NodeTemplateOutput>, DocumentError> {
    let Some(node_templates) = node_templates else { return Ok(Vec::new()) };
    let Some(mapping) = node_templates.as_mapping() else {
        return Err(DocumentError::format(
            ERR_FORMAT_BAD_DEPLOY,
            "node_templates must be a mapping",
            ElementPath::root().child("node_templates"),
            node_templates.location().clone(),
        ));
    };

    let functions = FunctionRegistry::with_builtins();
    let names: Vec<String> = mapping.keys().cloned().collect();

    let mut raw: HashMap<String, RawTemplate> = HashMap::new();
    for (name, entry) in mapping {
        let Some(template) = read_raw_template(entry) else {
            return Err(DocumentError::format(
                ERR_FORMAT_BAD_DEPLOY,
                format!("node template '{name}' must declare a 'type'"),
                ElementPath::root().child("node_templates").child(name),
                entry.location().clone(),
            ));
        };
        raw.insert(name.clone(), template);
    }

    // Validation pass (§4.4).
    for (name, template) in &raw {
        let path = ElementPath::root().child("node_templates").child(name);

        if !node_types.contains_key(&template.node_type) {
            return Err(DocumentError::logic(
                crate::hierarchy::ERR_UNKNOWN_TYPE,
                format!("node template '{name}' references unknown type '{}'", template.node_type),
                path.clone(),
                Location::NONE,
            ));
        }

        if template.instances_deploy < 0 {
            return Err(DocumentError::format(
                ERR_FORMAT_BAD_DEPLOY,
                format!("node template '{name}' has a negative instances.deploy"),
                path.child("instances"),
                Location::NONE,
            ));
        }
        if template.capabilities_scalable {
            return Err(DocumentError::logic(
                ERR_DEPLOY_SCALABLE_CONFLICT,
                format!("node template '{name}' declares both instances.deploy and capabilities.scalable"),
                path.clone(),
                Location::NONE,
            ));
        }

        let mut hosted_on_count = 0;
        for rel in &template.relationships {
            let Some(rel_type) = relationships_types.get(&rel.rel_type) else {
                return Err(DocumentError::logic(
                    ERR_UNKNOWN_RELATIONSHIP_TYPE,
                    format!("node template '{name}' references unknown relationship type '{}'", rel.rel_type),
                    path.clone(),
                    Location::NONE,
                ));
            };
            if rel.target == *name {
                return Err(DocumentError::logic(
                    ERR_SELF_TARGET,
                    format!("node template '{name}' has a relationship targeting itself"),
                    path.clone(),
                    Location::NONE,
                ));
            }
            if !raw.contains_key(&rel.target) {
                return Err(DocumentError::logic(
                    ERR_UNDEFINED_TARGET,
                    format!("node template '{name}' has a relationship targeting undefined node '{}'", rel.target),
                    path.clone(),
                    Location::NONE,
                ));
            }
            if is_hosted_on(&rel_type.type_hierarchy) {
                hosted_on_count += 1;
            }
        }
        if hosted_on_count > 1 {
            return Err(DocumentError::logic(
                ERR_DOUBLE_HOSTED_ON,
                format!("node template '{name}' has more than one HostedOn relationship"),
                path,
                Location::NONE,
            ));
        }
    }

    // Parse pass: type hierarchy, properties, operations, relationships.
    let mut outputs: HashMap<String, NodeTemplateOutput> = HashMap::new();
    let mut hosted_on_target: HashMap<String, String> = HashMap::new();

    for name in &names {
        let template = &raw[name];
        let path = ElementPath::root().child("node_templates").child(name);
        let node_type = &node_types[&template.node_type];

        let properties = merge_properties(&node_type.properties, &template.properties, data_types, &functions, &path.child("properties"))?;
        let merged_interfaces = merge_interface_maps(&node_type.interfaces, &template.interfaces);
        let operations = compile_interface_map(
            &merged_interfaces,
            known_plugins,
            false,
            &functions,
            &path.child("interfaces"),
            ERR_UNKNOWN_PLUGIN_IN_NODE,
        )?;

        let mut relationship_outputs = Vec::new();
        for rel in &template.relationships {
            let rel_type = &relationships_types[&rel.rel_type];
            let rel_properties =
                merge_properties(&rel_type.properties, &rel.properties, data_types, &functions, &path.child("relationships"))?;
            let source_merged = merge_interface_maps(&rel_type.interfaces, &rel.source_interfaces);
            let target_merged = merge_interface_maps(&rel_type.interfaces, &rel.target_interfaces);
            let source_operations = compile_interface_map(
                &source_merged,
                known_plugins,
                false,
                &functions,
                &path.child("relationships").child("source"),
                ERR_UNKNOWN_PLUGIN_IN_RELATIONSHIP,
            )?;
            let target_operations = compile_interface_map(
                &target_merged,
                known_plugins,
                false,
                &functions,
                &path.child("relationships").child("target"),
                ERR_UNKNOWN_PLUGIN_IN_RELATIONSHIP,
            )?;

            if is_hosted_on(&rel_type.type_hierarchy) {
                hosted_on_target.insert(name.clone(), rel.target.clone());
            }

            relationship_outputs.push(RelationshipOutput {
                rel_type: rel.rel_type.clone(),
                type_hierarchy: rel_type.type_hierarchy.clone(),
                target_id: rel.target.clone(),
                properties: rel_properties,
                source_operations,
                target_operations,
            });
        }

        outputs.insert(
            name.clone(),
            NodeTemplateOutput {
                name: name.clone(),
                node_type: template.node_type.clone(),
                type_hierarchy: node_type.type_hierarchy.clone(),
                properties,
                operations,
                relationships: relationship_outputs,
                host_id: None,
                plugins: Vec::new(),
                plugins_to_install: Vec::new(),
                deployment_plugins_to_install: Vec::new(),
            },
        );
    }

    // host_id propagation (§4.4 step 4): process in an order compatible
    // with HostedOn edges (target before source).
    let mut dag: Dag<String> = Dag::new();
    for name in &names {
        dag.add_node(name.clone());
    }
    for (source, target) in &hosted_on_target {
        dag.add_edge(target.clone(), source.clone());
    }
    let order = dag.topological_order().map_err(|_| {
        DocumentError::logic(
            ERR_DOUBLE_HOSTED_ON,
            "cyclic HostedOn chain among node templates",
            ElementPath::root().child("node_templates"),
            Location::NONE,
        )
    })?;

    let mut host_ids: HashMap<String, Option<String>> = HashMap::new();
    for name in &order {
        let output = &outputs[name];
        let host_id = if is_host_type(&output.type_hierarchy) {
            Some(name.clone())
        } else if let Some(target) = hosted_on_target.get(name) {
            host_ids.get(target).cloned().flatten()
        } else {
            None
        };
        host_ids.insert(name.clone(), host_id);
    }
    for (name, host_id) in &host_ids {
        outputs.get_mut(name).unwrap().host_id = host_id.clone();
    }

    // Plugin aggregation (§4.4 steps 5-8): own operations + source_operations
    // anchored here, plus target_operations anchored at the relationship's
    // target.
    let mut plugin_sets: HashMap<String, Vec<PluginRef>> = names.iter().map(|n| (n.clone(), Vec::new())).collect();
    for name in &names {
        let output = &outputs[name];
        for plugin in extract_plugins(&output.operations) {
            push_unique(plugin_sets.get_mut(name).unwrap(), plugin);
        }
        for rel in &output.relationships {
            for plugin in extract_plugins(&rel.source_operations) {
                push_unique(plugin_sets.get_mut(name).unwrap(), plugin);
            }
            for plugin in extract_plugins(&rel.target_operations) {
                if let Some(set) = plugin_sets.get_mut(&rel.target_id) {
                    push_unique(set, plugin);
                }
            }
        }
    }
    for (name, set) in &mut plugin_sets {
        set.sort_by(|a, b| (a.name.clone(), a.executor.clone()).cmp(&(b.name.clone(), b.executor.clone())));
        outputs.get_mut(name).unwrap().plugins = set.clone();
    }

    // Error 24: orphan host_agent plugin.
    for name in &names {
        let output = &outputs[name];
        if output.host_id.is_none() {
            if let Some(offending) = output.plugins.iter().find(|p| p.executor == HOST_AGENT) {
                return Err(DocumentError::logic(
                    ERR_ORPHAN_HOST_AGENT,
                    format!("node template '{name}' has a host_agent plugin '{}' with no HostedOn chain", offending.name),
                    ElementPath::root().child("node_templates").child(name),
                    Location::NONE,
                ));
            }
        }
    }

    for name in &names {
        let deployment_plugins: Vec<PluginRef> =
            outputs[name].plugins.iter().filter(|p| p.executor == CENTRAL_DEPLOYMENT_AGENT).cloned().collect();
        outputs.get_mut(name).unwrap().deployment_plugins_to_install = deployment_plugins;
    }

    let host_names: Vec<String> = names
        .iter()
        .filter(|n| is_host_type(&outputs[*n].type_hierarchy))
        .cloned()
        .collect();
    for host in &host_names {
        let mut to_install = Vec::new();
        for name in &names {
            if host_ids.get(name).cloned().flatten().as_deref() == Some(host.as_str()) {
                for plugin in outputs[name].plugins.iter().filter(|p| p.executor == LOCAL) {
                    push_unique(&mut to_install, plugin.clone());
                }
            }
        }
        to_install.sort_by(|a, b| (a.name.clone(), a.executor.clone()).cmp(&(b.name.clone(), b.executor.clone())));
        outputs.get_mut(host).unwrap().plugins_to_install = to_install;
    }

    Ok(names.into_iter().map(|n| outputs.remove(&n).unwrap()).collect())
}

fn extract_plugins(operations: &Map<String, Value>) -> Vec<PluginRef> {
    let mut out = Vec::new();
    for op in operations.values() {
        let Some(obj) = op.as_object() else { continue };
        let Some(name) = obj.get("plugin").and_then(Value::as_str) else { continue };
        let executor = obj.get("executor").and_then(Value::as_str).unwrap_or(LOCAL).to_string();
        out.push(PluginRef { name: name.to_string(), executor });
    }
    out
}

fn push_unique(set: &mut Vec<PluginRef>, plugin: PluginRef) {
    if !set.contains(&plugin) {
        set.push(plugin);
    }
}
