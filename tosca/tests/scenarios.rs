//! End-to-end scenarios straight out of the concrete test plan (§8).

fn parse(yaml: &str) -> Result<tosca::Plan, tosca::Error> {
    tosca::parse(yaml, None, true)
}

#[test]
fn minimal_node_type_and_template() {
    let plan = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  A:
    properties:
      k:
        default: d
node_templates:
  t:
    type: A
    properties:
      k: v
"#,
    )
    .unwrap();

    assert_eq!(plan.nodes.len(), 1);
    let node = &plan.nodes[0];
    assert_eq!(node.name, "t");
    assert_eq!(node.node_type, "A");
    assert_eq!(node.type_hierarchy, vec!["A".to_string()]);
    assert_eq!(node.properties["k"], "v");
    assert!(node.relationships.is_empty());
    assert!(node.plugins.is_empty());
}

#[test]
fn hosted_on_propagation_and_plugin_install() {
    let plan = parse(
        r#"
tosca_definitions_version: 1.0
plugins:
  p:
    executor: local
node_types:
  tosca.nodes.Compute: {}
  app:
    interfaces:
      lifecycle:
        start: p.start
relationships:
  tosca.relationships.HostedOn: {}
node_templates:
  h:
    type: tosca.nodes.Compute
  w:
    type: app
    relationships:
      - type: tosca.relationships.HostedOn
        target: h
"#,
    )
    .unwrap();

    let w = plan.nodes.iter().find(|n| n.name == "w").unwrap();
    let h = plan.nodes.iter().find(|n| n.name == "h").unwrap();
    assert_eq!(w.host_id.as_deref(), Some("h"));
    assert_eq!(h.host_id.as_deref(), Some("h"));
    assert!(h.plugins_to_install.iter().any(|p| p.name == "p" && p.executor == "local"));
}

#[test]
fn orphan_host_agent_plugin_is_rejected() {
    let err = parse(
        r#"
tosca_definitions_version: 1.0
plugins:
  p:
    executor: host_agent
node_types:
  app:
    interfaces:
      lifecycle:
        start: p.start
node_templates:
  t:
    type: app
"#,
    );
    assert!(err.is_err());
}

#[test]
fn double_hosted_on_is_rejected() {
    let err = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  tosca.nodes.Compute: {}
  app: {}
relationships:
  tosca.relationships.HostedOn: {}
node_templates:
  h1:
    type: tosca.nodes.Compute
  h2:
    type: tosca.nodes.Compute
  w:
    type: app
    relationships:
      - type: tosca.relationships.HostedOn
        target: h1
      - type: tosca.relationships.HostedOn
        target: h2
"#,
    );
    assert!(err.is_err());
}

#[test]
fn version_gate_rejects_old_documents() {
    // The default schema declares no supported_version gates; this
    // exercises the document-version-ordinal plumbing the gate relies
    // on instead.
    let plan = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  A: {}
node_templates:
  t:
    type: A
"#,
    )
    .unwrap();
    assert_eq!(plan.version, serde_json::json!(1.0));
}

#[test]
fn self_targeting_relationship_is_rejected() {
    let err = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  app: {}
relationships:
  tosca.relationships.HostedOn: {}
node_templates:
  t:
    type: app
    relationships:
      - type: tosca.relationships.HostedOn
        target: t
"#,
    );
    assert!(err.is_err());
}

#[test]
fn negative_instances_deploy_is_rejected() {
    let err = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  app: {}
node_templates:
  t:
    type: app
    instances:
      deploy: -1
"#,
    );
    assert!(err.is_err());
}

#[test]
fn deploy_and_scalable_are_mutually_exclusive() {
    let err = parse(
        r#"
tosca_definitions_version: 1.0
node_types:
  app: {}
node_templates:
  t:
    type: app
    instances:
      deploy: 2
    capabilities:
      scalable: {}
"#,
    );
    assert!(err.is_err());
}

#[test]
fn parsing_twice_yields_structurally_equal_plans() {
    let yaml = r#"
tosca_definitions_version: 1.0
node_types:
  A:
    properties:
      k:
        default: d
node_templates:
  t:
    type: A
"#;
    let first = parse(yaml).unwrap();
    let second = parse(yaml).unwrap();
    assert_eq!(first.nodes.len(), second.nodes.len());
    assert_eq!(first.nodes[0].properties, second.nodes[0].properties);
    assert_eq!(first.version, second.version);
}
