//! Concrete schema library and elaboration pipeline for a TOSCA-like
//! blueprint dialect, built on the generic `tosca-core` element
//! framework.

pub mod data_types;
pub mod error;
pub mod groups;
pub mod hierarchy;
pub mod imports;
pub mod inputs;
pub mod interfaces;
pub mod node_templates;
pub mod node_types;
pub mod operations;
pub mod outputs;
pub mod plan;
pub mod plugins;
pub mod policies;
pub mod properties;
pub mod relationships;
pub mod version;
pub mod workflows;

pub use node_templates::{NodeTemplateOutput, PluginRef, RelationshipOutput};
pub use plan::{elaborate, Plan};
