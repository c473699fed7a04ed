//! Re-export of the shared engine error taxonomy, plus an index of the
//! numeric error codes this crate raises (§6 "public contract").

pub use tosca_core::error::{DocumentError, Error, ErrorKind, SchemaApiError};

pub use crate::hierarchy::{ERR_CYCLIC_DERIVED_FROM, ERR_UNKNOWN_TYPE};
pub use crate::imports::{ERR_INCOMPATIBLE_REDEFINITION, ERR_VERSION_MISMATCH};
pub use crate::inputs::ERR_MISSING_REQUIRED_INPUT;
pub use crate::node_templates::{
    ERR_DEPLOY_SCALABLE_CONFLICT, ERR_DOUBLE_HOSTED_ON, ERR_FORMAT_BAD_DEPLOY, ERR_ORPHAN_HOST_AGENT, ERR_SELF_TARGET,
    ERR_UNDEFINED_TARGET, ERR_UNKNOWN_PLUGIN_IN_NODE, ERR_UNKNOWN_PLUGIN_IN_RELATIONSHIP, ERR_UNKNOWN_RELATIONSHIP_TYPE,
};
pub use crate::operations::{ERR_MALFORMED_IMPLEMENTATION, ERR_UNKNOWN_PLUGIN};
pub use crate::properties::{ERR_MISSING_PROPERTY, ERR_TYPE_MISMATCH, ERR_UNDEFINED_PROPERTY};
