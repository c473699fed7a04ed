//! Engine-level building blocks shared by every blueprint dialect: a
//! location-aware value tree, dot-joined element paths, the error
//! taxonomy, a dependency DAG, the `Resolve` import contract, the
//! intrinsic-function registry, and the element/extension framework
//! that drives top-level section parsing.

pub mod element;
pub mod error;
pub mod extend;
pub mod functions;
pub mod graph;
pub mod path;
pub mod resolve;
pub mod value;

pub use element::{Bindings, ElementBehavior, ElementId, ParsedSections, Registry, Shape};
pub use error::{DocumentError, Error, ErrorKind, SchemaApiError};
pub use extend::{ElementExtension, FunctionAction, FunctionExtension};
pub use functions::{AnyArgs, Function, FunctionRegistry, BUILTIN_FUNCTIONS};
pub use graph::Dag;
pub use path::ElementPath;
pub use resolve::{NoResolve, NotResolvable, Resolve};
pub use value::{as_version_ordinal, Location, Mapping, Node};
