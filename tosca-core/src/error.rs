//! The error taxonomy shared by the whole engine (§7): document-facing
//! `Format`/`Logic` errors, engine-internal `SchemaApi` errors, and
//! resolver failures, unified behind one top-level [`Error`].

use crate::path::ElementPath;
use crate::resolve::NotResolvable;
use crate::value::Location;
use snafu::Snafu;

/// Whether a [`DocumentError`] was raised while the document's shape was
/// being checked against the schema (`Format`, during tree build) or
/// while semantic validation/parsing ran (`Logic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Logic,
}

/// A document-facing error: the blueprint is malformed (`Format`) or
/// structurally valid but semantically inconsistent (`Logic`). Carries
/// the numeric error code from §6/§8, a message, the dot-joined element
/// path, and the source location when known.
#[derive(Debug, Snafu)]
#[snafu(display("{kind:?} error {code}: {message} (at {path})"))]
pub struct DocumentError {
    pub kind: ErrorKind,
    pub code: u32,
    pub message: String,
    pub path: ElementPath,
    pub location: Location,
}

impl DocumentError {
    #[must_use]
    pub fn format(code: u32, message: impl Into<String>, path: ElementPath, location: Location) -> Self {
        Self { kind: ErrorKind::Format, code, message: message.into(), path, location }
    }

    #[must_use]
    pub fn logic(code: u32, message: impl Into<String>, path: ElementPath, location: Location) -> Self {
        Self { kind: ErrorKind::Logic, code, message: message.into(), path, location }
    }
}

/// Programming errors in the engine or its extensions: reading a value
/// before it has been parsed, a cyclic `requires` graph, or an
/// ill-formed schema descriptor.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub), context(suffix(Ctx)))]
pub enum SchemaApiError {
    #[snafu(display("cannot access the parsed value of '{path}' before it has been parsed"))]
    UnparsedAccess { path: ElementPath },

    #[snafu(display("cyclic dependency detected among elements: {cycle}"))]
    CyclicDependency { cycle: String },

    #[snafu(display("ill-formed schema for element '{element}': {reason}"))]
    IllFormedSchema { element: &'static str, reason: String },

    #[snafu(display("extension target element '{element}' is not registered"))]
    UnknownElement { element: &'static str },

    #[snafu(display("no match found for '{query}' at {path}"))]
    NoMatch { query: &'static str, path: ElementPath },

    #[snafu(display("multiple matches found for '{query}' at {path} (found {count})"))]
    AmbiguousMatch {
        query: &'static str,
        path: ElementPath,
        count: usize,
    },
}

/// The top-level error type returned by `parse`. Propagation is fail-fast
/// (§7): the first error aborts the component that raised it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Document {
        #[snafu(source)]
        source: DocumentError,
    },

    #[snafu(display("{source}"))]
    SchemaApi {
        #[snafu(source)]
        source: SchemaApiError,
    },

    #[snafu(display("{source}"))]
    Resolution {
        #[snafu(source)]
        source: NotResolvable,
    },
}

impl From<DocumentError> for Error {
    fn from(source: DocumentError) -> Self {
        Error::Document { source }
    }
}

impl From<SchemaApiError> for Error {
    fn from(source: SchemaApiError) -> Self {
        Error::SchemaApi { source }
    }
}

impl From<NotResolvable> for Error {
    fn from(source: NotResolvable) -> Self {
        Error::Resolution { source }
    }
}
