//! The `Resolve` contract: the sole collaborator the engine uses to turn
//! an import reference into raw document text (§4.6, §6).

use snafu::Snafu;
use std::fmt;

/// Maps an import reference (as it appears under `imports:`) to raw
/// document text. Implementations may hit the filesystem or network; the
/// engine treats every call as an opaque synchronous operation (§5).
pub trait Resolve: fmt::Debug {
    fn resolve(&self, reference: &str) -> Result<String, NotResolvable>;
}

/// An import reference could not be resolved to document text.
#[derive(Debug, Snafu)]
#[snafu(display("could not resolve import '{reference}': {reason}"))]
pub struct NotResolvable {
    pub reference: String,
    pub reason: String,
}

impl NotResolvable {
    #[must_use]
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { reference: reference.into(), reason: reason.into() }
    }
}

/// A [`Resolve`] that always fails. Used as a safe default when a
/// blueprint declares no imports and no resolver was supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolve;

impl Resolve for NoResolve {
    fn resolve(&self, reference: &str) -> Result<String, NotResolvable> {
        Err(NotResolvable::new(reference, "no resolver configured"))
    }
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Result<String, NotResolvable> + fmt::Debug,
{
    fn resolve(&self, reference: &str) -> Result<String, NotResolvable> {
        self(reference)
    }
}
