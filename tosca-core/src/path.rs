//! Dot-joined element paths, used in diagnostics and error messages.

use std::fmt;

/// The path from the root element to some element, e.g. `node_templates.web.properties`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ElementPath(String);

impl ElementPath {
    #[must_use]
    pub fn root() -> Self {
        ElementPath(String::new())
    }

    #[must_use]
    pub fn child(&self, name: impl fmt::Display) -> Self {
        if self.0.is_empty() {
            ElementPath(name.to_string())
        } else {
            ElementPath(format!("{}.{}", self.0, name))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dot_joined_paths() {
        let root = ElementPath::root();
        let a = root.child("node_templates");
        let b = a.child("web");
        assert_eq!(b.as_str(), "node_templates.web");
    }
}
