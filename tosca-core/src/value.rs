//! Location-aware value tree.
//!
//! A [`Node`] mirrors the shape of a parsed YAML (or JSON) document —
//! scalar, mapping, or sequence — while carrying the source [`Location`]
//! of every node. This is the uniform representation the element
//! framework binds its schema to; building the tree from raw text with
//! real line/column tracking is the job of an external loader (the
//! "holder" layer), not of this crate.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// An ordered mapping of string keys to [`Node`]s. Iteration order always
/// matches the order keys first appeared in the source document.
pub type Mapping = IndexMap<String, Node>;

/// A (filename, start/end line, start/end column) record attached to every
/// node in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub filename: Option<Arc<str>>,
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
}

impl Location {
    /// Sentinel location used for values that were never tied to a source
    /// document, e.g. those constructed via [`Node::from_object`].
    pub const NONE: Location = Location {
        filename: None,
        start_line: -1,
        start_column: -1,
        end_line: -1,
        end_column: -1,
    };

    #[must_use]
    pub fn new(filename: Option<Arc<str>>, start_line: i64, start_column: i64, end_line: i64, end_column: i64) -> Self {
        Self { filename, start_line, start_column, end_line, end_column }
    }

    /// Whether this location actually points somewhere in a source document.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.start_line >= 0
    }
}

/// A location-tagged node of a parsed document.
#[derive(Debug, Clone)]
pub enum Node {
    /// A scalar: string, integer, float, bool, or null. Never an array or
    /// object — those are represented by [`Node::Sequence`] and
    /// [`Node::Mapping`] respectively.
    Scalar(Value, Location),
    Sequence(Vec<Node>, Location),
    Mapping(Mapping, Location),
}

impl Node {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Node::Scalar(_, loc) | Node::Sequence(_, loc) | Node::Mapping(_, loc) => loc,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m, _) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(s, _) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Node::Scalar(v, _) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Value::Null, _))
    }

    /// Strips location information, returning the plain value underneath.
    #[must_use]
    pub fn restore(&self) -> Value {
        match self {
            Node::Scalar(v, _) => v.clone(),
            Node::Sequence(items, _) => Value::Array(items.iter().map(Node::restore).collect()),
            Node::Mapping(map, _) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in map {
                    obj.insert(k.clone(), v.restore());
                }
                Value::Object(obj)
            }
        }
    }

    /// Wraps a plain value with sentinel ([`Location::NONE`]) locations,
    /// recursively.
    #[must_use]
    pub fn from_object(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                Node::Sequence(items.iter().map(Node::from_object).collect(), Location::NONE)
            }
            Value::Object(map) => {
                let mut m = Mapping::new();
                for (k, v) in map {
                    m.insert(k.clone(), Node::from_object(v));
                }
                Node::Mapping(m, Location::NONE)
            }
            scalar => Node::Scalar(scalar.clone(), Location::NONE),
        }
    }
}

/// Extracts a comparable version ordinal from a scalar node: numbers are
/// used directly, strings are read as `x.y[.z]` or `x_y[_z]` and turned
/// into a dotted-decimal ordinal (e.g. `"tosca_1_3"` -> `1.3`). Used by
/// the version gate (§4.2).
#[must_use]
pub fn as_version_ordinal(node: &Node) -> Option<f64> {
    let scalar = node.as_scalar()?;
    if let Some(n) = scalar.as_f64() {
        return Some(n);
    }
    let s = scalar.as_str()?;
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }
    let digits: Vec<&str> = s
        .split(|c: char| !c.is_ascii_digit())
        .filter(|p| !p.is_empty())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.join(".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_restore() {
        let original = json!({"a": [1, "two", null], "b": true});
        let node = Node::from_object(&original);
        assert_eq!(node.restore(), original);
    }

    #[test]
    fn from_object_uses_sentinel_locations() {
        let node = Node::from_object(&json!({"k": 1}));
        assert!(!node.location().is_known());
        if let Node::Mapping(m, _) = &node {
            assert!(!m["k"].location().is_known());
        } else {
            panic!("expected mapping");
        }
    }

    #[test]
    fn version_ordinal_parses_numbers_and_prefixed_strings() {
        let numeric = Node::from_object(&json!(1.0));
        assert_eq!(as_version_ordinal(&numeric), Some(1.0));
        let prefixed = Node::from_object(&json!("tosca_1_3"));
        assert_eq!(as_version_ordinal(&prefixed), Some(1.3));
        let plain = Node::from_object(&json!("1.1"));
        assert_eq!(as_version_ordinal(&plain), Some(1.1));
    }

    #[test]
    fn mapping_preserves_insertion_order() {
        let original = json!({"z": 1, "a": 2, "m": 3});
        let node = Node::from_object(&original);
        let keys: Vec<_> = node.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    proptest::proptest! {
        #[test]
        fn version_ordinal_of_a_plain_float_is_itself(major in 0u32..50, minor in 0u32..50) {
            let text = format!("{major}.{minor}");
            let node = Node::from_object(&json!(text));
            let ordinal = as_version_ordinal(&node).unwrap();
            let expected: f64 = text.parse().unwrap();
            proptest::prop_assert!((ordinal - expected).abs() < f64::EPSILON);
        }

        #[test]
        fn underscore_separated_version_matches_dotted_form(major in 0u32..50, minor in 0u32..50) {
            let underscored = Node::from_object(&json!(format!("tosca_{major}_{minor}")));
            let dotted = Node::from_object(&json!(format!("{major}.{minor}")));
            proptest::prop_assert_eq!(as_version_ordinal(&underscored), as_version_ordinal(&dotted));
        }
    }
}
