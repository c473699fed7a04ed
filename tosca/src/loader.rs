//! Default YAML loader (§4.1 "holder layer"): parses YAML text into a
//! location-aware [`Node`] tree using `yaml-rust2`'s low-level event
//! stream, so every scalar, mapping, and sequence carries its source
//! span.

use std::sync::Arc;
use tosca_blueprint::imports::Load;
use tosca_core::error::DocumentError;
use tosca_core::path::ElementPath;
use tosca_core::value::{Location, Mapping, Node};
use yaml_rust2::parser::{MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::Event;

fn span(filename: &Option<Arc<str>>, start: Marker, end: Marker) -> Location {
    Location::new(filename.clone(), start.line() as i64, start.col() as i64, end.line() as i64, end.col() as i64)
}

fn infer_scalar(text: &str, style: TScalarStyle) -> serde_json::Value {
    if style != TScalarStyle::Plain {
        return serde_json::Value::String(text.to_string());
    }
    match text {
        "" | "~" | "null" | "Null" | "NULL" => serde_json::Value::Null,
        "true" | "True" | "TRUE" => serde_json::Value::Bool(true),
        "false" | "False" | "FALSE" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(i) = text.parse::<i64>() {
                serde_json::Value::from(i)
            } else if let Ok(f) = text.parse::<f64>() {
                serde_json::Value::from(f)
            } else {
                serde_json::Value::String(text.to_string())
            }
        }
    }
}

enum Frame {
    Mapping { entries: Vec<(String, Node)>, pending_key: Option<String>, start: Marker },
    Sequence { items: Vec<Node>, start: Marker },
}

struct Builder {
    filename: Option<Arc<str>>,
    stack: Vec<Frame>,
    root: Option<Node>,
}

impl Builder {
    fn push_value(&mut self, value: Node) {
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping { entries, pending_key, .. }) => match pending_key.take() {
                Some(key) => entries.push((key, value)),
                None => {
                    let key = match &value {
                        Node::Scalar(v, _) => match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        },
                        other => other.restore().to_string(),
                    };
                    *pending_key = Some(key);
                }
            },
            None => self.root = Some(value),
        }
    }
}

impl MarkedEventReceiver for Builder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        match event {
            Event::Scalar(text, style, _, _) => {
                let value = infer_scalar(&text, style);
                self.push_value(Node::Scalar(value, span(&self.filename, mark, mark)));
            }
            Event::SequenceStart(..) => {
                self.stack.push(Frame::Sequence { items: Vec::new(), start: mark });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { items, start }) = self.stack.pop() {
                    let node = Node::Sequence(items, span(&self.filename, start, mark));
                    self.push_value(node);
                }
            }
            Event::MappingStart(..) => {
                self.stack.push(Frame::Mapping { entries: Vec::new(), pending_key: None, start: mark });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping { entries, start, .. }) = self.stack.pop() {
                    let mut mapping = Mapping::new();
                    for (key, value) in entries {
                        mapping.insert(key, value);
                    }
                    let node = Node::Mapping(mapping, span(&self.filename, start, mark));
                    self.push_value(node);
                }
            }
            _ => {}
        }
    }
}

/// The default [`Load`] implementation, backed by `yaml-rust2`.
#[derive(Debug, Default)]
pub struct YamlLoader;

impl Load for YamlLoader {
    fn load(&self, text: &str, filename: Option<&str>) -> Result<Node, DocumentError> {
        let mut builder = Builder { filename: filename.map(Arc::from), stack: Vec::new(), root: None };
        let mut parser = Parser::new_from_str(text);
        parser.load(&mut builder, false).map_err(|e| {
            DocumentError::format(1, format!("YAML parse error: {e}"), ElementPath::root(), Location::NONE)
        })?;
        builder
            .root
            .ok_or_else(|| DocumentError::format(1, "empty YAML document", ElementPath::root(), Location::NONE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_simple_mapping_with_locations() {
        let loader = YamlLoader;
        let node = loader.load("a: 1\nb: two\n", Some("doc.yaml")).unwrap();
        let mapping = node.as_mapping().unwrap();
        assert_eq!(mapping["a"].as_scalar().unwrap(), &serde_json::json!(1));
        assert_eq!(mapping["b"].as_scalar().unwrap(), &serde_json::json!("two"));
        assert!(node.location().is_known());
    }
}
