//! The parse tree (ptree): the abstract result of a successful parse.
//!
//! A node is either a `(name, text)` leaf or a `(name, children[])` branch.
//! The wire encoding is an array of exactly two elements: the tagged
//! union lives entirely in whether the second element is a string or an
//! array, which is why `Node` hand-rolls `Serialize`/`Deserialize` rather
//! than deriving them.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A node in the parse tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A matched substring labelled with a rule name.
    Leaf { name: String, text: String },
    /// A list of child nodes labelled with a rule name.
    Branch { name: String, children: Vec<Node> },
}

impl Node {
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Node::Leaf {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Branch {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Leaf { name, .. } => name,
            Node::Branch { name, .. } => name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Children of a branch, or an empty slice for a leaf.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Branch { children, .. } => children,
        }
    }

    /// The leaf's text, or `None` for a branch.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Leaf { text, .. } => Some(text),
            Node::Branch { .. } => None,
        }
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        match self {
            Node::Leaf { name, text } => {
                seq.serialize_element(name)?;
                seq.serialize_element(text)?;
            }
            Node::Branch { name, children } => {
                seq.serialize_element(name)?;
                seq.serialize_element(children)?;
            }
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a [name, text] or [name, children] array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let name: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let raw: serde_json::Value = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;

        match raw {
            serde_json::Value::String(text) => Ok(Node::Leaf { name, text }),
            serde_json::Value::Array(items) => {
                let children = items
                    .into_iter()
                    .map(|v| serde_json::from_value(v).map_err(de::Error::custom))
                    .collect::<Result<Vec<Node>, A::Error>>()?;
                Ok(Node::Branch { name, children })
            }
            other => Err(de::Error::custom(format!(
                "expected string or array as second element, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod ptree_tests {
    use super::*;

    #[test]
    fn leaf_round_trips_through_json() {
        let node = Node::leaf("year", "2021");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"["year","2021"]"#);
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn branch_round_trips_through_json() {
        let node = Node::branch(
            "Date",
            vec![
                Node::leaf("year", "2021"),
                Node::leaf("month", "04"),
                Node::leaf("day", "05"),
            ],
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["Date", [["year", "2021"], ["month", "04"], ["day", "05"]]])
        );
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn empty_branch_survives() {
        let node = Node::branch("Hdr", vec![]);
        assert_eq!(node.children().len(), 0);
        assert!(!node.is_leaf());
    }
}
