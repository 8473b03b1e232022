//! Pattern syntax tree.
//!
//! Patterns can be built directly with the constructors below or parsed from
//! text with [`crate::pattern::parser::parse`]. Either way the compiler sees
//! the same tree.

use super::byte_set::ByteSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    /// Matches one byte from the set.
    Class(ByteSet),
    Concat(Vec<Node>),
    Alternate(Vec<Node>),
    /// `min..=max` repetitions; `max == None` is unbounded.
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
    },
    /// A named span whose bytes are revealed. Spans with the same name share
    /// one tag.
    Capture { name: String, node: Box<Node> },
    /// Zero-width assertion that holds only before the first byte of the buffer.
    StartAnchor,
}

impl Node {
    /// A literal byte string.
    pub fn literal(bytes: impl AsRef<[u8]>) -> Node {
        let bytes = bytes.as_ref();
        match bytes.len() {
            0 => Node::Empty,
            1 => Node::Class(ByteSet::single(bytes[0])),
            _ => Node::Concat(bytes.iter().map(|&b| Node::Class(ByteSet::single(b))).collect()),
        }
    }

    pub fn class(set: ByteSet) -> Node {
        Node::Class(set)
    }

    pub fn concat(nodes: Vec<Node>) -> Node {
        Node::Concat(nodes)
    }

    pub fn alternate(nodes: Vec<Node>) -> Node {
        Node::Alternate(nodes)
    }

    pub fn repeat(node: Node, min: u32, max: Option<u32>) -> Node {
        Node::Repeat {
            node: Box::new(node),
            min,
            max,
        }
    }

    pub fn optional(node: Node) -> Node {
        Node::repeat(node, 0, Some(1))
    }

    pub fn star(node: Node) -> Node {
        Node::repeat(node, 0, None)
    }

    pub fn plus(node: Node) -> Node {
        Node::repeat(node, 1, None)
    }

    pub fn capture(name: impl Into<String>, node: Node) -> Node {
        Node::Capture {
            name: name.into(),
            node: Box::new(node),
        }
    }

    /// Names of all capture spans in order of first appearance, without
    /// duplicates.
    pub fn capture_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_capture_names(&mut names);
        names
    }

    fn collect_capture_names(&self, out: &mut Vec<String>) {
        match self {
            Node::Capture { name, node } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
                node.collect_capture_names(out);
            }
            Node::Concat(nodes) | Node::Alternate(nodes) => {
                for node in nodes {
                    node.collect_capture_names(out);
                }
            }
            Node::Repeat { node, .. } => node.collect_capture_names(out),
            Node::Empty | Node::Class(_) | Node::StartAnchor => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_shapes() {
        assert_eq!(Node::literal(""), Node::Empty);
        assert_eq!(Node::literal("a"), Node::Class(ByteSet::single(b'a')));
        assert!(matches!(Node::literal("ab"), Node::Concat(ref v) if v.len() == 2));
    }

    #[test]
    fn test_capture_names_are_deduplicated_in_order() {
        let node = Node::alternate(vec![
            Node::capture("amount", Node::literal("1")),
            Node::concat(vec![
                Node::capture("currency", Node::literal("$")),
                Node::capture("amount", Node::literal("2")),
            ]),
        ]);
        assert_eq!(node.capture_names(), vec!["amount", "currency"]);
    }
}
