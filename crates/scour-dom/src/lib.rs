//! scour DOM - Document tree
//!
//! Arena-backed, read-only-after-build document tree. Nodes are addressed
//! by [`NodeId`] (an index into the arena) instead of pointers, so parent
//! and sibling links never form ownership cycles.

mod node;
mod tree;
mod document;
mod interner;
mod serialize;

pub use node::{Node, NodeData, ElementData, TextData, Attribute, QualName};
pub use tree::{DomTree, Children, Descendants, Ancestors, Siblings};
pub use document::Document;
pub use interner::{StringInterner, InternedString};
pub use serialize::HtmlSerializer;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this ID refers to a node rather than the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
