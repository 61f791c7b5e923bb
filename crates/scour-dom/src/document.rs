//! Document - High-level document API

use crate::{DomTree, Node, NodeId};

/// HTML Document
///
/// Owns the arena tree. Once built by the parser it is only read, so a
/// `&Document` can be shared across threads freely.
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
}

impl Document {
    /// Create an empty document (document node only)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
        }
    }

    /// Wrap an already built tree
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        Self { tree, url: url.to_string() }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first `<title>` element, or an empty string
    pub fn title(&self) -> String {
        self.tree.descendants(self.tree.root())
            .find(|&id| self.tree.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case("title")))
            .map(|id| self.tree.text_content(id))
            .unwrap_or_default()
    }

    /// First element (document order) whose id attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        // Not interned means no element carries it
        let wanted = self.tree.interner().lookup(id)?;
        self.tree.descendants(self.tree.root()).find(|&node| {
            self.tree.get(node)
                .and_then(Node::as_element)
                .is_some_and(|e| e.id == Some(wanted))
        })
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.tree.memory_usage() + self.url.capacity()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_lookup() {
        let mut doc = Document::default();
        let tree = doc.tree_mut();
        let root = tree.root();
        let head = tree.create_element("head");
        let title = tree.create_element("title");
        let text = tree.create_text("Hello");
        let body = tree.create_element("body");
        tree.set_attribute(body, "id", "main");
        tree.append_child(root, head);
        tree.append_child(head, title);
        tree.append_child(title, text);
        tree.append_child(root, body);

        assert_eq!(doc.title(), "Hello");
        assert_eq!(doc.get_element_by_id("main"), Some(body));
        assert_eq!(doc.get_element_by_id("missing"), None);
        assert_eq!(doc.url(), "about:blank");
    }
}
