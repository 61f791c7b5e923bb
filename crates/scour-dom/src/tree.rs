//! DOM Tree (arena-based allocation)
//!
//! Nodes live in one `Vec`; links between them are `NodeId` indices, which
//! gives O(1) parent and sibling access without reference cycles.

use crate::{Node, NodeData, NodeId, ElementData, QualName, StringInterner, InternedString};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes in the tree (including the document node)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element with the given local name (HTML namespace)
    pub fn create_element(&mut self, local: &str) -> NodeId {
        let ns = self.interner.intern("http://www.w3.org/1999/xhtml");
        let local = self.interner.intern(local);
        self.push(Node::element(ElementData::new(QualName::new(ns, local))))
    }

    /// Add a fully built element
    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        self.push(Node::element(data))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        let name = self.interner.intern(name);
        self.push(Node::doctype(name, public_id.to_string(), system_id.to_string()))
    }

    /// Set an attribute on an element; cached id/class are kept in sync
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let ns = self.interner.intern("");
        let local = self.interner.intern(name);
        let id_value = (name == "id").then(|| self.interner.intern(value));
        let classes: Vec<InternedString> = if name == "class" {
            value.split_whitespace().map(|c| self.interner.intern(c)).collect()
        } else {
            Vec::new()
        };

        let Some(NodeData::Element(elem)) = self.nodes.get_mut(element.index()).map(|n| &mut n.data) else {
            tracing::warn!("set_attribute on non-element node {}", element);
            return;
        };
        if let Some(id) = id_value {
            elem.id = Some(id);
        }
        if name == "class" {
            elem.classes = classes;
        }
        elem.set_attr(QualName::new(ns, local), value.to_string());
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last = match self.nodes.get(parent.index()) {
            Some(p) => p.last_child,
            None => return,
        };

        {
            let c = &mut self.nodes[child.index()];
            c.parent = parent;
            c.prev_sibling = prev_last;
            c.next_sibling = NodeId::NONE;
        }

        if prev_last.is_valid() {
            self.nodes[prev_last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Resolve an interned string
    #[inline]
    pub fn resolve(&self, s: InternedString) -> &str {
        self.interner.get(s)
    }

    /// Access the interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Access the interner mutably
    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| self.resolve(e.name.local))
    }

    /// Attribute value of an element (name compared ASCII case-insensitively)
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        elem.attrs.iter()
            .find(|a| self.resolve(a.name.local).eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Whether an element carries the given class token
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.classes.iter().any(|c| self.resolve(*c) == class))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Parent of a node (None for the document node)
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Direct children in document order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// All descendants of `id` (excluding `id`) in document order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, root: id, next }
    }

    /// Proper ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(id).unwrap_or(NodeId::NONE) }
    }

    /// Siblings after `id`, in document order
    pub fn following_siblings(&self, id: NodeId) -> Siblings<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        Siblings { tree: self, next, forward: true }
    }

    /// Siblings before `id`, nearest first
    pub fn preceding_siblings(&self, id: NodeId) -> Siblings<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.prev_sibling);
        Siblings { tree: self, next, forward: false }
    }

    /// Whether `ancestor` is a proper ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Concatenation of all descendant text nodes in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
            return out;
        }
        for desc in self.descendants(id) {
            if let Some(text) = self.get(desc).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        let mut total = self.nodes.capacity() * std::mem::size_of::<Node>();
        for node in &self.nodes {
            total += match &node.data {
                NodeData::Text(t) => t.content.capacity(),
                NodeData::Comment(c) => c.capacity(),
                NodeData::Element(e) => {
                    e.attrs.iter().map(|a| a.value.capacity()).sum::<usize>()
                        + e.attrs.capacity() * std::mem::size_of::<crate::Attribute>()
                        + e.classes.capacity() * std::mem::size_of::<InternedString>()
                }
                NodeData::Doctype { public_id, system_id, .. } => {
                    public_id.capacity() + system_id.capacity()
                }
                NodeData::Document => 0,
            };
        }
        total + self.interner.memory_usage()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree, not including its root
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            // Climb until a next sibling exists, without leaving the subtree
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
            }
        };

        Some(current)
    }
}

/// Iterator over ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = node.parent;
        Some(current)
    }
}

/// Iterator over siblings in one direction
pub struct Siblings<'a> {
    tree: &'a DomTree,
    next: NodeId,
    forward: bool,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = if self.forward { node.next_sibling } else { node.prev_sibling };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <div><p>a</p><span>b<em>c</em></span></div><ul></ul>
    fn sample() -> (DomTree, [NodeId; 7]) {
        let mut tree = DomTree::new();
        let root = tree.root();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let a = tree.create_text("a");
        let span = tree.create_element("span");
        let b = tree.create_text("b");
        let em = tree.create_element("em");
        let c = tree.create_text("c");
        let ul = tree.create_element("ul");

        tree.append_child(root, div);
        tree.append_child(div, p);
        tree.append_child(p, a);
        tree.append_child(div, span);
        tree.append_child(span, b);
        tree.append_child(span, em);
        tree.append_child(em, c);
        tree.append_child(root, ul);

        (tree, [div, p, span, em, ul, a, c])
    }

    #[test]
    fn test_children_order() {
        let (tree, [div, p, span, ..]) = sample();
        let kids: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![p, span]);
    }

    #[test]
    fn test_descendants_stay_in_subtree() {
        let (tree, [div, p, span, em, ul, a, c]) = sample();
        let desc: Vec<NodeId> = tree.descendants(div).collect();
        assert_eq!(desc.len(), 6);
        assert_eq!(desc[0], p);
        assert_eq!(desc[1], a);
        assert_eq!(desc[2], span);
        assert_eq!(desc[4], em);
        assert_eq!(desc[5], c);
        assert!(!desc.contains(&ul));
    }

    #[test]
    fn test_descendants_of_root_reach_everything() {
        let (tree, _) = sample();
        assert_eq!(tree.descendants(tree.root()).count(), tree.len() - 1);
    }

    #[test]
    fn test_ancestors_and_siblings() {
        let (tree, [div, p, span, em, ul, ..]) = sample();
        let anc: Vec<NodeId> = tree.ancestors(em).collect();
        assert_eq!(anc, vec![span, div, NodeId::ROOT]);
        assert!(tree.is_ancestor(div, em));
        assert!(!tree.is_ancestor(p, em));

        assert_eq!(tree.following_siblings(p).collect::<Vec<_>>(), vec![span]);
        assert_eq!(tree.preceding_siblings(span).collect::<Vec<_>>(), vec![p]);
        assert_eq!(tree.following_siblings(div).collect::<Vec<_>>(), vec![ul]);
    }

    #[test]
    fn test_text_content_concatenates() {
        let (tree, [div, _, span, ..]) = sample();
        assert_eq!(tree.text_content(div), "abc");
        assert_eq!(tree.text_content(span), "bc");
    }

    #[test]
    fn test_attributes_cache_id_and_class() {
        let mut tree = DomTree::new();
        let el = tree.create_element("span");
        tree.set_attribute(el, "id", "world");
        tree.set_attribute(el, "class", "hello big");

        assert_eq!(tree.attribute(el, "ID"), Some("world"));
        assert!(tree.has_class(el, "big"));
        assert!(!tree.has_class(el, "Big"));
        let elem = tree.get(el).and_then(Node::as_element).unwrap();
        assert_eq!(elem.id.map(|i| tree.resolve(i)), Some("world"));
    }
}
