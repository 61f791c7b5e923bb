//! Selector matching against a DomTree
//!
//! Chains are matched right to left: the candidate must satisfy the last
//! compound, then each combinator walks toward the anchor, backtracking over
//! ancestors or earlier siblings until the first compound is reached and its
//! lead combinator relates it to the anchor.

use scour_dom::{DomTree, ElementData, Node, NodeId};

use crate::plan::Selection;
use crate::selector::{Combinator, Selector, SelectorChain};

/// Matching context: the tree plus the node matches are relative to
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub tree: &'a DomTree,
    pub anchor: NodeId,
}

impl<'a> MatchContext<'a> {
    /// Context anchored at the document node
    pub fn document(tree: &'a DomTree) -> Self {
        Self { tree, anchor: tree.root() }
    }

    pub fn new(tree: &'a DomTree, anchor: NodeId) -> Self {
        Self { tree, anchor }
    }
}

/// Whether `node` satisfies a single compound selector and its combinator
/// relation to the context anchor.
pub fn matches(selector: &Selector, node: NodeId, ctx: &MatchContext<'_>) -> bool {
    matches_compound(selector, node, ctx.tree) && relates(selector.combinator, node, ctx.anchor, ctx.tree)
}

/// Compound test only (tag, id, classes, attributes)
pub fn matches_compound(selector: &Selector, node: NodeId, tree: &DomTree) -> bool {
    let Some(elem) = tree.get(node).and_then(Node::as_element) else {
        return false;
    };
    match_element(selector, elem, tree)
}

fn match_element(selector: &Selector, elem: &ElementData, tree: &DomTree) -> bool {
    if let Some(tag) = &selector.tag {
        if !tree.resolve(elem.name.local).eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if let Some(id) = &selector.id {
        if elem.id.map(|i| tree.resolve(i)) != Some(id.as_str()) {
            return false;
        }
    }

    let has_classes = selector.classes.iter()
        .all(|class| elem.classes.iter().any(|c| tree.resolve(*c) == class));
    if !has_classes {
        return false;
    }

    selector.attributes.iter().all(|attr| {
        let value = elem.attrs.iter()
            .find(|a| tree.resolve(a.name.local).eq_ignore_ascii_case(&attr.name))
            .map(|a| a.value.as_str());
        attr.matches(value)
    })
}

/// Relation between a node and the anchor for a lead combinator
fn relates(combinator: Combinator, node: NodeId, anchor: NodeId, tree: &DomTree) -> bool {
    match combinator {
        Combinator::Root => true,
        Combinator::Descendant => tree.is_ancestor(anchor, node),
        Combinator::Child => tree.parent(node) == Some(anchor),
        Combinator::SubsequentSibling => {
            tree.parent(node).is_some() && tree.preceding_siblings(node).any(|s| s == anchor)
        }
    }
}

impl SelectorChain {
    /// Whether `node` matches the whole chain relative to the context anchor
    pub fn matches(&self, node: NodeId, ctx: &MatchContext<'_>) -> bool {
        match_from(self.parts(), node, ctx)
    }

    /// All matching elements in document order; `First` keeps only the
    /// earliest.
    pub fn select(&self, ctx: &MatchContext<'_>, selection: Selection) -> Vec<NodeId> {
        let mut found = self.candidates(ctx)
            .filter(|&id| self.matches(id, ctx));

        match selection {
            Selection::First => found.next().into_iter().collect(),
            Selection::All => found.collect(),
        }
    }

    /// Nodes that can possibly match, in document order
    fn candidates<'t>(&self, ctx: &MatchContext<'t>) -> Box<dyn Iterator<Item = NodeId> + 't> {
        let tree = ctx.tree;
        let anchor = ctx.anchor;

        match (self.lead(), self.parts().len()) {
            (Combinator::Child, 1) => Box::new(tree.children(anchor).map(|(id, _)| id)),
            (Combinator::SubsequentSibling, 1) => Box::new(tree.following_siblings(anchor)),
            (Combinator::SubsequentSibling, _) => Box::new(
                tree.following_siblings(anchor)
                    .flat_map(move |s| std::iter::once(s).chain(tree.descendants(s))),
            ),
            _ => Box::new(tree.descendants(anchor)),
        }
    }
}

/// Match `parts` with the last compound at `node`
fn match_from(parts: &[Selector], node: NodeId, ctx: &MatchContext<'_>) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return false;
    };
    if !matches_compound(last, node, ctx.tree) {
        return false;
    }
    if rest.is_empty() {
        return relates(last.combinator, node, ctx.anchor, ctx.tree);
    }

    let tree = ctx.tree;
    match last.combinator {
        Combinator::Child => tree.parent(node)
            .is_some_and(|parent| match_from(rest, parent, ctx)),
        Combinator::Descendant | Combinator::Root => tree.ancestors(node)
            .any(|ancestor| match_from(rest, ancestor, ctx)),
        Combinator::SubsequentSibling => tree.preceding_siblings(node)
            .any(|sibling| match_from(rest, sibling, ctx)),
    }
}
