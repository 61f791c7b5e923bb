//! Combinator evaluation
//!
//! Walks a compiled [`QueryNode`] tree relative to an anchor node and
//! produces label → records. Capture specs are folded from the root toward
//! the leaves, so the deepest spec that sets a field decides it.

use scour_dom::{DomTree, NodeId};

use crate::capture::{build_record, CaptureSpec};
use crate::matcher::MatchContext;
use crate::plan::{QueryNode, Step};
use crate::store::ChildMap;
use crate::CaptureError;

/// Evaluates query trees over one document
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    tree: &'a DomTree,
}

impl<'a> Evaluator<'a> {
    pub fn new(tree: &'a DomTree) -> Self {
        Self { tree }
    }

    /// Evaluate `node` with matches related to `anchor`
    pub fn evaluate(&self, node: &QueryNode, anchor: NodeId) -> Result<ChildMap, CaptureError> {
        self.eval(node, anchor, CaptureSpec::new())
    }

    fn eval(&self, node: &QueryNode, anchor: NodeId, inherited: CaptureSpec) -> Result<ChildMap, CaptureError> {
        match node {
            QueryNode::Leaf(step) => {
                let capture = inherited.merge(step.capture).resolve();
                let records = self.select(step, anchor)
                    .into_iter()
                    .map(|m| build_record(self.tree, m, capture, &step.label))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(single(&step.label, records))
            }
            QueryNode::Or(branches) => {
                let spec = inherited.merge(branches.capture);
                for (i, child) in branches.nodes.iter().enumerate() {
                    let result = self.eval(child, anchor, spec)?;
                    if !result.is_empty() {
                        tracing::trace!("OR branch {} matched at {}", i, anchor);
                        return Ok(result);
                    }
                }
                Ok(ChildMap::new())
            }
            QueryNode::And(branches) => {
                let spec = inherited.merge(branches.capture);
                let mut out = ChildMap::new();
                for (i, child) in branches.nodes.iter().enumerate() {
                    let result = self.eval(child, anchor, spec)?;
                    if result.is_empty() {
                        tracing::trace!("AND branch {} empty at {}", i, anchor);
                        return Ok(ChildMap::new());
                    }
                    merge_into(&mut out, result);
                }
                Ok(out)
            }
            QueryNode::Group(branches) => {
                let spec = inherited.merge(branches.capture);
                let mut out = ChildMap::new();
                for child in &branches.nodes {
                    merge_into(&mut out, self.eval(child, anchor, spec)?);
                }
                Ok(out)
            }
            QueryNode::Then(step, child) => {
                let spec = inherited.merge(step.capture);
                let mut out = ChildMap::new();
                for m in self.select(step, anchor) {
                    merge_into(&mut out, self.eval(child, m, spec)?);
                }
                Ok(out)
            }
            QueryNode::WithChildren(step, child) => {
                let spec = inherited.merge(step.capture);
                let capture = spec.resolve();
                let mut records = Vec::new();
                for m in self.select(step, anchor) {
                    let mut record = build_record(self.tree, m, capture, &step.label)?;
                    record.children = self.eval(child, m, spec)?;
                    records.push(record);
                }
                Ok(single(&step.label, records))
            }
        }
    }

    fn select(&self, step: &Step, anchor: NodeId) -> Vec<NodeId> {
        step.selector.select(&MatchContext::new(self.tree, anchor), step.selection)
    }
}

/// Map with one entry, or empty when there are no records
fn single(label: &str, records: Vec<crate::ResultRecord>) -> ChildMap {
    let mut out = ChildMap::new();
    if !records.is_empty() {
        out.insert(label.to_string(), records);
    }
    out
}

/// Append `other` into `out`; shared labels concatenate in order
fn merge_into(out: &mut ChildMap, other: ChildMap) {
    for (label, mut records) in other {
        out.entry(label).or_default().append(&mut records);
    }
}
