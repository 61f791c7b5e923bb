//! Compiled query plans
//!
//! [`QueryPlan`] holds validated [`QueryNode`] trees keyed by output name.
//! Compilation parses every selector, resolves concat modes, and checks
//! arities. Every error names the node path where it was found (`key/0/1`).
//! A compiled plan is immutable and can be executed against any number of
//! documents, concurrently.

use indexmap::IndexMap;
use scour_dom::DomTree;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capture::CaptureSpec;
use crate::decl::{QueryDecl, StepDecl};
use crate::eval::Evaluator;
use crate::parallel;
use crate::selector::{Combinator, SelectorChain};
use crate::store::{ResultRecord, ResultStore};
use crate::{CaptureError, CompileError};

/// How many matches a step keeps per anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    First,
}

/// A compiled selection step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub selector: SelectorChain,
    pub selection: Selection,
    pub capture: CaptureSpec,
    pub label: String,
}

/// Children of a composite node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branches {
    pub capture: CaptureSpec,
    pub nodes: Vec<QueryNode>,
}

/// Compiled query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryNode {
    Leaf(Step),
    Or(Branches),
    And(Branches),
    Group(Branches),
    Then(Step, Box<QueryNode>),
    WithChildren(Step, Box<QueryNode>),
}

impl QueryNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            QueryNode::Leaf(_) => NodeKind::Leaf,
            QueryNode::Or(_) => NodeKind::Or,
            QueryNode::And(_) => NodeKind::And,
            QueryNode::Group(_) => NodeKind::Group,
            QueryNode::Then(..) => NodeKind::Then,
            QueryNode::WithChildren(..) => NodeKind::WithChildren,
        }
    }

    /// Output label of a step-rooted node
    pub fn label(&self) -> Option<&str> {
        match self {
            QueryNode::Leaf(step) | QueryNode::Then(step, _) | QueryNode::WithChildren(step, _) => {
                Some(&step.label)
            }
            _ => None,
        }
    }
}

/// Node kind, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Leaf,
    Or,
    And,
    Group,
    Then,
    WithChildren,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Leaf => "LEAF",
            NodeKind::Or => "OR",
            NodeKind::And => "AND",
            NodeKind::Group => "GROUP",
            NodeKind::Then => "THEN",
            NodeKind::WithChildren => "WITH_CHILDREN",
        })
    }
}

/// Location of a node inside a plan: key, then child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    key: String,
    indices: Vec<usize>,
}

impl NodePath {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), indices: Vec::new() }
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.indices.push(index);
        path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        for i in &self.indices {
            write!(f, "/{i}")?;
        }
        Ok(())
    }
}

/// Compiled, immutable set of keyed queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryPlan {
    queries: IndexMap<String, QueryNode>,
}

impl QueryPlan {
    pub fn builder() -> PlanBuilder {
        PlanBuilder::default()
    }

    /// Compile `(key, declaration)` pairs in order
    pub fn compile<I, K>(decls: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = (K, QueryDecl)>,
        K: Into<String>,
    {
        let mut builder = PlanBuilder::default();
        for (key, decl) in decls {
            builder = builder.key(key, decl);
        }
        builder.build()
    }

    pub fn get(&self, key: &str) -> Option<&QueryNode> {
        self.queries.get(key)
    }

    /// Keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryNode)> {
        self.queries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Run every query against `tree`, in declaration order
    pub fn execute(&self, tree: &DomTree) -> Result<ResultStore, CaptureError> {
        tracing::debug!("Executing plan with {} queries over {} nodes", self.len(), tree.len());

        let mut store = ResultStore::new();
        for (key, node) in &self.queries {
            store.insert(key.clone(), run_query(tree, key, node)?);
        }
        Ok(store)
    }

    /// Run queries on up to `max_threads` worker threads. The store is
    /// identical to what [`execute`](Self::execute) returns.
    pub fn execute_parallel(&self, tree: &DomTree, max_threads: usize) -> Result<ResultStore, CaptureError> {
        let items: Vec<(&String, &QueryNode)> = self.queries.iter().collect();
        tracing::debug!(
            "Executing plan with {} queries on up to {} threads",
            items.len(),
            max_threads
        );

        let results = parallel::map_chunked(&items, max_threads, |(key, node)| {
            run_query(tree, key, node)
        });

        let mut store = ResultStore::new();
        for ((key, _), records) in items.into_iter().zip(results) {
            store.insert(key.clone(), records?);
        }
        Ok(store)
    }
}

/// Evaluate one top-level query against the document node. A composite
/// root flattens its labels into one list, first-seen label order.
fn run_query(tree: &DomTree, key: &str, node: &QueryNode) -> Result<Vec<ResultRecord>, CaptureError> {
    let captures = Evaluator::new(tree).evaluate(node, tree.root())?;
    let records: Vec<ResultRecord> = captures.into_values().flatten().collect();
    tracing::trace!("Query {} produced {} records", key, records.len());
    Ok(records)
}

/// Collects keyed declarations and compiles them into a [`QueryPlan`]
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    entries: Vec<(Option<String>, QueryDecl)>,
}

impl PlanBuilder {
    /// Add a query under an explicit key
    pub fn key(mut self, key: impl Into<String>, decl: impl Into<QueryDecl>) -> Self {
        self.entries.push((Some(key.into()), decl.into()));
        self
    }

    /// Add a query keyed by its root step's label (alias or selector)
    pub fn query(mut self, decl: impl Into<QueryDecl>) -> Self {
        self.entries.push((None, decl.into()));
        self
    }

    pub fn build(self) -> Result<QueryPlan, CompileError> {
        let mut queries = IndexMap::with_capacity(self.entries.len());

        for (index, (key, decl)) in self.entries.into_iter().enumerate() {
            let key = match key {
                Some(key) => key,
                None => match decl.step() {
                    Some(step) => label_of(step),
                    None => {
                        return Err(CompileError::MissingKey {
                            index,
                            kind: decl_kind(&decl),
                        });
                    }
                },
            };
            if queries.contains_key(&key) {
                return Err(CompileError::DuplicateKey(key));
            }

            let node = compile_node(&decl, &NodePath::new(key.as_str()), true)?;
            queries.insert(key, node);
        }

        tracing::debug!("Compiled query plan with {} keys", queries.len());
        Ok(QueryPlan { queries })
    }
}

fn label_of(step: &StepDecl) -> String {
    step.alias.clone().unwrap_or_else(|| step.selector.trim().to_string())
}

fn decl_kind(decl: &QueryDecl) -> NodeKind {
    match decl {
        QueryDecl::Leaf(_) => NodeKind::Leaf,
        QueryDecl::Or { .. } => NodeKind::Or,
        QueryDecl::And { .. } => NodeKind::And,
        QueryDecl::Group { .. } => NodeKind::Group,
        QueryDecl::Then { .. } => NodeKind::Then,
        QueryDecl::WithChildren { .. } => NodeKind::WithChildren,
    }
}

/// `top_level` is true while the node is still evaluated against the
/// document node (the key's root and composite branches under it).
fn compile_node(decl: &QueryDecl, path: &NodePath, top_level: bool) -> Result<QueryNode, CompileError> {
    let kind = decl_kind(decl);
    match decl {
        QueryDecl::Leaf(step) => Ok(QueryNode::Leaf(compile_step(step, path, top_level)?)),
        QueryDecl::Or { capture, branches } => {
            check_arity(kind, path, branches.len(), 2, "at least 2")?;
            Ok(QueryNode::Or(compile_branches(*capture, branches, path, top_level)?))
        }
        QueryDecl::And { capture, branches } => {
            check_arity(kind, path, branches.len(), 2, "at least 2")?;
            Ok(QueryNode::And(compile_branches(*capture, branches, path, top_level)?))
        }
        QueryDecl::Group { capture, branches } => {
            check_arity(kind, path, branches.len(), 1, "at least 1")?;
            Ok(QueryNode::Group(compile_branches(*capture, branches, path, top_level)?))
        }
        QueryDecl::Then { step, children } | QueryDecl::WithChildren { step, children } => {
            let [child] = children.as_slice() else {
                return Err(CompileError::Arity {
                    path: path.clone(),
                    kind,
                    expected: "exactly 1",
                    found: children.len(),
                });
            };
            let step = compile_step(step, path, top_level)?;
            let child = Box::new(compile_node(child, &path.child(0), false)?);
            Ok(match decl {
                QueryDecl::Then { .. } => QueryNode::Then(step, child),
                _ => QueryNode::WithChildren(step, child),
            })
        }
    }
}

fn check_arity(
    kind: NodeKind,
    path: &NodePath,
    found: usize,
    min: usize,
    expected: &'static str,
) -> Result<(), CompileError> {
    if found < min {
        return Err(CompileError::Arity { path: path.clone(), kind, expected, found });
    }
    Ok(())
}

fn compile_branches(
    capture: CaptureSpec,
    branches: &[QueryDecl],
    path: &NodePath,
    top_level: bool,
) -> Result<Branches, CompileError> {
    let nodes = branches.iter()
        .enumerate()
        .map(|(i, b)| compile_node(b, &path.child(i), top_level))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Branches { capture, nodes })
}

fn compile_step(decl: &StepDecl, path: &NodePath, top_level: bool) -> Result<Step, CompileError> {
    let mut selector = SelectorChain::parse(&decl.selector).map_err(|source| {
        CompileError::InvalidSelector {
            path: path.clone(),
            selector: decl.selector.clone(),
            source,
        }
    })?;

    let concat = decl.concat.as_deref()
        .map(|token| {
            Combinator::from_concat(token).ok_or_else(|| CompileError::UnknownConcat {
                path: path.clone(),
                token: token.to_string(),
            })
        })
        .transpose()?;

    let lead = match (selector.written_lead(), concat) {
        (Some(written), Some(concat)) if written != concat => {
            return Err(CompileError::ConflictingConcat { path: path.clone(), written, concat });
        }
        (Some(written), _) => written,
        (None, Some(concat)) => concat,
        (None, None) if top_level => Combinator::Root,
        (None, None) => Combinator::Descendant,
    };
    selector.set_lead(lead);

    Ok(Step {
        selector,
        selection: decl.selection,
        capture: decl.capture,
        label: label_of(decl),
    })
}
