//! Query declarations
//!
//! [`QueryDecl`] is the uncompiled, serializable description of a query
//! tree. It is usually produced with the fluent [`Query`] builder:
//!
//! ```
//! use scour_query::{CaptureSpec, Query};
//!
//! let decl = Query::all("#world")
//!     .capture(CaptureSpec::new().inner_html(true))
//!     .then([Query::all("a"), Query::all("p")]);
//! ```
//!
//! Chaining `.all()` / `.first()` nests each step under the previous one,
//! `.then([...])` attaches sibling branches under the last step, and
//! `.refine(...)` uses the last step's matches only as anchors.

use serde::{Deserialize, Serialize};

use crate::capture::CaptureSpec;
use crate::plan::Selection;

/// One selection step before compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDecl {
    pub selector: String,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default, skip_serializing_if = "CaptureSpec::is_empty")]
    pub capture: CaptureSpec,
    /// Concat-mode token relating the first compound to the anchor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concat: Option<String>,
    /// Output key, defaults to the selector text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl StepDecl {
    pub fn new(selector: impl Into<String>, selection: Selection) -> Self {
        Self {
            selector: selector.into(),
            selection,
            capture: CaptureSpec::new(),
            concat: None,
            alias: None,
        }
    }

    pub fn all(selector: impl Into<String>) -> Self {
        Self::new(selector, Selection::All)
    }

    pub fn first(selector: impl Into<String>) -> Self {
        Self::new(selector, Selection::First)
    }
}

/// Uncompiled query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryDecl {
    /// Records for every match of one step
    Leaf(StepDecl),
    /// First branch with a non-empty result
    Or {
        #[serde(default, skip_serializing_if = "CaptureSpec::is_empty")]
        capture: CaptureSpec,
        branches: Vec<QueryDecl>,
    },
    /// All branches, or nothing if any branch is empty
    And {
        #[serde(default, skip_serializing_if = "CaptureSpec::is_empty")]
        capture: CaptureSpec,
        branches: Vec<QueryDecl>,
    },
    /// Every non-empty branch
    Group {
        #[serde(default, skip_serializing_if = "CaptureSpec::is_empty")]
        capture: CaptureSpec,
        branches: Vec<QueryDecl>,
    },
    /// Step matches anchor the child; only the child's records are kept
    Then { step: StepDecl, children: Vec<QueryDecl> },
    /// One record per step match, carrying the child's results
    WithChildren { step: StepDecl, children: Vec<QueryDecl> },
}

impl QueryDecl {
    /// Overlay a capture spec on this node
    pub fn capture(mut self, spec: CaptureSpec) -> Self {
        match &mut self {
            QueryDecl::Leaf(step)
            | QueryDecl::Then { step, .. }
            | QueryDecl::WithChildren { step, .. } => step.capture = step.capture.merge(spec),
            QueryDecl::Or { capture, .. }
            | QueryDecl::And { capture, .. }
            | QueryDecl::Group { capture, .. } => *capture = capture.merge(spec),
        }
        self
    }

    /// The step of a step-rooted node
    pub fn step(&self) -> Option<&StepDecl> {
        match self {
            QueryDecl::Leaf(step)
            | QueryDecl::Then { step, .. }
            | QueryDecl::WithChildren { step, .. } => Some(step),
            _ => None,
        }
    }
}

impl From<StepDecl> for QueryDecl {
    fn from(step: StepDecl) -> Self {
        QueryDecl::Leaf(step)
    }
}

impl From<QueryBuilder> for QueryDecl {
    fn from(builder: QueryBuilder) -> Self {
        builder.build()
    }
}

fn collect<I>(branches: I) -> Vec<QueryDecl>
where
    I: IntoIterator,
    I::Item: Into<QueryDecl>,
{
    branches.into_iter().map(Into::into).collect()
}

/// OR over branches: the first non-empty result wins
pub fn or<I>(branches: I) -> QueryDecl
where
    I: IntoIterator,
    I::Item: Into<QueryDecl>,
{
    QueryDecl::Or { capture: CaptureSpec::new(), branches: collect(branches) }
}

/// AND over branches: all must match, results are merged
pub fn and<I>(branches: I) -> QueryDecl
where
    I: IntoIterator,
    I::Item: Into<QueryDecl>,
{
    QueryDecl::And { capture: CaptureSpec::new(), branches: collect(branches) }
}

/// Independent branches evaluated side by side
pub fn group<I>(branches: I) -> QueryDecl
where
    I: IntoIterator,
    I::Item: Into<QueryDecl>,
{
    QueryDecl::Group { capture: CaptureSpec::new(), branches: collect(branches) }
}

/// Entry point of the fluent builder
pub struct Query;

impl Query {
    /// Start a chain selecting every match
    pub fn all(selector: impl Into<String>) -> QueryBuilder {
        QueryBuilder { parents: Vec::new(), last: StepDecl::all(selector) }
    }

    /// Start a chain selecting the first match per anchor
    pub fn first(selector: impl Into<String>) -> QueryBuilder {
        QueryBuilder { parents: Vec::new(), last: StepDecl::first(selector) }
    }
}

/// Chain of steps, each nested under the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    /// Outermost first
    parents: Vec<StepDecl>,
    last: StepDecl,
}

impl QueryBuilder {
    pub fn all(self, selector: impl Into<String>) -> Self {
        self.push(StepDecl::all(selector))
    }

    pub fn first(self, selector: impl Into<String>) -> Self {
        self.push(StepDecl::first(selector))
    }

    fn push(mut self, step: StepDecl) -> Self {
        let previous = std::mem::replace(&mut self.last, step);
        self.parents.push(previous);
        self
    }

    /// Capture spec for the last step
    pub fn capture(mut self, spec: CaptureSpec) -> Self {
        self.last.capture = self.last.capture.merge(spec);
        self
    }

    /// Concat mode for the last step (`child`, `descendant`, `SubsequentSibling`, `~`)
    pub fn concat(mut self, token: impl Into<String>) -> Self {
        self.last.concat = Some(token.into());
        self
    }

    /// Output key for the last step
    pub fn alias(mut self, label: impl Into<String>) -> Self {
        self.last.alias = Some(label.into());
        self
    }

    /// Attach sibling branches under the last step
    pub fn then<I>(self, branches: I) -> QueryDecl
    where
        I: IntoIterator,
        I::Item: Into<QueryDecl>,
    {
        let mut branches = collect(branches);
        let child = if branches.len() == 1 {
            branches.remove(0)
        } else {
            group(branches)
        };
        self.finish(|step| QueryDecl::WithChildren { step, children: vec![child] })
    }

    /// Attach one subtree under the last step
    pub fn with_children(self, child: impl Into<QueryDecl>) -> QueryDecl {
        let child = child.into();
        self.finish(|step| QueryDecl::WithChildren { step, children: vec![child] })
    }

    /// Use the last step's matches only as anchors for `child`
    pub fn refine(self, child: impl Into<QueryDecl>) -> QueryDecl {
        let child = child.into();
        self.finish(|step| QueryDecl::Then { step, children: vec![child] })
    }

    /// Finish the chain without children
    pub fn build(self) -> QueryDecl {
        self.finish(QueryDecl::Leaf)
    }

    /// Wrap the last step with `tail`, then nest every earlier step around it
    fn finish(mut self, tail: impl FnOnce(StepDecl) -> QueryDecl) -> QueryDecl {
        let mut node = tail(self.last);
        while let Some(step) = self.parents.pop() {
            node = QueryDecl::WithChildren { step, children: vec![node] };
        }
        node
    }
}
