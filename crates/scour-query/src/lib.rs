//! scour query engine
//!
//! Declarative extraction over a parsed [`DomTree`]:
//! - [`selector`]: selector strings compiled to [`SelectorChain`]s
//! - [`matcher`]: right-to-left chain matching relative to an anchor
//! - [`decl`]: the fluent [`Query`] builder and [`QueryDecl`] trees
//! - [`plan`]: compilation into an immutable [`QueryPlan`]
//! - [`eval`]: OR / AND / GROUP / THEN / WITH_CHILDREN evaluation
//! - [`store`]: [`ResultStore`] and [`ResultRecord`]
//!
//! ```
//! use scour_query::{Query, QueryPlan};
//!
//! let plan = QueryPlan::builder()
//!     .query(Query::all("a[href]"))
//!     .build()
//!     .unwrap();
//! assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["a[href]"]);
//! ```

pub mod capture;
pub mod decl;
pub mod eval;
pub mod matcher;
pub mod parallel;
pub mod plan;
pub mod selector;
pub mod store;

pub use capture::{Capture, CaptureSpec};
pub use decl::{and, group, or, Query, QueryBuilder, QueryDecl, StepDecl};
pub use eval::Evaluator;
pub use matcher::{matches, MatchContext};
pub use plan::{Branches, NodeKind, NodePath, PlanBuilder, QueryNode, QueryPlan, Selection, Step};
pub use selector::{AttributeSelector, Combinator, Selector, SelectorChain, SelectorError};
pub use store::{ChildMap, ResultRecord, ResultStore};

pub use scour_dom::{DomTree, NodeId};

/// Plan compilation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("{path}: {kind} expects {expected} child node(s), found {found}")]
    Arity {
        path: NodePath,
        kind: NodeKind,
        expected: &'static str,
        found: usize,
    },

    #[error("{path}: unknown concat mode `{token}` (expected child, descendant, SubsequentSibling or ~)")]
    UnknownConcat { path: NodePath, token: String },

    #[error("{path}: concat mode `{concat}` conflicts with the selector's leading `{written}`")]
    ConflictingConcat {
        path: NodePath,
        written: Combinator,
        concat: Combinator,
    },

    #[error("{path}: invalid selector `{selector}`: {source}")]
    InvalidSelector {
        path: NodePath,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("duplicate query key `{0}`")]
    DuplicateKey(String),

    #[error("query #{index} is a {kind} node and needs an explicit key")]
    MissingKey { index: usize, kind: NodeKind },
}

/// Error while building result records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("node {0} is not in the document")]
    NodeNotFound(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
}
