//! scour
//!
//! Declarative structured extraction from HTML. A [`QueryPlan`] is compiled
//! once from selector chains and combinators, then executed against any
//! number of documents, each run producing an owned [`ResultStore`].
//!
//! # Example
//! ```
//! use scour::{parse, Query, QueryPlan};
//!
//! let plan = QueryPlan::builder()
//!     .query(Query::all("#world").all("a"))
//!     .build()?;
//!
//! let html = r#"<span id="world">Hello <a href="https://www.example.com">World</a></span>"#;
//! let store = parse(html, &plan)?;
//!
//! let link = &store["#world"][0]["a"][0];
//! assert_eq!(link.attribute("href"), Some("https://www.example.com"));
//! assert_eq!(link.text_content(), Some("World"));
//! # Ok::<(), scour::Error>(())
//! ```

use std::sync::OnceLock;

mod config;
mod engine;
mod error;

pub use config::Config;
pub use engine::Engine;
pub use error::Error;

pub use scour_html::{Document, ParseError};
pub use scour_query::{
    and, group, or, CaptureError, CaptureSpec, CompileError, Query, QueryDecl, QueryNode,
    QueryPlan, ResultRecord, ResultStore, Selection,
};

// Re-export sub-crates for advanced usage
pub use scour_dom as dom;
pub use scour_html as html;
pub use scour_query as query;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `source` (UTF-8 bytes or text) and execute `plan` with the default
/// configuration
pub fn parse(source: impl AsRef<[u8]>, plan: &QueryPlan) -> Result<ResultStore, Error> {
    default_engine().parse(source, plan)
}

/// Shared engine with [`Config::default`], built on first use
pub fn default_engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(Engine::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_shared() {
        assert!(std::ptr::eq(default_engine(), default_engine()));
        assert!(default_engine().config().keep_whitespace_text);
    }

    #[test]
    fn test_parse_repeatedly() {
        let plan = QueryPlan::builder().query(Query::all("p")).build().unwrap();
        for _ in 0..3 {
            assert_eq!(parse("<p>a</p><p>b</p>", &plan).unwrap()["p"].len(), 2);
        }
    }
}
