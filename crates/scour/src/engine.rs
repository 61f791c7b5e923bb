//! Engine - Main entry point

use scour_html::{Document, HtmlParser};
use scour_query::{QueryPlan, ResultStore};

use crate::{Config, Error};

/// Parses documents and runs compiled plans over them
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    parser: HtmlParser,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        tracing::debug!("scour {} initialized", crate::VERSION);
        let parser = HtmlParser::with_options(config.parser_options());
        Self { config, parser }
    }

    /// Parse `source` and execute `plan` against it
    pub fn parse(&self, source: impl AsRef<[u8]>, plan: &QueryPlan) -> Result<ResultStore, Error> {
        let document = self.load(source)?;
        self.execute(&document, plan)
    }

    /// Parse a document without running any query
    pub fn load(&self, source: impl AsRef<[u8]>) -> Result<Document, Error> {
        Ok(self.parser.parse_bytes(source.as_ref())?)
    }

    /// Execute `plan` against an already parsed document
    pub fn execute(&self, document: &Document, plan: &QueryPlan) -> Result<ResultStore, Error> {
        let tree = document.tree();
        let store = if self.config.parallel && plan.len() > 1 {
            plan.execute_parallel(tree, self.config.max_threads)?
        } else {
            plan.execute(tree)?
        };
        tracing::debug!(
            "Extracted {} records under {} keys from {}",
            store.record_count(),
            store.len(),
            document.url()
        );
        Ok(store)
    }

    /// Get engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
