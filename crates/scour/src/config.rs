//! Engine Configuration

use scour_html::ParserOptions;

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Evaluate top-level query keys on worker threads
    pub parallel: bool,

    /// Upper bound on worker threads when `parallel` is set
    pub max_threads: usize,

    /// Keep text nodes that contain only whitespace
    pub keep_whitespace_text: bool,

    /// Reject documents larger than this many bytes
    pub max_document_bytes: Option<usize>,

    /// URL recorded on parsed documents
    pub url: String,
}

impl Config {
    /// Parser-side subset of the configuration
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            keep_whitespace_text: self.keep_whitespace_text,
            max_document_bytes: self.max_document_bytes,
            url: self.url.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            max_threads: scour_query::parallel::num_cpus(),
            keep_whitespace_text: true,
            max_document_bytes: None,
            url: "about:blank".to_string(),
        }
    }
}
