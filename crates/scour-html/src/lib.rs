//! scour HTML Parser
//!
//! HTML5 front end built on html5ever. Turns raw bytes or text into an
//! immutable [`Document`] that the query engine reads.

mod parser;

pub use parser::{HtmlParser, ParserOptions};
pub use scour_dom::{Document, DomTree, NodeId};

/// Parse an HTML string with default options
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse raw bytes (must be UTF-8) with default options
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, ParseError> {
    HtmlParser::new().parse_bytes(bytes)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Encoding { valid_up_to: usize },

    #[error("Document is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}
