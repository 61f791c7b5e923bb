//! Unified error type

use scour_html::ParseError;
use scour_query::{CaptureError, CompileError};

/// Any failure along compile → parse → execute
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
}
