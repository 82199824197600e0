//! Structured error types for the folio layout engine.
//!
//! Layout bugs are loud: every invariant violation is a [`LayoutError`] that
//! aborts the pass. Content that merely doesn't fit is not an error at all;
//! it is logged and clipped, see the pagination and table modules.

use thiserror::Error;

/// A caller bug detected during layout or paint. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error(
        "invalid constraints: width {min_width}..{max_width}, height {min_height}..{max_height}"
    )]
    InvalidConstraints {
        min_width: f64,
        max_width: f64,
        min_height: f64,
        max_height: f64,
    },

    #[error("{name} must be {expected}, got {value}")]
    InvalidFactor {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("fraction column width must be within [0, 1], got {0}")]
    InvalidFraction(f64),

    #[error("pop from an empty transform stack")]
    EmptyTransformStack,

    #[error("transform is not invertible")]
    NonInvertibleTransform,

    #[error("{0} painted before it was laid out")]
    NotLaidOut(&'static str),

    #[error("graphics restore without a matching save")]
    UnbalancedSave,
}

/// The unified error type returned by the crate's document-level API.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid folio document.
    #[error("failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
    /// A widget tree violated a layout invariant.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// A custom font could not be decoded or parsed.
    #[error("font error: {0}")]
    Font(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the folio document schema. Check node types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}
