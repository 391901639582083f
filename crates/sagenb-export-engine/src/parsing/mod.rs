//! # Worksheet Parsing
//!
//! A SageNB `worksheet.html` is plain text interleaved with compute cells:
//!
//! ```text
//! Some narrative text
//! {{{id=3|
//! x = 1
//! ///
//! 4
//! }}}
//! ```
//!
//! ## Parsing Phases
//!
//! 1. **Line Classification** (`classify`): each line is checked against the
//!    three marker shapes, with no context.
//! 2. **Cell Construction** (`parser`): `WorksheetParser` walks the lines as a
//!    three-state machine (outside, input, output) and yields cells lazily.
//!
//! Runs are joined with `\n`, trimmed, then passed through an [`Unescape`]
//! implementation. Markers are only recognised in the state that waits for
//! them; anywhere else they are ordinary content.

pub mod classify;
pub mod lines;
pub mod parser;
pub mod unescape;

#[cfg(test)]
mod tests;

use std::num::ParseIntError;

pub use classify::{LineClass, WorksheetLineClassifier, is_cell_close, is_cell_mid, is_cell_open};
pub use parser::WorksheetParser;
use unescape::{HtmlUnescape, Unescape, UnescapeError};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("corrupt worksheet: cell index {digits:?} on line {line} is not a valid index: {source}")]
    MalformedIndex {
        line: usize,
        digits: String,
        source: ParseIntError,
    },
    #[error(transparent)]
    Unescape(#[from] UnescapeError),
}

/// Parses worksheet text with the default HTML unescaping.
pub fn parse_worksheet(worksheet: &str) -> WorksheetParser<'_, HtmlUnescape> {
    WorksheetParser::new(worksheet, HtmlUnescape)
}

/// Parses worksheet text with a caller-supplied unescaper.
pub fn parse_worksheet_with<U: Unescape>(worksheet: &str, unescape: U) -> WorksheetParser<'_, U> {
    WorksheetParser::new(worksheet, unescape)
}
