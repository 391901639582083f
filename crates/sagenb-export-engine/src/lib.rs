pub mod io;
pub mod models;
pub mod parsing;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::*;
pub use models::{cell::*, worksheet::*};
pub use parsing::{ParseError, WorksheetParser, parse_worksheet, parse_worksheet_with, unescape::*};
