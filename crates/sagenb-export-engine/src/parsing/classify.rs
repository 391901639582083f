/// Opening marker prefix, followed by the cell index and [`CELL_OPEN_SUFFIX`].
pub const CELL_OPEN_PREFIX: &str = "{{{id=";
pub const CELL_OPEN_SUFFIX: &str = "|";
/// Separates a compute cell's input from its output.
pub const CELL_MID: &str = "///";
/// Ends a compute cell.
pub const CELL_CLOSE: &str = "}}}";

/// Classification of a single worksheet line.
///
/// Only three exact line shapes carry structure; everything else is
/// [`LineClass::Content`] and is never inspected further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// `{{{id=N|` with the digit run `N` still unparsed.
    CellOpen { digits: &'a str },
    /// `///`
    CellMid,
    /// `}}}`
    CellClose,
    Content,
}

/// Matches `{{{id=<digits>|` exactly and returns the digit run.
pub fn is_cell_open(line: &str) -> Option<&str> {
    let digits = line
        .strip_prefix(CELL_OPEN_PREFIX)?
        .strip_suffix(CELL_OPEN_SUFFIX)?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

pub fn is_cell_mid(line: &str) -> bool {
    line == CELL_MID
}

pub fn is_cell_close(line: &str) -> bool {
    line == CELL_CLOSE
}

/// Classifies worksheet lines, one at a time and without lookahead.
pub struct WorksheetLineClassifier;

impl WorksheetLineClassifier {
    pub fn classify<'a>(&self, line: &'a str) -> LineClass<'a> {
        if let Some(digits) = is_cell_open(line) {
            LineClass::CellOpen { digits }
        } else if is_cell_mid(line) {
            LineClass::CellMid
        } else if is_cell_close(line) {
            LineClass::CellClose
        } else {
            LineClass::Content
        }
    }
}
