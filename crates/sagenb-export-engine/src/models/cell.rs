/// Leading directives that have no meaning outside SageNB and are dropped.
pub const NOOP_DIRECTIVES: [&str; 4] = ["%auto", "%hide", "%hideall", "%save_server"];

/// Opening tag of output that SageNB renders as HTML.
pub const RAW_OPEN: &str = "<html>";
/// Closing tag of output that SageNB renders as HTML.
pub const RAW_CLOSE: &str = "</html>";

/// One unit of a worksheet, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(TextCell),
    Compute(ComputeCell),
}

impl Cell {
    pub fn input(&self) -> &str {
        match self {
            Cell::Text(cell) => cell.input(),
            Cell::Compute(cell) => cell.input(),
        }
    }

    pub fn as_compute(&self) -> Option<&ComputeCell> {
        match self {
            Cell::Compute(cell) => Some(cell),
            Cell::Text(_) => None,
        }
    }
}

/// Narrative text between compute cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    input: String,
}

impl TextCell {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A code cell with its captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeCell {
    index: u64,
    input: String,
    output: String,
}

impl ComputeCell {
    pub fn new(index: u64, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            index,
            input: input.into(),
            output: output.into(),
        }
    }

    /// The worksheet's id for this cell. Stable across reordering, not
    /// necessarily sorted or contiguous.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The input as the author typed it.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The captured output, raw HTML regions included.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Input with leading `%` directives converted to whole-cell `%%` magics.
    ///
    /// SageNB allows several leading `%` lines while IPython only honours one
    /// cell magic; all of them are converted so no meaning is lost. Directives
    /// in [`NOOP_DIRECTIVES`] are removed. Each kept directive ends in `\n`,
    /// even when nothing follows it. Everything from the first non-`%` line
    /// on is copied unchanged, so a `%` line after code is left alone.
    pub fn directive_rewrite(&self) -> String {
        let mut lines = self.input.split_inclusive('\n');
        let mut res = String::with_capacity(self.input.len() + 8);
        for line in lines.by_ref() {
            if !line.starts_with('%') {
                res.push_str(line);
                break;
            }
            let directive = line.trim_end();
            if NOOP_DIRECTIVES.contains(&directive) {
                continue;
            }
            // already a cell magic
            if !directive.starts_with("%%") {
                res.push('%');
            }
            res.push_str(directive);
            res.push('\n');
        }
        res.extend(lines);
        res
    }

    /// Output with every `<html>...</html>` region removed.
    ///
    /// An `<html>` without a closing tag hides the rest of the output.
    /// Stray `</html>` tags are dropped. Removal repeats until the text stops
    /// changing, so a tag spliced together by one removal is removed as well
    /// and the result can be shorter than a single pass would leave.
    pub fn visible_output(&self) -> String {
        let mut current = strip_raw_regions(&self.output);
        loop {
            let next = strip_raw_regions(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

/// One removal pass. A pass can splice a new tag together out of the text
/// around a removed region, which is why `visible_output` runs to a fixpoint.
fn strip_raw_regions(s: &str) -> String {
    let mut kept = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find(RAW_OPEN) {
        kept.push_str(&rest[..open]);
        let after_open = &rest[open + RAW_OPEN.len()..];
        match after_open.find(RAW_CLOSE) {
            Some(close) => rest = &after_open[close + RAW_CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    kept.push_str(rest);
    kept.replace(RAW_CLOSE, "")
}
