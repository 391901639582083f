use crate::models::cell::{Cell, ComputeCell, TextCell};

use super::{
    ParseError,
    classify::{LineClass, WorksheetLineClassifier},
    lines::WorksheetLines,
    unescape::Unescape,
};

#[derive(Debug)]
enum State<'a> {
    /// Between cells, collecting narrative text.
    Outside,
    /// After `{{{id=N|`, collecting the cell input. The index is parsed on
    /// the following step, after the text before the marker has been yielded.
    InInput { digits: &'a str, line: usize },
    /// After `///`, collecting the cell output.
    InOutput { index: u64, input: String },
    Done,
}

/// Lazily splits a worksheet into [`Cell`]s in document order.
///
/// Missing `///` or `}}}` markers at the end of the document close the
/// pending cell implicitly. After the first error the parser yields nothing.
pub struct WorksheetParser<'a, U> {
    lines: WorksheetLines<'a>,
    classifier: WorksheetLineClassifier,
    unescape: U,
    state: State<'a>,
}

impl<'a, U: Unescape> WorksheetParser<'a, U> {
    pub fn new(worksheet: &'a str, unescape: U) -> Self {
        let lines = WorksheetLines::new(worksheet);
        log::debug!("Worksheet has {} lines", lines.len());
        Self {
            lines,
            classifier: WorksheetLineClassifier,
            unescape,
            state: State::Outside,
        }
    }

    fn step(&mut self) -> Result<Option<Cell>, ParseError> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Outside => {
                if self.lines.is_finished() {
                    return Ok(None);
                }
                let (run, marker) =
                    self.collect_run("text", |c| matches!(c, LineClass::CellOpen { .. }));
                if let Some((line, LineClass::CellOpen { digits })) = marker {
                    self.state = State::InInput { digits, line };
                }
                let text = join_trimmed(&run);
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Cell::Text(TextCell::new(self.unescape.unescape(&text)?))))
            }
            State::InInput { digits, line } => {
                let index = parse_index(digits, line)?;
                let (run, _) = self.collect_run("cell input", |c| *c == LineClass::CellMid);
                let input = self.unescape.unescape(&join_trimmed(&run))?;
                self.state = State::InOutput { index, input };
                Ok(None)
            }
            State::InOutput { index, input } => {
                let (run, _) = self.collect_run("cell output", |c| *c == LineClass::CellClose);
                let output = self.unescape.unescape(&join_trimmed(&run))?;
                self.state = State::Outside;
                Ok(Some(Cell::Compute(ComputeCell::new(index, input, output))))
            }
            State::Done => Ok(None),
        }
    }

    /// Consumes content lines up to and including the first line matching
    /// `stop`. Returns the content and the stop marker with its line number,
    /// or `None` for the marker when the document ran out first.
    fn collect_run(
        &mut self,
        what: &str,
        stop: impl Fn(&LineClass<'a>) -> bool,
    ) -> (Vec<&'a str>, Option<(usize, LineClass<'a>)>) {
        let mut run = Vec::new();
        while let Some(line) = self.lines.current() {
            let class = self.classifier.classify(line);
            let line_number = self.lines.line_number();
            self.lines.advance();
            if stop(&class) {
                return (run, Some((line_number, class)));
            }
            log::debug!("Read {what}: {line}");
            run.push(line);
        }
        (run, None)
    }
}

impl<U: Unescape> Iterator for WorksheetParser<'_, U> {
    type Item = Result<Cell, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if matches!(self.state, State::Done) {
                return None;
            }
            match self.step() {
                Ok(Some(cell)) => {
                    log::debug!("Cell: {cell:?}");
                    return Some(Ok(cell));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<U: Unescape> std::iter::FusedIterator for WorksheetParser<'_, U> {}

fn join_trimmed(run: &[&str]) -> String {
    run.join("\n").trim().to_string()
}

fn parse_index(digits: &str, line: usize) -> Result<u64, ParseError> {
    digits
        .parse()
        .map_err(|source| ParseError::MalformedIndex {
            line,
            digits: digits.to_string(),
            source,
        })
}
