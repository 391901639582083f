/// Forward-only cursor over the lines of one worksheet.
#[derive(Debug)]
pub struct WorksheetLines<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> WorksheetLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// The line under the cursor, if any.
    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// 1-based number of the line under the cursor.
    pub fn line_number(&self) -> usize {
        self.pos + 1
    }

    pub fn advance(&mut self) {
        if !self.is_finished() {
            self.pos += 1;
        }
    }
}
