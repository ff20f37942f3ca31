// Headless display: the shown text plus a line-number gutter kept in step with it.

use super::sink::DisplaySink;

#[derive(Debug, Clone)]
pub struct Transcript {
    text: String,
    lines: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            lines: 1,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines shown, counting a trailing partial line. Never zero.
    pub fn line_count(&self) -> usize {
        self.lines.max(1)
    }

    /// Line numbers `1..=line_count`, one per line, right-aligned to the widest.
    pub fn gutter(&self) -> String {
        let count = self.line_count();
        let width = count.to_string().len();
        (1..=count)
            .map(|n| format!("{:>width$}", n, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, s: &str) {
        self.lines = self.line_count() + s.matches('\n').count();
        self.text.push_str(s);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for Transcript {
    fn append_text(&mut self, chunk: &str) {
        self.push(chunk);
    }

    fn clear(&mut self) {
        self.text.clear();
        self.lines = 1;
    }

    fn notify(&mut self, message: &str) {
        self.push(message);
    }
}
