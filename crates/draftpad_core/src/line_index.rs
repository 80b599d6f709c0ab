//! Line-number gutter derived from the buffer, scroll-locked to it.

/// Ordered line numbers for the gutter next to the buffer.
///
/// The gutter scroll offset mirrors the buffer viewport offset in the same
/// call that reports it; there is no lag and no easing.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIndex {
    line_count: usize,
    gutter_scroll: f64,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LineIndex {
    pub fn new() -> Self {
        Self {
            line_count: 1,
            gutter_scroll: 0.0,
        }
    }

    /// Recount lines from the buffer content. An empty string is one line.
    pub fn update(&mut self, content: &str) {
        self.line_count = content.matches('\n').count() + 1;
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// The ordered sequence `1..=line_count`.
    pub fn line_numbers(&self) -> impl Iterator<Item = usize> {
        1..=self.line_count
    }

    /// Mirror the buffer viewport scroll offset into the gutter.
    pub fn sync_scroll(&mut self, buffer_scroll: f64) {
        self.gutter_scroll = buffer_scroll;
    }

    pub fn gutter_scroll(&self) -> f64 {
        self.gutter_scroll
    }
}
