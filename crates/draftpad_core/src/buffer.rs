//! The raw source buffer and cursor-relative edit operations.
//!
//! The buffer accepts any string, malformed markup included; validation is
//! not its job. Every mutation bumps a revision counter that dependents
//! (line index, autosave, preview) observe through the owning session.

/// Literal inserted when Tab is intercepted inside the buffer.
pub const TAB_LITERAL: &str = "  ";

/// Raw markup source plus the cursor position, in byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    content: String,
    cursor: usize,
    revision: u64,
}

impl TextBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            cursor: 0,
            revision: 0,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Monotonic counter, bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn move_cursor(&mut self, offset: usize) {
        self.cursor = snap_to_char_boundary(&self.content, offset);
    }

    /// Replace the whole content unconditionally. Any string is accepted.
    pub fn set_content(&mut self, new_text: impl Into<String>) {
        self.content = new_text.into();
        self.cursor = snap_to_char_boundary(&self.content, self.cursor);
        self.revision += 1;
    }

    /// Replace the selection `[selection_start, selection_end)` with
    /// `literal` and place the cursor right after it, in the same call, so
    /// the caller never observes a cursor jump.
    ///
    /// Returns the new cursor offset, `selection_start + literal.len()`.
    pub fn insert_at_cursor(
        &mut self,
        selection_start: usize,
        selection_end: usize,
        literal: &str,
    ) -> usize {
        // Hosts indexing in UTF-16 routinely report offsets that land
        // inside a multibyte character; snap instead of panicking.
        let start = snap_to_char_boundary(&self.content, selection_start);
        let end = snap_to_char_boundary(&self.content, selection_end).max(start);
        self.content.replace_range(start..end, literal);
        self.cursor = start + literal.len();
        self.revision += 1;
        self.cursor
    }

    /// Tab is intercepted: insert two spaces at the cursor instead of
    /// letting the host perform focus navigation.
    pub fn insert_tab(&mut self, selection_start: usize, selection_end: usize) -> usize {
        self.insert_at_cursor(selection_start, selection_end, TAB_LITERAL)
    }
}

/// Clamp `offset` to the content length and walk it back to the nearest
/// preceding char boundary.
fn snap_to_char_boundary(content: &str, offset: usize) -> usize {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
