//! Document statistics for the status line.

use serde::{Deserialize, Serialize};

/// Words-per-minute assumed for the reading time estimate.
const READING_WPM: usize = 200;

/// Statistics over the raw buffer content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub words: usize,
    /// Characters excluding whitespace.
    pub characters: usize,
    pub lines: usize,
    pub reading_minutes: usize,
}

/// Calculate statistics from the raw markup source.
///
/// Lines follow the gutter rule: separator count plus one, so the empty
/// document is one line.
pub fn calculate_document_stats(content: &str) -> DocumentStats {
    let lines = content.matches('\n').count() + 1;
    let words = content.split_whitespace().count();
    let characters = content.chars().filter(|c| !c.is_whitespace()).count();
    let reading_minutes = words.div_ceil(READING_WPM);

    DocumentStats {
        words,
        characters,
        lines,
        reading_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = calculate_document_stats("Hello world!\n\nThis is a test.");
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.words, 6);
        assert!(stats.characters > 0);
    }

    #[test]
    fn test_empty_content_is_one_line() {
        let stats = calculate_document_stats("");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.reading_minutes, 0);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let content = vec!["word"; 250].join(" ");
        let stats = calculate_document_stats(&content);
        assert_eq!(stats.reading_minutes, 2);
    }
}
