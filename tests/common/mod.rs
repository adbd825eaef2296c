// Common test utilities for gap buffer content and invariant checks

use gapbuf::GapBuffer;

/// Utilities for building buffers in specific layouts
pub mod layout {
    use super::*;

    /// Growable buffer holding `text` with the cursor at codepoint `cursor`
    /// and at least `spare` free bytes in the gap.
    #[allow(dead_code)]
    pub fn buffer_with_cursor(text: &str, cursor: usize, spare: usize) -> GapBuffer<'static> {
        let mut buffer = GapBuffer::with_capacity(text.len() + spare).unwrap();
        buffer.insert(text).unwrap();
        buffer.move_absolute(cursor);
        buffer
    }

    /// Every cursor position (in codepoints) for `text`, including the end.
    #[allow(dead_code)]
    pub fn all_cursor_positions(text: &str) -> std::ops::RangeInclusive<usize> {
        0..=text.chars().count()
    }
}

/// Validation utilities for checking invariants
pub mod validation {
    use super::*;

    /// Collect every line the iterator yields
    #[allow(dead_code)]
    pub fn collect_lines(buffer: &GapBuffer<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut iter = buffer.lines();
        while let Some(line) = iter.next_line() {
            lines.push(line.as_str().to_string());
        }
        iter.free();
        lines
    }

    /// Assert the buffer's internal invariants hold and its text is `expected`
    #[allow(dead_code)]
    pub fn assert_content(buffer: &GapBuffer<'_>, expected: &str) {
        if let Err(err) = buffer.check_invariants() {
            panic!("Buffer invariants violated: {err}");
        }
        assert_eq!(buffer.to_string(), expected);
        assert_eq!(
            buffer.byte_count(),
            expected.len(),
            "byte_count out of sync with content {:?}",
            expected
        );
    }

    /// Assert the cursor splits the text into `before` and `after`
    #[allow(dead_code)]
    pub fn assert_split(buffer: &GapBuffer<'_>, before: &str, after: &str) {
        assert_eq!(buffer.text_before_cursor(), before, "text before cursor");
        assert_eq!(buffer.text_after_cursor(), after, "text after cursor");
        assert_eq!(buffer.cursor_byte(), before.len());
    }
}
