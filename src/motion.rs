// src/motion.rs - Cursor motion and removal: codepoint scanning and block moves across the gap

use crate::buffer::GapBuffer;
use crate::utf8::{is_continuation_byte, lead_byte_length};
use log::trace;

/// A physical byte offset found by scanning, and how many codepoints were
/// stepped over to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    offset: usize,
    crossed: usize,
}

impl GapBuffer<'_> {
    /// Lead byte `count` codepoints before the cursor, clamped at the start
    /// of the buffer.
    fn preceding_boundary(&self, count: usize) -> Boundary {
        let data = self.data();
        let mut i = self.gap_offset;
        let mut crossed = 0;
        while crossed < count && i > 0 {
            i -= 1;
            while i > 0 && is_continuation_byte(data[i]) {
                i -= 1;
            }
            debug_assert!(
                !is_continuation_byte(data[i]),
                "text before the gap starts mid-sequence"
            );
            crossed += 1;
        }
        Boundary { offset: i, crossed }
    }

    /// Byte just past the `count`-th codepoint after the gap, clamped at the
    /// end of the buffer.
    fn following_boundary(&self, count: usize) -> Boundary {
        let data = self.data();
        let end = data.len();
        let mut i = self.gap_end();
        let mut crossed = 0;
        while crossed < count && i < end {
            i += lead_byte_length(data[i]);
            crossed += 1;
        }
        debug_assert!(i <= end, "text after the gap ends mid-sequence");
        Boundary {
            offset: i.min(end),
            crossed,
        }
    }

    /// Moves the `count` bytes just before the gap to just after it.
    fn shift_after_gap(&mut self, count: usize) {
        debug_assert!(count <= self.gap_offset);
        let start = self.gap_offset - count;
        let end = self.gap_offset;
        let dest = self.gap_end() - count;
        // Source and destination overlap whenever the gap is shorter than `count`.
        self.storage.bytes_mut().copy_within(start..end, dest);
        self.gap_offset = start;
    }

    /// Moves the `count` bytes just after the gap to just before it.
    fn shift_before_gap(&mut self, count: usize) {
        let gap_end = self.gap_end();
        debug_assert!(gap_end + count <= self.capacity());
        let dest = self.gap_offset;
        self.storage
            .bytes_mut()
            .copy_within(gap_end..gap_end + count, dest);
        self.gap_offset += count;
    }

    /// Moves the cursor by `offset` codepoints, backwards when negative.
    ///
    /// Requests past either end of the text stop at that end. Returns the
    /// number of codepoints actually moved over.
    pub fn move_relative(&mut self, offset: isize) -> usize {
        let moved = if offset < 0 {
            let boundary = self.preceding_boundary(offset.unsigned_abs());
            self.shift_after_gap(self.gap_offset - boundary.offset);
            boundary.crossed
        } else {
            let boundary = self.following_boundary(offset.unsigned_abs());
            self.shift_before_gap(boundary.offset - self.gap_end());
            boundary.crossed
        };
        self.sync_header();
        trace!(
            "move_relative({}) crossed {} codepoints, cursor at byte {}",
            offset, moved, self.gap_offset
        );
        moved
    }

    /// Places the cursor before the `index`-th codepoint of the text, or at
    /// the end if there are fewer. Returns the codepoint index it landed on.
    pub fn move_absolute(&mut self, index: usize) -> usize {
        let data = self.data();
        let content = self.byte_count();
        let gap_offset = self.gap_offset;
        let gap_length = self.gap_length;

        // Walk logical offsets from the start; the gap is skipped by mapping
        // each logical offset to its physical position.
        let mut logical = 0;
        let mut crossed = 0;
        while crossed < index && logical < content {
            let physical = if logical < gap_offset {
                logical
            } else {
                logical + gap_length
            };
            logical += lead_byte_length(data[physical]);
            crossed += 1;
        }
        debug_assert!(logical <= content);
        let target = logical.min(content);

        if target < gap_offset {
            self.shift_after_gap(gap_offset - target);
        } else {
            self.shift_before_gap(target - gap_offset);
        }
        self.sync_header();
        trace!(
            "move_absolute({}) landed on codepoint {}, cursor at byte {}",
            index, crossed, self.gap_offset
        );
        crossed
    }

    /// Deletes up to `count` codepoints after the cursor. The cursor does not
    /// move. Returns the number of codepoints removed.
    pub fn remove_forwards(&mut self, count: usize) -> usize {
        let boundary = self.following_boundary(count);
        self.gap_length = boundary.offset - self.gap_offset;
        self.sync_header();
        trace!(
            "remove_forwards({}) removed {} codepoints",
            count, boundary.crossed
        );
        boundary.crossed
    }

    /// Deletes up to `count` codepoints before the cursor; the cursor moves
    /// left over the deleted text. Returns the number of codepoints removed.
    pub fn remove_backwards(&mut self, count: usize) -> usize {
        let boundary = self.preceding_boundary(count);
        self.gap_length += self.gap_offset - boundary.offset;
        self.gap_offset = boundary.offset;
        self.sync_header();
        trace!(
            "remove_backwards({}) removed {} codepoints",
            count, boundary.crossed
        );
        boundary.crossed
    }
}
