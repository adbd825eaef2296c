// src/lines.rs - Line iteration over a gap buffer, stitching the line that straddles the gap

use crate::buffer::GapBuffer;
use crate::utf8;
use log::warn;
use std::fmt;

/// Inline capacity used to stitch a line split by the gap without allocating.
pub const SCRATCH_LEN: usize = 512;

/// One line of text, without its `\n`.
///
/// Borrowed either straight from the buffer or, for the line that crosses the
/// gap, from the iterator's scratch space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'l> {
    bytes: &'l [u8],
    truncated: bool,
}

impl<'l> Line<'l> {
    pub fn as_bytes(&self) -> &'l [u8] {
        self.bytes
    }

    pub fn as_str(&self) -> &'l str {
        utf8::as_text(self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the line crossed the gap, was too long for the scratch space
    /// and the spill allocation failed; only its first [`SCRATCH_LEN`] bytes
    /// are present.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Line<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

/// Forward-only iterator over the lines of a [`GapBuffer`].
///
/// Lines borrow from the iterator, so this is a lending iterator driven by
/// [`LineIter::next_line`] rather than [`Iterator`]. The buffer cannot be
/// mutated while the iterator is alive.
pub struct LineIter<'b> {
    data: &'b [u8],
    gap_offset: usize,
    gap_end: usize,
    cur: usize,
    crossed_gap: bool,
    scratch: [u8; SCRATCH_LEN],
    spill: Option<Vec<u8>>,
}

impl fmt::Debug for LineIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineIter")
            .field("cur", &self.cur)
            .field("crossed_gap", &self.crossed_gap)
            .field("spill", &self.spill.as_ref().map(Vec::len))
            .finish()
    }
}

impl<'b> LineIter<'b> {
    pub fn new(buffer: &'b GapBuffer<'_>) -> Self {
        Self {
            data: buffer.data(),
            gap_offset: buffer.gap_offset,
            gap_end: buffer.gap_end(),
            cur: 0,
            crossed_gap: false,
            scratch: [0; SCRATCH_LEN],
            spill: None,
        }
    }

    /// Next line, or `None` once the text is exhausted. A trailing `\n` does
    /// not produce an extra empty line.
    pub fn next_line(&mut self) -> Option<Line<'_>> {
        self.free();
        let data = self.data;

        if self.crossed_gap {
            let start = self.cur;
            let end = find_newline(data, start, data.len());
            if end == data.len() {
                if end == start {
                    return None;
                }
                self.cur = end;
            } else {
                self.cur = end + 1;
            }
            return Some(Line {
                bytes: &data[start..end],
                truncated: false,
            });
        }

        let start = self.cur;
        let end = find_newline(data, start, self.gap_offset);
        if end < self.gap_offset {
            self.cur = end + 1;
            return Some(Line {
                bytes: &data[start..end],
                truncated: false,
            });
        }

        // The line runs into the gap and continues on the other side.
        self.crossed_gap = true;
        let head = &data[start..self.gap_offset];
        let tail_start = self.gap_end;
        let tail_end = find_newline(data, tail_start, data.len());
        let tail = &data[tail_start..tail_end];
        self.cur = if tail_end < data.len() {
            tail_end + 1
        } else {
            tail_end
        };

        if head.is_empty() && tail.is_empty() && tail_end == data.len() {
            return None;
        }
        if head.is_empty() || tail.is_empty() {
            let bytes = if head.is_empty() { tail } else { head };
            return Some(Line {
                bytes,
                truncated: false,
            });
        }
        Some(self.stitch(head, tail))
    }

    /// Releases any heap memory held for a stitched line. Idempotent.
    pub fn free(&mut self) {
        self.spill = None;
    }

    fn stitch(&mut self, head: &[u8], tail: &[u8]) -> Line<'_> {
        let len = head.len() + tail.len();
        if len <= SCRATCH_LEN {
            self.scratch[..head.len()].copy_from_slice(head);
            self.scratch[head.len()..len].copy_from_slice(tail);
            return Line {
                bytes: &self.scratch[..len],
                truncated: false,
            };
        }

        let mut spill = Vec::new();
        if spill.try_reserve_exact(len).is_ok() {
            spill.extend_from_slice(head);
            spill.extend_from_slice(tail);
            let spill = self.spill.insert(spill);
            return Line {
                bytes: spill.as_slice(),
                truncated: false,
            };
        }

        warn!(
            "could not allocate {} bytes for a line crossing the gap; truncating to {}",
            len, SCRATCH_LEN
        );
        let kept = fill_truncated(&mut self.scratch, head, tail);
        Line {
            bytes: &self.scratch[..kept],
            truncated: true,
        }
    }
}

impl GapBuffer<'_> {
    /// Iterates over the lines of the logical text.
    pub fn lines(&self) -> LineIter<'_> {
        LineIter::new(self)
    }
}

/// Position of the first `\n` in `data[from..to]`, or `to`.
fn find_newline(data: &[u8], from: usize, to: usize) -> usize {
    data[from..to]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(to, |at| from + at)
}

/// Copies as much of `head` then `tail` as fits into `scratch`, returning the
/// number of bytes written.
fn fill_truncated(scratch: &mut [u8], head: &[u8], tail: &[u8]) -> usize {
    let from_head = head.len().min(scratch.len());
    scratch[..from_head].copy_from_slice(&head[..from_head]);
    let from_tail = tail.len().min(scratch.len() - from_head);
    scratch[from_head..from_head + from_tail].copy_from_slice(&tail[..from_tail]);
    from_head + from_tail
}
