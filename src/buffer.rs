// src/buffer.rs - Gap buffer storage core: construction, growth and insertion

use crate::error::{GapBufferError, Result};
use crate::region::{self, HEADER_LEN, RegionHeader};
use crate::utf8;
use log::debug;
use std::fmt;

/// Backing memory of a [`GapBuffer`].
#[derive(Debug)]
pub(crate) enum Storage<'a> {
    /// Allocated by the buffer. Released on drop and replaced on growth.
    Owned(Vec<u8>),
    /// Supplied by the caller. Never grows and is never released by the buffer.
    Fixed {
        header: &'a mut [u8],
        data: &'a mut [u8],
    },
}

impl Storage<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Storage::Owned(data) => data.as_slice(),
            Storage::Fixed { data, .. } => &data[..],
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Storage::Owned(data) => data.as_mut_slice(),
            Storage::Fixed { data, .. } => &mut data[..],
        }
    }
}

/// A UTF-8 text buffer with a movable gap at the edit cursor.
///
/// The backing bytes are split into three regions:
///
/// ```text
///  [ text before cursor | gap (free) | text after cursor ]
///    0..gap_offset        ..gap_end    gap_end..capacity
/// ```
///
/// Inserting and deleting at the cursor only touches the gap; moving the
/// cursor shifts the bytes it passes over from one side of the gap to the
/// other. Both text regions always hold well-formed UTF-8, and no sequence is
/// ever split by the gap.
///
/// A buffer either owns its memory (growable) or borrows a caller-supplied
/// region for `'a` (fixed size).
#[derive(Debug)]
pub struct GapBuffer<'a> {
    pub(crate) storage: Storage<'a>,
    pub(crate) gap_offset: usize,
    pub(crate) gap_length: usize,
}

fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| GapBufferError::AllocationFailed { requested: len })?;
    data.resize(len, 0);
    Ok(data)
}

impl GapBuffer<'static> {
    /// Creates an empty growable buffer with no capacity. Does not allocate.
    pub fn new() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            gap_offset: 0,
            gap_length: 0,
        }
    }

    /// Creates an empty growable buffer with `capacity` free bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            storage: Storage::Owned(allocate(capacity)?),
            gap_offset: 0,
            gap_length: capacity,
        })
    }
}

impl Default for GapBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GapBuffer<'a> {
    /// Creates an empty fixed-size buffer inside `region`.
    ///
    /// The first [`HEADER_LEN`] bytes of the region hold the bookkeeping
    /// header; the rest becomes the buffer's capacity.
    pub fn from_region(region: &'a mut [u8]) -> Result<Self> {
        let (header, data) = region::split_region(region)?;
        RegionHeader::empty(data.len()).write_to(header);
        let capacity = data.len();
        Ok(Self {
            storage: Storage::Fixed { header, data },
            gap_offset: 0,
            gap_length: capacity,
        })
    }

    /// Re-opens a region previously initialised by [`GapBuffer::from_region`],
    /// picking up its content and cursor from the header.
    pub fn attach_region(region: &'a mut [u8]) -> Result<Self> {
        let (header, data) = region::split_region(region)?;
        let layout = RegionHeader::read_from(header)?;
        if layout.capacity != data.len() {
            return Err(GapBufferError::CorruptRegion(
                "recorded capacity does not match region",
            ));
        }

        let gap_end = layout.gap_offset + layout.gap_length;
        if !utf8::validate(&data[..layout.gap_offset]) || !utf8::validate(&data[gap_end..]) {
            return Err(GapBufferError::CorruptRegion("content is not valid UTF-8"));
        }

        Ok(Self {
            storage: Storage::Fixed { header, data },
            gap_offset: layout.gap_offset,
            gap_length: layout.gap_length,
        })
    }

    /// Builds a fixed-size buffer in `region` holding the same text as
    /// `source`, with the cursor at the same position.
    pub fn clone_into(region: &'a mut [u8], source: &GapBuffer<'_>) -> Result<Self> {
        let before = source.before_gap();
        let after = source.after_gap();
        let content = before.len() + after.len();
        if region.len() < HEADER_LEN + content {
            return Err(GapBufferError::TooSmall {
                required: HEADER_LEN + content,
                available: region.len(),
            });
        }

        let mut clone = Self::from_region(region)?;
        let capacity = clone.capacity();
        let data = clone.storage.bytes_mut();
        data[..before.len()].copy_from_slice(before);
        data[capacity - after.len()..].copy_from_slice(after);
        clone.gap_offset = before.len();
        clone.gap_length = capacity - content;
        clone.sync_header();
        Ok(clone)
    }

    /// Copies this buffer into freshly allocated, growable storage of the
    /// same capacity. Content and cursor are preserved.
    pub fn to_owned_buffer(&self) -> Result<GapBuffer<'static>> {
        self.relocated(self.capacity())
    }

    /// Releases the buffer. Owned memory is freed; a caller-supplied region
    /// is handed back to the caller untouched beyond its current content.
    pub fn destroy(self) {
        drop(self);
    }

    /// Total size of the data area in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.bytes().len()
    }

    /// Bytes currently occupied by text.
    pub fn byte_count(&self) -> usize {
        self.capacity() - self.gap_length
    }

    pub fn is_empty(&self) -> bool {
        self.byte_count() == 0
    }

    /// Free bytes available before the buffer must grow.
    pub fn gap_len(&self) -> usize {
        self.gap_length
    }

    /// Cursor position as a byte offset into the logical text.
    pub fn cursor_byte(&self) -> usize {
        self.gap_offset
    }

    /// Cursor position in codepoints. O(n) in the text before the cursor.
    pub fn cursor_char(&self) -> usize {
        self.text_before_cursor().chars().count()
    }

    /// Number of codepoints in the buffer. O(n).
    pub fn char_count(&self) -> usize {
        self.cursor_char() + self.text_after_cursor().chars().count()
    }

    /// Whether the buffer may relocate to a larger region.
    pub fn is_resizable(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.storage.bytes()
    }

    pub(crate) fn gap_end(&self) -> usize {
        self.gap_offset + self.gap_length
    }

    pub(crate) fn before_gap(&self) -> &[u8] {
        &self.data()[..self.gap_offset]
    }

    pub(crate) fn after_gap(&self) -> &[u8] {
        &self.data()[self.gap_end()..]
    }

    pub fn text_before_cursor(&self) -> &str {
        utf8::as_text(self.before_gap())
    }

    pub fn text_after_cursor(&self) -> &str {
        utf8::as_text(self.after_gap())
    }

    /// Makes sure at least `min_free` bytes are free.
    ///
    /// Owned buffers grow to `max(2 * capacity, capacity + min_free)`; the
    /// text keeps its place relative to the cursor. Fixed buffers fail with
    /// [`GapBufferError::NotResizable`]. On failure nothing changes.
    pub fn ensure_capacity(&mut self, min_free: usize) -> Result<()> {
        if self.gap_length >= min_free {
            return Ok(());
        }
        if !self.is_resizable() {
            return Err(GapBufferError::NotResizable {
                needed: min_free,
                available: self.gap_length,
            });
        }

        let capacity = self.capacity();
        let new_capacity = capacity
            .checked_add(min_free)
            .map(|grown| grown.max(capacity.saturating_mul(2)))
            .ok_or(GapBufferError::AllocationFailed {
                requested: usize::MAX,
            })?;

        debug!(
            "growing gap buffer from {} to {} bytes ({} free requested)",
            capacity, new_capacity, min_free
        );
        *self = self.relocated(new_capacity)?;
        Ok(())
    }

    /// Inserts `text` immediately before the cursor; the cursor ends up right
    /// after it.
    ///
    /// The whole input is validated first, so invalid UTF-8 inserts nothing.
    pub fn insert(&mut self, text: impl AsRef<[u8]>) -> Result<()> {
        let text = text.as_ref();
        if let Some(valid_up_to) = utf8::first_invalid(text) {
            return Err(GapBufferError::InvalidUtf8 { valid_up_to });
        }
        self.ensure_capacity(text.len())?;

        let start = self.gap_offset;
        self.storage.bytes_mut()[start..start + text.len()].copy_from_slice(text);
        self.gap_offset += text.len();
        self.gap_length -= text.len();
        self.sync_header();
        Ok(())
    }

    /// Like [`GapBuffer::insert`], but a full fixed-size buffer is moved into
    /// owned storage instead of failing. The handle is replaced in place and
    /// the caller's region keeps the pre-insert content.
    pub fn insert_or_relocate(&mut self, text: impl AsRef<[u8]>) -> Result<()> {
        let text = text.as_ref();
        match self.insert(text) {
            Err(GapBufferError::NotResizable { .. }) => {
                let needed = self.byte_count().checked_add(text.len()).ok_or(
                    GapBufferError::AllocationFailed {
                        requested: usize::MAX,
                    },
                )?;
                let mut moved = self.relocated(needed)?;
                moved.insert(text)?;
                debug!(
                    "relocated fixed gap buffer to {} owned bytes",
                    moved.capacity()
                );
                *self = moved;
                Ok(())
            }
            other => other,
        }
    }

    /// Verifies the three-region layout and that both text regions are valid
    /// UTF-8 on their own. For fixed buffers the header must match too.
    pub fn check_invariants(&self) -> Result<()> {
        let capacity = self.capacity();
        let gap_end = self.gap_offset.checked_add(self.gap_length);
        if gap_end.is_none_or(|end| end > capacity) {
            return Err(GapBufferError::InvariantViolation(format!(
                "gap {}+{} exceeds capacity {}",
                self.gap_offset, self.gap_length, capacity
            )));
        }

        if let Some(at) = utf8::first_invalid(self.before_gap()) {
            return Err(GapBufferError::InvariantViolation(format!(
                "text before the gap is malformed at byte {at}"
            )));
        }
        if let Some(at) = utf8::first_invalid(self.after_gap()) {
            return Err(GapBufferError::InvariantViolation(format!(
                "text after the gap is malformed at byte {}",
                self.gap_end() + at
            )));
        }

        if let Storage::Fixed { header, .. } = &self.storage {
            let recorded = RegionHeader::read_from(header)?;
            let actual = RegionHeader {
                capacity,
                gap_offset: self.gap_offset,
                gap_length: self.gap_length,
            };
            if recorded != actual {
                return Err(GapBufferError::InvariantViolation(format!(
                    "header {recorded:?} out of sync with {actual:?}"
                )));
            }
        }
        Ok(())
    }

    /// Mirrors the gap layout into the region header of a fixed buffer.
    pub(crate) fn sync_header(&mut self) {
        if let Storage::Fixed { header, data } = &mut self.storage {
            RegionHeader {
                capacity: data.len(),
                gap_offset: self.gap_offset,
                gap_length: self.gap_length,
            }
            .write_to(header);
        }
    }

    /// Copies the text into a new owned region of `capacity` bytes, before-gap
    /// text at the start and after-gap text at the end.
    fn relocated(&self, capacity: usize) -> Result<GapBuffer<'static>> {
        let before = self.before_gap();
        let after = self.after_gap();
        let content = before.len() + after.len();
        debug_assert!(capacity >= content);

        let mut data = allocate(capacity)?;
        data[..before.len()].copy_from_slice(before);
        data[capacity - after.len()..].copy_from_slice(after);
        Ok(GapBuffer {
            storage: Storage::Owned(data),
            gap_offset: before.len(),
            gap_length: capacity - content,
        })
    }
}

impl fmt::Display for GapBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_before_cursor())?;
        f.write_str(self.text_after_cursor())
    }
}
