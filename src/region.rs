// src/region.rs - Bookkeeping header stored at the front of caller-supplied memory
//
// Layout (little-endian):
//
//   0..4    magic "GAPB"
//   4..8    format version
//   8..16   capacity of the data area
//   16..24  gap offset
//   24..32  gap length
//
// The data area follows immediately after the header.

use crate::error::{GapBufferError, Result};

/// Bytes a caller-supplied region gives up to bookkeeping.
pub const HEADER_LEN: usize = 32;

const MAGIC: &[u8; 4] = b"GAPB";
const VERSION: u32 = 1;

/// Gap layout as recorded in a region header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionHeader {
    pub capacity: usize,
    pub gap_offset: usize,
    pub gap_length: usize,
}

impl RegionHeader {
    /// Header for a freshly initialised region: the gap spans the whole data area.
    pub fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            gap_offset: 0,
            gap_length: capacity,
        }
    }

    pub fn write_to(&self, header: &mut [u8]) {
        debug_assert!(header.len() >= HEADER_LEN);
        header[0..4].copy_from_slice(MAGIC);
        header[4..8].copy_from_slice(&VERSION.to_le_bytes());
        header[8..16].copy_from_slice(&(self.capacity as u64).to_le_bytes());
        header[16..24].copy_from_slice(&(self.gap_offset as u64).to_le_bytes());
        header[24..32].copy_from_slice(&(self.gap_length as u64).to_le_bytes());
    }

    /// Parse and sanity-check a header. Content validation is left to the caller.
    pub fn read_from(header: &[u8]) -> Result<Self> {
        if header.len() < HEADER_LEN {
            return Err(GapBufferError::TooSmall {
                required: HEADER_LEN,
                available: header.len(),
            });
        }
        if &header[0..4] != MAGIC {
            return Err(GapBufferError::CorruptRegion("bad magic"));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&header[4..8]);
        if u32::from_le_bytes(version) != VERSION {
            return Err(GapBufferError::CorruptRegion("unsupported version"));
        }

        let parsed = Self {
            capacity: read_usize(header, 8)?,
            gap_offset: read_usize(header, 16)?,
            gap_length: read_usize(header, 24)?,
        };

        let gap_end = parsed
            .gap_offset
            .checked_add(parsed.gap_length)
            .ok_or(GapBufferError::CorruptRegion("gap overflows"))?;
        if gap_end > parsed.capacity {
            return Err(GapBufferError::CorruptRegion("gap exceeds capacity"));
        }
        Ok(parsed)
    }
}

fn read_usize(header: &[u8], at: usize) -> Result<usize> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&header[at..at + 8]);
    usize::try_from(u64::from_le_bytes(raw))
        .map_err(|_| GapBufferError::CorruptRegion("field does not fit in usize"))
}

/// Split a region into its header and data area.
pub fn split_region(region: &mut [u8]) -> Result<(&mut [u8], &mut [u8])> {
    if region.len() < HEADER_LEN {
        return Err(GapBufferError::TooSmall {
            required: HEADER_LEN,
            available: region.len(),
        });
    }
    Ok(region.split_at_mut(HEADER_LEN))
}
