// src/utf8.rs - UTF-8 codec: validation and codepoint boundary scanning
//
// Nothing here allocates. The buffer calls `first_invalid` before every
// insertion and uses `lead_byte_length` / `is_continuation_byte` to step over
// text it already knows is well formed.

/// Outcome of decoding the sequence at the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A well-formed sequence: its scalar value and the bytes it occupies (1-4).
    Char { ch: char, len: usize },
    /// The slice was empty. Not an error.
    Empty,
    /// The leading bytes do not form a well-formed sequence.
    Invalid,
}

impl Decoded {
    /// Number of bytes consumed; zero for `Empty` and `Invalid`.
    pub fn consumed(&self) -> usize {
        match self {
            Decoded::Char { len, .. } => *len,
            Decoded::Empty | Decoded::Invalid => 0,
        }
    }
}

/// True iff `byte` has the form `10xxxxxx`.
pub fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Sequence length announced by a lead byte. Performs no validation: the
/// caller must already know `byte` starts a well-formed sequence.
pub fn lead_byte_length(byte: u8) -> usize {
    match byte {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Decode the first codepoint of `bytes`.
///
/// The checks run in a fixed order: the lead byte must announce a length,
/// that many bytes must be present, every trailing byte must be a
/// continuation byte, and the value must be canonical for its length (no
/// overlong forms, nothing above U+10FFFF). Surrogates are rejected as well,
/// since they are not scalar values.
pub fn decode_one(bytes: &[u8]) -> Decoded {
    let Some(&lead) = bytes.first() else {
        return Decoded::Empty;
    };

    let (len, lead_bits, min, max) = match lead {
        0x00..=0x7F => {
            return Decoded::Char {
                ch: char::from(lead),
                len: 1,
            };
        }
        // 110xxxxx 10xxxxxx
        0xC0..=0xDF => (2, lead & 0x1F, 0x80, 0x7FF),
        // 1110xxxx 10xxxxxx 10xxxxxx
        0xE0..=0xEF => (3, lead & 0x0F, 0x800, 0xFFFF),
        // 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
        0xF0..=0xF7 => (4, lead & 0x07, 0x1_0000, 0x10_FFFF),
        _ => return Decoded::Invalid,
    };

    if bytes.len() < len {
        return Decoded::Invalid;
    }

    let tail = &bytes[1..len];
    if !tail.iter().all(|&b| is_continuation_byte(b)) {
        return Decoded::Invalid;
    }

    let value = tail
        .iter()
        .fold(u32::from(lead_bits), |acc, &b| (acc << 6) | u32::from(b & 0x3F));

    if !(min..=max).contains(&value) {
        return Decoded::Invalid;
    }

    match char::from_u32(value) {
        Some(ch) => Decoded::Char { ch, len },
        None => Decoded::Invalid,
    }
}

/// Offset of the first sequence that fails to decode, or `None` when all of
/// `bytes` is well formed.
pub fn first_invalid(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        match decode_one(&bytes[i..]) {
            Decoded::Char { len, .. } => i += len,
            Decoded::Empty | Decoded::Invalid => return Some(i),
        }
    }
    None
}

/// True iff `bytes` decodes completely without failure.
pub fn validate(bytes: &[u8]) -> bool {
    first_invalid(bytes).is_none()
}

/// View already-validated bytes as `&str`.
///
/// A truncated line from the iterator may end mid-sequence; in that case only
/// the well-formed prefix is returned.
pub fn as_text(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
    }
}
