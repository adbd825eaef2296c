// Capacity edges for caller-supplied regions, cloning and relocation

mod common;
use common::validation;

use gapbuf::region::{HEADER_LEN, RegionHeader};
use gapbuf::{GapBuffer, GapBufferError};

#[test]
fn test_region_smaller_than_header_is_rejected() {
    let mut region = vec![0u8; HEADER_LEN - 1];
    let result = GapBuffer::from_region(&mut region);
    assert!(matches!(result, Err(GapBufferError::TooSmall { .. })));
}

#[test]
fn test_fixed_region_fills_exactly() {
    let mut region = vec![0u8; HEADER_LEN + 8];
    let mut buffer = GapBuffer::from_region(&mut region).unwrap();
    assert!(!buffer.is_resizable());
    assert_eq!(buffer.capacity(), 8);

    buffer.insert("1234").unwrap();
    buffer.insert("€").unwrap();
    buffer.insert("x").unwrap();
    assert_eq!(buffer.gap_len(), 0);
    validation::assert_content(&buffer, "1234€x");

    let result = buffer.insert("y");
    assert_eq!(
        result,
        Err(GapBufferError::NotResizable {
            needed: 1,
            available: 0
        })
    );
    validation::assert_content(&buffer, "1234€x");
}

#[test]
fn test_full_fixed_buffer_still_moves_and_removes() {
    let mut region = vec![0u8; HEADER_LEN + 6];
    let mut buffer = GapBuffer::from_region(&mut region).unwrap();
    buffer.insert("abcdef").unwrap();

    assert_eq!(buffer.move_absolute(2), 2);
    validation::assert_split(&buffer, "ab", "cdef");
    assert_eq!(buffer.remove_forwards(2), 2);
    buffer.insert("XY").unwrap();
    validation::assert_content(&buffer, "abXYef");
}

#[test]
fn test_header_tracks_every_mutation() {
    let mut region = vec![0u8; HEADER_LEN + 16];
    {
        let mut buffer = GapBuffer::from_region(&mut region).unwrap();
        buffer.insert("hello").unwrap();
        buffer.move_absolute(1);
        buffer.remove_forwards(1);
    }

    let header = RegionHeader::read_from(&region[..HEADER_LEN]).unwrap();
    assert_eq!(header.capacity, 16);
    assert_eq!(header.gap_offset, 1);
    assert_eq!(header.gap_length, 12);
}

#[test]
fn test_attach_region_restores_content_and_cursor() {
    let mut region = vec![0u8; HEADER_LEN + 32];
    {
        let mut buffer = GapBuffer::from_region(&mut region).unwrap();
        buffer.insert("first line\nsecond").unwrap();
        buffer.move_absolute(5);
        buffer.destroy();
    }

    let mut buffer = GapBuffer::attach_region(&mut region).unwrap();
    validation::assert_content(&buffer, "first line\nsecond");
    validation::assert_split(&buffer, "first", " line\nsecond");

    buffer.insert(",").unwrap();
    validation::assert_content(&buffer, "first, line\nsecond");
}

#[test]
fn test_attach_uninitialised_region_fails() {
    let mut region = vec![0u8; HEADER_LEN + 8];
    let result = GapBuffer::attach_region(&mut region);
    assert!(matches!(result, Err(GapBufferError::CorruptRegion(_))));
}

#[test]
fn test_attach_region_with_wrong_length_fails() {
    let mut region = vec![0u8; HEADER_LEN + 8];
    GapBuffer::from_region(&mut region).unwrap();
    let result = GapBuffer::attach_region(&mut region[..HEADER_LEN + 4]);
    assert!(matches!(result, Err(GapBufferError::CorruptRegion(_))));
}

#[test]
fn test_clone_into_exact_fit() {
    let mut source = GapBuffer::with_capacity(64).unwrap();
    source.insert("copy me 😀").unwrap();
    source.move_absolute(4);

    let needed = HEADER_LEN + source.byte_count();
    let mut region = vec![0u8; needed];
    let clone = GapBuffer::clone_into(&mut region, &source).unwrap();

    assert_eq!(clone.capacity(), source.byte_count());
    assert_eq!(clone.gap_len(), 0);
    validation::assert_content(&clone, "copy me 😀");
    validation::assert_split(&clone, "copy", " me 😀");
}

#[test]
fn test_clone_into_too_small_leaves_region_untouched() {
    let mut source = GapBuffer::new();
    source.insert("twelve bytes").unwrap();

    let mut region = vec![0xAAu8; HEADER_LEN + 11];
    let result = GapBuffer::clone_into(&mut region, &source);
    assert_eq!(
        result.err(),
        Some(GapBufferError::TooSmall {
            required: HEADER_LEN + 12,
            available: HEADER_LEN + 11
        })
    );
    assert!(region.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_clone_is_independent_of_source() {
    let mut source = GapBuffer::new();
    source.insert("shared").unwrap();

    let mut region = vec![0u8; HEADER_LEN + 16];
    let mut clone = GapBuffer::clone_into(&mut region, &source).unwrap();
    clone.insert("!").unwrap();
    source.remove_backwards(3);

    validation::assert_content(&clone, "shared!");
    validation::assert_content(&source, "sha");
}

#[test]
fn test_insert_or_relocate_moves_full_region_to_owned_storage() {
    let mut region = vec![0u8; HEADER_LEN + 4];
    let mut buffer = GapBuffer::from_region(&mut region).unwrap();
    buffer.insert("abcd").unwrap();
    buffer.move_absolute(2);

    buffer.insert_or_relocate("XYZ").unwrap();
    assert!(buffer.is_resizable());
    validation::assert_content(&buffer, "abXYZcd");
    validation::assert_split(&buffer, "abXYZ", "cd");

    // further inserts grow normally
    buffer.insert(" and more text").unwrap();
    validation::assert_content(&buffer, "abXYZ and more textcd");
}

#[test]
fn test_insert_or_relocate_stays_in_place_when_it_fits() {
    let mut region = vec![0u8; HEADER_LEN + 8];
    let mut buffer = GapBuffer::from_region(&mut region).unwrap();
    buffer.insert_or_relocate("fits").unwrap();
    assert!(!buffer.is_resizable());
    validation::assert_content(&buffer, "fits");
}

#[test]
fn test_insert_or_relocate_still_rejects_invalid_utf8() {
    let mut region = vec![0u8; HEADER_LEN + 2];
    let mut buffer = GapBuffer::from_region(&mut region).unwrap();
    let result = buffer.insert_or_relocate([0xFFu8, 0xFE, 0xFD]);
    assert!(matches!(result, Err(GapBufferError::InvalidUtf8 { .. })));
    assert!(!buffer.is_resizable());
    assert!(buffer.is_empty());
}

#[test]
fn test_to_owned_buffer_grows_past_region() {
    let mut region = vec![0u8; HEADER_LEN + 3];
    let mut fixed = GapBuffer::from_region(&mut region).unwrap();
    fixed.insert("abc").unwrap();
    fixed.move_absolute(1);

    let mut owned = fixed.to_owned_buffer().unwrap();
    assert!(owned.is_resizable());
    validation::assert_split(&owned, "a", "bc");
    owned.insert("---").unwrap();
    validation::assert_content(&owned, "a---bc");
    validation::assert_content(&fixed, "abc");
}

#[test]
fn test_growth_doubles_capacity() {
    let mut buffer = GapBuffer::with_capacity(8).unwrap();
    buffer.insert("12345678").unwrap();
    assert_eq!(buffer.capacity(), 8);

    buffer.insert("9").unwrap();
    assert_eq!(buffer.capacity(), 16);

    buffer.insert("a".repeat(40)).unwrap();
    assert_eq!(buffer.capacity(), 16 + 40);
    assert_eq!(buffer.byte_count(), 49);
}

#[test]
fn test_growth_preserves_cursor_split() {
    let mut buffer = GapBuffer::with_capacity(4).unwrap();
    buffer.insert("wxyz").unwrap();
    buffer.move_absolute(2);
    buffer.insert("1234567890").unwrap();
    validation::assert_split(&buffer, "wx1234567890", "yz");
}
