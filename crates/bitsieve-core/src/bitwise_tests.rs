//! Tests for `bitwise` module

use super::bitwise::*;
use super::ops::BitOp;

fn reference<W: super::element::BitWord>(
    op: BitOp,
    left: &[W],
    right: &[W],
    start_left: usize,
    start_right: usize,
    size: usize,
) -> Vec<bool> {
    let total = left.len() * W::BITS;
    (0..total)
        .map(|i| {
            let l = get_bit(left, i);
            if i < start_left || i >= start_left + size {
                return l;
            }
            let r = get_bit(right, start_right + (i - start_left));
            op.apply(u64::from(l), u64::from(r)) & 1 == 1
        })
        .collect()
}

fn bits<W: super::element::BitWord>(words: &[W]) -> Vec<bool> {
    (0..words.len() * W::BITS).map(|i| get_bit(words, i)).collect()
}

#[test]
fn test_low_mask() {
    assert_eq!(low_mask(0), 0);
    assert_eq!(low_mask(3), 0b111);
    assert_eq!(low_mask(63), u64::MAX >> 1);
    assert_eq!(low_mask(64), u64::MAX);
}

#[test]
fn test_get_set_bit_lsb_first() {
    // Arrange
    let mut words = [0u8; 2];

    // Act
    set_bit(&mut words, 0, true);
    set_bit(&mut words, 9, true);
    set_bit(&mut words, 9, false);
    set_bit(&mut words, 15, true);

    // Assert
    assert_eq!(words, [0b0000_0001, 0b1000_0000]);
    assert!(get_bit(&words, 15));
    assert!(!get_bit(&words, 9));
}

#[test]
fn test_load_bits_crosses_words() {
    // Arrange
    let words = [0b1111_0000u8, 0b0000_1010];

    // Act
    let value = load_bits(&words, 4, 8);

    // Assert - bits 4..12: 1111 from byte 0 then 1010 from byte 1
    assert_eq!(value, 0b1010_1111);
}

#[test]
fn test_apply_op_misaligned_u8_matches_reference() {
    for op in BitOp::ALL {
        // Arrange
        let original = [0b1011_0110u8, 0b0101_1100, 0b1110_0011, 0b0001_1111];
        let right = [0b1100_1010u8, 0b0011_0101, 0b1001_1001, 0b0110_0110];
        let expected = reference(op, &original, &right, 3, 5, 20);
        let mut left = original;

        // Act
        apply_op(op, &mut left, &right, 3, 5, 20);

        // Assert
        assert_eq!(bits(&left), expected, "{op:?}");
    }
}

#[test]
fn test_apply_op_misaligned_u64_matches_reference() {
    for op in BitOp::ALL {
        // Arrange
        let original = [0xDEAD_BEEF_0123_4567u64, 0x89AB_CDEF_FEDC_BA98];
        let right = [0x0F0F_F0F0_3C3C_C3C3u64, 0xA5A5_5A5A_9999_6666];
        let expected = reference(op, &original, &right, 61, 7, 66);
        let mut left = original;

        // Act
        apply_op(op, &mut left, &right, 61, 7, 66);

        // Assert
        assert_eq!(bits(&left), expected, "{op:?}");
    }
}

#[test]
fn test_apply_op_zero_size_is_noop() {
    // Arrange
    let mut left = [0xAAu8; 2];

    // Act
    apply_op(BitOp::And, &mut left, &[0u8; 2], 5, 0, 0);

    // Assert
    assert_eq!(left, [0xAA; 2]);
}

#[test]
fn test_apply_op_multiple_equals_sequential() {
    for op in [BitOp::And, BitOp::Or, BitOp::Xor, BitOp::Sub] {
        // Arrange
        let original = [0x5Au8, 0xC3, 0x0F, 0xF0, 0x99];
        let r1 = [0xFFu8, 0x0F, 0xAA, 0x55, 0x33];
        let r2 = [0x81u8, 0x7E, 0x18, 0xE7, 0xCC];
        let r3 = [0x12u8, 0x34, 0x56, 0x78, 0x9A];
        let starts = [1usize, 6, 11];

        let mut sequential = original;
        apply_op(op, &mut sequential, &r1, 2, starts[0], 25);
        apply_op(op, &mut sequential, &r2, 2, starts[1], 25);
        apply_op(op, &mut sequential, &r3, 2, starts[2], 25);

        // Act
        let mut fused = original;
        apply_op_multiple(op, &mut fused, &[&r1[..], &r2[..], &r3[..]], 2, &starts, 25);

        // Assert
        assert_eq!(fused, sequential, "{op:?}");
    }
}
