//! Word-level kernels for set operations at arbitrary bit offsets.
//!
//! The destination range is walked one destination word at a time; for each
//! word the matching run of source bits is gathered from up to `64 / BITS + 1`
//! source words, shifted into place and merged under a mask. Bits outside
//! `[start, start + size)` are never written, and source words outside the
//! requested range are never read.

use crate::element::BitWord;
use crate::ops::BitOp;

/// Mask with the low `n` bits set (`n <= 64`).
#[inline]
#[must_use]
pub const fn low_mask(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Reads bit `index` of a packed buffer.
#[inline]
#[must_use]
pub fn get_bit<W: BitWord>(words: &[W], index: usize) -> bool {
    (words[index / W::BITS].to_u64() >> (index % W::BITS)) & 1 == 1
}

/// Writes bit `index` of a packed buffer.
#[inline]
pub fn set_bit<W: BitWord>(words: &mut [W], index: usize, value: bool) {
    let slot = &mut words[index / W::BITS];
    let bit = 1u64 << (index % W::BITS);
    let current = slot.to_u64();
    *slot = W::from_u64(if value { current | bit } else { current & !bit });
}

/// Gathers `n` bits (`1..=64`) starting at bit `pos`, LSB aligned.
#[inline]
pub(crate) fn load_bits<W: BitWord>(src: &[W], pos: usize, n: usize) -> u64 {
    debug_assert!(n > 0 && n <= 64);
    let mut idx = pos / W::BITS;
    let shift = pos % W::BITS;
    let mut value = src[idx].to_u64() >> shift;
    let mut filled = W::BITS - shift;
    while filled < n {
        idx += 1;
        value |= src[idx].to_u64() << filled;
        filled += W::BITS;
    }
    value & low_mask(n)
}

/// `left[start_left..start_left + size] op= right[start_right..start_right + size]`.
pub(crate) fn apply_op<W: BitWord>(
    op: BitOp,
    left: &mut [W],
    right: &[W],
    start_left: usize,
    start_right: usize,
    size: usize,
) {
    let end = start_left + size;
    let mut pos = start_left;
    while pos < end {
        let idx = pos / W::BITS;
        let shift = pos % W::BITS;
        let n = (W::BITS - shift).min(end - pos);
        let mask = low_mask(n) << shift;

        let incoming = load_bits(right, start_right + (pos - start_left), n) << shift;
        let current = left[idx].to_u64();
        let merged = op.apply(current, incoming);
        left[idx] = W::from_u64((current & !mask) | (merged & mask));

        pos += n;
    }
}

/// Fused form of [`apply_op`]: every right operand is folded into each
/// destination word before it is written back, in operand order.
pub(crate) fn apply_op_multiple<W: BitWord>(
    op: BitOp,
    left: &mut [W],
    rights: &[&[W]],
    start_left: usize,
    start_rights: &[usize],
    size: usize,
) {
    debug_assert_eq!(
        rights.len(),
        start_rights.len(),
        "one start offset per right operand"
    );
    let end = start_left + size;
    let mut pos = start_left;
    while pos < end {
        let idx = pos / W::BITS;
        let shift = pos % W::BITS;
        let n = (W::BITS - shift).min(end - pos);
        let mask = low_mask(n) << shift;
        let offset = pos - start_left;

        let current = left[idx].to_u64();
        let merged = rights
            .iter()
            .zip(start_rights)
            .fold(current, |acc, (right, &start_right)| {
                op.apply(acc, load_bits(right, start_right + offset, n) << shift)
            });
        left[idx] = W::from_u64((current & !mask) | (merged & mask));

        pos += n;
    }
}

/// Debug-build bounds checks for a set operation.
#[inline]
pub(crate) fn debug_check_range<W: BitWord>(words: &[W], start: usize, size: usize) {
    debug_assert!(
        start + size <= words.len() * W::BITS,
        "bit range {start}..{} exceeds buffer of {} bits",
        start + size,
        words.len() * W::BITS
    );
}
