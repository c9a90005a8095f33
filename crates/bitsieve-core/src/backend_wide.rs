//! Portable SIMD strategy using the `wide` crate.
//!
//! The `wide` types lower to SSE2/AVX on x86, NEON on ARM and SIMD128 on
//! WASM. Coverage is partial:
//!
//! | Family | Types |
//! |--------|-------|
//! | compare | `f32`, `f64`, `i32` |
//! | range | `f32`, `f64` |
//! | arith-compare | `f32`, `f64` with `Add` / `Sub` / `Mul` |
//! | set ops | `u64` words |
//!
//! Float lanes follow IEEE ordering: every comparison against NaN is false,
//! `Ne` is computed as the complement of `Eq` so NaN yields true there.

use std::ops::BitOr;

use wide::{f32x8, f64x4, i32x8, u64x4, CmpEq, CmpGt, CmpLt};

use crate::backend::{debug_check_bitmask, BackendKind, PredicateBackend};
use crate::bitwise::{apply_op, apply_op_multiple, debug_check_range, low_mask};
use crate::element::{HighPrecision, NumericScalar, NumericSlice};
use crate::ops::{ArithOp, BitOp, CompareOp, RangeType};

/// Strategy built on `wide` vector types.
#[derive(Debug, Clone, Copy, Default)]
pub struct WideBackend;

/// Process-wide `wide` instance.
pub static WIDE: WideBackend = WideBackend;

// =============================================================================
// Lane abstraction
// =============================================================================

trait Lanes:
    Copy + CmpEq<Output = Self> + CmpGt<Output = Self> + CmpLt<Output = Self> + BitOr<Output = Self>
{
    type Scalar: Copy;

    const WIDTH: usize;

    fn load(src: &[Self::Scalar]) -> Self;

    fn broadcast(value: Self::Scalar) -> Self;

    /// One bit per lane, lane 0 in bit 0.
    fn mask_bits(self) -> u8;
}

macro_rules! impl_lanes {
    ($simd:ty, $scalar:ty, $width:expr, |$lane:ident| $is_set:expr) => {
        impl Lanes for $simd {
            type Scalar = $scalar;

            const WIDTH: usize = $width;

            #[inline]
            fn load(src: &[$scalar]) -> Self {
                let mut lanes = [<$scalar>::default(); $width];
                lanes.copy_from_slice(&src[..$width]);
                <$simd>::new(lanes)
            }

            #[inline]
            fn broadcast(value: $scalar) -> Self {
                <$simd>::splat(value)
            }

            #[inline]
            fn mask_bits(self) -> u8 {
                self.to_array()
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &$lane)| acc | (u8::from($is_set) << i))
            }
        }
    };
}

impl_lanes!(f32x8, f32, 8, |lane| lane.to_bits() != 0);
impl_lanes!(f64x4, f64, 4, |lane| lane.to_bits() != 0);
impl_lanes!(i32x8, i32, 8, |lane| lane != 0);

#[inline]
fn compare_bits<L: Lanes>(op: CompareOp, a: L, b: L) -> u8 {
    match op {
        CompareOp::Eq => a.cmp_eq(b).mask_bits(),
        CompareOp::Ne => !a.cmp_eq(b).mask_bits() & low_mask(L::WIDTH) as u8,
        CompareOp::Gt => a.cmp_gt(b).mask_bits(),
        CompareOp::Ge => (a.cmp_gt(b) | a.cmp_eq(b)).mask_bits(),
        CompareOp::Lt => a.cmp_lt(b).mask_bits(),
        CompareOp::Le => (a.cmp_lt(b) | a.cmp_eq(b)).mask_bits(),
    }
}

#[inline]
fn range_bits<L: Lanes>(range: RangeType, lower: L, upper: L, values: L) -> u8 {
    let above = if range.lower_inclusive() {
        values.cmp_gt(lower) | values.cmp_eq(lower)
    } else {
        values.cmp_gt(lower)
    };
    let below = if range.upper_inclusive() {
        values.cmp_lt(upper) | values.cmp_eq(upper)
    } else {
        values.cmp_lt(upper)
    };
    above.mask_bits() & below.mask_bits()
}

/// Fills `len / 8` bytes; `lane_bits(offset)` yields `L::WIDTH` bits for the
/// elements starting at `offset`.
#[inline]
fn pack_lanes<L: Lanes>(bitmask: &mut [u8], len: usize, lane_bits: impl Fn(usize) -> u8) {
    for (byte_idx, byte) in bitmask[..len / 8].iter_mut().enumerate() {
        let base = byte_idx * 8;
        let mut bits = 0u8;
        let mut shift = 0;
        while shift < 8 {
            bits |= lane_bits(base + shift) << shift;
            shift += L::WIDTH;
        }
        *byte = bits;
    }
}

fn compare_val_lanes<L: Lanes>(op: CompareOp, bitmask: &mut [u8], data: &[L::Scalar], value: L::Scalar) {
    let value = L::broadcast(value);
    pack_lanes::<L>(bitmask, data.len(), |o| compare_bits(op, L::load(&data[o..]), value));
}

fn compare_column_lanes<L: Lanes>(
    op: CompareOp,
    bitmask: &mut [u8],
    left: &[L::Scalar],
    right: &[L::Scalar],
) {
    pack_lanes::<L>(bitmask, left.len(), |o| {
        compare_bits(op, L::load(&left[o..]), L::load(&right[o..]))
    });
}

fn range_val_lanes<L: Lanes>(
    range: RangeType,
    bitmask: &mut [u8],
    lower: L::Scalar,
    upper: L::Scalar,
    values: &[L::Scalar],
) {
    let lower = L::broadcast(lower);
    let upper = L::broadcast(upper);
    pack_lanes::<L>(bitmask, values.len(), |o| {
        range_bits(range, lower, upper, L::load(&values[o..]))
    });
}

fn range_column_lanes<L: Lanes>(
    range: RangeType,
    bitmask: &mut [u8],
    lower: &[L::Scalar],
    upper: &[L::Scalar],
    values: &[L::Scalar],
) {
    pack_lanes::<L>(bitmask, values.len(), |o| {
        range_bits(range, L::load(&lower[o..]), L::load(&upper[o..]), L::load(&values[o..]))
    });
}

#[inline]
fn widen_f64x4<T: Copy + Into<f64>>(src: &[T]) -> f64x4 {
    f64x4::new([src[0].into(), src[1].into(), src[2].into(), src[3].into()])
}

/// Arith-compare in `f64` lanes. `Div` and `Mod` are not covered.
fn arith_compare_lanes<T: Copy + Into<f64>>(
    arith: ArithOp,
    cmp: CompareOp,
    bitmask: &mut [u8],
    src: &[T],
    right_operand: f64,
    value: f64,
) -> bool {
    let apply: fn(f64x4, f64x4) -> f64x4 = match arith {
        ArithOp::Add => |a, b| a + b,
        ArithOp::Sub => |a, b| a - b,
        ArithOp::Mul => |a, b| a * b,
        ArithOp::Div | ArithOp::Mod => return false,
    };
    let operand = f64x4::splat(right_operand);
    let value = f64x4::splat(value);
    pack_lanes::<f64x4>(bitmask, src.len(), |o| {
        compare_bits(cmp, apply(widen_f64x4(&src[o..]), operand), value)
    });
    true
}

// =============================================================================
// Set operations
// =============================================================================

#[inline]
fn load_u64x4(src: &[u64]) -> u64x4 {
    u64x4::new([src[0], src[1], src[2], src[3]])
}

#[inline]
fn bitop_lanes(op: BitOp, left: u64x4, right: u64x4) -> u64x4 {
    match op {
        BitOp::And => left & right,
        BitOp::Or => left | right,
        BitOp::Xor => left ^ right,
        BitOp::Sub => left ^ (left & right),
    }
}

/// Both ranges start on a word boundary: whole 4-word blocks go through
/// `u64x4`, the rest through the generic kernel.
fn forward_aligned(
    op: BitOp,
    left: &mut [u64],
    right: &[u64],
    start_left: usize,
    start_right: usize,
    size: usize,
) {
    let blocks = size / 256;
    let lw = start_left / 64;
    let rw = start_right / 64;
    let dst = &mut left[lw..lw + blocks * 4];
    let src = &right[rw..rw + blocks * 4];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let merged = bitop_lanes(op, load_u64x4(d), load_u64x4(s));
        d.copy_from_slice(&merged.to_array());
    }

    let done = blocks * 256;
    if done < size {
        apply_op(op, left, right, start_left + done, start_right + done, size - done);
    }
}

fn forward_multiple_aligned(
    op: BitOp,
    left: &mut [u64],
    rights: &[&[u64]],
    start_left: usize,
    start_rights: &[usize],
    size: usize,
) {
    let blocks = size / 256;
    let lw = start_left / 64;
    for block in 0..blocks {
        let base = block * 4;
        let dst = &mut left[lw + base..lw + base + 4];
        let merged = rights
            .iter()
            .zip(start_rights)
            .fold(load_u64x4(dst), |acc, (right, &start_right)| {
                bitop_lanes(op, acc, load_u64x4(&right[start_right / 64 + base..]))
            });
        dst.copy_from_slice(&merged.to_array());
    }

    // Per-bit ops: folding the tail one operand at a time equals the fused form.
    let done = blocks * 256;
    if done < size {
        for (right, &start_right) in rights.iter().zip(start_rights) {
            apply_op(op, left, right, start_left + done, start_right + done, size - done);
        }
    }
}

// =============================================================================
// Contract
// =============================================================================

impl PredicateBackend for WideBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Wide
    }

    fn compare_column(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        left: NumericSlice<'_>,
        right: NumericSlice<'_>,
    ) -> bool {
        match (left, right) {
            (NumericSlice::Float32(l), NumericSlice::Float32(r)) => {
                debug_check_bitmask(bitmask, l.len());
                compare_column_lanes::<f32x8>(op, bitmask, l, r);
            }
            (NumericSlice::Float64(l), NumericSlice::Float64(r)) => {
                debug_check_bitmask(bitmask, l.len());
                compare_column_lanes::<f64x4>(op, bitmask, l, r);
            }
            (NumericSlice::Int32(l), NumericSlice::Int32(r)) => {
                debug_check_bitmask(bitmask, l.len());
                compare_column_lanes::<i32x8>(op, bitmask, l, r);
            }
            _ => return false,
        }
        true
    }

    fn compare_val(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        data: NumericSlice<'_>,
        value: NumericScalar,
    ) -> bool {
        match (data, value) {
            (NumericSlice::Float32(d), NumericScalar::Float32(v)) => {
                debug_check_bitmask(bitmask, d.len());
                compare_val_lanes::<f32x8>(op, bitmask, d, v);
            }
            (NumericSlice::Float64(d), NumericScalar::Float64(v)) => {
                debug_check_bitmask(bitmask, d.len());
                compare_val_lanes::<f64x4>(op, bitmask, d, v);
            }
            (NumericSlice::Int32(d), NumericScalar::Int32(v)) => {
                debug_check_bitmask(bitmask, d.len());
                compare_val_lanes::<i32x8>(op, bitmask, d, v);
            }
            _ => return false,
        }
        true
    }

    fn within_range_column(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: NumericSlice<'_>,
        upper: NumericSlice<'_>,
        values: NumericSlice<'_>,
    ) -> bool {
        match (lower, upper, values) {
            (NumericSlice::Float32(l), NumericSlice::Float32(u), NumericSlice::Float32(v)) => {
                debug_check_bitmask(bitmask, v.len());
                range_column_lanes::<f32x8>(range, bitmask, l, u, v);
            }
            (NumericSlice::Float64(l), NumericSlice::Float64(u), NumericSlice::Float64(v)) => {
                debug_check_bitmask(bitmask, v.len());
                range_column_lanes::<f64x4>(range, bitmask, l, u, v);
            }
            _ => return false,
        }
        true
    }

    fn within_range_val(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: NumericScalar,
        upper: NumericScalar,
        values: NumericSlice<'_>,
    ) -> bool {
        match (lower, upper, values) {
            (NumericScalar::Float32(l), NumericScalar::Float32(u), NumericSlice::Float32(v)) => {
                debug_check_bitmask(bitmask, v.len());
                range_val_lanes::<f32x8>(range, bitmask, l, u, v);
            }
            (NumericScalar::Float64(l), NumericScalar::Float64(u), NumericSlice::Float64(v)) => {
                debug_check_bitmask(bitmask, v.len());
                range_val_lanes::<f64x4>(range, bitmask, l, u, v);
            }
            _ => return false,
        }
        true
    }

    fn arith_compare(
        &self,
        arith: ArithOp,
        cmp: CompareOp,
        bitmask: &mut [u8],
        src: NumericSlice<'_>,
        right_operand: HighPrecision,
        value: HighPrecision,
    ) -> bool {
        match (src, right_operand, value) {
            (NumericSlice::Float32(s), HighPrecision::Float(r), HighPrecision::Float(v)) => {
                debug_check_bitmask(bitmask, s.len());
                arith_compare_lanes(arith, cmp, bitmask, s, r, v)
            }
            (NumericSlice::Float64(s), HighPrecision::Float(r), HighPrecision::Float(v)) => {
                debug_check_bitmask(bitmask, s.len());
                arith_compare_lanes(arith, cmp, bitmask, s, r, v)
            }
            _ => false,
        }
    }

    fn forward_op_u64(
        &self,
        op: BitOp,
        left: &mut [u64],
        right: &[u64],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        debug_check_range(left, start_left, size);
        debug_check_range(right, start_right, size);
        if start_left % 64 == 0 && start_right % 64 == 0 {
            forward_aligned(op, left, right, start_left, start_right, size);
        } else {
            apply_op(op, left, right, start_left, start_right, size);
        }
        true
    }

    fn forward_op_multiple_u64(
        &self,
        op: BitOp,
        left: &mut [u64],
        rights: &[&[u64]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        debug_check_range(left, start_left, size);
        if start_left % 64 == 0 && start_rights.iter().all(|s| s % 64 == 0) {
            forward_multiple_aligned(op, left, rights, start_left, start_rights, size);
        } else {
            apply_op_multiple(op, left, rights, start_left, start_rights, size);
        }
        true
    }
}
