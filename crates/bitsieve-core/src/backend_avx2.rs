//! AVX2 strategy using `core::arch::x86_64` intrinsics.
//!
//! Covers `f32` / `i32` compares (column and value) and `f32` value-bound
//! ranges. Float predicates use the ordered, non-signalling forms, except
//! `Ne` which is unordered so NaN lanes compare true.

#![allow(clippy::wildcard_imports)]

use std::arch::x86_64::*;

use crate::backend::{debug_check_bitmask, BackendKind, PredicateBackend};
use crate::element::{NumericScalar, NumericSlice};
use crate::ops::{CompareOp, RangeType};

/// Strategy built on AVX2 intrinsics.
///
/// Only obtainable through [`Avx2Backend::detect`], which guarantees the
/// running CPU supports AVX2.
#[derive(Debug)]
pub struct Avx2Backend {
    _detected: (),
}

/// Instance handed out once the host check has passed.
pub(crate) static AVX2: Avx2Backend = Avx2Backend { _detected: () };

impl Avx2Backend {
    /// Returns the strategy if the current CPU supports AVX2.
    #[must_use]
    pub fn detect() -> Option<&'static Self> {
        BackendKind::Avx2.is_supported_on_host().then_some(&AVX2)
    }
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn mask_f32(op: CompareOp, a: __m256, b: __m256) -> u8 {
    let m = match op {
        CompareOp::Eq => _mm256_cmp_ps::<_CMP_EQ_OQ>(a, b),
        CompareOp::Ne => _mm256_cmp_ps::<_CMP_NEQ_UQ>(a, b),
        CompareOp::Gt => _mm256_cmp_ps::<_CMP_GT_OQ>(a, b),
        CompareOp::Ge => _mm256_cmp_ps::<_CMP_GE_OQ>(a, b),
        CompareOp::Lt => _mm256_cmp_ps::<_CMP_LT_OQ>(a, b),
        CompareOp::Le => _mm256_cmp_ps::<_CMP_LE_OQ>(a, b),
    };
    _mm256_movemask_ps(m) as u8
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn mask_i32(op: CompareOp, a: __m256i, b: __m256i) -> u8 {
    // Only eq and gt exist for epi32; the rest are swaps or complements.
    let (m, invert) = match op {
        CompareOp::Eq => (_mm256_cmpeq_epi32(a, b), false),
        CompareOp::Ne => (_mm256_cmpeq_epi32(a, b), true),
        CompareOp::Gt => (_mm256_cmpgt_epi32(a, b), false),
        CompareOp::Ge => (_mm256_cmpgt_epi32(b, a), true),
        CompareOp::Lt => (_mm256_cmpgt_epi32(b, a), false),
        CompareOp::Le => (_mm256_cmpgt_epi32(a, b), true),
    };
    let bits = _mm256_movemask_ps(_mm256_castsi256_ps(m)) as u8;
    if invert {
        !bits
    } else {
        bits
    }
}

#[target_feature(enable = "avx2")]
unsafe fn compare_val_f32(op: CompareOp, bitmask: &mut [u8], data: &[f32], value: f32) {
    let vb = _mm256_set1_ps(value);
    for (byte, chunk) in bitmask.iter_mut().zip(data.chunks_exact(8)) {
        let va = _mm256_loadu_ps(chunk.as_ptr());
        *byte = mask_f32(op, va, vb);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn compare_column_f32(op: CompareOp, bitmask: &mut [u8], left: &[f32], right: &[f32]) {
    for ((byte, l), r) in bitmask
        .iter_mut()
        .zip(left.chunks_exact(8))
        .zip(right.chunks_exact(8))
    {
        let va = _mm256_loadu_ps(l.as_ptr());
        let vb = _mm256_loadu_ps(r.as_ptr());
        *byte = mask_f32(op, va, vb);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn compare_val_i32(op: CompareOp, bitmask: &mut [u8], data: &[i32], value: i32) {
    let vb = _mm256_set1_epi32(value);
    for (byte, chunk) in bitmask.iter_mut().zip(data.chunks_exact(8)) {
        let va = _mm256_loadu_si256(chunk.as_ptr().cast());
        *byte = mask_i32(op, va, vb);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn compare_column_i32(op: CompareOp, bitmask: &mut [u8], left: &[i32], right: &[i32]) {
    for ((byte, l), r) in bitmask
        .iter_mut()
        .zip(left.chunks_exact(8))
        .zip(right.chunks_exact(8))
    {
        let va = _mm256_loadu_si256(l.as_ptr().cast());
        let vb = _mm256_loadu_si256(r.as_ptr().cast());
        *byte = mask_i32(op, va, vb);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn range_val_f32(range: RangeType, bitmask: &mut [u8], lower: f32, upper: f32, values: &[f32]) {
    let lo = _mm256_set1_ps(lower);
    let hi = _mm256_set1_ps(upper);
    for (byte, chunk) in bitmask.iter_mut().zip(values.chunks_exact(8)) {
        let v = _mm256_loadu_ps(chunk.as_ptr());
        let above = if range.lower_inclusive() {
            _mm256_cmp_ps::<_CMP_GE_OQ>(v, lo)
        } else {
            _mm256_cmp_ps::<_CMP_GT_OQ>(v, lo)
        };
        let below = if range.upper_inclusive() {
            _mm256_cmp_ps::<_CMP_LE_OQ>(v, hi)
        } else {
            _mm256_cmp_ps::<_CMP_LT_OQ>(v, hi)
        };
        *byte = _mm256_movemask_ps(_mm256_and_ps(above, below)) as u8;
    }
}

impl PredicateBackend for Avx2Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Avx2
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
                // SAFETY: an Avx2Backend only exists after AVX2 was detected.
                unsafe { compare_column_f32(op, bitmask, l, r) };
            }
            (NumericSlice::Int32(l), NumericSlice::Int32(r)) => {
                debug_check_bitmask(bitmask, l.len());
                // SAFETY: as above.
                unsafe { compare_column_i32(op, bitmask, l, r) };
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
                // SAFETY: an Avx2Backend only exists after AVX2 was detected.
                unsafe { compare_val_f32(op, bitmask, d, v) };
            }
            (NumericSlice::Int32(d), NumericScalar::Int32(v)) => {
                debug_check_bitmask(bitmask, d.len());
                // SAFETY: as above.
                unsafe { compare_val_i32(op, bitmask, d, v) };
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
                // SAFETY: an Avx2Backend only exists after AVX2 was detected.
                unsafe { range_val_f32(range, bitmask, l, u, v) };
                true
            }
            _ => false,
        }
    }
}
