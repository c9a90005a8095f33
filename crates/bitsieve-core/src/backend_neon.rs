//! NEON strategy for aarch64. Covers `f32` compares only.

#![allow(clippy::wildcard_imports)]

use std::arch::aarch64::*;

use crate::backend::{debug_check_bitmask, BackendKind, PredicateBackend};
use crate::element::{NumericScalar, NumericSlice};
use crate::ops::CompareOp;

/// Strategy built on NEON intrinsics.
///
/// Only obtainable through [`NeonBackend::detect`].
#[derive(Debug)]
pub struct NeonBackend {
    _detected: (),
}

pub(crate) static NEON: NeonBackend = NeonBackend { _detected: () };

impl NeonBackend {
    /// Returns the strategy if the current CPU supports NEON.
    #[must_use]
    pub fn detect() -> Option<&'static Self> {
        BackendKind::Neon.is_supported_on_host().then_some(&NEON)
    }
}

/// Four lanes of `a op b`, lane 0 in bit 0.
#[target_feature(enable = "neon")]
#[inline]
unsafe fn mask_f32x4(op: CompareOp, a: float32x4_t, b: float32x4_t) -> u8 {
    let m = match op {
        CompareOp::Eq => vceqq_f32(a, b),
        CompareOp::Ne => vmvnq_u32(vceqq_f32(a, b)),
        CompareOp::Gt => vcgtq_f32(a, b),
        CompareOp::Ge => vcgeq_f32(a, b),
        CompareOp::Lt => vcltq_f32(a, b),
        CompareOp::Le => vcleq_f32(a, b),
    };
    let mut lanes = [0u32; 4];
    vst1q_u32(lanes.as_mut_ptr(), m);
    lanes
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &lane)| acc | (u8::from(lane != 0) << i))
}

#[target_feature(enable = "neon")]
unsafe fn compare_val_f32(op: CompareOp, bitmask: &mut [u8], data: &[f32], value: f32) {
    let vb = vdupq_n_f32(value);
    for (byte, chunk) in bitmask.iter_mut().zip(data.chunks_exact(8)) {
        let lo = vld1q_f32(chunk.as_ptr());
        let hi = vld1q_f32(chunk.as_ptr().add(4));
        *byte = mask_f32x4(op, lo, vb) | (mask_f32x4(op, hi, vb) << 4);
    }
}

#[target_feature(enable = "neon")]
unsafe fn compare_column_f32(op: CompareOp, bitmask: &mut [u8], left: &[f32], right: &[f32]) {
    for ((byte, l), r) in bitmask
        .iter_mut()
        .zip(left.chunks_exact(8))
        .zip(right.chunks_exact(8))
    {
        let lo = mask_f32x4(op, vld1q_f32(l.as_ptr()), vld1q_f32(r.as_ptr()));
        let hi = mask_f32x4(op, vld1q_f32(l.as_ptr().add(4)), vld1q_f32(r.as_ptr().add(4)));
        *byte = lo | (hi << 4);
    }
}

impl PredicateBackend for NeonBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Neon
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
                // SAFETY: a NeonBackend only exists after NEON was detected;
                // chunks_exact(8) keeps both 4-lane loads in bounds.
                unsafe { compare_column_f32(op, bitmask, l, r) };
                true
            }
            _ => false,
        }
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
                // SAFETY: as above.
                unsafe { compare_val_f32(op, bitmask, d, v) };
                true
            }
            _ => false,
        }
    }
}
