//! The contract every hardware strategy implements.
//!
//! Each entry point returns a coverage flag: `true` means the strategy has a
//! specialization for the requested (type, operator) pair and the destination
//! was written; `false` means it has none and the destination was not touched.
//! Every default method answers `false`, so a strategy declares coverage only by
//! overriding a method, and within it only for the combinations it matches.
//!
//! | Backend | Technology | Coverage |
//! |---------|------------|----------|
//! | `Scalar` | Rust native | Total (terminal fallback) |
//! | `Wide` | `wide` crate f32x8 / f64x4 / i32x8 / u64x4 | Partial |
//! | `Avx2` | `core::arch` AVX2 | Partial, x86_64 only |
//! | `Neon` | `core::arch` NEON | Partial, aarch64 only |
//!
//! Comparison-family entry points require the element count to be a multiple
//! of 8; the destination holds `len / 8` bytes, bit `i` at byte `i / 8`,
//! position `i % 8`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::{HighPrecision, NumericScalar, NumericSlice};
use crate::ops::{ArithOp, BitOp, CompareOp, RangeType};

/// Strategies known to the registry, ordered coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Reference implementation of every combination.
    Scalar,
    /// Portable SIMD via the `wide` crate.
    Wide,
    /// Native AVX2 intrinsics (x86_64 only).
    Avx2,
    /// Native NEON intrinsics (aarch64 only).
    Neon,
}

impl BackendKind {
    /// All registered strategies.
    pub const ALL: [Self; 4] = [Self::Scalar, Self::Wide, Self::Avx2, Self::Neon];

    /// Returns true if the current CPU can execute this strategy.
    ///
    /// Checked against the real hardware, independently of any injected
    /// capability record.
    #[must_use]
    pub fn is_supported_on_host(self) -> bool {
        match self {
            Self::Scalar | Self::Wide => true,
            Self::Avx2 => {
                #[cfg(target_arch = "x86_64")]
                {
                    is_x86_feature_detected!("avx2")
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    false
                }
            }
            Self::Neon => {
                #[cfg(target_arch = "aarch64")]
                {
                    std::arch::is_aarch64_feature_detected!("neon")
                }
                #[cfg(not(target_arch = "aarch64"))]
                {
                    false
                }
            }
        }
    }

    /// Lowercase identifier, as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Wide => "wide",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "Scalar"),
            Self::Wide => write!(f, "Wide"),
            Self::Avx2 => write!(f, "AVX2"),
            Self::Neon => write!(f, "NEON"),
        }
    }
}

/// One concrete implementation of the predicate contract.
#[allow(unused_variables)]
pub trait PredicateBackend: Send + Sync + fmt::Debug {
    /// Registry tag of this strategy.
    fn kind(&self) -> BackendKind;

    /// Writes bit `i` = `left[i] op right[i]`.
    ///
    /// Operands of different element types are never covered.
    fn compare_column(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        left: NumericSlice<'_>,
        right: NumericSlice<'_>,
    ) -> bool {
        false
    }

    /// Writes bit `i` = `data[i] op value`.
    fn compare_val(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        data: NumericSlice<'_>,
        value: NumericScalar,
    ) -> bool {
        false
    }

    /// Writes bit `i` = `values[i]` within `[lower[i], upper[i]]` per `range`.
    fn within_range_column(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: NumericSlice<'_>,
        upper: NumericSlice<'_>,
        values: NumericSlice<'_>,
    ) -> bool {
        false
    }

    /// Writes bit `i` = `values[i]` within `[lower, upper]` per `range`.
    fn within_range_val(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: NumericScalar,
        upper: NumericScalar,
        values: NumericSlice<'_>,
    ) -> bool {
        false
    }

    /// Writes bit `i` = `(widen(src[i]) arith right_operand) cmp value`.
    #[allow(clippy::too_many_arguments)]
    fn arith_compare(
        &self,
        arith: ArithOp,
        cmp: CompareOp,
        bitmask: &mut [u8],
        src: NumericSlice<'_>,
        right_operand: HighPrecision,
        value: HighPrecision,
    ) -> bool {
        false
    }

    /// In-place `left[start_left..+size] op= right[start_right..+size]` over bytes.
    fn forward_op_u8(
        &self,
        op: BitOp,
        left: &mut [u8],
        right: &[u8],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        false
    }

    /// In-place `left[start_left..+size] op= right[start_right..+size]` over 64-bit words.
    fn forward_op_u64(
        &self,
        op: BitOp,
        left: &mut [u64],
        right: &[u64],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        false
    }

    /// Fused reduction of every right operand into `left`, over bytes.
    ///
    /// Bit-identical to applying [`PredicateBackend::forward_op_u8`] per right
    /// operand in order.
    fn forward_op_multiple_u8(
        &self,
        op: BitOp,
        left: &mut [u8],
        rights: &[&[u8]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        false
    }

    /// Fused reduction of every right operand into `left`, over 64-bit words.
    fn forward_op_multiple_u64(
        &self,
        op: BitOp,
        left: &mut [u64],
        rights: &[&[u64]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        false
    }
}

/// Debug-build checks shared by the comparison-family entry points.
#[inline]
pub(crate) fn debug_check_bitmask(bitmask: &[u8], size: usize) {
    debug_assert!(size % 8 == 0, "element count {size} is not a multiple of 8");
    debug_assert!(
        bitmask.len() * 8 >= size,
        "bitmask of {} bytes cannot hold {size} bits",
        bitmask.len()
    );
}
