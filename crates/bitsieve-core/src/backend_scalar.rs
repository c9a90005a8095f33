//! Scalar reference strategy.
//!
//! Implements every (type, operator) combination and is the terminal fallback
//! of the dispatch chain. Its byte packers are also used by the SIMD
//! strategies for their remainder handling.

use crate::backend::{debug_check_bitmask, BackendKind, PredicateBackend};
use crate::bitwise::{apply_op, apply_op_multiple, debug_check_range};
use crate::element::{HighPrecision, NumericScalar, NumericSlice};
use crate::ops::{ArithOp, BitOp, CompareOp, RangeType};

/// Total, non-vectorized strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

/// Process-wide scalar instance.
pub static SCALAR: ScalarBackend = ScalarBackend;

// =============================================================================
// Bit packers
// =============================================================================

/// Packs `pred(data[i])` into `bitmask`, eight elements per byte.
#[inline]
pub(crate) fn pack_unary<T: Copy>(bitmask: &mut [u8], data: &[T], pred: impl Fn(T) -> bool) {
    for (byte, chunk) in bitmask.iter_mut().zip(data.chunks_exact(8)) {
        let mut bits = 0u8;
        for (i, &x) in chunk.iter().enumerate() {
            bits |= u8::from(pred(x)) << i;
        }
        *byte = bits;
    }
}

/// Packs `pred(a[i], b[i])` into `bitmask`.
#[inline]
pub(crate) fn pack_binary<T: Copy>(
    bitmask: &mut [u8],
    a: &[T],
    b: &[T],
    pred: impl Fn(T, T) -> bool,
) {
    for ((byte, ca), cb) in bitmask
        .iter_mut()
        .zip(a.chunks_exact(8))
        .zip(b.chunks_exact(8))
    {
        let mut bits = 0u8;
        for i in 0..8 {
            bits |= u8::from(pred(ca[i], cb[i])) << i;
        }
        *byte = bits;
    }
}

/// Packs `pred(a[i], b[i], c[i])` into `bitmask`.
#[inline]
pub(crate) fn pack_ternary<T: Copy>(
    bitmask: &mut [u8],
    a: &[T],
    b: &[T],
    c: &[T],
    pred: impl Fn(T, T, T) -> bool,
) {
    for (((byte, ca), cb), cc) in bitmask
        .iter_mut()
        .zip(a.chunks_exact(8))
        .zip(b.chunks_exact(8))
        .zip(c.chunks_exact(8))
    {
        let mut bits = 0u8;
        for i in 0..8 {
            bits |= u8::from(pred(ca[i], cb[i], cc[i])) << i;
        }
        *byte = bits;
    }
}

// =============================================================================
// Typed kernels
// =============================================================================

pub(crate) fn compare_val_typed<T: PartialOrd + Copy>(
    op: CompareOp,
    bitmask: &mut [u8],
    data: &[T],
    value: T,
) {
    match op {
        CompareOp::Eq => pack_unary(bitmask, data, |x| x == value),
        CompareOp::Ne => pack_unary(bitmask, data, |x| x != value),
        CompareOp::Gt => pack_unary(bitmask, data, |x| x > value),
        CompareOp::Ge => pack_unary(bitmask, data, |x| x >= value),
        CompareOp::Lt => pack_unary(bitmask, data, |x| x < value),
        CompareOp::Le => pack_unary(bitmask, data, |x| x <= value),
    }
}

pub(crate) fn compare_column_typed<T: PartialOrd + Copy>(
    op: CompareOp,
    bitmask: &mut [u8],
    left: &[T],
    right: &[T],
) {
    match op {
        CompareOp::Eq => pack_binary(bitmask, left, right, |a, b| a == b),
        CompareOp::Ne => pack_binary(bitmask, left, right, |a, b| a != b),
        CompareOp::Gt => pack_binary(bitmask, left, right, |a, b| a > b),
        CompareOp::Ge => pack_binary(bitmask, left, right, |a, b| a >= b),
        CompareOp::Lt => pack_binary(bitmask, left, right, |a, b| a < b),
        CompareOp::Le => pack_binary(bitmask, left, right, |a, b| a <= b),
    }
}

pub(crate) fn range_val_typed<T: PartialOrd + Copy>(
    range: RangeType,
    bitmask: &mut [u8],
    lower: T,
    upper: T,
    values: &[T],
) {
    match range {
        RangeType::ExcExc => pack_unary(bitmask, values, |v| lower < v && v < upper),
        RangeType::ExcInc => pack_unary(bitmask, values, |v| lower < v && v <= upper),
        RangeType::IncExc => pack_unary(bitmask, values, |v| lower <= v && v < upper),
        RangeType::IncInc => pack_unary(bitmask, values, |v| lower <= v && v <= upper),
    }
}

pub(crate) fn range_column_typed<T: PartialOrd + Copy>(
    range: RangeType,
    bitmask: &mut [u8],
    lower: &[T],
    upper: &[T],
    values: &[T],
) {
    match range {
        RangeType::ExcExc => pack_ternary(bitmask, lower, upper, values, |l, u, v| l < v && v < u),
        RangeType::ExcInc => pack_ternary(bitmask, lower, upper, values, |l, u, v| l < v && v <= u),
        RangeType::IncExc => pack_ternary(bitmask, lower, upper, values, |l, u, v| l <= v && v < u),
        RangeType::IncInc => {
            pack_ternary(bitmask, lower, upper, values, |l, u, v| l <= v && v <= u);
        }
    }
}

/// Compares `map(src[i])` against `value`; a `None` from `map` clears the bit.
#[inline]
fn compare_mapped<T: Copy, R: PartialOrd + Copy>(
    cmp: CompareOp,
    bitmask: &mut [u8],
    src: &[T],
    value: R,
    map: impl Fn(T) -> Option<R>,
) {
    match cmp {
        CompareOp::Eq => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r == value)),
        CompareOp::Ne => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r != value)),
        CompareOp::Gt => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r > value)),
        CompareOp::Ge => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r >= value)),
        CompareOp::Lt => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r < value)),
        CompareOp::Le => pack_unary(bitmask, src, |x| map(x).is_some_and(|r| r <= value)),
    }
}

/// Integer arith-compare, evaluated exactly in `i128`.
///
/// A zero divisor for `Div`/`Mod` clears every bit.
pub(crate) fn arith_compare_int<T: Copy + Into<i64>>(
    arith: ArithOp,
    cmp: CompareOp,
    bitmask: &mut [u8],
    src: &[T],
    right_operand: i64,
    value: i64,
) {
    let operand = i128::from(right_operand);
    let value = i128::from(value);
    let widen = |x: T| i128::from(x.into());
    match arith {
        ArithOp::Add => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) + operand)),
        ArithOp::Sub => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) - operand)),
        ArithOp::Mul => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) * operand)),
        ArithOp::Div => compare_mapped(cmp, bitmask, src, value, |x| widen(x).checked_div(operand)),
        ArithOp::Mod => compare_mapped(cmp, bitmask, src, value, |x| widen(x).checked_rem(operand)),
    }
}

/// Floating arith-compare, evaluated in `f64` with IEEE-754 semantics.
pub(crate) fn arith_compare_float<T: Copy + Into<f64>>(
    arith: ArithOp,
    cmp: CompareOp,
    bitmask: &mut [u8],
    src: &[T],
    right_operand: f64,
    value: f64,
) {
    let widen = |x: T| -> f64 { x.into() };
    match arith {
        ArithOp::Add => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) + right_operand)),
        ArithOp::Sub => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) - right_operand)),
        ArithOp::Mul => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) * right_operand)),
        ArithOp::Div => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) / right_operand)),
        ArithOp::Mod => compare_mapped(cmp, bitmask, src, value, |x| Some(widen(x) % right_operand)),
    }
}

// =============================================================================
// Contract
// =============================================================================

impl PredicateBackend for ScalarBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scalar
    }

    fn compare_column(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        left: NumericSlice<'_>,
        right: NumericSlice<'_>,
    ) -> bool {
        debug_check_bitmask(bitmask, left.len());
        match (left, right) {
            (NumericSlice::Int8(l), NumericSlice::Int8(r)) => compare_column_typed(op, bitmask, l, r),
            (NumericSlice::Int16(l), NumericSlice::Int16(r)) => compare_column_typed(op, bitmask, l, r),
            (NumericSlice::Int32(l), NumericSlice::Int32(r)) => compare_column_typed(op, bitmask, l, r),
            (NumericSlice::Int64(l), NumericSlice::Int64(r)) => compare_column_typed(op, bitmask, l, r),
            (NumericSlice::Float32(l), NumericSlice::Float32(r)) => {
                compare_column_typed(op, bitmask, l, r);
            }
            (NumericSlice::Float64(l), NumericSlice::Float64(r)) => {
                compare_column_typed(op, bitmask, l, r);
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
        debug_check_bitmask(bitmask, data.len());
        match (data, value) {
            (NumericSlice::Int8(d), NumericScalar::Int8(v)) => compare_val_typed(op, bitmask, d, v),
            (NumericSlice::Int16(d), NumericScalar::Int16(v)) => compare_val_typed(op, bitmask, d, v),
            (NumericSlice::Int32(d), NumericScalar::Int32(v)) => compare_val_typed(op, bitmask, d, v),
            (NumericSlice::Int64(d), NumericScalar::Int64(v)) => compare_val_typed(op, bitmask, d, v),
            (NumericSlice::Float32(d), NumericScalar::Float32(v)) => {
                compare_val_typed(op, bitmask, d, v);
            }
            (NumericSlice::Float64(d), NumericScalar::Float64(v)) => {
                compare_val_typed(op, bitmask, d, v);
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
        debug_check_bitmask(bitmask, values.len());
        match (lower, upper, values) {
            (NumericSlice::Int8(l), NumericSlice::Int8(u), NumericSlice::Int8(v)) => {
                range_column_typed(range, bitmask, l, u, v);
            }
            (NumericSlice::Int16(l), NumericSlice::Int16(u), NumericSlice::Int16(v)) => {
                range_column_typed(range, bitmask, l, u, v);
            }
            (NumericSlice::Int32(l), NumericSlice::Int32(u), NumericSlice::Int32(v)) => {
                range_column_typed(range, bitmask, l, u, v);
            }
            (NumericSlice::Int64(l), NumericSlice::Int64(u), NumericSlice::Int64(v)) => {
                range_column_typed(range, bitmask, l, u, v);
            }
            (NumericSlice::Float32(l), NumericSlice::Float32(u), NumericSlice::Float32(v)) => {
                range_column_typed(range, bitmask, l, u, v);
            }
            (NumericSlice::Float64(l), NumericSlice::Float64(u), NumericSlice::Float64(v)) => {
                range_column_typed(range, bitmask, l, u, v);
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
        debug_check_bitmask(bitmask, values.len());
        match (lower, upper, values) {
            (NumericScalar::Int8(l), NumericScalar::Int8(u), NumericSlice::Int8(v)) => {
                range_val_typed(range, bitmask, l, u, v);
            }
            (NumericScalar::Int16(l), NumericScalar::Int16(u), NumericSlice::Int16(v)) => {
                range_val_typed(range, bitmask, l, u, v);
            }
            (NumericScalar::Int32(l), NumericScalar::Int32(u), NumericSlice::Int32(v)) => {
                range_val_typed(range, bitmask, l, u, v);
            }
            (NumericScalar::Int64(l), NumericScalar::Int64(u), NumericSlice::Int64(v)) => {
                range_val_typed(range, bitmask, l, u, v);
            }
            (NumericScalar::Float32(l), NumericScalar::Float32(u), NumericSlice::Float32(v)) => {
                range_val_typed(range, bitmask, l, u, v);
            }
            (NumericScalar::Float64(l), NumericScalar::Float64(u), NumericSlice::Float64(v)) => {
                range_val_typed(range, bitmask, l, u, v);
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
        debug_check_bitmask(bitmask, src.len());
        match (src, right_operand, value) {
            (NumericSlice::Int8(s), HighPrecision::Int(r), HighPrecision::Int(v)) => {
                arith_compare_int(arith, cmp, bitmask, s, r, v);
            }
            (NumericSlice::Int16(s), HighPrecision::Int(r), HighPrecision::Int(v)) => {
                arith_compare_int(arith, cmp, bitmask, s, r, v);
            }
            (NumericSlice::Int32(s), HighPrecision::Int(r), HighPrecision::Int(v)) => {
                arith_compare_int(arith, cmp, bitmask, s, r, v);
            }
            (NumericSlice::Int64(s), HighPrecision::Int(r), HighPrecision::Int(v)) => {
                arith_compare_int(arith, cmp, bitmask, s, r, v);
            }
            (NumericSlice::Float32(s), HighPrecision::Float(r), HighPrecision::Float(v)) => {
                arith_compare_float(arith, cmp, bitmask, s, r, v);
            }
            (NumericSlice::Float64(s), HighPrecision::Float(r), HighPrecision::Float(v)) => {
                arith_compare_float(arith, cmp, bitmask, s, r, v);
            }
            _ => return false,
        }
        true
    }

    fn forward_op_u8(
        &self,
        op: BitOp,
        left: &mut [u8],
        right: &[u8],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        debug_check_range(left, start_left, size);
        debug_check_range(right, start_right, size);
        apply_op(op, left, right, start_left, start_right, size);
        true
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
        apply_op(op, left, right, start_left, start_right, size);
        true
    }

    fn forward_op_multiple_u8(
        &self,
        op: BitOp,
        left: &mut [u8],
        rights: &[&[u8]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        debug_check_range(left, start_left, size);
        apply_op_multiple(op, left, rights, start_left, start_rights, size);
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
        apply_op_multiple(op, left, rights, start_left, start_rights, size);
        true
    }
}
