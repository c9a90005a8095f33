//! Binding between Rust element types and the type tags backends match on.
//!
//! The public facade is generic (`&[T]`), the backend contract is object safe.
//! [`Element`] turns a typed slice into a [`NumericSlice`] view without copying,
//! and [`BitWord`] routes word buffers to the `u8` / `u64` backend entry points.

use crate::backend::PredicateBackend;
use crate::ops::{BitOp, NumericType, WordType};

mod sealed {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for u8 {}
    impl Sealed for u64 {}
}

/// Borrowed column view tagged with its element type.
#[derive(Debug, Clone, Copy)]
pub enum NumericSlice<'a> {
    /// `i8` column
    Int8(&'a [i8]),
    /// `i16` column
    Int16(&'a [i16]),
    /// `i32` column
    Int32(&'a [i32]),
    /// `i64` column
    Int64(&'a [i64]),
    /// `f32` column
    Float32(&'a [f32]),
    /// `f64` column
    Float64(&'a [f64]),
}

impl NumericSlice<'_> {
    /// Element type of the view.
    #[must_use]
    pub const fn numeric_type(&self) -> NumericType {
        match self {
            Self::Int8(_) => NumericType::Int8,
            Self::Int16(_) => NumericType::Int16,
            Self::Int32(_) => NumericType::Int32,
            Self::Int64(_) => NumericType::Int64,
            Self::Float32(_) => NumericType::Float32,
            Self::Float64(_) => NumericType::Float64,
        }
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Int8(s) => s.len(),
            Self::Int16(s) => s.len(),
            Self::Int32(s) => s.len(),
            Self::Int64(s) => s.len(),
            Self::Float32(s) => s.len(),
            Self::Float64(s) => s.len(),
        }
    }

    /// Returns true if the view has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single value tagged with its element type.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NumericScalar {
    /// `i8` value
    Int8(i8),
    /// `i16` value
    Int16(i16),
    /// `i32` value
    Int32(i32),
    /// `i64` value
    Int64(i64),
    /// `f32` value
    Float32(f32),
    /// `f64` value
    Float64(f64),
}

impl NumericScalar {
    /// Element type of the value.
    #[must_use]
    pub const fn numeric_type(&self) -> NumericType {
        match self {
            Self::Int8(_) => NumericType::Int8,
            Self::Int16(_) => NumericType::Int16,
            Self::Int32(_) => NumericType::Int32,
            Self::Int64(_) => NumericType::Int64,
            Self::Float32(_) => NumericType::Float32,
            Self::Float64(_) => NumericType::Float64,
        }
    }
}

/// Widened accumulator value for arith-compare operands.
///
/// Integer columns take [`HighPrecision::Int`], floating columns take
/// [`HighPrecision::Float`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum HighPrecision {
    /// Operand for `i8`/`i16`/`i32`/`i64` columns.
    Int(i64),
    /// Operand for `f32`/`f64` columns.
    Float(f64),
}

impl HighPrecision {
    /// Returns true if this operand kind matches the column type.
    #[must_use]
    pub const fn matches(&self, numeric_type: NumericType) -> bool {
        matches!(
            (self, numeric_type.is_float()),
            (Self::Int(_), false) | (Self::Float(_), true)
        )
    }
}

/// Column element type accepted by the engines.
pub trait Element: Copy + PartialOrd + Default + Send + Sync + sealed::Sealed + 'static {
    /// Widened type used for arith-compare operands.
    type HighPrecision: Copy + PartialOrd + Send + Sync;

    /// Tag of this element type.
    const NUMERIC_TYPE: NumericType;

    /// Tagged view of a typed slice.
    fn slice(values: &[Self]) -> NumericSlice<'_>;

    /// Tagged copy of a typed value.
    fn scalar(self) -> NumericScalar;

    /// Widens a value into the high-precision type.
    fn widen(self) -> Self::HighPrecision;

    /// Tagged copy of a high-precision operand.
    fn high_precision(value: Self::HighPrecision) -> HighPrecision;

    /// Typed value, if the tag matches.
    fn from_scalar(value: NumericScalar) -> Option<Self>;

    /// Typed slice, if the tag matches.
    fn from_numeric_slice<'a>(values: NumericSlice<'a>) -> Option<&'a [Self]>;

    /// Typed high-precision operand, if the kind matches.
    fn from_high_precision(value: HighPrecision) -> Option<Self::HighPrecision>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $hp:ty, $hp_variant:ident) => {
        impl Element for $ty {
            type HighPrecision = $hp;

            const NUMERIC_TYPE: NumericType = NumericType::$variant;

            #[inline]
            fn slice(values: &[Self]) -> NumericSlice<'_> {
                NumericSlice::$variant(values)
            }

            #[inline]
            fn scalar(self) -> NumericScalar {
                NumericScalar::$variant(self)
            }

            #[inline]
            fn widen(self) -> Self::HighPrecision {
                <$hp>::from(self)
            }

            #[inline]
            fn high_precision(value: Self::HighPrecision) -> HighPrecision {
                HighPrecision::$hp_variant(value)
            }

            #[inline]
            fn from_scalar(value: NumericScalar) -> Option<Self> {
                match value {
                    NumericScalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn from_numeric_slice<'a>(values: NumericSlice<'a>) -> Option<&'a [Self]> {
                match values {
                    NumericSlice::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn from_high_precision(value: HighPrecision) -> Option<Self::HighPrecision> {
                match value {
                    HighPrecision::$hp_variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i8, Int8, i64, Int);
impl_element!(i16, Int16, i64, Int);
impl_element!(i32, Int32, i64, Int);
impl_element!(i64, Int64, i64, Int);
impl_element!(f32, Float32, f64, Float);
impl_element!(f64, Float64, f64, Float);

/// Packing word accepted by the set-op engine.
///
/// Bit `i` of a buffer lives in word `i / BITS` at position `i % BITS`
/// (least significant bit first).
pub trait BitWord: Copy + Send + Sync + sealed::Sealed + 'static {
    /// Bits per word.
    const BITS: usize;

    /// Tag of this word type.
    const WORD_TYPE: WordType;

    /// Zero-extends to 64 bits.
    fn to_u64(self) -> u64;

    /// Truncates from 64 bits.
    fn from_u64(value: u64) -> Self;

    /// Routes a two-operand op to the backend entry point for this word type.
    #[allow(clippy::too_many_arguments)]
    fn forward_op(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        right: &[Self],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool;

    /// Routes an N-operand op to the backend entry point for this word type.
    #[allow(clippy::too_many_arguments)]
    fn forward_op_multiple(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        rights: &[&[Self]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool;
}

impl BitWord for u8 {
    const BITS: usize = 8;
    const WORD_TYPE: WordType = WordType::U8;

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value as u8
    }

    #[inline]
    fn forward_op(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        right: &[Self],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        backend.forward_op_u8(op, left, right, start_left, start_right, size)
    }

    #[inline]
    fn forward_op_multiple(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        rights: &[&[Self]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        backend.forward_op_multiple_u8(op, left, rights, start_left, start_rights, size)
    }
}

impl BitWord for u64 {
    const BITS: usize = 64;
    const WORD_TYPE: WordType = WordType::U64;

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value
    }

    #[inline]
    fn forward_op(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        right: &[Self],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        backend.forward_op_u64(op, left, right, start_left, start_right, size)
    }

    #[inline]
    fn forward_op_multiple(
        backend: &dyn PredicateBackend,
        op: BitOp,
        left: &mut [Self],
        rights: &[&[Self]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        backend.forward_op_multiple_u64(op, left, rights, start_left, start_rights, size)
    }
}
