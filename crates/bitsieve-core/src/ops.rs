//! Operator and type vocabularies shared by every backend.
//!
//! All enums are `Copy` tags: backends match on them once per call and then
//! run a monomorphized loop, so the tag never appears in the hot path.

use serde::{Deserialize, Serialize};

/// Element-wise comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
}

impl CompareOp {
    /// All comparison operators.
    pub const ALL: [Self; 6] = [Self::Eq, Self::Ne, Self::Gt, Self::Ge, Self::Lt, Self::Le];

    /// Evaluates `a op b` with IEEE-754 semantics for floats.
    ///
    /// NaN on either side yields `false` for every operator except [`CompareOp::Ne`].
    #[inline]
    #[must_use]
    pub fn evaluate<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Lt => a < b,
            Self::Le => a <= b,
        }
    }

    /// Returns the operator with swapped operands (`a op b` == `b op' a`).
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
        }
    }

    /// Short symbolic name.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// Inclusivity of the lower and upper bound of a range test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    /// `lower < v < upper`
    ExcExc,
    /// `lower < v <= upper`
    ExcInc,
    /// `lower <= v < upper`
    IncExc,
    /// `lower <= v <= upper`
    IncInc,
}

impl RangeType {
    /// All range variants.
    pub const ALL: [Self; 4] = [Self::ExcExc, Self::ExcInc, Self::IncExc, Self::IncInc];

    /// Builds a range type from bound inclusivity flags.
    #[must_use]
    pub const fn from_bounds(lower_inclusive: bool, upper_inclusive: bool) -> Self {
        match (lower_inclusive, upper_inclusive) {
            (false, false) => Self::ExcExc,
            (false, true) => Self::ExcInc,
            (true, false) => Self::IncExc,
            (true, true) => Self::IncInc,
        }
    }

    /// Whether the lower bound is inclusive.
    #[must_use]
    pub const fn lower_inclusive(self) -> bool {
        matches!(self, Self::IncExc | Self::IncInc)
    }

    /// Whether the upper bound is inclusive.
    #[must_use]
    pub const fn upper_inclusive(self) -> bool {
        matches!(self, Self::ExcInc | Self::IncInc)
    }

    /// Operator applied as `lower op value`.
    #[must_use]
    pub const fn lower_op(self) -> CompareOp {
        if self.lower_inclusive() {
            CompareOp::Le
        } else {
            CompareOp::Lt
        }
    }

    /// Operator applied as `value op upper`.
    #[must_use]
    pub const fn upper_op(self) -> CompareOp {
        if self.upper_inclusive() {
            CompareOp::Le
        } else {
            CompareOp::Lt
        }
    }

    /// Tests `value` against the bounds.
    #[inline]
    #[must_use]
    pub fn contains<T: PartialOrd>(self, lower: T, upper: T, value: T) -> bool {
        let above = if self.lower_inclusive() {
            lower <= value
        } else {
            lower < value
        };
        let below = if self.upper_inclusive() {
            value <= upper
        } else {
            value < upper
        };
        above && below
    }

    /// Interval notation, e.g. `[lo, hi)`.
    #[must_use]
    pub const fn notation(self) -> &'static str {
        match self {
            Self::ExcExc => "(lo, hi)",
            Self::ExcInc => "(lo, hi]",
            Self::IncExc => "[lo, hi)",
            Self::IncInc => "[lo, hi]",
        }
    }
}

/// Arithmetic operator applied before an arith-compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    /// `src + operand`
    Add,
    /// `src - operand`
    Sub,
    /// `src * operand`
    Mul,
    /// `src / operand`
    Div,
    /// `src % operand` (truncated remainder)
    Mod,
}

impl ArithOp {
    /// All arithmetic operators.
    pub const ALL: [Self; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Mod];

    /// Exact integer evaluation in `i128`.
    ///
    /// Returns `None` for a zero divisor.
    #[inline]
    #[must_use]
    pub fn apply_int(self, src: i128, operand: i128) -> Option<i128> {
        match self {
            Self::Add => Some(src + operand),
            Self::Sub => Some(src - operand),
            Self::Mul => Some(src * operand),
            Self::Div => src.checked_div(operand),
            Self::Mod => src.checked_rem(operand),
        }
    }

    /// IEEE-754 floating evaluation; `%` is `fmod`.
    #[inline]
    #[must_use]
    pub fn apply_float(self, src: f64, operand: f64) -> f64 {
        match self {
            Self::Add => src + operand,
            Self::Sub => src - operand,
            Self::Mul => src * operand,
            Self::Div => src / operand,
            Self::Mod => src % operand,
        }
    }

    /// Symbol used in diagnostics.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// Bit-level boolean operation between two packed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOp {
    /// `left & right`
    And,
    /// `left | right`
    Or,
    /// `left ^ right`
    Xor,
    /// `left & !right`
    Sub,
}

impl BitOp {
    /// All bit operations.
    pub const ALL: [Self; 4] = [Self::And, Self::Or, Self::Xor, Self::Sub];

    /// Applies the operation to two 64-bit lanes.
    #[inline]
    #[must_use]
    pub const fn apply(self, left: u64, right: u64) -> u64 {
        match self {
            Self::And => left & right,
            Self::Or => left | right,
            Self::Xor => left ^ right,
            Self::Sub => left & !right,
        }
    }
}

/// Element type of a filtered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericType {
    /// `i8`
    Int8,
    /// `i16`
    Int16,
    /// `i32`
    Int32,
    /// `i64`
    Int64,
    /// `f32`
    Float32,
    /// `f64`
    Float64,
}

impl NumericType {
    /// All numeric types.
    pub const ALL: [Self; 6] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
    ];

    /// Rust type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        }
    }

    /// Whether this is a floating-point type.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl std::fmt::Display for NumericType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Packing unit used by the set-op kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordType {
    /// 8-bit words.
    U8,
    /// 64-bit words.
    U64,
}

impl WordType {
    /// All word types.
    pub const ALL: [Self; 2] = [Self::U8, Self::U64];

    /// Bits per word.
    #[must_use]
    pub const fn bits(self) -> usize {
        match self {
            Self::U8 => 8,
            Self::U64 => 64,
        }
    }
}

impl std::fmt::Display for WordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => f.write_str("u8"),
            Self::U64 => f.write_str("u64"),
        }
    }
}
