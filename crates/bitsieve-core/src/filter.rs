//! Column-level filtering on top of the dispatch facade.
//!
//! The engine entry points take element counts that are multiples of 8 and
//! report coverage instead of failing. [`ColumnFilter`] is the layer that
//! makes them usable on arbitrary columns:
//!
//! - the aligned prefix is evaluated in place, the tail is padded to eight
//!   elements and its padding bits are cleared afterwards;
//! - a `false` from the active strategy is retried on the scalar strategy
//!   (unless `fallback_to_scalar` is off);
//! - large columns can be split into byte-aligned chunks evaluated on rayon.
//!
//! # Example
//!
//! ```
//! use bitsieve_core::{ColumnFilter, CompareOp, NumericScalar, Predicate, TypedColumn};
//!
//! let filter = ColumnFilter::default();
//! let column = TypedColumn::from(vec![3i32, 9, 4, 12, 7]);
//! let predicate = Predicate::Compare { op: CompareOp::Ge, value: NumericScalar::Int32(7) };
//!
//! let mask = filter.evaluate(&column, &predicate).unwrap();
//! assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![1, 3, 4]);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::bitmask::BitMask;
use crate::bitwise::low_mask;
use crate::config::{FilterConfig, SieveConfig};
use crate::dispatch::{dispatcher, Dispatcher};
use crate::element::{Element, HighPrecision, NumericScalar, NumericSlice};
use crate::error::{Error, Result};
use crate::ops::{ArithOp, BitOp, CompareOp, NumericType, RangeType};

/// Owned column of one numeric type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum TypedColumn {
    /// `i8` column
    Int8(Vec<i8>),
    /// `i16` column
    Int16(Vec<i16>),
    /// `i32` column
    Int32(Vec<i32>),
    /// `i64` column
    Int64(Vec<i64>),
    /// `f32` column
    Float32(Vec<f32>),
    /// `f64` column
    Float64(Vec<f64>),
}

macro_rules! with_column {
    ($column:expr, |$values:ident| $body:expr) => {
        match $column {
            TypedColumn::Int8($values) => $body,
            TypedColumn::Int16($values) => $body,
            TypedColumn::Int32($values) => $body,
            TypedColumn::Int64($values) => $body,
            TypedColumn::Float32($values) => $body,
            TypedColumn::Float64($values) => $body,
        }
    };
}

impl TypedColumn {
    /// Element type of the column.
    #[must_use]
    pub fn numeric_type(&self) -> NumericType {
        self.as_slice().numeric_type()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        with_column!(self, |values| values.len())
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrowed, tagged view.
    #[must_use]
    pub fn as_slice(&self) -> NumericSlice<'_> {
        with_column!(self, |values| Element::slice(values.as_slice()))
    }
}

macro_rules! impl_column_from {
    ($ty:ty, $variant:ident) => {
        impl From<Vec<$ty>> for TypedColumn {
            fn from(values: Vec<$ty>) -> Self {
                Self::$variant(values)
            }
        }
    };
}

impl_column_from!(i8, Int8);
impl_column_from!(i16, Int16);
impl_column_from!(i32, Int32);
impl_column_from!(i64, Int64);
impl_column_from!(f32, Float32);
impl_column_from!(f64, Float64);

/// Row predicate evaluated against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `row op value`
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand value.
        value: NumericScalar,
    },
    /// `row op right[row]`
    CompareColumn {
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand column.
        right: TypedColumn,
    },
    /// `lower .. upper` contains `row`
    Range {
        /// Bound inclusivity.
        range: RangeType,
        /// Lower bound.
        lower: NumericScalar,
        /// Upper bound.
        upper: NumericScalar,
    },
    /// `lower[row] .. upper[row]` contains `row`
    RangeColumn {
        /// Bound inclusivity.
        range: RangeType,
        /// Lower bounds.
        lower: TypedColumn,
        /// Upper bounds.
        upper: TypedColumn,
    },
    /// `(row arith right_operand) cmp value`, evaluated in the widened type
    ArithCompare {
        /// Arithmetic operator.
        arith: ArithOp,
        /// Comparison operator.
        cmp: CompareOp,
        /// Arithmetic operand.
        right_operand: HighPrecision,
        /// Comparison threshold.
        value: HighPrecision,
    },
}

// =============================================================================
// Typed operands
// =============================================================================

/// A predicate resolved against a column of `T`.
#[derive(Clone, Copy)]
enum Operands<'a, T: Element> {
    Compare {
        op: CompareOp,
        value: T,
    },
    CompareColumn {
        op: CompareOp,
        right: &'a [T],
    },
    Range {
        range: RangeType,
        lower: T,
        upper: T,
    },
    RangeColumn {
        range: RangeType,
        lower: &'a [T],
        upper: &'a [T],
    },
    ArithCompare {
        arith: ArithOp,
        cmp: CompareOp,
        right_operand: T::HighPrecision,
        value: T::HighPrecision,
    },
}

fn type_mismatch(expected: NumericType, actual: NumericType) -> Error {
    Error::TypeMismatch {
        expected: expected.name().to_string(),
        actual: actual.name().to_string(),
    }
}

fn scalar_of<T: Element>(value: NumericScalar) -> Result<T> {
    T::from_scalar(value).ok_or_else(|| type_mismatch(T::NUMERIC_TYPE, value.numeric_type()))
}

fn column_of<T: Element>(column: &TypedColumn, rows: usize) -> Result<&[T]> {
    let values = T::from_numeric_slice(column.as_slice())
        .ok_or_else(|| type_mismatch(T::NUMERIC_TYPE, column.numeric_type()))?;
    if values.len() != rows {
        return Err(Error::LengthMismatch {
            expected: rows,
            actual: values.len(),
        });
    }
    Ok(values)
}

fn high_precision_of<T: Element>(value: HighPrecision) -> Result<T::HighPrecision> {
    T::from_high_precision(value).ok_or_else(|| Error::TypeMismatch {
        expected: format!("high precision operand for {}", T::NUMERIC_TYPE),
        actual: format!("{value:?}"),
    })
}

impl<'a, T: Element> Operands<'a, T> {
    fn resolve(predicate: &'a Predicate, rows: usize) -> Result<Self> {
        Ok(match predicate {
            Predicate::Compare { op, value } => Self::Compare {
                op: *op,
                value: scalar_of(*value)?,
            },
            Predicate::CompareColumn { op, right } => Self::CompareColumn {
                op: *op,
                right: column_of(right, rows)?,
            },
            Predicate::Range {
                range,
                lower,
                upper,
            } => Self::Range {
                range: *range,
                lower: scalar_of(*lower)?,
                upper: scalar_of(*upper)?,
            },
            Predicate::RangeColumn {
                range,
                lower,
                upper,
            } => Self::RangeColumn {
                range: *range,
                lower: column_of(lower, rows)?,
                upper: column_of(upper, rows)?,
            },
            Predicate::ArithCompare {
                arith,
                cmp,
                right_operand,
                value,
            } => Self::ArithCompare {
                arith: *arith,
                cmp: *cmp,
                right_operand: high_precision_of::<T>(*right_operand)?,
                value: high_precision_of::<T>(*value)?,
            },
        })
    }

    /// Restricts column operands to rows `start..end`.
    fn rows(self, start: usize, end: usize) -> Self {
        match self {
            Self::CompareColumn { op, right } => Self::CompareColumn {
                op,
                right: &right[start..end],
            },
            Self::RangeColumn {
                range,
                lower,
                upper,
            } => Self::RangeColumn {
                range,
                lower: &lower[start..end],
                upper: &upper[start..end],
            },
            other => other,
        }
    }

    fn apply(self, dispatcher: &Dispatcher, bitmask: &mut [u8], values: &[T]) -> bool {
        match self {
            Self::Compare { op, value } => dispatcher.op_compare_val(op, bitmask, values, value),
            Self::CompareColumn { op, right } => {
                dispatcher.op_compare_column(op, bitmask, values, right)
            }
            Self::Range {
                range,
                lower,
                upper,
            } => dispatcher.op_within_range_val(range, bitmask, lower, upper, values),
            Self::RangeColumn {
                range,
                lower,
                upper,
            } => dispatcher.op_within_range_column(range, bitmask, lower, upper, values),
            Self::ArithCompare {
                arith,
                cmp,
                right_operand,
                value,
            } => dispatcher.op_arith_compare(arith, cmp, bitmask, values, right_operand, value),
        }
    }

    fn describe(self) -> String {
        let ty = T::NUMERIC_TYPE;
        match self {
            Self::Compare { op, .. } => format!("compare_val<{ty}> {}", op.symbol()),
            Self::CompareColumn { op, .. } => format!("compare_column<{ty}> {}", op.symbol()),
            Self::Range { range, .. } => format!("within_range_val<{ty}> {}", range.notation()),
            Self::RangeColumn { range, .. } => {
                format!("within_range_column<{ty}> {}", range.notation())
            }
            Self::ArithCompare { arith, cmp, .. } => {
                format!("arith_compare<{ty}> {} {}", arith.symbol(), cmp.symbol())
            }
        }
    }
}

/// Eight-element scratch copies of a partial trailing group.
struct Tail<T> {
    values: [T; 8],
    right: [T; 8],
    lower: [T; 8],
    upper: [T; 8],
}

fn pad<T: Element>(src: &[T]) -> [T; 8] {
    let mut out = [T::default(); 8];
    out[..src.len()].copy_from_slice(src);
    out
}

impl<T: Element> Tail<T> {
    fn new(values: &[T], operands: Operands<'_, T>) -> Self {
        let mut tail = Self {
            values: pad(values),
            right: [T::default(); 8],
            lower: [T::default(); 8],
            upper: [T::default(); 8],
        };
        match operands {
            Operands::CompareColumn { right, .. } => tail.right = pad(right),
            Operands::RangeColumn { lower, upper, .. } => {
                tail.lower = pad(lower);
                tail.upper = pad(upper);
            }
            _ => {}
        }
        tail
    }

    fn operands(&self, operands: Operands<'_, T>) -> Operands<'_, T> {
        match operands {
            Operands::CompareColumn { op, .. } => Operands::CompareColumn {
                op,
                right: &self.right,
            },
            Operands::RangeColumn { range, .. } => Operands::RangeColumn {
                range,
                lower: &self.lower,
                upper: &self.upper,
            },
            Operands::Compare { op, value } => Operands::Compare { op, value },
            Operands::Range {
                range,
                lower,
                upper,
            } => Operands::Range {
                range,
                lower,
                upper,
            },
            Operands::ArithCompare {
                arith,
                cmp,
                right_operand,
                value,
            } => Operands::ArithCompare {
                arith,
                cmp,
                right_operand,
                value,
            },
        }
    }
}

// =============================================================================
// ColumnFilter
// =============================================================================

/// Evaluates predicates over whole columns.
#[derive(Debug, Clone)]
pub struct ColumnFilter {
    dispatcher: Dispatcher,
    config: FilterConfig,
}

impl Default for ColumnFilter {
    /// Process-wide dispatcher with default filter settings.
    fn default() -> Self {
        Self::new(*dispatcher(), FilterConfig::default())
    }
}

impl ColumnFilter {
    /// Filter bound to a specific dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: FilterConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Filter built from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names a backend
    /// the host cannot run.
    pub fn from_config(config: &SieveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Dispatcher::from_config(&config.dispatch)?,
            config.filter.clone(),
        ))
    }

    /// Dispatcher used for the first attempt.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Active filter settings.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Evaluates `predicate` for every row of `column`.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if an operand type differs from the column's.
    /// - [`Error::LengthMismatch`] if a column operand has a different length.
    /// - [`Error::Unimplemented`] if no strategy handled the operation.
    pub fn evaluate(&self, column: &TypedColumn, predicate: &Predicate) -> Result<BitMask> {
        with_column!(column, |values| self.evaluate_typed(values.as_slice(), predicate, false))
    }

    /// Like [`ColumnFilter::evaluate`], splitting columns of at least
    /// `parallel_threshold_rows` rows into `chunk_rows` chunks on rayon.
    ///
    /// Without the `parallel` feature this is sequential.
    ///
    /// # Errors
    ///
    /// Same as [`ColumnFilter::evaluate`].
    pub fn evaluate_parallel(&self, column: &TypedColumn, predicate: &Predicate) -> Result<BitMask> {
        with_column!(column, |values| self.evaluate_typed(values.as_slice(), predicate, true))
    }

    fn evaluate_typed<T: Element>(
        &self,
        values: &[T],
        predicate: &Predicate,
        parallel: bool,
    ) -> Result<BitMask> {
        let operands = Operands::<T>::resolve(predicate, values.len())?;
        let mut mask = BitMask::zeros(values.len());

        let chunk_rows = self.config.chunk_rows;
        let split = parallel
            && cfg!(feature = "parallel")
            && chunk_rows > 0
            && chunk_rows % 8 == 0
            && values.len() >= self.config.parallel_threshold_rows
            && values.len() > chunk_rows;

        if split {
            self.evaluate_chunks(values, operands, mask.as_bytes_mut(), chunk_rows)?;
        } else {
            self.evaluate_rows(values, operands, mask.as_bytes_mut())?;
        }
        Ok(mask)
    }

    #[cfg(feature = "parallel")]
    fn evaluate_chunks<T: Element>(
        &self,
        values: &[T],
        operands: Operands<'_, T>,
        bitmask: &mut [u8],
        chunk_rows: usize,
    ) -> Result<()> {
        bitmask
            .par_chunks_mut(chunk_rows / 8)
            .enumerate()
            .try_for_each(|(i, bytes)| {
                let start = i * chunk_rows;
                let end = (start + chunk_rows).min(values.len());
                self.evaluate_rows(&values[start..end], operands.rows(start, end), bytes)
            })
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_chunks<T: Element>(
        &self,
        values: &[T],
        operands: Operands<'_, T>,
        bitmask: &mut [u8],
        _chunk_rows: usize,
    ) -> Result<()> {
        self.evaluate_rows(values, operands, bitmask)
    }

    /// Evaluates `values` into `bitmask` (`values.len().div_ceil(8)` bytes).
    fn evaluate_rows<T: Element>(
        &self,
        values: &[T],
        operands: Operands<'_, T>,
        bitmask: &mut [u8],
    ) -> Result<()> {
        let aligned = values.len() / 8 * 8;
        if aligned > 0 {
            self.run(
                operands.rows(0, aligned),
                &mut bitmask[..aligned / 8],
                &values[..aligned],
            )?;
        }

        let remaining = values.len() - aligned;
        if remaining > 0 {
            let tail_operands = operands.rows(aligned, values.len());
            let tail = Tail::new(&values[aligned..], tail_operands);
            let mut byte = [0u8; 1];
            self.run(tail.operands(tail_operands), &mut byte, &tail.values)?;
            bitmask[aligned / 8] = byte[0] & low_mask(remaining) as u8;
        }
        Ok(())
    }

    /// One engine call with scalar fallback.
    fn run<T: Element>(
        &self,
        operands: Operands<'_, T>,
        bitmask: &mut [u8],
        values: &[T],
    ) -> Result<()> {
        if operands.apply(&self.dispatcher, bitmask, values) {
            return Ok(());
        }

        let backend = self.dispatcher.kind();
        if self.config.fallback_to_scalar && backend != BackendKind::Scalar {
            tracing::debug!(
                backend = %backend,
                operation = %operands.describe(),
                rows = values.len(),
                "no kernel on active backend, falling back to scalar"
            );
            if operands.apply(&Dispatcher::scalar(), bitmask, values) {
                return Ok(());
            }
        }

        Err(Error::Unimplemented {
            backend: backend.as_str().to_string(),
            operation: operands.describe(),
        })
    }

    /// Fuses masks of equal length into one.
    ///
    /// `And` / `Or` use the fused multi-operand kernels; `Xor` / `Sub` apply
    /// each operand in order.
    ///
    /// # Errors
    ///
    /// - [`Error::LengthMismatch`] if mask lengths differ.
    /// - [`Error::Unimplemented`] if no strategy handled the operation.
    pub fn combine(&self, op: BitOp, first: &BitMask, rest: &[&BitMask]) -> Result<BitMask> {
        if let Some(bad) = rest.iter().find(|m| m.len() != first.len()) {
            return Err(Error::LengthMismatch {
                expected: first.len(),
                actual: bad.len(),
            });
        }

        let mut out = first.clone();
        let size = first.len();
        let rights: Vec<&[u8]> = rest.iter().map(|m| m.as_bytes()).collect();

        match op {
            BitOp::And | BitOp::Or => {
                let starts = vec![0usize; rights.len()];
                self.run_set_op(op, || format!("forward_op_multiple<u8> {op:?}"), |d| {
                    d.op_forward_multiple(op, out.as_bytes_mut(), &rights, 0, &starts, size)
                })?;
            }
            BitOp::Xor | BitOp::Sub => {
                for right in rights.iter().copied() {
                    self.run_set_op(op, || format!("forward_op<u8> {op:?}"), |d| {
                        d.op_forward(op, out.as_bytes_mut(), right, 0, 0, size)
                    })?;
                }
            }
        }
        Ok(out)
    }

    fn run_set_op(
        &self,
        op: BitOp,
        describe: impl Fn() -> String,
        mut call: impl FnMut(&Dispatcher) -> bool,
    ) -> Result<()> {
        if call(&self.dispatcher) {
            return Ok(());
        }

        let backend = self.dispatcher.kind();
        if self.config.fallback_to_scalar && backend != BackendKind::Scalar {
            tracing::debug!(
                backend = %backend,
                operation = %describe(),
                ?op,
                "no set-op kernel on active backend, falling back to scalar"
            );
            if call(&Dispatcher::scalar()) {
                return Ok(());
            }
        }

        Err(Error::Unimplemented {
            backend: backend.as_str().to_string(),
            operation: describe(),
        })
    }
}
