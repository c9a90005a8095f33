//! # `bitsieve` Core
//!
//! Bitmask predicate engine for columnar filtering.
//!
//! Given columns of scalar values, `bitsieve` produces packed bitmasks marking
//! the rows that satisfy a predicate, and fuses such bitmasks with bit-level
//! set operations at arbitrary, non-aligned offsets.
//!
//! ## Features
//!
//! - **Compare / range / arith-compare** kernels for `i8`..`i64`, `f32`, `f64`
//! - **Overflow-free arith-compare**: operands in a widened type (`i64` / `f64`)
//! - **Set ops** AND / OR / XOR / SUB over `u8` or `u64` words, any bit offset,
//!   with fused multi-operand AND / OR
//! - **Capability dispatch**: scalar, `wide`, AVX2 and NEON strategies, selected
//!   once per process; partial strategies report missing kernels with `false`
//! - **Column filter** with tail padding, scalar fallback and rayon chunking
//!
//! ## Quick Start
//!
//! ```
//! use bitsieve_core::{dispatcher, ArithOp, CompareOp, Dispatcher};
//!
//! // 120 + 10 >= 130 holds in the widened type even though 130 overflows i8.
//! let src = [120i8, 0, 0, 0, 0, 0, 0, 0];
//! let mut bitmask = [0u8; 1];
//! let d = dispatcher();
//! if !d.op_arith_compare(ArithOp::Add, CompareOp::Ge, &mut bitmask, &src, 10, 130) {
//!     Dispatcher::scalar().op_arith_compare(ArithOp::Add, CompareOp::Ge, &mut bitmask, &src, 10, 130);
//! }
//! assert_eq!(bitmask[0], 0b0000_0001);
//!
//! // Non-aligned AND of 64 bits.
//! let mut left = [u64::MAX; 2];
//! let right = [0u64; 2];
//! assert!(Dispatcher::scalar().op_and(&mut left, &right, 3, 5, 64));
//! assert_eq!(left[0], 0b111);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Numeric casts are pervasive in lane/mask packing.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_arguments)]

pub mod backend;
#[cfg(target_arch = "x86_64")]
pub mod backend_avx2;
#[cfg(all(test, target_arch = "x86_64"))]
mod backend_avx2_tests;
#[cfg(target_arch = "aarch64")]
pub mod backend_neon;
pub mod backend_scalar;
pub mod backend_wide;
pub mod bitmask;
pub mod bitwise;
#[cfg(test)]
mod bitwise_tests;
pub mod capability;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod coverage;
pub mod dispatch;
pub mod element;
#[cfg(test)]
mod element_tests;
pub mod error;
pub mod filter;
pub mod index_info;
pub mod ops;
#[cfg(test)]
mod ops_tests;

pub use backend::{BackendKind, PredicateBackend};
pub use backend_scalar::ScalarBackend;
pub use backend_wide::WideBackend;
pub use bitmask::BitMask;
pub use capability::{available_backends, select_backend, CpuCapabilities};
pub use config::{
    BackendChoice, ConfigError, DispatchConfig, FilterConfig, LoggingConfig, SieveConfig,
};
pub use coverage::{CoverageEntry, CoverageReport, OperationFamily};
pub use dispatch::{
    dispatch_info, dispatcher, init_dispatcher, DispatchInfo, Dispatcher,
};
pub use element::{BitWord, Element, HighPrecision, NumericScalar, NumericSlice};
pub use error::{Error, Result};
pub use filter::{ColumnFilter, Predicate, TypedColumn};
pub use index_info::{CreateIndexInfo, DataType, JsonCastType, NgramParams};
pub use ops::{ArithOp, BitOp, CompareOp, NumericType, RangeType, WordType};
