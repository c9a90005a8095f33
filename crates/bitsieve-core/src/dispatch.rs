//! Dispatch facade: the typed entry points callers use.
//!
//! A [`Dispatcher`] is bound to exactly one strategy and forwards every call
//! to it unchanged, including the coverage flag. It never falls back on its
//! own; [`crate::filter::ColumnFilter`] is the layer that retries against the
//! scalar strategy.
//!
//! # Usage
//!
//! ```
//! use bitsieve_core::{dispatcher, CompareOp};
//!
//! let data = [1i64, 5, 9, 2, 7, 3, 8, 4];
//! let mut bitmask = [0u8; 1];
//! if !dispatcher().op_compare_val(CompareOp::Gt, &mut bitmask, &data, 4) {
//!     // active strategy has no i64 kernel: retry on the scalar strategy
//!     bitsieve_core::Dispatcher::scalar().op_compare_val(CompareOp::Gt, &mut bitmask, &data, 4);
//! }
//! assert_eq!(bitmask[0], 0b0101_0110);
//! ```

use std::fmt;
use std::sync::OnceLock;

use crate::backend::{BackendKind, PredicateBackend};
use crate::backend_scalar::SCALAR;
use crate::backend_wide::WIDE;
use crate::capability::{available_backends, select_backend, CpuCapabilities};
use crate::config::DispatchConfig;
use crate::element::{BitWord, Element};
use crate::error::{Error, Result};
use crate::ops::{ArithOp, BitOp, CompareOp, RangeType};

/// Handle to one bound strategy.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    backend: &'static dyn PredicateBackend,
}

impl Dispatcher {
    /// Binds the given strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendUnavailable`] if the current CPU cannot run it.
    pub fn new(kind: BackendKind) -> Result<Self> {
        let backend: &'static dyn PredicateBackend = match kind {
            BackendKind::Scalar => &SCALAR,
            BackendKind::Wide => &WIDE,
            BackendKind::Avx2 => avx2_backend().ok_or_else(|| unavailable(kind))?,
            BackendKind::Neon => neon_backend().ok_or_else(|| unavailable(kind))?,
        };
        Ok(Self { backend })
    }

    /// The total reference strategy.
    #[must_use]
    pub fn scalar() -> Self {
        Self { backend: &SCALAR }
    }

    /// Binds the strategy selected for an injected capability record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendUnavailable`] if the record selects a strategy
    /// the real CPU cannot execute.
    pub fn from_capabilities(caps: &CpuCapabilities) -> Result<Self> {
        Self::new(select_backend(caps))
    }

    /// Binds the strategy selected for the detected CPU.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_capabilities(&CpuCapabilities::detect()).unwrap_or_else(|_| Self::scalar())
    }

    /// Binds the strategy named by configuration (`auto` detects).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendUnavailable`] if a forced strategy cannot run
    /// on this host.
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        match config.backend.forced() {
            None => Ok(Self::detect()),
            Some(kind) => Self::new(kind).inspect_err(|_| {
                tracing::warn!(backend = %kind, "configured backend is not available on this host");
            }),
        }
    }

    /// Tag of the bound strategy.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The bound strategy.
    #[must_use]
    pub fn backend(&self) -> &'static dyn PredicateBackend {
        self.backend
    }

    // -------------------------------------------------------------------------
    // Column compare
    // -------------------------------------------------------------------------

    /// Bit `i` = `left[i] op right[i]`; `left.len()` must be a multiple of 8.
    ///
    /// Mixed element types are accepted by the signature and reported as
    /// unimplemented by every strategy.
    #[inline]
    pub fn op_compare_column<T: Element, U: Element>(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        left: &[T],
        right: &[U],
    ) -> bool {
        self.backend
            .compare_column(op, bitmask, T::slice(left), U::slice(right))
    }

    /// Bit `i` = `data[i] op value`; `data.len()` must be a multiple of 8.
    #[inline]
    pub fn op_compare_val<T: Element>(
        &self,
        op: CompareOp,
        bitmask: &mut [u8],
        data: &[T],
        value: T,
    ) -> bool {
        self.backend
            .compare_val(op, bitmask, T::slice(data), value.scalar())
    }

    // -------------------------------------------------------------------------
    // Range
    // -------------------------------------------------------------------------

    /// Bit `i` = `values[i]` inside `lower[i]..upper[i]` per `range`.
    #[inline]
    pub fn op_within_range_column<T: Element>(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: &[T],
        upper: &[T],
        values: &[T],
    ) -> bool {
        self.backend.within_range_column(
            range,
            bitmask,
            T::slice(lower),
            T::slice(upper),
            T::slice(values),
        )
    }

    /// Bit `i` = `values[i]` inside `lower..upper` per `range`.
    #[inline]
    pub fn op_within_range_val<T: Element>(
        &self,
        range: RangeType,
        bitmask: &mut [u8],
        lower: T,
        upper: T,
        values: &[T],
    ) -> bool {
        self.backend
            .within_range_val(range, bitmask, lower.scalar(), upper.scalar(), T::slice(values))
    }

    // -------------------------------------------------------------------------
    // Arithmetic compare
    // -------------------------------------------------------------------------

    /// Bit `i` = `(widen(src[i]) arith right_operand) cmp value`.
    ///
    /// Operands are taken in the widened type of `T`, so an `i8` column near
    /// its maximum does not wrap before the comparison.
    #[inline]
    pub fn op_arith_compare<T: Element>(
        &self,
        arith: ArithOp,
        cmp: CompareOp,
        bitmask: &mut [u8],
        src: &[T],
        right_operand: T::HighPrecision,
        value: T::HighPrecision,
    ) -> bool {
        self.backend.arith_compare(
            arith,
            cmp,
            bitmask,
            T::slice(src),
            T::high_precision(right_operand),
            T::high_precision(value),
        )
    }

    // -------------------------------------------------------------------------
    // Set operations
    // -------------------------------------------------------------------------

    /// Generic two-operand form behind `op_and` / `op_or` / `op_xor` / `op_sub`.
    #[inline]
    pub fn op_forward<W: BitWord>(
        &self,
        op: BitOp,
        left: &mut [W],
        right: &[W],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        W::forward_op(self.backend, op, left, right, start_left, start_right, size)
    }

    /// `left[start_left..][..size] &= right[start_right..][..size]`.
    #[inline]
    pub fn op_and<W: BitWord>(
        &self,
        left: &mut [W],
        right: &[W],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        self.op_forward(BitOp::And, left, right, start_left, start_right, size)
    }

    /// `left[start_left..][..size] |= right[start_right..][..size]`.
    #[inline]
    pub fn op_or<W: BitWord>(
        &self,
        left: &mut [W],
        right: &[W],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        self.op_forward(BitOp::Or, left, right, start_left, start_right, size)
    }

    /// `left[start_left..][..size] ^= right[start_right..][..size]`.
    #[inline]
    pub fn op_xor<W: BitWord>(
        &self,
        left: &mut [W],
        right: &[W],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        self.op_forward(BitOp::Xor, left, right, start_left, start_right, size)
    }

    /// `left[start_left..][..size] &= !right[start_right..][..size]`.
    #[inline]
    pub fn op_sub<W: BitWord>(
        &self,
        left: &mut [W],
        right: &[W],
        start_left: usize,
        start_right: usize,
        size: usize,
    ) -> bool {
        self.op_forward(BitOp::Sub, left, right, start_left, start_right, size)
    }

    /// Generic fused form behind `op_and_multiple` / `op_or_multiple`.
    #[inline]
    pub fn op_forward_multiple<W: BitWord>(
        &self,
        op: BitOp,
        left: &mut [W],
        rights: &[&[W]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        W::forward_op_multiple(self.backend, op, left, rights, start_left, start_rights, size)
    }

    /// ANDs every right operand into `left`, one pass over memory.
    #[inline]
    pub fn op_and_multiple<W: BitWord>(
        &self,
        left: &mut [W],
        rights: &[&[W]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        self.op_forward_multiple(BitOp::And, left, rights, start_left, start_rights, size)
    }

    /// ORs every right operand into `left`, one pass over memory.
    #[inline]
    pub fn op_or_multiple<W: BitWord>(
        &self,
        left: &mut [W],
        rights: &[&[W]],
        start_left: usize,
        start_rights: &[usize],
        size: usize,
    ) -> bool {
        self.op_forward_multiple(BitOp::Or, left, rights, start_left, start_rights, size)
    }
}

fn unavailable(kind: BackendKind) -> Error {
    Error::BackendUnavailable(kind.as_str().to_string())
}

fn avx2_backend() -> Option<&'static dyn PredicateBackend> {
    #[cfg(target_arch = "x86_64")]
    {
        crate::backend_avx2::Avx2Backend::detect().map(|b| b as &'static dyn PredicateBackend)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        None
    }
}

fn neon_backend() -> Option<&'static dyn PredicateBackend> {
    #[cfg(target_arch = "aarch64")]
    {
        crate::backend_neon::NeonBackend::detect().map(|b| b as &'static dyn PredicateBackend)
    }
    #[cfg(not(target_arch = "aarch64"))]
    {
        None
    }
}

// =============================================================================
// Process-wide binding
// =============================================================================

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

fn log_bind(dispatcher: &Dispatcher) {
    tracing::info!(
        backend = %dispatcher.kind(),
        capabilities = ?CpuCapabilities::detect().feature_names(),
        "predicate dispatch bound"
    );
}

/// Process-wide dispatcher, bound to the detected strategy on first use.
pub fn dispatcher() -> &'static Dispatcher {
    DISPATCHER.get_or_init(|| {
        let dispatcher = Dispatcher::detect();
        log_bind(&dispatcher);
        dispatcher
    })
}

/// Binds the process-wide dispatcher from configuration.
///
/// Calling it again with a configuration that resolves to the bound strategy
/// is a no-op.
///
/// # Errors
///
/// - [`Error::BackendUnavailable`] if a forced strategy cannot run here.
/// - [`Error::AlreadyInitialized`] if a different strategy is already bound.
pub fn init_dispatcher(config: &DispatchConfig) -> Result<&'static Dispatcher> {
    let requested = Dispatcher::from_config(config)?;
    let bound = DISPATCHER.get_or_init(|| {
        log_bind(&requested);
        requested
    });
    if bound.kind() == requested.kind() {
        Ok(bound)
    } else {
        Err(Error::AlreadyInitialized {
            bound: bound.kind().as_str().to_string(),
            requested: requested.kind().as_str().to_string(),
        })
    }
}

/// Snapshot of the dispatch decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchInfo {
    /// Strategy bound to the process-wide dispatcher.
    pub backend: BackendKind,
    /// Detected CPU capabilities.
    pub capabilities: CpuCapabilities,
    /// Strategies the CPU can execute.
    pub available_backends: Vec<BackendKind>,
}

impl fmt::Display for DispatchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicate Dispatch Info:")?;
        writeln!(f, "  Backend: {}", self.backend)?;
        writeln!(f, "  Capabilities: {:?}", self.capabilities.feature_names())?;
        write!(f, "  Available backends: {:?}", self.available_backends)
    }
}

/// Returns information about the process-wide dispatch decision.
#[must_use]
pub fn dispatch_info() -> DispatchInfo {
    DispatchInfo {
        backend: dispatcher().kind(),
        capabilities: CpuCapabilities::detect(),
        available_backends: available_backends(),
    }
}
