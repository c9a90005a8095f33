//! Coverage probing.
//!
//! Calls every entry point of a strategy once per (type, operator)
//! combination on eight-element inputs and records which ones it claims.
//! A probe whose call answered `false` must leave its destination exactly as
//! it was; any write is recorded as a violation.

use std::fmt;

use serde::Serialize;

use crate::backend::{BackendKind, PredicateBackend};
use crate::element::{BitWord, Element};
use crate::ops::{ArithOp, BitOp, CompareOp, RangeType, WordType};

/// Sentinel byte written to destinations before every probe.
const SENTINEL: u8 = 0xAA;

/// Entry-point family of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationFamily {
    /// `compare_column`
    CompareColumn,
    /// `compare_val`
    CompareVal,
    /// `within_range_column`
    RangeColumn,
    /// `within_range_val`
    RangeVal,
    /// `arith_compare`
    ArithCompare,
    /// two-operand set ops
    SetOp,
    /// fused N-operand set ops
    SetOpMultiple,
}

impl OperationFamily {
    /// All families, in report order.
    pub const ALL: [Self; 7] = [
        Self::CompareColumn,
        Self::CompareVal,
        Self::RangeColumn,
        Self::RangeVal,
        Self::ArithCompare,
        Self::SetOp,
        Self::SetOpMultiple,
    ];

    /// Entry-point name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CompareColumn => "compare_column",
            Self::CompareVal => "compare_val",
            Self::RangeColumn => "within_range_column",
            Self::RangeVal => "within_range_val",
            Self::ArithCompare => "arith_compare",
            Self::SetOp => "forward_op",
            Self::SetOpMultiple => "forward_op_multiple",
        }
    }
}

impl fmt::Display for OperationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coverage of one family for one element or word type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    /// Entry-point family.
    pub family: OperationFamily,
    /// Element (`i8`..`f64`) or word (`u8`, `u64`) type name.
    pub subject: &'static str,
    /// Operator combinations the strategy claimed.
    pub covered: usize,
    /// Operator combinations probed.
    pub total: usize,
}

impl CoverageEntry {
    /// Every probed combination is covered.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.covered == self.total
    }
}

/// Coverage of a whole strategy.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    /// Probed strategy.
    pub backend: BackendKind,
    /// One entry per (family, type).
    pub entries: Vec<CoverageEntry>,
    /// Probes that answered `false` but wrote to their destination.
    pub violations: Vec<String>,
}

impl CoverageReport {
    /// Probes every entry point of `backend`.
    #[must_use]
    pub fn probe(backend: &dyn PredicateBackend) -> Self {
        let mut probe = Probe {
            backend,
            entries: Vec::new(),
            violations: Vec::new(),
        };

        probe.numeric::<i8>([0, 1, 2, 3, 4, 5, 6, 7]);
        probe.numeric::<i16>([0, 1, 2, 3, 4, 5, 6, 7]);
        probe.numeric::<i32>([0, 1, 2, 3, 4, 5, 6, 7]);
        probe.numeric::<i64>([0, 1, 2, 3, 4, 5, 6, 7]);
        probe.numeric::<f32>([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        probe.numeric::<f64>([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        probe.words::<u8>();
        probe.words::<u64>();

        Self {
            backend: backend.kind(),
            entries: probe.entries,
            violations: probe.violations,
        }
    }

    /// Entry for a family and type name.
    #[must_use]
    pub fn entry(&self, family: OperationFamily, subject: &str) -> Option<&CoverageEntry> {
        self.entries
            .iter()
            .find(|e| e.family == family && e.subject == subject)
    }

    /// Whether the strategy covers every probed combination.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.entries.iter().all(CoverageEntry::is_full)
    }

    /// Claimed combinations across all families.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.entries.iter().map(|e| e.covered).sum()
    }

    /// Probed combinations across all families.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.total).sum()
    }
}

struct Probe<'a> {
    backend: &'a dyn PredicateBackend,
    entries: Vec<CoverageEntry>,
    violations: Vec<String>,
}

impl Probe<'_> {
    fn record(&mut self, family: OperationFamily, subject: &'static str, results: &[bool]) {
        self.entries.push(CoverageEntry {
            family,
            subject,
            covered: results.iter().filter(|&&c| c).count(),
            total: results.len(),
        });
    }

    /// Runs one comparison-family call against a sentinel-filled byte.
    fn call(
        &mut self,
        family: OperationFamily,
        label: String,
        f: impl FnOnce(&mut [u8]) -> bool,
    ) -> bool {
        let mut bitmask = [SENTINEL; 1];
        let covered = f(&mut bitmask);
        if !covered && bitmask[0] != SENTINEL {
            self.violations.push(format!("{family} {label}"));
        }
        covered
    }

    fn numeric<T: Element>(&mut self, values: [T; 8]) {
        let backend = self.backend;
        let name = T::NUMERIC_TYPE.name();
        let data = T::slice(&values);
        let (lo, hi) = (values[2], values[5]);

        let results: Vec<bool> = CompareOp::ALL
            .iter()
            .map(|&op| {
                self.call(OperationFamily::CompareColumn, format!("{name} {}", op.symbol()), |m| {
                    backend.compare_column(op, m, data, data)
                })
            })
            .collect();
        self.record(OperationFamily::CompareColumn, name, &results);

        let results: Vec<bool> = CompareOp::ALL
            .iter()
            .map(|&op| {
                self.call(OperationFamily::CompareVal, format!("{name} {}", op.symbol()), |m| {
                    backend.compare_val(op, m, data, lo.scalar())
                })
            })
            .collect();
        self.record(OperationFamily::CompareVal, name, &results);

        let lower = [lo; 8];
        let upper = [hi; 8];
        let results: Vec<bool> = RangeType::ALL
            .iter()
            .map(|&range| {
                self.call(OperationFamily::RangeColumn, format!("{name} {}", range.notation()), |m| {
                    backend.within_range_column(range, m, T::slice(&lower), T::slice(&upper), data)
                })
            })
            .collect();
        self.record(OperationFamily::RangeColumn, name, &results);

        let results: Vec<bool> = RangeType::ALL
            .iter()
            .map(|&range| {
                self.call(OperationFamily::RangeVal, format!("{name} {}", range.notation()), |m| {
                    backend.within_range_val(range, m, lo.scalar(), hi.scalar(), data)
                })
            })
            .collect();
        self.record(OperationFamily::RangeVal, name, &results);

        let operand = T::high_precision(values[1].widen());
        let threshold = T::high_precision(values[3].widen());
        let mut results = Vec::with_capacity(ArithOp::ALL.len() * CompareOp::ALL.len());
        for arith in ArithOp::ALL {
            for cmp in CompareOp::ALL {
                let label = format!("{name} {} {}", arith.symbol(), cmp.symbol());
                results.push(self.call(OperationFamily::ArithCompare, label, |m| {
                    backend.arith_compare(arith, cmp, m, data, operand, threshold)
                }));
            }
        }
        self.record(OperationFamily::ArithCompare, name, &results);
    }

    fn words<W: BitWord>(&mut self) {
        let backend = self.backend;
        let name = match W::WORD_TYPE {
            WordType::U8 => "u8",
            WordType::U64 => "u64",
        };
        let sentinel = W::from_u64(u64::from_ne_bytes([SENTINEL; 8]));
        let right = [W::from_u64(0x0F0F_0F0F_0F0F_0F0F); 2];
        let size = W::BITS + 3;

        let mut single = Vec::with_capacity(BitOp::ALL.len());
        for op in BitOp::ALL {
            let mut left = [sentinel; 2];
            let covered = W::forward_op(backend, op, &mut left, &right, 1, 2, size);
            if !covered && left.iter().any(|w| w.to_u64() != sentinel.to_u64()) {
                self.violations.push(format!("{} {name} {op:?}", OperationFamily::SetOp));
            }
            single.push(covered);
        }
        self.record(OperationFamily::SetOp, name, &single);

        let mut multiple = Vec::with_capacity(2);
        for op in [BitOp::And, BitOp::Or] {
            let mut left = [sentinel; 2];
            let rights: [&[W]; 2] = [&right, &right];
            let covered = W::forward_op_multiple(backend, op, &mut left, &rights, 1, &[2, 0], size);
            if !covered && left.iter().any(|w| w.to_u64() != sentinel.to_u64()) {
                self.violations
                    .push(format!("{} {name} {op:?}", OperationFamily::SetOpMultiple));
            }
            multiple.push(covered);
        }
        self.record(OperationFamily::SetOpMultiple, name, &multiple);
    }
}
