//! Self-check: runs random columns through the active backend and the scalar
//! reference and counts differing bits.

use bitsieve_core::{
    ArithOp, BackendKind, BitOp, BitWord, CompareOp, Dispatcher, Element, RangeType,
};
use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of one operation.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub operation: String,
    /// Whether the active backend has a kernel for it.
    pub covered: bool,
    /// Bits that differ from the scalar reference.
    pub mismatches: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub backend: BackendKind,
    pub rows: usize,
    pub seed: u64,
    pub results: Vec<CheckResult>,
}

impl Summary {
    pub fn mismatches(&self) -> usize {
        self.results.iter().map(|r| r.mismatches).sum()
    }

    pub fn covered(&self) -> usize {
        self.results.iter().filter(|r| r.covered).count()
    }
}

fn differing_bits<W: BitWord>(a: &[W], b: &[W]) -> usize {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x.to_u64() ^ y.to_u64()).count_ones() as usize)
        .sum()
}

struct Checker<'a> {
    active: &'a Dispatcher,
    rows: usize,
    results: Vec<CheckResult>,
}

impl Checker<'_> {
    fn predicate(&mut self, operation: String, call: impl Fn(&Dispatcher, &mut [u8]) -> bool) {
        let mut expected = vec![0u8; self.rows / 8];
        call(&Dispatcher::scalar(), &mut expected);

        let mut actual = vec![0u8; self.rows / 8];
        let covered = call(self.active, &mut actual);
        let mismatches = if covered {
            differing_bits(&expected, &actual)
        } else {
            0
        };
        self.results.push(CheckResult {
            operation,
            covered,
            mismatches,
        });
    }

    fn numeric<T: Element>(
        &mut self,
        values: &[T],
        other: &[T],
        (lo, hi): (T, T),
        operand: T::HighPrecision,
        threshold: T::HighPrecision,
    ) {
        let ty = T::NUMERIC_TYPE;
        for op in CompareOp::ALL {
            self.predicate(format!("compare_val<{ty}> {}", op.symbol()), |d, m| {
                d.op_compare_val(op, m, values, lo)
            });
            self.predicate(format!("compare_column<{ty}> {}", op.symbol()), |d, m| {
                d.op_compare_column(op, m, values, other)
            });
        }
        for range in RangeType::ALL {
            self.predicate(format!("within_range_val<{ty}> {}", range.notation()), |d, m| {
                d.op_within_range_val(range, m, lo, hi, values)
            });
        }
        for arith in ArithOp::ALL {
            for cmp in [CompareOp::Eq, CompareOp::Gt, CompareOp::Le] {
                let label = format!("arith_compare<{ty}> {} {}", arith.symbol(), cmp.symbol());
                self.predicate(label, |d, m| {
                    d.op_arith_compare(arith, cmp, m, values, operand, threshold)
                });
            }
        }
    }

    fn words<W: BitWord>(&mut self, rng: &mut StdRng)
    where
        Standard: Distribution<W>,
    {
        let size = self.rows;
        let len = size / W::BITS + 2;
        let mut random = || -> Vec<W> { (0..len).map(|_| rng.gen()).collect() };
        let left = random();
        let rights = [random(), random(), random()];
        let starts = [rng.gen_range(0..W::BITS), rng.gen_range(0..W::BITS), rng.gen_range(0..W::BITS)];
        let start_left = rng.gen_range(0..W::BITS);
        let name = W::WORD_TYPE;

        for op in BitOp::ALL {
            self.set_op(format!("forward_op<{name}> {op:?}"), &left, |d, dst| {
                d.op_forward(op, dst, &rights[0], start_left, starts[0], size)
            });
        }
        for op in [BitOp::And, BitOp::Or] {
            let operands: Vec<&[W]> = rights.iter().map(Vec::as_slice).collect();
            self.set_op(format!("forward_op_multiple<{name}> {op:?}"), &left, |d, dst| {
                d.op_forward_multiple(op, dst, &operands, start_left, &starts, size)
            });
        }
    }

    fn set_op<W: BitWord>(
        &mut self,
        operation: String,
        left: &[W],
        call: impl Fn(&Dispatcher, &mut [W]) -> bool,
    ) {
        let mut expected = left.to_vec();
        call(&Dispatcher::scalar(), &mut expected);

        let mut actual = left.to_vec();
        let covered = call(self.active, &mut actual);
        let mismatches = if covered {
            differing_bits(&expected, &actual)
        } else {
            0
        };
        self.results.push(CheckResult {
            operation,
            covered,
            mismatches,
        });
    }
}

/// Runs every operation family on `rows` random rows (rounded up to a
/// multiple of 8).
pub fn run(active: &Dispatcher, rows: usize, seed: u64) -> Summary {
    let rows = rows.div_ceil(8).max(1) * 8;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut checker = Checker {
        active,
        rows,
        results: Vec::new(),
    };

    macro_rules! ints {
        ($ty:ty) => {{
            let values: Vec<$ty> = (0..rows).map(|_| rng.gen()).collect();
            let other: Vec<$ty> = (0..rows).map(|_| rng.gen()).collect();
            let (a, b) = (values[0], values[rows / 2]);
            let bounds = (a.min(b), a.max(b));
            checker.numeric(&values, &other, bounds, rng.gen_range(-3..=3), i64::from(bounds.0));
        }};
    }
    ints!(i8);
    ints!(i16);
    ints!(i32);
    ints!(i64);

    macro_rules! floats {
        ($ty:ty) => {{
            let values: Vec<$ty> = (0..rows).map(|_| rng.gen_range(-100.0..100.0)).collect();
            let other: Vec<$ty> = (0..rows).map(|_| rng.gen_range(-100.0..100.0)).collect();
            checker.numeric(&values, &other, (-25.0, 25.0), 1.5, 10.0);
        }};
    }
    floats!(f32);
    floats!(f64);

    checker.words::<u8>(&mut rng);
    checker.words::<u64>(&mut rng);

    tracing::info!(
        backend = %active.kind(),
        rows,
        seed,
        operations = checker.results.len(),
        "self-check finished"
    );

    Summary {
        backend: active.kind(),
        rows,
        seed,
        results: checker.results,
    }
}
