//! Property tests for the predicate engines, run against every strategy the
//! host can execute.
//!
//! Run with: `cargo test -p bitsieve-core --test properties`

use std::fmt::Debug;

use bitsieve_core::bitwise::get_bit;
use bitsieve_core::{
    available_backends, ArithOp, BackendKind, BitWord, CompareOp, CoverageReport, Dispatcher,
    Element, RangeType,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn backends() -> Vec<Dispatcher> {
    available_backends()
        .into_iter()
        .map(|kind| Dispatcher::new(kind).expect("available backend binds"))
        .collect()
}

/// Column lengths that are positive multiples of 8.
fn column<T: Arbitrary + Debug>() -> impl Strategy<Value = Vec<T>> {
    (1usize..=8).prop_flat_map(|groups| vec(any::<T>(), groups * 8))
}

fn check_compare_val<T: Element + Debug>(data: &[T], value: T) -> Result<(), TestCaseError> {
    for d in backends() {
        for op in CompareOp::ALL {
            let mut bitmask = vec![0u8; data.len() / 8];
            let covered = d.op_compare_val(op, &mut bitmask, data, value);
            if d.kind() == BackendKind::Scalar {
                prop_assert!(covered, "scalar must cover {:?}", op);
            }
            if !covered {
                continue;
            }
            for (i, &x) in data.iter().enumerate() {
                prop_assert_eq!(
                    get_bit(&bitmask, i),
                    op.evaluate(x, value),
                    "{} {:?} row {}: {:?} vs {:?}",
                    d.kind(),
                    op,
                    i,
                    x,
                    value
                );
            }
        }
    }
    Ok(())
}

fn check_equal_bounds<T: Element + Debug>(v: T) -> Result<(), TestCaseError> {
    let values = [v; 8];
    for d in backends() {
        for range in RangeType::ALL {
            let mut bitmask = [0u8; 1];
            if !d.op_within_range_val(range, &mut bitmask, v, v, &values) {
                continue;
            }
            let expected = if range == RangeType::IncInc { 0xFF } else { 0x00 };
            prop_assert_eq!(bitmask[0], expected, "{} {:?} {:?}", d.kind(), range, v);
        }
    }
    Ok(())
}

fn reference_op<W: BitWord>(
    left: &[W],
    right: &[W],
    start_left: usize,
    start_right: usize,
    size: usize,
    op: impl Fn(bool, bool) -> bool,
) -> Vec<bool> {
    (0..left.len() * W::BITS)
        .map(|i| {
            let l = get_bit(left, i);
            if (start_left..start_left + size).contains(&i) {
                op(l, get_bit(right, start_right + i - start_left))
            } else {
                l
            }
        })
        .collect()
}

fn bits<W: BitWord>(words: &[W]) -> Vec<bool> {
    (0..words.len() * W::BITS).map(|i| get_bit(words, i)).collect()
}

fn check_and_multiple<W: BitWord + Debug + PartialEq>(
    left: &[W],
    rights: &[Vec<W>],
    start_left: usize,
    start_rights: &[usize],
    size: usize,
) -> Result<(), TestCaseError> {
    for d in backends() {
        for k in [1usize, 2, 5] {
            let operands: Vec<&[W]> = rights[..k].iter().map(Vec::as_slice).collect();

            let mut fused = left.to_vec();
            if !d.op_and_multiple(&mut fused, &operands, start_left, &start_rights[..k], size) {
                continue;
            }

            let mut sequential = left.to_vec();
            for (right, &start_right) in operands.iter().zip(start_rights) {
                Dispatcher::scalar().op_and(&mut sequential, right, start_left, start_right, size);
            }
            prop_assert_eq!(&fused, &sequential, "{} k={}", d.kind(), k);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // ---------------------------------------------------------------------
    // compare_val matches the scalar reference
    // ---------------------------------------------------------------------

    #[test]
    fn prop_compare_val_i8(data in column::<i8>(), value in any::<i8>()) {
        check_compare_val(&data, value)?;
    }

    #[test]
    fn prop_compare_val_i16(data in column::<i16>(), value in any::<i16>()) {
        check_compare_val(&data, value)?;
    }

    #[test]
    fn prop_compare_val_i32(data in column::<i32>(), pick in any::<prop::sample::Index>()) {
        // Draw the value from the column so equality is exercised.
        let value = data[pick.index(data.len())];
        check_compare_val(&data, value)?;
    }

    #[test]
    fn prop_compare_val_i64(data in column::<i64>(), value in any::<i64>()) {
        check_compare_val(&data, value)?;
    }

    #[test]
    fn prop_compare_val_f32(data in column::<f32>(), pick in any::<prop::sample::Index>()) {
        let value = data[pick.index(data.len())];
        check_compare_val(&data, value)?;
    }

    #[test]
    fn prop_compare_val_f64(data in column::<f64>(), value in any::<f64>()) {
        check_compare_val(&data, value)?;
    }

    // ---------------------------------------------------------------------
    // equal bounds are inside only for [lo, hi]
    // ---------------------------------------------------------------------

    #[test]
    fn prop_equal_bounds_int(v in any::<i32>(), w in any::<i8>()) {
        check_equal_bounds(v)?;
        check_equal_bounds(w)?;
    }

    #[test]
    fn prop_equal_bounds_float(v in -1.0e9f32..1.0e9, w in -1.0e300f64..1.0e300) {
        check_equal_bounds(v)?;
        check_equal_bounds(w)?;
    }

    // ---------------------------------------------------------------------
    // non-aligned set ops match a bit-by-bit reference
    // ---------------------------------------------------------------------

    #[test]
    fn prop_and_non_aligned_u8(
        left in vec(any::<u8>(), 13),
        right in vec(any::<u8>(), 13),
        start_left in 0usize..=36,
        start_right in 0usize..=36,
    ) {
        for d in backends() {
            let mut actual = left.clone();
            if !d.op_and(&mut actual, &right, start_left, start_right, 64) {
                continue;
            }
            let expected = reference_op(&left, &right, start_left, start_right, 64, |a, b| a && b);
            prop_assert_eq!(bits(&actual), expected, "{}", d.kind());
        }
    }

    #[test]
    fn prop_and_non_aligned_u64(left in vec(any::<u64>(), 2), right in vec(any::<u64>(), 2)) {
        // 100 logical bits, start_left = 3, start_right = 5, 64 bits.
        for d in backends() {
            let mut actual = left.clone();
            if !d.op_and(&mut actual, &right, 3, 5, 64) {
                continue;
            }
            let expected = reference_op(&left, &right, 3, 5, 64, |a, b| a && b);
            prop_assert_eq!(bits(&actual), expected, "{}", d.kind());
        }
    }

    #[test]
    fn prop_xor_sub_aligned_u64(
        left in vec(any::<u64>(), 12),
        right in vec(any::<u64>(), 12),
        size in 1usize..=640,
    ) {
        for d in backends() {
            let mut xor = left.clone();
            let mut sub = left.clone();
            let covered = d.op_xor(&mut xor, &right, 64, 0, size)
                && d.op_sub(&mut sub, &right, 64, 0, size);
            if !covered {
                continue;
            }
            prop_assert_eq!(bits(&xor), reference_op(&left, &right, 64, 0, size, |a, b| a ^ b));
            prop_assert_eq!(bits(&sub), reference_op(&left, &right, 64, 0, size, |a, b| a && !b));
        }
    }

    // ---------------------------------------------------------------------
    // fused AND equals sequential AND for k in {1, 2, 5}
    // ---------------------------------------------------------------------

    #[test]
    fn prop_and_multiple_u8(
        left in vec(any::<u8>(), 16),
        rights in vec(vec(any::<u8>(), 16), 5),
        start_left in 0usize..=28,
        start_rights in vec(0usize..=28, 5),
    ) {
        check_and_multiple(&left, &rights, start_left, &start_rights, 100)?;
    }

    #[test]
    fn prop_and_multiple_u64(
        left in vec(any::<u64>(), 8),
        rights in vec(vec(any::<u64>(), 8), 5),
        aligned in any::<bool>(),
    ) {
        let (start_left, start_rights) = if aligned {
            (0, vec![0, 64, 128, 0, 64])
        } else {
            (5, vec![1, 70, 9, 0, 63])
        };
        check_and_multiple(&left, &rights, start_left, &start_rights, 300)?;
    }

    // ---------------------------------------------------------------------
    // OR with itself is identity, SUB with itself clears
    // ---------------------------------------------------------------------

    #[test]
    fn prop_self_or_sub(words in vec(any::<u64>(), 4), start in 0usize..128, size in 0usize..=128) {
        for d in backends() {
            let same = words.clone();

            let mut or = words.clone();
            if d.op_or(&mut or, &same, start, start, size) {
                prop_assert_eq!(&or, &words, "{}", d.kind());
            }

            let mut sub = words.clone();
            if d.op_sub(&mut sub, &same, start, start, size) {
                let expected = reference_op(&words, &same, start, start, size, |_, _| false);
                prop_assert_eq!(bits(&sub), expected, "{}", d.kind());
            }
        }
    }
}

// -------------------------------------------------------------------------
// arith-compare is evaluated in the widened type
// -------------------------------------------------------------------------

#[test]
fn test_arith_compare_int8_overflow_boundary() {
    let src = [120i8; 8];
    for d in backends() {
        let mut bitmask = [0u8; 1];
        if !d.op_arith_compare(ArithOp::Add, CompareOp::Ge, &mut bitmask, &src, 10, 130) {
            assert_ne!(d.kind(), BackendKind::Scalar);
            continue;
        }
        // 120 + 10 wraps to -126 in i8; the widened sum 130 satisfies >= 130.
        assert_eq!(bitmask[0], 0xFF, "{}", d.kind());
    }
}

// -------------------------------------------------------------------------
// uncovered calls leave the destination untouched
// -------------------------------------------------------------------------

#[test]
fn test_every_backend_signals_coverage_cleanly() {
    for d in backends() {
        let report = CoverageReport::probe(d.backend());
        assert!(report.violations.is_empty(), "{}: {:?}", d.kind(), report.violations);
        if d.kind() == BackendKind::Scalar {
            assert!(report.is_total());
        }
    }
}
