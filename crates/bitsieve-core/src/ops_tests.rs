//! Tests for `ops` module

use super::ops::*;

// -------------------------------------------------------------------------
// CompareOp
// -------------------------------------------------------------------------

#[test]
fn test_compare_op_evaluate_integers() {
    // Arrange & Act & Assert
    assert!(CompareOp::Eq.evaluate(3, 3));
    assert!(CompareOp::Ne.evaluate(3, 4));
    assert!(CompareOp::Gt.evaluate(4, 3));
    assert!(CompareOp::Ge.evaluate(3, 3));
    assert!(CompareOp::Lt.evaluate(2, 3));
    assert!(CompareOp::Le.evaluate(3, 3));
    assert!(!CompareOp::Lt.evaluate(3, 3));
}

#[test]
fn test_compare_op_nan_only_ne_is_true() {
    // Arrange
    let nan = f64::NAN;

    // Act & Assert
    for op in CompareOp::ALL {
        let expected = op == CompareOp::Ne;
        assert_eq!(op.evaluate(nan, 1.0), expected, "{op:?} nan vs 1");
        assert_eq!(op.evaluate(1.0, nan), expected, "{op:?} 1 vs nan");
        assert_eq!(op.evaluate(nan, nan), expected, "{op:?} nan vs nan");
    }
}

#[test]
fn test_compare_op_swapped_is_consistent() {
    // Arrange
    let pairs = [(1, 2), (2, 1), (5, 5)];

    // Act & Assert
    for op in CompareOp::ALL {
        for (a, b) in pairs {
            assert_eq!(op.evaluate(a, b), op.swapped().evaluate(b, a), "{op:?} {a} {b}");
        }
    }
}

#[test]
fn test_compare_op_serialization() {
    // Arrange
    let op = CompareOp::Ge;

    // Act
    let json = serde_json::to_string(&op).expect("serialize");
    let back: CompareOp = serde_json::from_str(&json).expect("deserialize");

    // Assert
    assert_eq!(json, "\"ge\"");
    assert_eq!(back, op);
}

// -------------------------------------------------------------------------
// RangeType
// -------------------------------------------------------------------------

#[test]
fn test_range_type_from_bounds_roundtrip() {
    for range in RangeType::ALL {
        // Act
        let rebuilt = RangeType::from_bounds(range.lower_inclusive(), range.upper_inclusive());

        // Assert
        assert_eq!(rebuilt, range);
    }
}

#[test]
fn test_range_type_contains_equal_bounds_only_inclusive() {
    // Arrange
    let (lo, hi, v) = (5, 5, 5);

    // Act & Assert
    assert!(!RangeType::ExcExc.contains(lo, hi, v));
    assert!(!RangeType::ExcInc.contains(lo, hi, v));
    assert!(!RangeType::IncExc.contains(lo, hi, v));
    assert!(RangeType::IncInc.contains(lo, hi, v));
}

#[test]
fn test_range_type_contains_boundaries() {
    // Arrange & Act & Assert
    assert!(RangeType::IncExc.contains(1, 10, 1));
    assert!(!RangeType::IncExc.contains(1, 10, 10));
    assert!(RangeType::ExcInc.contains(1, 10, 10));
    assert!(!RangeType::ExcInc.contains(1, 10, 1));
    assert!(RangeType::ExcExc.contains(1, 10, 5));
}

#[test]
fn test_range_type_ops_match_contains() {
    for range in RangeType::ALL {
        for v in 0..=4 {
            // Arrange
            let (lo, hi) = (1, 3);

            // Act
            let via_ops = range.lower_op().evaluate(lo, v) && range.upper_op().evaluate(v, hi);

            // Assert
            assert_eq!(via_ops, range.contains(lo, hi, v), "{range:?} v={v}");
        }
    }
}

#[test]
fn test_range_type_notation() {
    assert_eq!(RangeType::IncExc.notation(), "[lo, hi)");
    assert_eq!(RangeType::ExcInc.notation(), "(lo, hi]");
}

// -------------------------------------------------------------------------
// ArithOp
// -------------------------------------------------------------------------

#[test]
fn test_arith_op_apply_int() {
    // Arrange & Act & Assert
    assert_eq!(ArithOp::Add.apply_int(120, 10), Some(130));
    assert_eq!(ArithOp::Sub.apply_int(-120, 10), Some(-130));
    assert_eq!(ArithOp::Mul.apply_int(i128::from(i64::MAX), 2), Some(i128::from(i64::MAX) * 2));
    assert_eq!(ArithOp::Div.apply_int(-7, 2), Some(-3));
    assert_eq!(ArithOp::Mod.apply_int(-7, 2), Some(-1));
}

#[test]
fn test_arith_op_apply_int_zero_divisor() {
    assert_eq!(ArithOp::Div.apply_int(7, 0), None);
    assert_eq!(ArithOp::Mod.apply_int(7, 0), None);
}

#[test]
fn test_arith_op_apply_float_ieee() {
    // Arrange & Act
    let div = ArithOp::Div.apply_float(1.0, 0.0);
    let rem = ArithOp::Mod.apply_float(1.0, 0.0);
    let fmod = ArithOp::Mod.apply_float(-7.5, 2.0);

    // Assert
    assert!(div.is_infinite() && div.is_sign_positive());
    assert!(rem.is_nan());
    assert!((fmod - -1.5).abs() < f64::EPSILON);
}

// -------------------------------------------------------------------------
// BitOp
// -------------------------------------------------------------------------

#[test]
fn test_bit_op_apply() {
    // Arrange
    let (l, r) = (0b1100u64, 0b1010u64);

    // Act & Assert
    assert_eq!(BitOp::And.apply(l, r), 0b1000);
    assert_eq!(BitOp::Or.apply(l, r), 0b1110);
    assert_eq!(BitOp::Xor.apply(l, r), 0b0110);
    assert_eq!(BitOp::Sub.apply(l, r), 0b0100);
}

// -------------------------------------------------------------------------
// NumericType / WordType
// -------------------------------------------------------------------------

#[test]
fn test_numeric_type_names_and_float_flag() {
    assert_eq!(NumericType::Int8.name(), "i8");
    assert_eq!(NumericType::Float64.to_string(), "f64");
    let floats: Vec<_> = NumericType::ALL.iter().filter(|t| t.is_float()).collect();
    assert_eq!(floats, vec![&NumericType::Float32, &NumericType::Float64]);
}

#[test]
fn test_word_type_bits() {
    assert_eq!(WordType::U8.bits(), 8);
    assert_eq!(WordType::U64.bits(), 64);
    assert_eq!(WordType::U64.to_string(), "u64");
}
