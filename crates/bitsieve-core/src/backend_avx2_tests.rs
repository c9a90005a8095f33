//! Tests for `backend_avx2` module

use super::backend::{BackendKind, PredicateBackend};
use super::backend_avx2::*;
use super::backend_scalar::SCALAR;
use super::element::{HighPrecision, NumericScalar, NumericSlice};
use super::ops::{ArithOp, CompareOp, RangeType};

fn f32_data() -> Vec<f32> {
    (0..32)
        .map(|i| if i % 11 == 3 { f32::NAN } else { (i % 7) as f32 - 3.0 })
        .collect()
}

#[test]
fn test_detect_matches_host() {
    assert_eq!(
        Avx2Backend::detect().is_some(),
        BackendKind::Avx2.is_supported_on_host()
    );
}

#[test]
fn test_compare_matches_scalar() {
    let Some(avx2) = Avx2Backend::detect() else {
        return;
    };

    // Arrange
    let floats = f32_data();
    let other: Vec<f32> = floats.iter().rev().copied().collect();
    let ints: Vec<i32> = (0..32).map(|i| (i * 37) % 9 - 4).collect();
    let other_ints: Vec<i32> = ints.iter().rev().copied().collect();

    for op in CompareOp::ALL {
        let mut expected = [0u8; 4];
        let mut actual = [0u8; 4];

        // Act & Assert - f32 value
        let data = NumericSlice::Float32(&floats);
        assert!(SCALAR.compare_val(op, &mut expected, data, NumericScalar::Float32(0.0)));
        assert!(avx2.compare_val(op, &mut actual, data, NumericScalar::Float32(0.0)));
        assert_eq!(actual, expected, "f32 val {op:?}");

        // Act & Assert - f32 column
        let right = NumericSlice::Float32(&other);
        assert!(SCALAR.compare_column(op, &mut expected, data, right));
        assert!(avx2.compare_column(op, &mut actual, data, right));
        assert_eq!(actual, expected, "f32 column {op:?}");

        // Act & Assert - i32 value and column
        let idata = NumericSlice::Int32(&ints);
        assert!(SCALAR.compare_val(op, &mut expected, idata, NumericScalar::Int32(1)));
        assert!(avx2.compare_val(op, &mut actual, idata, NumericScalar::Int32(1)));
        assert_eq!(actual, expected, "i32 val {op:?}");

        let iright = NumericSlice::Int32(&other_ints);
        assert!(SCALAR.compare_column(op, &mut expected, idata, iright));
        assert!(avx2.compare_column(op, &mut actual, idata, iright));
        assert_eq!(actual, expected, "i32 column {op:?}");
    }
}

#[test]
fn test_range_val_matches_scalar() {
    let Some(avx2) = Avx2Backend::detect() else {
        return;
    };

    // Arrange
    let values = f32_data();
    let (lo, hi) = (NumericScalar::Float32(-1.0), NumericScalar::Float32(2.0));

    for range in RangeType::ALL {
        let mut expected = [0u8; 4];
        let mut actual = [0u8; 4];

        // Act
        SCALAR.within_range_val(range, &mut expected, lo, hi, NumericSlice::Float32(&values));
        let covered = avx2.within_range_val(range, &mut actual, lo, hi, NumericSlice::Float32(&values));

        // Assert
        assert!(covered);
        assert_eq!(actual, expected, "{range:?}");
    }
}

#[test]
fn test_uncovered_families_leave_destination() {
    let Some(avx2) = Avx2Backend::detect() else {
        return;
    };

    // Arrange
    let data = [1.0f64; 8];
    let mut bitmask = [0xAAu8; 1];

    // Act
    let compare = avx2.compare_val(CompareOp::Eq, &mut bitmask, NumericSlice::Float64(&data), NumericScalar::Float64(1.0));
    let arith = avx2.arith_compare(
        ArithOp::Add,
        CompareOp::Eq,
        &mut bitmask,
        NumericSlice::Float64(&data),
        HighPrecision::Float(1.0),
        HighPrecision::Float(2.0),
    );

    // Assert
    assert!(!compare);
    assert!(!arith);
    assert_eq!(bitmask[0], 0xAA);
}
