//! Tests for `element` module

use super::element::*;
use super::ops::NumericType;

#[test]
fn test_element_slice_tags_match_numeric_type() {
    // Arrange
    let ints = [1i16, 2, 3];
    let floats = [1.0f32, 2.0];

    // Act
    let int_view = i16::slice(&ints);
    let float_view = f32::slice(&floats);

    // Assert
    assert_eq!(int_view.numeric_type(), NumericType::Int16);
    assert_eq!(int_view.len(), 3);
    assert_eq!(float_view.numeric_type(), f32::NUMERIC_TYPE);
    assert!(!float_view.is_empty());
}

#[test]
fn test_element_widen_to_high_precision() {
    // Arrange & Act & Assert
    assert_eq!(i8::MAX.widen(), 127i64);
    assert_eq!(i32::MIN.widen(), i64::from(i32::MIN));
    assert!((1.5f32.widen() - 1.5f64).abs() < f64::EPSILON);
    assert_eq!(i8::high_precision(130), HighPrecision::Int(130));
    assert_eq!(f64::high_precision(0.5), HighPrecision::Float(0.5));
}

#[test]
fn test_element_from_scalar_requires_matching_tag() {
    // Arrange
    let value = NumericScalar::Int32(7);

    // Act & Assert
    assert_eq!(i32::from_scalar(value), Some(7));
    assert_eq!(i64::from_scalar(value), None);
    assert_eq!(f32::from_scalar(value), None);
}

#[test]
fn test_element_from_numeric_slice_requires_matching_tag() {
    // Arrange
    let data = [1.0f64, 2.0];
    let view = f64::slice(&data);

    // Act & Assert
    assert_eq!(f64::from_numeric_slice(view), Some(&data[..]));
    assert!(f32::from_numeric_slice(view).is_none());
}

#[test]
fn test_high_precision_matches_kind() {
    assert!(HighPrecision::Int(1).matches(NumericType::Int8));
    assert!(!HighPrecision::Int(1).matches(NumericType::Float32));
    assert!(HighPrecision::Float(1.0).matches(NumericType::Float64));
    assert_eq!(i16::from_high_precision(HighPrecision::Float(1.0)), None);
    assert_eq!(f32::from_high_precision(HighPrecision::Float(2.0)), Some(2.0));
}

#[test]
fn test_numeric_scalar_serialization() {
    // Arrange
    let value = NumericScalar::Float32(1.5);

    // Act
    let json = serde_json::to_string(&value).expect("serialize");
    let back: NumericScalar = serde_json::from_str(&json).expect("deserialize");

    // Assert
    assert_eq!(json, r#"{"type":"float32","value":1.5}"#);
    assert_eq!(back, value);
}

#[test]
fn test_bit_word_u8_truncates() {
    assert_eq!(<u8 as BitWord>::BITS, 8);
    assert_eq!(u8::from_u64(0x1FF), 0xFF);
    assert_eq!(0xABu8.to_u64(), 0xAB);
    assert_eq!(<u64 as BitWord>::BITS, 64);
}
