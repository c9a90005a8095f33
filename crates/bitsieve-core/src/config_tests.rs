//! Tests for `config` module

use std::io::Write;

use super::backend::BackendKind;
use super::config::*;

// ========================================================================
// BackendChoice tests
// ========================================================================

#[test]
fn test_backend_choice_default_is_auto() {
    // Arrange & Act
    let choice = BackendChoice::default();

    // Assert
    assert_eq!(choice, BackendChoice::Auto);
    assert_eq!(choice.forced(), None);
}

#[test]
fn test_backend_choice_forced_roundtrip() {
    for kind in BackendKind::ALL {
        // Act
        let choice = BackendChoice::from(kind);

        // Assert
        assert_eq!(choice.forced(), Some(kind));
    }
}

#[test]
fn test_backend_choice_serialization() {
    // Arrange
    let choice = BackendChoice::Avx2;

    // Act
    let json = serde_json::to_string(&choice).expect("serialize");

    // Assert
    assert_eq!(json, "\"avx2\"");
}

// ========================================================================
// SieveConfig tests
// ========================================================================

#[test]
fn test_config_default_values() {
    // Arrange & Act
    let config = SieveConfig::default();

    // Assert
    assert_eq!(config.dispatch.backend, BackendChoice::Auto);
    assert!(config.filter.fallback_to_scalar);
    assert_eq!(config.filter.parallel_threshold_rows, 65_536);
    assert_eq!(config.filter.chunk_rows, 16_384);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_toml_minimal() {
    // Arrange
    let toml = r#"
[dispatch]
backend = "scalar"
"#;

    // Act
    let config = SieveConfig::from_toml(toml).expect("parse");

    // Assert
    assert_eq!(config.dispatch.backend, BackendChoice::Scalar);
    assert_eq!(config.filter.chunk_rows, 16_384);
}

#[test]
fn test_config_from_toml_full() {
    // Arrange
    let toml = r#"
[dispatch]
backend = "wide"

[filter]
fallback_to_scalar = false
parallel_threshold_rows = 1024
chunk_rows = 256

[logging]
level = "debug"
format = "json"
"#;

    // Act
    let config = SieveConfig::from_toml(toml).expect("parse");

    // Assert
    assert_eq!(config.dispatch.backend, BackendChoice::Wide);
    assert!(!config.filter.fallback_to_scalar);
    assert_eq!(config.filter.parallel_threshold_rows, 1024);
    assert_eq!(config.filter.chunk_rows, 256);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_config_from_toml_invalid_backend() {
    // Arrange
    let toml = r#"
[dispatch]
backend = "gpu"
"#;

    // Act
    let result = SieveConfig::from_toml(toml);

    // Assert
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_validate_chunk_rows() {
    for bad in [0, 12] {
        // Arrange
        let mut config = SieveConfig::default();
        config.filter.chunk_rows = bad;

        // Act
        let result = config.validate();

        // Assert
        let Err(ConfigError::InvalidValue { key, .. }) = result else {
            panic!("chunk_rows {bad} accepted");
        };
        assert_eq!(key, "filter.chunk_rows");
    }
}

#[test]
fn test_config_validate_invalid_log_level() {
    // Arrange
    let mut config = SieveConfig::default();
    config.logging.level = "verbose".to_string();

    // Act
    let result = config.validate();

    // Assert
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("logging.level"));
}

#[test]
fn test_config_validate_invalid_log_format() {
    // Arrange
    let mut config = SieveConfig::default();
    config.logging.format = "xml".to_string();

    // Act & Assert
    assert!(config.validate().is_err());
}

#[test]
fn test_config_roundtrip() {
    // Arrange
    let mut original = SieveConfig::default();
    original.dispatch.backend = BackendChoice::Neon;
    original.filter.chunk_rows = 4096;

    // Act
    let toml = original.to_toml().expect("serialize");
    let parsed = SieveConfig::from_toml(&toml).expect("parse");

    // Assert
    assert_eq!(parsed.dispatch.backend, BackendChoice::Neon);
    assert_eq!(parsed.filter.chunk_rows, 4096);
    assert_eq!(parsed.logging.level, original.logging.level);
}

#[test]
fn test_config_load_from_path() {
    // Arrange
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[filter]\nparallel_threshold_rows = 99").expect("write");

    // Act
    let config = SieveConfig::load_from_path(file.path()).expect("load");

    // Assert
    assert_eq!(config.filter.parallel_threshold_rows, 99);
}

#[test]
fn test_config_load_missing_file_uses_defaults() {
    // Arrange
    let dir = tempfile::tempdir().expect("temp dir");

    // Act
    let config = SieveConfig::load_from_path(dir.path().join("absent.toml")).expect("load");

    // Assert
    assert_eq!(config.filter.chunk_rows, 16_384);
}
