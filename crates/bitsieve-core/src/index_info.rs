//! Index-creation record handed over by the index layer.
//!
//! The engine only reads `field_type` (and, for JSON fields, the cast type)
//! to decide which numeric specialization a caller should request; the other
//! fields are carried through unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::NumericType;

/// Schema data type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Variable-length string.
    VarChar,
    /// Array of scalars.
    Array,
    /// JSON document.
    Json,
    /// Dense float vector.
    FloatVector,
    /// Packed binary vector.
    BinaryVector,
    /// Sparse float vector.
    SparseFloatVector,
}

/// Cast applied to a JSON path before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonCastType {
    /// No cast configured.
    #[default]
    Unknown,
    /// Cast to boolean.
    Bool,
    /// Cast to double.
    Double,
    /// Cast to string.
    Varchar,
    /// Cast to array of booleans.
    ArrayBool,
    /// Cast to array of doubles.
    ArrayDouble,
    /// Cast to array of strings.
    ArrayVarchar,
}

/// N-gram tokenizer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramParams {
    /// Whether the index is being loaded rather than built.
    pub loading_index: bool,
    /// Smallest gram length.
    pub min_gram: usize,
    /// Largest gram length.
    pub max_gram: usize,
}

const fn default_scalar_index_engine_version() -> i32 {
    1
}

const fn default_tantivy_index_version() -> u32 {
    7
}

fn default_json_cast_function() -> String {
    "unknown".to_string()
}

/// Per-field index creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexInfo {
    /// Field data type.
    pub field_type: DataType,
    /// Index type name (e.g. `INVERTED`, `STL_SORT`).
    #[serde(default)]
    pub index_type: String,
    /// Metric type name (vector fields only).
    #[serde(default)]
    pub metric_type: String,
    /// Index engine version.
    #[serde(default)]
    pub index_engine_version: i32,
    /// Field name.
    pub field_name: String,
    /// Vector dimension (0 for scalar fields).
    #[serde(default)]
    pub dim: i64,
    /// Scalar index engine version.
    #[serde(default = "default_scalar_index_engine_version")]
    pub scalar_index_engine_version: i32,
    /// Tantivy index format version.
    #[serde(default = "default_tantivy_index_version")]
    pub tantivy_index_version: u32,
    /// Cast applied to `json_path`.
    #[serde(default)]
    pub json_cast_type: JsonCastType,
    /// JSON path for JSON fields.
    #[serde(default)]
    pub json_path: String,
    /// Named cast function for JSON fields.
    #[serde(default = "default_json_cast_function")]
    pub json_cast_function: String,
    /// N-gram parameters, if the index is an n-gram index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngram_params: Option<NgramParams>,
}

impl CreateIndexInfo {
    /// Record for `field_name` with every optional field at its default.
    #[must_use]
    pub fn new(field_name: impl Into<String>, field_type: DataType) -> Self {
        Self {
            field_type,
            index_type: String::new(),
            metric_type: String::new(),
            index_engine_version: 0,
            field_name: field_name.into(),
            dim: 0,
            scalar_index_engine_version: default_scalar_index_engine_version(),
            tantivy_index_version: default_tantivy_index_version(),
            json_cast_type: JsonCastType::Unknown,
            json_path: String::new(),
            json_cast_function: default_json_cast_function(),
            ngram_params: None,
        }
    }

    /// Parses a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the record to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Element type whose kernels filter this field.
    ///
    /// JSON fields map through their cast type; only `Double` casts are
    /// numeric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFieldType`] for non-numeric fields.
    pub fn numeric_type(&self) -> Result<NumericType> {
        match (self.field_type, self.json_cast_type) {
            (DataType::Int8, _) => Ok(NumericType::Int8),
            (DataType::Int16, _) => Ok(NumericType::Int16),
            (DataType::Int32, _) => Ok(NumericType::Int32),
            (DataType::Int64, _) => Ok(NumericType::Int64),
            (DataType::Float, _) => Ok(NumericType::Float32),
            (DataType::Double, _) | (DataType::Json, JsonCastType::Double) => {
                Ok(NumericType::Float64)
            }
            (DataType::Json, cast) => Err(Error::UnsupportedFieldType(format!(
                "{} (json cast {cast:?})",
                self.field_name
            ))),
            (other, _) => Err(Error::UnsupportedFieldType(format!(
                "{} ({other:?})",
                self.field_name
            ))),
        }
    }
}
