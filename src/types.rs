//! Core data model types for the value store.
//!
//! Every quantity an analysis touches (raw record fields, derived quantities, constants and cut
//! results) has one of the closed set of [`ValueType`]s. [`Value`] is the dynamically typed form
//! used at the edges: record sources and diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinematics::{FourVector, Vector3};

/// Semantic type of a named value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// 32-bit signed integer.
    #[serde(rename = "int", alias = "int32")]
    Int32,
    /// 64-bit signed integer.
    #[serde(rename = "long", alias = "int64", alias = "Long64_t")]
    Int64,
    /// 64-bit floating point number.
    #[serde(rename = "double", alias = "float64")]
    Float64,
    /// Cartesian three-vector.
    #[serde(rename = "vector3")]
    Vector3,
    /// Energy-momentum four-vector.
    #[serde(rename = "four_vector")]
    FourVector,
    /// Boolean (cut results).
    #[serde(rename = "bool")]
    Bool,
}

impl ValueType {
    /// Returns `true` for the numeric scalar types a record source can provide.
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Float64)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int32 => "int",
            Self::Int64 => "long",
            Self::Float64 => "double",
            Self::Vector3 => "vector3",
            Self::FourVector => "four_vector",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A single dynamically typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Three-vector.
    Vector3(Vector3),
    /// Four-vector.
    FourVector(FourVector),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// The [`ValueType`] of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float64(_) => ValueType::Float64,
            Self::Vector3(_) => ValueType::Vector3,
            Self::FourVector(_) => ValueType::FourVector,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    /// Numeric scalar value widened to `f64`, if this is a scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int32(v) => Some(f64::from(v)),
            Self::Int64(v) => Some(v as f64),
            Self::Float64(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, ValueType};

    #[test]
    fn value_type_names_match_description_keywords() {
        let ty: ValueType = serde_json::from_str("\"double\"").unwrap();
        assert_eq!(ty, ValueType::Float64);
        let ty: ValueType = serde_json::from_str("\"Long64_t\"").unwrap();
        assert_eq!(ty, ValueType::Int64);
        assert_eq!(ValueType::Int32.to_string(), "int");
    }

    #[test]
    fn scalars_widen_to_f64() {
        assert_eq!(Value::Int32(3).as_f64(), Some(3.0));
        assert_eq!(Value::Int64(-2).as_f64(), Some(-2.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert!(ValueType::Int64.is_scalar());
        assert!(!ValueType::FourVector.is_scalar());
    }
}
