//! Typed attribute values used as index keys
//!
//! Values have a total, deterministic order so they can key `BTreeMap`
//! indexes. Ordering across variants is Bool < Int < String < Uid < VerifyKey.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::VerifyKey;

use super::uid::Uid;

/// Declared type of a partition attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int,
    String,
    Uid,
    VerifyKey,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::String => "string",
            FieldType::Uid => "uid",
            FieldType::VerifyKey => "verify_key",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete attribute value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    String(String),
    Uid(Uid),
    VerifyKey(VerifyKey),
}

impl FieldValue {
    /// Type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Uid(_) => FieldType::Uid,
            FieldValue::VerifyKey(_) => FieldType::VerifyKey,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::String(v) => write!(f, "{:?}", v),
            FieldValue::Uid(v) => write!(f, "{}", v),
            FieldValue::VerifyKey(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<Uid> for FieldValue {
    fn from(v: Uid) -> Self {
        FieldValue::Uid(v)
    }
}

impl From<VerifyKey> for FieldValue {
    fn from(v: VerifyKey) -> Self {
        FieldValue::VerifyKey(v)
    }
}

impl From<&VerifyKey> for FieldValue {
    fn from(v: &VerifyKey) -> Self {
        FieldValue::VerifyKey(*v)
    }
}
