use crate::common::{Error, Result};
use crate::config::config::STRING_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of column types the engine stores.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Text => write!(f, "string"),
        }
    }
}

impl DataType {
    /// Serialized width of a field of this type. Text fields are fixed
    /// width: a 4-byte length prefix followed by `STRING_LEN` content bytes.
    pub fn length_bytes(&self) -> usize {
        match self {
            DataType::Int => 4,
            DataType::Text => STRING_LEN + 4,
        }
    }
}

/// Comparison operators used by predicates. `Like` is substring containment
/// on text and coincides with equality on integers.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum CompareOp {
    Equals,
    GreaterThan,
    LessThan,
    LessThanOrEq,
    GreaterThanOrEq,
    Like,
    NotEquals,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Equals => write!(f, "="),
            CompareOp::GreaterThan => write!(f, ">"),
            CompareOp::LessThan => write!(f, "<"),
            CompareOp::LessThanOrEq => write!(f, "<="),
            CompareOp::GreaterThanOrEq => write!(f, ">="),
            CompareOp::Like => write!(f, "LIKE"),
            CompareOp::NotEquals => write!(f, "<>"),
        }
    }
}

/// A typed value. Dispatch is on the tag; there is no field class hierarchy.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
pub enum Field {
    Integer(i32),
    Text(String),
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Integer(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::text(v)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Integer(i) => i.fmt(f),
            Field::Text(s) => f.write_str(s),
        }
    }
}

impl Field {
    /// Builds a text field, truncating content beyond `STRING_LEN` bytes the
    /// way the on-disk encoding would.
    pub fn text(s: &str) -> Field {
        let mut content = s.to_string();
        if content.len() > STRING_LEN {
            let mut cut = STRING_LEN;
            while !content.is_char_boundary(cut) {
                cut -= 1;
            }
            content.truncate(cut);
        }
        Field::Text(content)
    }

    pub fn get_type(&self) -> DataType {
        match self {
            Field::Integer(_) => DataType::Int,
            Field::Text(_) => DataType::Text,
        }
    }

    /// Serialized width of this field.
    pub fn length_bytes(&self) -> usize {
        self.get_type().length_bytes()
    }

    /// Evaluates `self op other`. Comparing fields of different types is a
    /// schema error rather than a silent `false`.
    pub fn compare(&self, op: CompareOp, other: &Field) -> Result<bool> {
        match (self, other) {
            (Field::Integer(lhs), Field::Integer(rhs)) => Ok(match op {
                CompareOp::Equals | CompareOp::Like => lhs == rhs,
                CompareOp::NotEquals => lhs != rhs,
                CompareOp::GreaterThan => lhs > rhs,
                CompareOp::GreaterThanOrEq => lhs >= rhs,
                CompareOp::LessThan => lhs < rhs,
                CompareOp::LessThanOrEq => lhs <= rhs,
            }),
            (Field::Text(lhs), Field::Text(rhs)) => Ok(match op {
                CompareOp::Equals => lhs == rhs,
                CompareOp::NotEquals => lhs != rhs,
                CompareOp::GreaterThan => lhs > rhs,
                CompareOp::GreaterThanOrEq => lhs >= rhs,
                CompareOp::LessThan => lhs < rhs,
                CompareOp::LessThanOrEq => lhs <= rhs,
                CompareOp::Like => lhs.contains(rhs.as_str()),
            }),
            (lhs, rhs) => Result::from(Error::SchemaMismatch(format!(
                "cannot compare {} and {}",
                lhs.get_type(),
                rhs.get_type()
            ))),
        }
    }

    /// Encodes the field. Integers are 4 bytes big-endian. Text is a 4-byte
    /// big-endian length prefix followed by the content zero-padded to
    /// `STRING_LEN` bytes; the encoding is byte-exact with on-disk pages.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Field::Integer(i) => i.to_be_bytes().to_vec(),
            Field::Text(s) => {
                // Clamp, in case the variant was built around the fixed
                // width instead of through [`Field::text`].
                let content = &s.as_bytes()[..s.len().min(STRING_LEN)];
                let mut data = Vec::with_capacity(STRING_LEN + 4);
                data.extend_from_slice(&(content.len() as u32).to_be_bytes());
                data.extend_from_slice(content);
                data.resize(STRING_LEN + 4, 0);
                data
            }
        }
    }

    /// Decodes a field of the given type from its fixed-width encoding.
    pub fn deserialize(data: &[u8], data_type: DataType) -> Result<Field> {
        if data.len() < data_type.length_bytes() {
            return Result::from(Error::InvalidInput(format!(
                "{} bytes cannot hold a {} field",
                data.len(),
                data_type
            )));
        }
        match data_type {
            DataType::Int => {
                let raw: [u8; 4] = data[..4].try_into().expect("length checked above");
                Ok(Field::Integer(i32::from_be_bytes(raw)))
            }
            DataType::Text => {
                let raw: [u8; 4] = data[..4].try_into().expect("length checked above");
                let len = u32::from_be_bytes(raw) as usize;
                if len > STRING_LEN {
                    return Result::from(Error::InvalidInput(format!(
                        "text length prefix {len} exceeds the fixed width {STRING_LEN}"
                    )));
                }
                let content = String::from_utf8(data[4..4 + len].to_vec())
                    .map_err(|err| Error::InvalidInput(err.to_string()))?;
                Ok(Field::Text(content))
            }
        }
    }
}
