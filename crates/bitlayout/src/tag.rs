//! Canonical type tags and the mapping from legacy type keywords.

use std::fmt;

use crate::errors::SchemaError;

/// Closed set of canonical leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeTag {
    #[cfg_attr(feature = "serde", serde(rename = "int32"))]
    Int32,
    #[cfg_attr(feature = "serde", serde(rename = "int16"))]
    Int16,
    /// Fixed-length character array; the length is the field size.
    #[cfg_attr(feature = "serde", serde(rename = "char-array"))]
    CharArray,
    #[cfg_attr(feature = "serde", serde(rename = "float64"))]
    Float64,
    #[cfg_attr(feature = "serde", serde(rename = "float32"))]
    Float32,
    #[cfg_attr(feature = "serde", serde(rename = "int64"))]
    Int64,
    #[cfg_attr(feature = "serde", serde(rename = "byte"))]
    Byte,
    #[cfg_attr(feature = "serde", serde(rename = "uint32"))]
    UInt32,
    /// Sub-byte field packed MSB-first with its neighbours.
    #[cfg_attr(feature = "serde", serde(rename = "bitfield"))]
    Bitfield,
}

impl TypeTag {
    /// Canonical tag name as emitted in descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int32 => "int32",
            TypeTag::Int16 => "int16",
            TypeTag::CharArray => "char-array",
            TypeTag::Float64 => "float64",
            TypeTag::Float32 => "float32",
            TypeTag::Int64 => "int64",
            TypeTag::Byte => "byte",
            TypeTag::UInt32 => "uint32",
            TypeTag::Bitfield => "bitfield",
        }
    }

    /// Looks up a legacy keyword. Words separated by whitespace are joined with
    /// `_`, so `LONG LONG` reads as `LONG_LONG`.
    pub fn from_keyword(keyword: &str) -> Option<TypeTag> {
        let normalized = keyword.split_whitespace().collect::<Vec<_>>().join("_");

        let tag = match normalized.as_str() {
            "LONG" => TypeTag::Int32,
            "SHORT" => TypeTag::Int16,
            "CHAR" => TypeTag::CharArray,
            "DOUBLE" => TypeTag::Float64,
            "FLOAT" => TypeTag::Float32,
            "LONG_LONG" => TypeTag::Int64,
            "BYTE" => TypeTag::Byte,
            "UNSIGNED_LONG" => TypeTag::UInt32,
            "BIT" => TypeTag::Bitfield,
            _ => return None,
        };

        Some(tag)
    }

    pub fn is_bitfield(&self) -> bool {
        *self == TypeTag::Bitfield
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalizes the keyword declared for `field` in `struct_name`.
pub fn canonicalize(keyword: &str, struct_name: &str, field: &str) -> Result<TypeTag, SchemaError> {
    TypeTag::from_keyword(keyword).ok_or_else(|| SchemaError::UnknownTypeKeyword {
        keyword: keyword.to_string(),
        struct_name: struct_name.to_string(),
        field: field.to_string(),
    })
}
