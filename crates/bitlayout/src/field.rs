//! Entries of a struct definition: leaf fields and references to other structs.

use crate::tag::TypeTag;

/// Position of a bit field inside its containing byte (MSB-first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitRange {
    /// Offset of the first bit, 0 being the most significant bit of the byte.
    pub offset: usize,
    /// Number of bits, 1..=8.
    pub width: usize,
}

/// A primitive leaf field.
///
/// Built by [crate::schema::StructDefBuilder], which canonicalizes the type keyword
/// and assigns bit positions, so a `FieldSpec` is never modified after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) type_tag: TypeTag,
    pub(crate) size_bytes: usize,
    pub(crate) bits: Option<BitRange>,
    pub(crate) declared_offset: Option<usize>,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Bytes occupied by the field. A bit field reports its containing byte.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Bit position for bit fields, `None` otherwise.
    pub fn bits(&self) -> Option<BitRange> {
        self.bits
    }

    /// Offset written in the source schema. Documentary only.
    pub fn declared_offset(&self) -> Option<usize> {
        self.declared_offset
    }

    /// True for a bit field that shares its byte with a preceding bit field.
    pub(crate) fn continues_byte(&self) -> bool {
        self.bits.is_some_and(|bits| bits.offset > 0)
    }
}

/// Reference to another struct, either a single nested instance or a fixed-size
/// array of instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructRef {
    /// Name of the referenced struct in the registry.
    pub name: String,
    /// Number of instances; `None` and `Some(1)` both mean a single nested
    /// instance. Zero is rejected when the reference is expanded.
    pub repeat_count: Option<usize>,
    /// Offset written in the source schema. Documentary only.
    pub declared_offset: Option<usize>,
    /// Size of one instance written in the source schema. Documentary only.
    pub declared_size: Option<usize>,
}

impl StructRef {
    pub fn new(name: impl Into<String>) -> Self {
        StructRef {
            name: name.into(),
            repeat_count: None,
            declared_offset: None,
            declared_size: None,
        }
    }

    pub fn repeated(mut self, count: usize) -> Self {
        self.repeat_count = Some(count);
        self
    }

    pub fn declared_at(mut self, offset: usize) -> Self {
        self.declared_offset = Some(offset);
        self
    }

    pub fn declared_size(mut self, size: usize) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// True when the reference expands to indexed instances (`Name[i].`).
    pub fn is_array(&self) -> bool {
        self.repeat_count.is_some_and(|count| count > 1)
    }
}

/// One entry of a [crate::schema::StructDef], in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Field(FieldSpec),
    Struct(StructRef),
}

impl Entry {
    /// Field name, or the referenced struct name for struct references.
    pub fn name(&self) -> &str {
        match self {
            Entry::Field(field) => &field.name,
            Entry::Struct(reference) => &reference.name,
        }
    }

    pub fn declared_offset(&self) -> Option<usize> {
        match self {
            Entry::Field(field) => field.declared_offset,
            Entry::Struct(reference) => reference.declared_offset,
        }
    }
}
