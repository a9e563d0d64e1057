//! Struct definitions and the registry they are looked up in.
//!
//! Both are built once through validating builders and are read-only afterwards,
//! so a [SchemaRegistry] can be shared between threads compiling different roots.

use std::collections::{HashMap, HashSet};

use crate::{
    bits::{BITS_PER_BYTE, BitCursor},
    compiled::{self, RecordOptions},
    errors::SchemaError,
    field::{BitRange, Entry, FieldSpec, StructRef},
    tag::{self, TypeTag},
};

/// What to do when a name appears more than once in an ordered field list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DuplicatePolicy {
    /// Fail with [SchemaError::DuplicateField].
    #[default]
    Reject,
    /// Keep every occurrence as a distinct entry, in declaration order.
    ///
    /// Applies to leaf fields only. A struct referenced twice from the same
    /// struct would expand to colliding qualified names and is always rejected.
    Keep,
}

/// A named, ordered list of entries describing one contiguous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    name: String,
    entries: Vec<Entry>,
}

impl StructDef {
    pub fn builder(name: impl Into<String>) -> StructDefBuilder {
        StructDefBuilder {
            name: name.into(),
            duplicates: DuplicatePolicy::default(),
            decls: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leaf fields declared directly in this struct.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Field(field) => Some(field),
            Entry::Struct(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
enum FieldType {
    Keyword(String),
    Tag(TypeTag),
}

#[derive(Debug, Clone)]
enum Decl {
    Field {
        name: String,
        ty: FieldType,
        size: usize,
        declared_offset: Option<usize>,
    },
    Struct(StructRef),
}

/// Collects entries for a [StructDef] and validates them in [StructDefBuilder::build].
#[derive(Debug, Clone)]
pub struct StructDefBuilder {
    name: String,
    duplicates: DuplicatePolicy,
    decls: Vec<Decl>,
}

impl StructDefBuilder {
    /// Declares a primitive field by legacy type keyword (`LONG`, `CHAR`, `BIT`, ...).
    ///
    /// For `BIT` the size is the width in bits.
    pub fn field(mut self, name: impl Into<String>, keyword: impl Into<String>, size: usize) -> Self {
        self.decls.push(Decl::Field {
            name: name.into(),
            ty: FieldType::Keyword(keyword.into()),
            size,
            declared_offset: None,
        });
        self
    }

    /// Like [StructDefBuilder::field], also recording the offset written in the source schema.
    pub fn field_at(
        mut self,
        name: impl Into<String>,
        keyword: impl Into<String>,
        size: usize,
        declared_offset: usize,
    ) -> Self {
        self.decls.push(Decl::Field {
            name: name.into(),
            ty: FieldType::Keyword(keyword.into()),
            size,
            declared_offset: Some(declared_offset),
        });
        self
    }

    /// Declares a primitive field with an already canonical tag.
    pub fn typed_field(mut self, name: impl Into<String>, tag: TypeTag, size: usize) -> Self {
        self.decls.push(Decl::Field {
            name: name.into(),
            ty: FieldType::Tag(tag),
            size,
            declared_offset: None,
        });
        self
    }

    pub fn struct_ref(mut self, reference: StructRef) -> Self {
        self.decls.push(Decl::Struct(reference));
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Validates names, sizes and type keywords, and assigns bit positions to
    /// consecutive bit fields.
    pub fn build(self) -> Result<StructDef, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName {
                context: "struct definition".to_string(),
            });
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(self.decls.len());
        let mut entries = Vec::with_capacity(self.decls.len());
        let mut cursor = BitCursor::new();

        for decl in self.decls {
            let entry = match decl {
                Decl::Field {
                    name,
                    ty,
                    size,
                    declared_offset,
                } => {
                    let type_tag = match ty {
                        FieldType::Keyword(keyword) => tag::canonicalize(&keyword, &self.name, &name)?,
                        FieldType::Tag(tag) => tag,
                    };

                    if size == 0 {
                        return Err(SchemaError::InvalidFieldSize {
                            struct_name: self.name,
                            field: name,
                            size,
                        });
                    }

                    let (size_bytes, bits) = if type_tag.is_bitfield() {
                        if size > BITS_PER_BYTE {
                            return Err(SchemaError::InvalidBitWidth {
                                struct_name: self.name,
                                field: name,
                                width: size,
                            });
                        }

                        let offset = cursor.place(size);
                        (1, Some(BitRange { offset, width: size }))
                    } else {
                        cursor.reset();
                        (size, None)
                    };

                    Entry::Field(FieldSpec {
                        name,
                        type_tag,
                        size_bytes,
                        bits,
                        declared_offset,
                    })
                }
                Decl::Struct(reference) => {
                    cursor.reset();
                    Entry::Struct(reference)
                }
            };

            let name = entry.name();
            if name.is_empty() {
                return Err(SchemaError::EmptyName { context: self.name });
            }

            let keep = self.duplicates == DuplicatePolicy::Keep && matches!(entry, Entry::Field(_));
            if !seen.insert(name.to_string()) && !keep {
                return Err(SchemaError::DuplicateField {
                    struct_name: self.name,
                    field: name.to_string(),
                });
            }

            entries.push(entry);
        }

        Ok(StructDef {
            name: self.name,
            entries,
        })
    }
}

/// Struct name → definition. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    structs: Vec<StructDef>,
    name_to_idx: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Builds a registry from struct definitions, rejecting duplicate struct names.
    ///
    /// References between structs are resolved lazily when a root is flattened.
    pub fn build(structs: impl IntoIterator<Item = StructDef>) -> Result<Self, SchemaError> {
        let structs: Vec<StructDef> = structs.into_iter().collect();
        let mut name_to_idx = HashMap::with_capacity(structs.len());

        for (i, def) in structs.iter().enumerate() {
            if name_to_idx.insert(def.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateStruct {
                    name: def.name.clone(),
                });
            }
        }

        log::debug!("built schema registry with {} structs", structs.len());

        Ok(Self {
            structs,
            name_to_idx,
        })
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.name_to_idx.get(name).map(|&i| &self.structs[i])
    }

    /// Looks up `name`, failing with [SchemaError::UnknownStruct].
    pub fn resolve(&self, name: &str) -> Result<&StructDef, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownStruct {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_idx.contains_key(name)
    }

    /// Struct names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.structs.iter().map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Packed byte size of one instance of `name`.
    pub fn struct_size(&self, name: &str) -> Result<usize, SchemaError> {
        Ok(compiled::compile(self, name, &RecordOptions::default())?.total_size)
    }
}
