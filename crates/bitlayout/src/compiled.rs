//! Recursive flattening of a struct into an ordered list of addressable leaves.
//!
//! Leaves come out depth-first, left to right, with array indices ascending.
//! Consumers walk this list sequentially, so the order is the byte order of the
//! record and offsets are assigned in the same pass.

use crate::{
    bits::align_up,
    errors::SchemaError,
    field::{BitRange, Entry, FieldSpec, StructRef},
    schema::{SchemaRegistry, StructDef},
    tag::TypeTag,
};

/// One leaf of a flattened record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFieldDescriptor {
    /// Path through nested structs and array indices, e.g. `Inner[1].y`.
    pub qualified_name: String,
    pub type_tag: TypeTag,
    pub size_bytes: usize,
    /// Byte offset from the start of the root record.
    pub offset: usize,
    /// Position within the byte at `offset`, for bit fields.
    pub bits: Option<BitRange>,
}

/// Options for computing record offsets while flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecordOptions {
    /// Byte boundary each leaf starts on; 1 means tightly packed.
    pub alignment: usize,
}

impl Default for RecordOptions {
    fn default() -> Self {
        RecordOptions { alignment: 1 }
    }
}

/// A flattened record: leaves in order plus the record size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlatLayout {
    pub fields: Vec<FlatFieldDescriptor>,
    pub total_size: usize,
}

impl FlatLayout {
    pub fn get(&self, qualified_name: &str) -> Option<&FlatFieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.qualified_name == qualified_name)
    }
}

/// Flattens `root` into leaf descriptors named relative to the root.
pub fn flatten(registry: &SchemaRegistry, root: &str) -> Result<Vec<FlatFieldDescriptor>, SchemaError> {
    flatten_with_prefix(registry, root, "")
}

/// Flattens `root`, prepending `prefix` to every qualified name.
pub fn flatten_with_prefix(
    registry: &SchemaRegistry,
    root: &str,
    prefix: &str,
) -> Result<Vec<FlatFieldDescriptor>, SchemaError> {
    Ok(compile_with_prefix(registry, root, prefix, &RecordOptions::default())?.fields)
}

/// Flattens `root` and reports the record size under `options`.
pub fn compile(registry: &SchemaRegistry, root: &str, options: &RecordOptions) -> Result<FlatLayout, SchemaError> {
    compile_with_prefix(registry, root, "", options)
}

fn compile_with_prefix(
    registry: &SchemaRegistry,
    root: &str,
    prefix: &str,
    options: &RecordOptions,
) -> Result<FlatLayout, SchemaError> {
    if options.alignment == 0 {
        return Err(SchemaError::InvalidAlignment {
            alignment: options.alignment,
        });
    }

    let def = registry.resolve(root)?;
    let mut flattener = Flattener {
        registry,
        alignment: options.alignment,
        path: Vec::new(),
        fields: Vec::new(),
        running: 0,
        unit_start: 0,
    };

    flattener.expand(def, prefix)?;

    log::debug!(
        "flattened `{}` into {} fields, {} bytes",
        root,
        flattener.fields.len(),
        flattener.running
    );

    Ok(FlatLayout {
        fields: flattener.fields,
        total_size: flattener.running,
    })
}

struct Flattener<'r> {
    registry: &'r SchemaRegistry,
    alignment: usize,
    /// Structs currently being expanded, root first.
    path: Vec<&'r str>,
    fields: Vec<FlatFieldDescriptor>,
    running: usize,
    /// Offset of the byte the current run of bit fields is packed into.
    unit_start: usize,
}

impl<'r> Flattener<'r> {
    fn expand(&mut self, def: &'r StructDef, prefix: &str) -> Result<(), SchemaError> {
        self.path.push(def.name());
        let base = self.aligned_running(def, def.name())?;

        for entry in def.entries() {
            match entry {
                Entry::Field(field) => {
                    let offset = self.place(def, field)?;
                    audit_offset(def, entry, offset - base);

                    self.fields.push(FlatFieldDescriptor {
                        qualified_name: format!("{}{}", prefix, field.name()),
                        type_tag: field.type_tag(),
                        size_bytes: field.size_bytes(),
                        offset,
                        bits: field.bits(),
                    });
                }
                Entry::Struct(reference) => {
                    let start = self.aligned_running(def, entry.name())?;
                    audit_offset(def, entry, start - base);
                    self.expand_ref(def, reference, prefix)?;
                }
            }
        }

        self.path.pop();
        Ok(())
    }

    fn expand_ref(&mut self, parent: &StructDef, reference: &StructRef, prefix: &str) -> Result<(), SchemaError> {
        let count = reference.repeat_count.unwrap_or(1);
        if count == 0 {
            return Err(SchemaError::InvalidRepeatCount {
                struct_name: parent.name().to_string(),
                entry: reference.name.clone(),
                count,
            });
        }

        let target = self.registry.resolve(&reference.name)?;
        if self.path.contains(&target.name()) {
            let mut path: Vec<String> = self.path.iter().map(|name| name.to_string()).collect();
            path.push(target.name().to_string());

            return Err(SchemaError::CyclicReference {
                name: reference.name.clone(),
                path,
            });
        }

        log::trace!("expanding `{}` x{} under `{}`", reference.name, count, prefix);

        for i in 0..count {
            let nested = if reference.is_array() {
                format!("{}{}[{}].", prefix, reference.name, i)
            } else {
                format!("{}{}.", prefix, reference.name)
            };

            let start = self.aligned_running(parent, &reference.name)?;
            self.expand(target, &nested)?;

            if i == 0 {
                audit_size(parent, reference, self.running.saturating_sub(start));
            }
        }

        Ok(())
    }

    /// Assigns the byte offset of `field` and advances the running offset.
    fn place(&mut self, def: &StructDef, field: &FieldSpec) -> Result<usize, SchemaError> {
        if field.continues_byte() {
            return Ok(self.unit_start);
        }

        let offset = self.aligned_running(def, field.name())?;
        self.running = offset
            .checked_add(field.size_bytes())
            .ok_or_else(|| overflow(def, field.name()))?;
        self.unit_start = offset;

        Ok(offset)
    }

    /// Running offset rounded up to the record alignment.
    fn aligned_running(&self, def: &StructDef, entry: &str) -> Result<usize, SchemaError> {
        align_up(self.running, self.alignment).ok_or_else(|| overflow(def, entry))
    }
}

fn overflow(def: &StructDef, entry: &str) -> SchemaError {
    SchemaError::LayoutOverflow {
        struct_name: def.name().to_string(),
        field: entry.to_string(),
    }
}

fn audit_offset(def: &StructDef, entry: &Entry, computed: usize) {
    if let Some(declared) = entry.declared_offset() {
        if declared != computed {
            log::warn!(
                "`{}.{}` declares offset {} but is laid out at {}",
                def.name(),
                entry.name(),
                declared,
                computed
            );
        }
    }
}

fn audit_size(parent: &StructDef, reference: &StructRef, computed: usize) {
    if let Some(declared) = reference.declared_size {
        if declared != computed {
            log::warn!(
                "`{}.{}` declares size {} but one instance is {} bytes",
                parent.name(),
                reference.name,
                declared,
                computed
            );
        }
    }
}
