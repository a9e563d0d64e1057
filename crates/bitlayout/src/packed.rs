//! Padding-aware offset calculation for flat, sequential field lists.
//!
//! Each field is preceded by the padding needed to bring the running offset to a
//! multiple of the alignment. The running offset then advances by the field size
//! plus that padding; nothing is added after the last field.

use std::collections::HashSet;

use crate::{bits::padding_for, errors::SchemaError, schema::DuplicatePolicy};

/// Context name used in errors raised for calculator input.
const FIELD_LIST: &str = "field list";

/// Which position is reported as a field's offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OffsetConvention {
    /// The aligned start of the field, after its padding.
    #[default]
    Aligned,
    /// The running offset before padding is inserted, as legacy tables report it.
    PrePadding,
}

/// Options for [calculate_packed_layout].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    /// Byte boundary every field start is padded to. Must be at least 1.
    pub alignment: usize,
    pub offsets: OffsetConvention,
    pub duplicates: DuplicatePolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            alignment: 2,
            offsets: OffsetConvention::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl LayoutOptions {
    pub fn with_alignment(alignment: usize) -> Self {
        LayoutOptions {
            alignment,
            ..Default::default()
        }
    }
}

/// Placement of one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutEntry {
    pub name: String,
    pub offset: usize,
    pub size_bytes: usize,
    /// Filler bytes inserted before the field.
    pub padding_bytes: usize,
}

/// Result of [calculate_packed_layout]: entries in input order and the final
/// running offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedLayout {
    pub entries: Vec<LayoutEntry>,
    pub total_size: usize,
}

impl PackedLayout {
    pub fn get(&self, name: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Lays out `(name, size_bytes)` pairs in order under `options`.
///
/// Fails on zero alignment, zero sizes, empty names, and (unless
/// [DuplicatePolicy::Keep] is set) repeated names.
pub fn calculate_packed_layout<N: AsRef<str>>(
    fields: &[(N, usize)],
    options: &LayoutOptions,
) -> Result<PackedLayout, SchemaError> {
    if options.alignment == 0 {
        return Err(SchemaError::InvalidAlignment {
            alignment: options.alignment,
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());
    let mut entries = Vec::with_capacity(fields.len());
    let mut running = 0usize;

    for (name, size_bytes) in fields {
        let name = name.as_ref();
        let size_bytes = *size_bytes;

        if name.is_empty() {
            return Err(SchemaError::EmptyName {
                context: FIELD_LIST.to_string(),
            });
        }

        if size_bytes == 0 {
            return Err(SchemaError::InvalidFieldSize {
                struct_name: FIELD_LIST.to_string(),
                field: name.to_string(),
                size: size_bytes,
            });
        }

        if !seen.insert(name) && options.duplicates == DuplicatePolicy::Reject {
            return Err(SchemaError::DuplicateField {
                struct_name: FIELD_LIST.to_string(),
                field: name.to_string(),
            });
        }

        let padding_bytes = padding_for(running, options.alignment);
        let overflow = || SchemaError::LayoutOverflow {
            struct_name: FIELD_LIST.to_string(),
            field: name.to_string(),
        };

        let aligned = running.checked_add(padding_bytes).ok_or_else(overflow)?;
        let end = aligned.checked_add(size_bytes).ok_or_else(overflow)?;
        let offset = match options.offsets {
            OffsetConvention::Aligned => aligned,
            OffsetConvention::PrePadding => running,
        };

        entries.push(LayoutEntry {
            name: name.to_string(),
            offset,
            size_bytes,
            padding_bytes,
        });

        running = end;
    }

    log::debug!(
        "laid out {} fields at alignment {}: {} bytes",
        entries.len(),
        options.alignment,
        running
    );

    Ok(PackedLayout {
        entries,
        total_size: running,
    })
}
