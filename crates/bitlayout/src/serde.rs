//! JSON‑deserializable schema description and serializable compiler output.
//!
//! A schema file lists structs with their entries in declaration order. It is
//! converted into a [`SchemaRegistry`] with `TryFrom`, which runs the same
//! validation as the builders. Flattened descriptors serialize as
//! `{qualified_name, type_tag, length, offset}` records, plus `bit_offset` and
//! `bit_width` for bit fields.

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    compiled::FlatFieldDescriptor,
    errors::SchemaError,
    field::StructRef,
    schema::{DuplicatePolicy, SchemaRegistry, StructDef},
    tag::TypeTag,
};

/// Top‑level schema definition: every struct that may be referenced.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    pub structs: Vec<RecordDef>,
}

/// One struct and its entries.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordDef {
    pub name: String,
    /// Keep repeated field names as distinct entries instead of rejecting them.
    #[serde(default)]
    pub allow_duplicates: bool,
    pub entries: Vec<EntryDef>,
}

/// A struct entry: primitive field or reference to another struct.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDef {
    Field {
        name: String,
        /// Legacy type keyword such as `LONG` or `BIT`.
        #[serde(rename = "type")]
        keyword: String,
        /// Size in bytes, or width in bits for `BIT`.
        size: usize,
        /// Documentary offset; never trusted.
        #[serde(default)]
        offset: Option<usize>,
    },
    Struct {
        name: String,
        /// Number of instances; absent means one.
        #[serde(default)]
        count: Option<usize>,
        /// Documentary size of one instance.
        #[serde(default)]
        size: Option<usize>,
        /// Documentary offset.
        #[serde(default)]
        offset: Option<usize>,
    },
}

impl TryFrom<RecordDef> for StructDef {
    type Error = SchemaError;

    fn try_from(value: RecordDef) -> Result<Self, Self::Error> {
        let policy = if value.allow_duplicates {
            DuplicatePolicy::Keep
        } else {
            DuplicatePolicy::Reject
        };

        let mut builder = StructDef::builder(value.name).duplicates(policy);

        for entry in value.entries {
            builder = match entry {
                EntryDef::Field {
                    name,
                    keyword,
                    size,
                    offset: Some(offset),
                } => builder.field_at(name, keyword, size, offset),
                EntryDef::Field {
                    name,
                    keyword,
                    size,
                    offset: None,
                } => builder.field(name, keyword, size),
                EntryDef::Struct {
                    name,
                    count,
                    size,
                    offset,
                } => builder.struct_ref(StructRef {
                    name,
                    repeat_count: count,
                    declared_offset: offset,
                    declared_size: size,
                }),
            };
        }

        builder.build()
    }
}

impl TryFrom<SchemaDef> for SchemaRegistry {
    type Error = SchemaError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        let structs = value
            .structs
            .into_iter()
            .map(StructDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        SchemaRegistry::build(structs)
    }
}

/// Wire form of a [`FlatFieldDescriptor`].
#[derive(Serialize)]
struct DescriptorRecord<'a> {
    qualified_name: &'a str,
    type_tag: TypeTag,
    length: usize,
    offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_width: Option<usize>,
}

impl Serialize for FlatFieldDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DescriptorRecord {
            qualified_name: &self.qualified_name,
            type_tag: self.type_tag,
            length: self.size_bytes,
            offset: self.offset,
            bit_offset: self.bits.map(|bits| bits.offset),
            bit_width: self.bits.map(|bits| bits.width),
        }
        .serialize(serializer)
    }
}

/// Serializes descriptors as a JSON array, preserving order.
#[cfg(feature = "json")]
pub fn descriptors_to_json(fields: &[FlatFieldDescriptor]) -> Result<String, serde_json::Error> {
    serde_json::to_string(fields)
}

/// Serializes a padded layout as a JSON object with `entries` and `total_size`.
#[cfg(feature = "json")]
pub fn layout_to_json(layout: &crate::packed::PackedLayout) -> Result<String, serde_json::Error> {
    serde_json::to_string(layout)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{compiled::flatten, packed::LayoutOptions};

    fn schema_json() -> serde_json::Value {
        json!({
            "structs": [
                {
                    "name": "MESSAGE",
                    "entries": [
                        { "kind": "struct", "name": "MESSAGE_HEADER", "size": 6, "offset": 0 },
                        { "kind": "field", "name": "NoOfRecords", "type": "SHORT", "size": 2, "offset": 6 },
                        { "kind": "struct", "name": "FLAGS", "count": 2 }
                    ]
                },
                {
                    "name": "MESSAGE_HEADER",
                    "entries": [
                        { "kind": "field", "name": "TransactionCode", "type": "SHORT", "size": 2 },
                        { "kind": "field", "name": "LogTime", "type": "LONG", "size": 4 }
                    ]
                },
                {
                    "name": "FLAGS",
                    "entries": [
                        { "kind": "field", "name": "Buy", "type": "BIT", "size": 1 },
                        { "kind": "field", "name": "Sell", "type": "BIT", "size": 1 }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_schema_def_into_registry() {
        let def: SchemaDef = serde_json::from_value(schema_json()).unwrap();
        let registry = SchemaRegistry::try_from(def).unwrap();

        let fields = flatten(&registry, "MESSAGE").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.qualified_name.as_str()).collect();

        assert_eq!(
            names,
            [
                "MESSAGE_HEADER.TransactionCode",
                "MESSAGE_HEADER.LogTime",
                "NoOfRecords",
                "FLAGS[0].Buy",
                "FLAGS[0].Sell",
                "FLAGS[1].Buy",
                "FLAGS[1].Sell"
            ]
        );
    }

    #[test]
    fn test_unknown_keyword_in_schema_file() {
        let def: SchemaDef = serde_json::from_value(json!({
            "structs": [
                { "name": "S", "entries": [ { "kind": "field", "name": "x", "type": "NIBBLE", "size": 1 } ] }
            ]
        }))
        .unwrap();

        assert!(matches!(
            SchemaRegistry::try_from(def),
            Err(SchemaError::UnknownTypeKeyword { .. })
        ));
    }

    #[test]
    fn test_allow_duplicates() {
        let record = json!({
            "name": "BCAST_HEADER",
            "entries": [
                { "kind": "field", "name": "Reserved", "type": "CHAR", "size": 2 },
                { "kind": "field", "name": "Reserved", "type": "CHAR", "size": 2 }
            ]
        });

        let strict: RecordDef = serde_json::from_value(record.clone()).unwrap();
        assert!(StructDef::try_from(strict).is_err());

        let mut lenient: RecordDef = serde_json::from_value(record).unwrap();
        lenient.allow_duplicates = true;
        assert_eq!(StructDef::try_from(lenient).unwrap().len(), 2);
    }

    #[test]
    fn test_descriptor_wire_format() {
        let def: SchemaDef = serde_json::from_value(schema_json()).unwrap();
        let registry = SchemaRegistry::try_from(def).unwrap();
        let fields = flatten(&registry, "MESSAGE").unwrap();

        let value = serde_json::to_value(&fields[..4]).unwrap();
        assert_eq!(
            value,
            json!([
                { "qualified_name": "MESSAGE_HEADER.TransactionCode", "type_tag": "int16", "length": 2, "offset": 0 },
                { "qualified_name": "MESSAGE_HEADER.LogTime", "type_tag": "int32", "length": 4, "offset": 2 },
                { "qualified_name": "NoOfRecords", "type_tag": "int16", "length": 2, "offset": 6 },
                { "qualified_name": "FLAGS[0].Buy", "type_tag": "bitfield", "length": 1, "offset": 8, "bit_offset": 0, "bit_width": 1 }
            ])
        );
    }

    #[test]
    fn test_layout_options_defaults() {
        let options: LayoutOptions = serde_json::from_value(json!({ "alignment": 4 })).unwrap();
        assert_eq!(options, LayoutOptions::with_alignment(4));

        let options: LayoutOptions = serde_json::from_value(json!({ "offsets": "pre_padding" })).unwrap();
        assert_eq!(options.alignment, 2);
    }
}
