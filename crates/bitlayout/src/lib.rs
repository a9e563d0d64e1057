//! # bitlayout
//!
//! A compiler for fixed-layout binary record schemas.
//!
//! Describe records as structs of primitive fields, bit fields, nested structs
//! and fixed-size arrays of structs, then flatten a root struct into an ordered
//! list of leaves with qualified names, canonical type tags, sizes and byte
//! offsets. A separate calculator lays out flat `(name, size)` lists under an
//! explicit alignment rule. Nothing here reads or writes record bytes; the output
//! is the metadata a binary reader needs.
//!
//! ## Example
//!
//! ```
//! use bitlayout::compiled::flatten;
//! use bitlayout::field::StructRef;
//! use bitlayout::schema::{SchemaRegistry, StructDef};
//!
//! let outer = StructDef::builder("Outer")
//!     .field("x", "SHORT", 2)
//!     .struct_ref(StructRef::new("Inner").repeated(2))
//!     .build()
//!     .unwrap();
//! let inner = StructDef::builder("Inner").field("y", "LONG", 4).build().unwrap();
//! let registry = SchemaRegistry::build([outer, inner]).unwrap();
//!
//! let fields = flatten(&registry, "Outer").unwrap();
//! let names: Vec<&str> = fields.iter().map(|f| f.qualified_name.as_str()).collect();
//! assert_eq!(names, ["x", "Inner[0].y", "Inner[1].y"]);
//! assert_eq!(fields[2].offset, 6);
//! ```
//!
//! Padded layout of a flat field list:
//!
//! ```
//! use bitlayout::packed::{calculate_packed_layout, LayoutOptions};
//!
//! let layout = calculate_packed_layout(&[("a", 1), ("b", 4)], &LayoutOptions::with_alignment(4)).unwrap();
//! assert_eq!(layout.entries[1].offset, 4);
//! assert_eq!(layout.entries[1].padding_bytes, 3);
//! assert_eq!(layout.total_size, 8);
//! ```

pub mod bits;
pub mod compiled;
pub mod errors;
pub mod field;
pub mod packed;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod tag;
