//! Error types for schema construction, flattening and layout computation.

/// Errors produced while building a [crate::schema::SchemaRegistry], flattening a
/// struct, or computing a padded layout.
///
/// Every variant carries enough context to locate the offending schema entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A primitive type keyword is not part of the closed keyword set.
    #[error("unknown type keyword `{keyword}` for field `{field}` in struct `{struct_name}`")]
    UnknownTypeKeyword {
        keyword: String,
        struct_name: String,
        field: String,
    },
    /// A struct reference names a struct absent from the registry.
    #[error("unknown struct: {name}")]
    UnknownStruct { name: String },
    /// A struct is (directly or transitively) referenced while it is being expanded.
    #[error("cyclic struct reference: {name}")]
    CyclicReference {
        name: String,
        /// Expansion path from the root to the repeated struct, inclusive.
        path: Vec<String>,
    },
    /// A struct reference has a repeat count of zero.
    #[error("invalid repeat count {count} for `{entry}` in struct `{struct_name}`")]
    InvalidRepeatCount {
        struct_name: String,
        entry: String,
        count: usize,
    },
    /// A field size is zero.
    #[error("invalid size {size} for field `{field}` in `{struct_name}`")]
    InvalidFieldSize {
        struct_name: String,
        field: String,
        size: usize,
    },
    /// Alignment is zero.
    #[error("invalid alignment {alignment}")]
    InvalidAlignment { alignment: usize },
    /// A bit field width is zero or does not fit in a byte.
    #[error("invalid bit width {width} for field `{field}` in struct `{struct_name}`")]
    InvalidBitWidth {
        struct_name: String,
        field: String,
        width: usize,
    },
    /// The same field name appears twice in one struct or field list.
    #[error("duplicate field `{field}` in `{struct_name}`")]
    DuplicateField { struct_name: String, field: String },
    /// A field's end offset does not fit in `usize`.
    #[error("layout overflow at field `{field}` in `{struct_name}`")]
    LayoutOverflow { struct_name: String, field: String },
    /// The same struct name is registered twice.
    #[error("duplicate struct `{name}`")]
    DuplicateStruct { name: String },
    /// A struct or field name is empty.
    #[error("empty name in `{context}`")]
    EmptyName { context: String },
}
