use bitlayout::{
    compiled::{RecordOptions, compile, flatten},
    field::StructRef,
    packed::{LayoutOptions, OffsetConvention, calculate_packed_layout},
    schema::{SchemaRegistry, StructDef},
};
use proptest::prelude::*;

fn named(sizes: &[usize]) -> Vec<(String, usize)> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| (format!("f{}", i), size))
        .collect()
}

fn array_registry(leaves: &[usize], count: usize) -> SchemaRegistry {
    let mut element = StructDef::builder("Element");
    for (i, &size) in leaves.iter().enumerate() {
        element = element.field(format!("v{}", i), "CHAR", size);
    }

    let root = StructDef::builder("Root")
        .field("head", "SHORT", 2)
        .struct_ref(StructRef::new("Element").repeated(count))
        .field("tail", "BYTE", 1)
        .build()
        .unwrap();

    SchemaRegistry::build([root, element.build().unwrap()]).unwrap()
}

proptest! {
    #[test]
    fn packed_sizes_and_padding_sum_to_total(
        sizes in prop::collection::vec(1usize..64, 0..40),
        alignment in 1usize..16,
    ) {
        let layout = calculate_packed_layout(&named(&sizes), &LayoutOptions::with_alignment(alignment)).unwrap();

        let sum: usize = layout.entries.iter().map(|e| e.size_bytes + e.padding_bytes).sum();
        prop_assert_eq!(sum, layout.total_size);

        for entry in &layout.entries {
            prop_assert!(entry.padding_bytes < alignment);
            prop_assert_eq!(entry.offset % alignment, 0);
        }
    }

    #[test]
    fn pre_padding_offsets_trail_aligned_offsets_by_padding(
        sizes in prop::collection::vec(1usize..64, 1..40),
        alignment in 1usize..16,
    ) {
        let fields = named(&sizes);
        let aligned = calculate_packed_layout(&fields, &LayoutOptions::with_alignment(alignment)).unwrap();
        let legacy = calculate_packed_layout(&fields, &LayoutOptions {
            alignment,
            offsets: OffsetConvention::PrePadding,
            ..Default::default()
        }).unwrap();

        prop_assert_eq!(aligned.total_size, legacy.total_size);
        for (a, l) in aligned.entries.iter().zip(&legacy.entries) {
            prop_assert_eq!(a.offset, l.offset + l.padding_bytes);
        }
    }

    #[test]
    fn array_expansion_yields_indexed_blocks(
        leaves in prop::collection::vec(1usize..16, 1..6),
        count in 2usize..8,
    ) {
        let registry = array_registry(&leaves, count);
        let fields = flatten(&registry, "Root").unwrap();

        prop_assert_eq!(fields.len(), 2 + leaves.len() * count);
        prop_assert_eq!(fields[0].qualified_name.as_str(), "head");
        prop_assert_eq!(fields[fields.len() - 1].qualified_name.as_str(), "tail");

        let blocks = &fields[1..fields.len() - 1];
        for (i, block) in blocks.chunks(leaves.len()).enumerate() {
            for (j, field) in block.iter().enumerate() {
                prop_assert_eq!(&field.qualified_name, &format!("Element[{}].v{}", i, j));
                prop_assert_eq!(field.size_bytes, leaves[j]);
            }
        }
    }

    #[test]
    fn packed_record_offsets_are_contiguous(
        leaves in prop::collection::vec(1usize..16, 1..6),
        count in 1usize..8,
    ) {
        let registry = array_registry(&leaves, count);
        let layout = compile(&registry, "Root", &RecordOptions::default()).unwrap();

        let mut expected = 0;
        for field in &layout.fields {
            prop_assert_eq!(field.offset, expected);
            expected += field.size_bytes;
        }
        prop_assert_eq!(layout.total_size, expected);
        prop_assert_eq!(registry.struct_size("Root").unwrap(), expected);
    }

    #[test]
    fn flattening_is_deterministic(
        leaves in prop::collection::vec(1usize..16, 1..6),
        count in 1usize..8,
    ) {
        let registry = array_registry(&leaves, count);
        prop_assert_eq!(flatten(&registry, "Root").unwrap(), flatten(&registry, "Root").unwrap());
    }
}
