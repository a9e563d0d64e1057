use bitlayout::{
    compiled::{RecordOptions, compile},
    field::StructRef,
    packed::{LayoutOptions, calculate_packed_layout},
    schema::{SchemaRegistry, StructDef},
};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_registry(field_count: usize, repeat: usize) -> SchemaRegistry {
    let mut leaf = StructDef::builder("Leaf");
    for i in 0..field_count {
        leaf = leaf.field(format!("f{}", i), "LONG", 4);
    }

    let root = StructDef::builder("Root")
        .field("header", "SHORT", 2)
        .struct_ref(StructRef::new("Leaf").repeated(repeat))
        .build()
        .unwrap();

    SchemaRegistry::build([root, leaf.build().unwrap()]).unwrap()
}

fn bench_flatten(c: &mut Criterion) {
    for &(field_count, repeat) in &[(1usize, 1usize), (10, 4), (50, 16), (100, 64)] {
        let registry = gen_registry(field_count, repeat);
        let options = RecordOptions::default();

        c.bench_function(&format!("flatten_{}x{}_fields", field_count, repeat), |b| {
            b.iter(|| {
                let _ = compile(&registry, "Root", &options).unwrap();
            })
        });
    }
}

fn bench_packed_layout(c: &mut Criterion) {
    for &field_count in &[10usize, 100, 1000] {
        let fields: Vec<(String, usize)> = (0..field_count)
            .map(|i| (format!("f{}", i), i % 7 + 1))
            .collect();
        let options = LayoutOptions::with_alignment(4);

        c.bench_function(&format!("packed_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = calculate_packed_layout(&fields, &options).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_flatten, bench_packed_layout);
criterion_main!(benches);
