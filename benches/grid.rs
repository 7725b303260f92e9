use criterion::{black_box, criterion_group, criterion_main, Criterion};

use worldgrid::data::{plain_template, TemplateRegistry};
use worldgrid::save::{decode, encode, from_grid, to_grid};
use worldgrid::world::{generate_default, generate_terrain};

fn bench_generation(c: &mut Criterion) {
    let template = plain_template();
    c.bench_function("generate_default 128x128", |b| {
        b.iter(|| generate_default(black_box(128), black_box(128), &template))
    });

    let registry = TemplateRegistry::with_builtins();
    c.bench_function("generate_terrain 128x128", |b| {
        b.iter(|| generate_terrain(128, 128, black_box(42), &registry))
    });
}

fn bench_map_file(c: &mut Criterion) {
    let registry = TemplateRegistry::with_builtins();
    let grid = generate_terrain(64, 64, 7, &registry).unwrap();
    let text = encode(&from_grid(&grid)).unwrap();

    c.bench_function("encode 64x64", |b| b.iter(|| encode(&from_grid(black_box(&grid)))));
    c.bench_function("decode 64x64", |b| {
        b.iter(|| {
            let record = decode(black_box(&text)).unwrap();
            to_grid(&record, &registry)
        })
    });
}

criterion_group!(benches, bench_generation, bench_map_file);
criterion_main!(benches);
