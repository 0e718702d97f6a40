//! Benchmarks for FolioDB storage and query operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use foliodb::{Config, Database, PageCapacity};
use tempfile::TempDir;

fn populated_db(rows: usize, indexed: bool) -> (TempDir, Database) {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp.path()).build();
    let db = Database::open(config).unwrap();

    db.create_table_with_capacity("bench", PageCapacity::Bounded(100), &["id", "bucket"])
        .unwrap();
    for i in 0..rows {
        db.insert("bench", vec![i.to_string(), format!("b{}", i % 10)])
            .unwrap();
    }
    if indexed {
        db.create_index("bench", "bucket").unwrap();
    }
    (temp, db)
}

fn insert_benchmark(c: &mut Criterion) {
    c.bench_function("insert_1000_rows", |b| {
        b.iter_batched(
            || {
                let temp = TempDir::new().unwrap();
                let config = Config::builder().data_dir(temp.path()).build();
                let db = Database::open(config).unwrap();
                db.create_table_with_capacity(
                    "bench",
                    PageCapacity::Bounded(100),
                    &["id", "bucket"],
                )
                .unwrap();
                (temp, db)
            },
            |(_temp, db)| {
                for i in 0..1000 {
                    db.insert("bench", vec![i.to_string(), format!("b{}", i % 10)])
                        .unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn select_benchmarks(c: &mut Criterion) {
    let (_temp_scan, scan_db) = populated_db(1000, false);
    c.bench_function("select_full_scan_1000", |b| {
        b.iter(|| scan_db.select_where("bench", &["bucket"], &["b3"]).unwrap());
    });

    let (_temp_idx, idx_db) = populated_db(1000, true);
    c.bench_function("select_all_indexed_1000", |b| {
        b.iter(|| idx_db.select_where("bench", &["bucket"], &["b3"]).unwrap());
    });
}

criterion_group!(benches, insert_benchmark, select_benchmarks);
criterion_main!(benches);
