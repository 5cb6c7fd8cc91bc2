//! Benchmarks for the recommendation sources
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic table (600 titles, 2000 users) so the benchmark runs
//! without the Book-Crossing exports.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{RatingRecord, RatingsTable};
use sources::{ContentModel, NeighborModel, PopularityRanker};

const WORDS: [&str; 12] = [
    "river", "shadow", "garden", "winter", "empire", "silent", "harvest", "ember", "tides",
    "orchard", "lantern", "voyage",
];

fn synthetic_table() -> RatingsTable {
    let mut records = Vec::new();
    for book in 0..600u32 {
        let title = format!(
            "{} {} {}",
            WORDS[(book % 12) as usize],
            WORDS[(book / 12 % 12) as usize],
            book
        );
        // Popular books get more raters
        let raters = 40 + (book * 7) % 120;
        for r in 0..raters {
            let user = (book * 31 + r * 17) % 2000;
            let rating = 1 + ((book + user) % 10) as u8;
            records.push(RatingRecord::new(title.clone(), user, rating));
        }
    }
    RatingsTable::from_records(records)
}

fn bench_build_models(c: &mut Criterion) {
    let table = synthetic_table();

    c.bench_function("neighbor_model_build", |b| {
        b.iter(|| black_box(NeighborModel::build(black_box(&table))))
    });
    c.bench_function("content_model_build", |b| {
        b.iter(|| black_box(ContentModel::build(black_box(&table))))
    });
}

fn bench_queries(c: &mut Criterion) {
    let table = synthetic_table();
    let knn = NeighborModel::build(&table);
    let content = ContentModel::build(&table);
    let popular = PopularityRanker::build(&table);

    c.bench_function("knn_recommend", |b| {
        b.iter(|| black_box(knn.knn_recommend(black_box("winter"), 5)))
    });
    c.bench_function("content_recommend", |b| {
        b.iter(|| black_box(content.content_recommend(black_box("winter"), 5)))
    });
    c.bench_function("popularity_based", |b| {
        b.iter(|| black_box(popular.popularity_based(black_box(5))))
    });
}

criterion_group!(benches, bench_build_models, bench_queries);
criterion_main!(benches);
