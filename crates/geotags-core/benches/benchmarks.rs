//! Parser, geometry and range-search benchmarks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geotags_core::math::{distance, EARTH_RADIUS};
use geotags_core::prelude::*;
use geotags_core::tokens;
use std::hint::black_box;

// ============================================================================
// Test Data Generation
// ============================================================================

/// A store with `count` primary coordinates on a grid around a centre point,
/// one page per coordinate.
fn populated_store(count: usize, center_lat: f64, center_lon: f64, spread_deg: f64) -> MemoryStore {
    let config = GeoConfig::default();
    let side = (count as f64).sqrt().ceil() as usize;
    let step = spread_deg / side as f64;
    let mut store = MemoryStore::new();
    let rows: Vec<StoredRow> = (0..count)
        .map(|i| {
            let lat = center_lat - spread_deg / 2.0 + (i / side) as f64 * step;
            let lon = center_lon - spread_deg / 2.0 + (i % side) as f64 * step;
            let coord = Coord::earth(lat, lon).with_primary(true);
            StoredRow::from_coord(&coord, i as PageId + 1, config.index_granularity)
        })
        .collect();
    store.insert_rows(rows).expect("in-memory insert");
    store
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let parser = CoordinateParser::default();
    let earth = Globe::earth();
    let mut group = c.benchmark_group("parse");

    let decimal = tokens![37.786971, -122.399677];
    group.bench_function("decimal", |b| {
        b.iter(|| parser.parse_coordinates(black_box(&decimal), &earth))
    });

    let dms = tokens![20, 30, 40, "S", 40, 45, 55, "E"];
    group.bench_function("dms", |b| {
        b.iter(|| parser.parse_coordinates(black_box(&dms), &earth))
    });

    let invocation = ["55.7558", "37.6173", "primary", "type=city", "region=RU-MOW"];
    group.bench_function("invocation", |b| {
        b.iter(|| parser.parse_invocation(black_box(&invocation)))
    });

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    c.bench_function("distance/haversine", |b| {
        b.iter(|| {
            distance(
                black_box(37.786971),
                black_box(-122.399677),
                black_box(40.7128),
                black_box(-74.006),
                EARTH_RADIUS,
            )
        })
    });

    let center = Coord::earth(37.786971, -122.399677);
    let earth = Globe::earth();
    c.bench_function("distance/bbox_around", |b| {
        b.iter(|| center.bbox_around(black_box(10_000.0), &earth))
    });
}

fn bench_range_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_search");

    for count in [1_000usize, 10_000, 50_000] {
        let store = populated_store(count, 48.0, 11.0, 4.0);
        let service = SearchService::new(GeoConfig::default(), &store);

        group.bench_with_input(BenchmarkId::new("radius_10km", count), &count, |b, _| {
            b.iter(|| {
                service.search(SearchParams {
                    coord: Some("48.0|11.0".to_string()),
                    radius: Some(10_000.0),
                    limit: Some(50),
                    ..SearchParams::default()
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_distance, bench_range_search);
criterion_main!(benches);
