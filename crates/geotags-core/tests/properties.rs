//! Property tests for parsing, geometry and reconciliation.

use geotags_core::math::{distance, wrap_around, EARTH_RADIUS};
use geotags_core::prelude::*;
use proptest::prelude::*;

/// Latitude on the micro-degree grid, so formatting to six decimals is exact.
fn micro_lat() -> impl Strategy<Value = f64> {
    (-90_000_000i64..=90_000_000).prop_map(|v| v as f64 / 1e6)
}

fn micro_lon() -> impl Strategy<Value = f64> {
    (-180_000_000i64..=180_000_000).prop_map(|v| v as f64 / 1e6)
}

fn earth_coord() -> impl Strategy<Value = Coord> {
    (micro_lat(), micro_lon(), any::<bool>(), prop::option::of(1u32..1_000_000))
        .prop_map(|(lat, lon, primary, dim)| {
            let mut coord = Coord::earth(lat, lon).with_primary(primary);
            coord.dim = dim;
            coord
        })
}

proptest! {
    /// Property: decimal formatting parses back to an equal coordinate.
    #[test]
    fn prop_decimal_round_trip(lat in micro_lat(), lon in micro_lon()) {
        let parser = CoordinateParser::default();
        let earth = Globe::earth();
        let coord = Coord::earth(lat, lon);
        let tokens = to_decimal_tokens(&coord, &earth);
        let parsed = parser.parse_coordinates(&tokens, &earth).unwrap();
        prop_assert!(parsed.equals_to(&coord), "{:?} != {:?}", parsed, coord);
    }

    /// Property: DMS formatting parses back to within a tenth of a metre.
    #[test]
    fn prop_dms_round_trip(lat in micro_lat(), lon in micro_lon()) {
        let parser = CoordinateParser::default();
        let earth = Globe::earth();
        let coord = Coord::earth(lat, lon);
        let tokens = to_dms_tokens(&coord, &earth);
        let parsed = parser.parse_coordinates(&tokens, &earth).unwrap();
        prop_assert!(parsed.distance_to(&coord, &earth) < 0.1);
    }

    /// Property: loose equality is symmetric and never holds across globes.
    #[test]
    fn prop_equality_symmetric(a in earth_coord(), b in earth_coord()) {
        prop_assert_eq!(a.equals_to(&b), b.equals_to(&a));
        prop_assert!(a.equals_to(&a));
        let mut moon = a.clone();
        moon.globe = "moon".to_string();
        prop_assert!(!a.equals_to(&moon));
    }

    /// Property: distance is symmetric, non-negative and zero to self.
    #[test]
    fn prop_distance_symmetric(
        lat1 in micro_lat(), lon1 in micro_lon(),
        lat2 in micro_lat(), lon2 in micro_lon(),
    ) {
        let ab = distance(lat1, lon1, lat2, lon2, EARTH_RADIUS);
        let ba = distance(lat2, lon2, lat1, lon1, EARTH_RADIUS);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!(distance(lat1, lon1, lat1, lon1, EARTH_RADIUS) < 1e-6);
        prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS + 1e-3);
    }

    /// Property: wrapping an already wrapped interval changes nothing.
    #[test]
    fn prop_wrap_idempotent(from in -540.0f64..540.0, width in 0.0f64..359.0) {
        let once = wrap_around(from, from + width, -180.0, 180.0);
        let twice = wrap_around(once.0, once.1, -180.0, 180.0);
        prop_assert_eq!(once, twice);
    }

    /// Property: reconciling the same set twice writes nothing the second time.
    #[test]
    fn prop_reconcile_idempotent(coords in prop::collection::vec(earth_coord(), 0..12)) {
        let config = GeoConfig::default();
        let reconciler = Reconciler::new(&config);
        let mut store = MemoryStore::new();
        let set = CoordinateSet::from_coords(config.max_coordinates_per_page, coords);

        reconciler.reconcile(&mut store, 1, &set).unwrap();
        let stored = store.coordinates_for_page(1).unwrap();
        prop_assert!(plan(&set, &stored).is_empty());
        let stats = reconciler.reconcile(&mut store, 1, &set).unwrap();
        prop_assert_eq!(stats, ReconcileStats::default());
    }
}
