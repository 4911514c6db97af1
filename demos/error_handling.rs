//! Error handling example for geotags-rs
//!
//! This example demonstrates parse errors, tag policies and search validation

use geotags_core::prelude::*;

fn main() -> Result<()> {
    println!("=== GeoTags-RS Error Handling Example ===\n");

    let parser = CoordinateParser::default();

    // Example 1: Malformed coordinates
    println!("--- Example 1: Rejected coordinates ---");
    let inputs: [&[&str]; 4] = [
        &["91", "0"],
        &["10", "N", "200", "E"],
        &["-10", "S", "20", "E"],
        &["10", "20", "30"],
    ];
    for parts in inputs {
        match parser.parse_invocation(parts) {
            Ok(parsed) => println!("  Parsed: {} {}", parsed.coord.lat, parsed.coord.lon),
            Err(e) => println!("  ✗ {:?}: {e}", parts.join(" ")),
        }
    }
    println!();

    // Example 2: Warnings under the default policy
    println!("--- Example 2: Unknown globe and type ---");
    let parsed = parser.parse_invocation(&["45", "300", "globe=zorblax", "type=volcano"])?;
    for warning in &parsed.warnings {
        println!("  ⚠ {warning:?} (category {})", warning.tracking_category());
    }
    println!();

    // Example 3: Fail policy turns warnings into errors
    println!("--- Example 3: Strict policy ---");
    let strict = CoordinateParser::new(GeoConfig {
        warning_level: WarningPolicy {
            unknown_globe: WarningLevel::Fail,
            ..WarningPolicy::default()
        },
        ..GeoConfig::default()
    });
    match strict.parse_invocation(&["45", "300", "globe=zorblax"]) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(e) => println!("  ✗ {e}"),
    }
    println!();

    // Example 4: Coordinate cap and duplicate primaries
    println!("--- Example 4: Coordinate set outcomes ---");
    let mut set = CoordinateSet::new(2);
    let candidates = [
        Coord::earth(1.0, 1.0).with_primary(true),
        Coord::earth(2.0, 2.0).with_primary(true),
        Coord::earth(3.0, 3.0),
        Coord::earth(4.0, 4.0),
    ];
    for coord in candidates {
        let (lat, lon) = (coord.lat, coord.lon);
        println!("  add ({}, {}) -> {:?}", lat, lon, set.add(coord));
    }
    println!();

    // Example 5: Invalid searches
    println!("--- Example 5: Search validation ---");
    let store = MemoryStore::new();
    let service = SearchService::new(GeoConfig::default(), &store);
    let requests = [
        SearchParams::default(),
        SearchParams {
            coord: Some("10|20".to_string()),
            bbox: Some("11|19|9|21".to_string()),
            radius: Some(1_000.0),
            ..SearchParams::default()
        },
        SearchParams {
            coord: Some("10|20".to_string()),
            radius: Some(50_000.0),
            ..SearchParams::default()
        },
        SearchParams {
            bbox: Some("10|170|10|170".to_string()),
            ..SearchParams::default()
        },
        SearchParams {
            page: Some(99),
            radius: Some(1_000.0),
            ..SearchParams::default()
        },
    ];
    for params in requests {
        match service.search(params) {
            Ok(response) => println!("  ✓ {} hits", response.hits.len()),
            Err(e) => println!("  ✗ {e}"),
        }
    }

    Ok(())
}
