//! Basic usage example for geotags-rs
//!
//! This example demonstrates how to:
//! - Parse coordinate tags in decimal and DMS notation
//! - Collect a page's coordinates and reconcile them into a store
//! - Run radius and bounding-box searches

use geotags_core::prelude::*;

fn main() -> Result<()> {
    println!("=== GeoTags-RS Basic Usage Example ===\n");

    let config = GeoConfig::default();
    let parser = CoordinateParser::new(config.clone());

    // Example 1: Parse a tag invocation
    println!("--- Example 1: Parse a tag ---");
    let parsed = parser.parse_invocation(&["37.786971", "-122.399677", "primary", "type=city"])?;
    println!(
        "lat {} lon {} on {} (dim {:?}, type {:?})",
        parsed.coord.lat, parsed.coord.lon, parsed.coord.globe, parsed.coord.dim, parsed.coord.type_
    );
    println!();

    // Example 2: Degrees, minutes, seconds
    println!("--- Example 2: DMS notation ---");
    let earth = Globe::earth();
    let dms = parser.parse_coordinates(&tokens![20, 30, 40, "S", 40, 45, 55, "E"], &earth)?;
    println!("Parsed: {:.6}, {:.6}", dms.lat, dms.lon);
    let rendered: Vec<String> = to_dms_tokens(&dms, &earth).iter().map(ToString::to_string).collect();
    println!("Rendered back: {}", rendered.join(" "));
    println!();

    // Example 3: Store coordinates for a few pages
    println!("--- Example 3: Reconcile pages into a store ---");
    let mut store = MemoryStore::new();
    let reconciler = Reconciler::new(&config);
    let pages = [
        (1, vec!["37.786971", "-122.399677", "primary", "name=Downtown"]),
        (2, vec!["37.8044", "-122.2712", "primary", "name=Oakland"]),
        (3, vec!["37.7749", "-122.4194", "primary", "name=Civic Center"]),
        (4, vec!["40.7128", "-74.0060", "primary", "name=New York"]),
    ];
    for (page_id, parts) in pages {
        let mut set = CoordinateSet::from_config(&config);
        set.add(parser.parse_invocation(&parts)?.coord);
        let stats = reconciler.reconcile(&mut store, page_id, &set)?;
        println!("page {page_id}: {} inserted, {} deleted", stats.inserted, stats.deleted);
    }
    println!("✓ Store holds {} rows\n", store.row_count());

    // Example 4: Radius search
    println!("--- Example 4: Pages within 10 km of downtown ---");
    let service = SearchService::new(config.clone(), &store);
    let response = service.search(SearchParams {
        coord: Some("37.786971|-122.399677".to_string()),
        radius: Some(10_000.0),
        props: PropSet::all(),
        ..SearchParams::default()
    })?;
    for hit in &response.hits {
        println!(
            "- page {} {:?}: {:.0} m",
            hit.page_id,
            hit.coord.name,
            hit.distance.unwrap_or_default()
        );
    }
    println!();

    // Example 5: Bounding-box search
    println!("--- Example 5: Pages inside a box ---");
    let response = service.search(SearchParams {
        bbox: Some("37.80|-122.42|37.70|-122.30".to_string()),
        sort: SortMode::Relevance,
        ..SearchParams::default()
    })?;
    println!("Found {} pages in the downtown box", response.hits.len());

    Ok(())
}
