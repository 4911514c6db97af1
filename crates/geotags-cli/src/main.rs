//! geotags — Command-line interface for geotags-core
//!
//! Usage examples
//! --------------
//!
//! - Parse a coordinate tag
//!   $ geotags parse 10 N 20 E type=city
//!   $ geotags parse --format dms 51.5 -0.12
//!
//! - Distance and bounding box
//!   $ geotags distance "0|0" "0|1"
//!   $ geotags bbox "55.75|37.62" 5000
//!
//! - Tag a page and search around it
//!   $ geotags tag 42 "55.75|37.62|primary|type=city"
//!   $ geotags search --coord "55.7|37.6" --radius 10000
//!   $ geotags list 42 --primary all
//!
//! Logging goes through `tracing`; set `RUST_LOG=debug` to see predicates,
//! queries and reconcile plans.
mod args;

use crate::args::{CliArgs, Commands, OutputFormat};
use anyhow::Context;
use clap::Parser;
use geotags_core::parser::format::{to_decimal_tokens, to_dms_tokens};
use geotags_core::prelude::*;
use geotags_core::search::{list_coordinates, ListOptions};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => GeoConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GeoConfig::default(),
    };
    let parser = CoordinateParser::new(config.clone());

    match args.command {
        Commands::Parse { format, parts } => {
            let parsed = parser.parse_invocation(&parts)?;
            let globe = parser.globe(&parsed.coord.globe);
            match format {
                OutputFormat::Decimal => println!("{}", join(&to_decimal_tokens(&parsed.coord, &globe))),
                OutputFormat::Dms => println!("{}", join(&to_dms_tokens(&parsed.coord, &globe))),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed.coord)?),
            }
            for warning in &parsed.warnings {
                eprintln!("warning: {warning:?} [{}]", warning.tracking_category());
            }
        }

        Commands::Distance { from, to, globe } => {
            let globe = parser.globe(globe.as_deref().unwrap_or(&config.default_globe));
            let from = parse_point(&parser, &from, &globe)?;
            let to = parse_point(&parser, &to, &globe)?;
            println!("{:.1} m", from.distance_to(&to, &globe));
        }

        Commands::Bbox { coord, radius, globe } => {
            let globe = parser.globe(globe.as_deref().unwrap_or(&config.default_globe));
            let center = parse_point(&parser, &coord, &globe)?;
            let bbox = center.bbox_around(radius, &globe);
            println!("top:    {:.6}", bbox.top);
            println!("left:   {:.6}", bbox.left);
            println!("bottom: {:.6}", bbox.bottom);
            println!("right:  {:.6}", bbox.right);
            if bbox.crosses_antimeridian() {
                println!("(crosses the antimeridian)");
            }
        }

        Commands::Globes => {
            let registry = parser.registry();
            println!("{} globes:", registry.len());
            for name in registry.names() {
                let globe = registry.lookup(name);
                let radius = globe
                    .radius()
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.0} m"));
                println!(
                    "- {:<12} lon {:>4}..{:<4} east {:+}  radius {}",
                    globe.name(),
                    globe.min_longitude(),
                    globe.max_longitude(),
                    globe.east_sign(),
                    radius
                );
            }
        }

        Commands::Tag {
            page,
            namespace,
            invocations,
        } => {
            let mut store = open_store(&args.store)?;
            if store.page(page).is_none() {
                store.upsert_page(page, namespace, None);
            }

            let mut set = CoordinateSet::from_config(&config);
            for invocation in &invocations {
                let parts: Vec<&str> = invocation.split('|').collect();
                match parser.parse_invocation(&parts) {
                    Ok(parsed) => {
                        if let AddOutcome::Warned(warning) = set.add(parsed.coord) {
                            eprintln!("warning: {warning:?} [{}]", warning.tracking_category());
                        }
                    }
                    Err(e) => eprintln!("error in '{invocation}': {e}"),
                }
            }

            let stats = Reconciler::new(&config).reconcile(&mut store, page, &set)?;
            store.save_snapshot(&args.store)?;
            println!(
                "page {page}: {} coordinates, {} inserted, {} deleted",
                set.len(),
                stats.inserted,
                stats.deleted
            );
        }

        Commands::Search {
            coord,
            page,
            bbox,
            radius,
            max_dim,
            globe,
            primary,
            namespaces,
            props,
            sort,
            limit,
        } => {
            let store = open_store(&args.store)?;
            let params = SearchParams {
                coord,
                page,
                bbox,
                radius,
                max_dim,
                globe,
                primary,
                namespaces,
                props,
                sort,
                limit,
            };
            let service = SearchService::new(config.clone(), &store);
            #[cfg(feature = "http")]
            let service = if config.backend == BackendKind::GeoIndex {
                service.with_engine(geotags_core::search::HttpSearchEngine::new(&config.geo_index)?)
            } else {
                service
            };
            let response = service.search(params)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::List {
            pages,
            primary,
            limit,
            cursor,
            from,
        } => {
            let store = open_store(&args.store)?;
            let distance_from = match from {
                Some(text) => {
                    let globe = parser.globe(&config.default_globe);
                    Some(parse_point(&parser, &text, &globe)?)
                }
                None => None,
            };
            let options = ListOptions {
                primary,
                limit,
                cursor,
                distance_from,
                props: PropSet::all(),
            };
            let listing = list_coordinates(&store, &pages, &options, &config)?;
            println!("{}", serde_json::to_string_pretty(&listing.items)?);
            if let Some(next) = listing.next {
                println!("continue: {next}");
            }
        }
    }

    Ok(())
}

/// Parses `lat|lon` (or the longer positional forms, `|`-separated).
fn parse_point(parser: &CoordinateParser, text: &str, globe: &Globe) -> anyhow::Result<Coord> {
    let tokens: Vec<Token> = text.split('|').map(|t| Token::from(t.trim())).collect();
    parser
        .parse_coordinates(&tokens, globe)
        .with_context(|| format!("invalid coordinate '{text}'"))
}

fn open_store(path: &Path) -> anyhow::Result<MemoryStore> {
    if path.exists() {
        MemoryStore::load_snapshot(path).with_context(|| format!("loading store {}", path.display()))
    } else {
        tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
        Ok(MemoryStore::new())
    }
}

fn join(tokens: &[Token]) -> String {
    tokens.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}
