// crates/geotags-core/src/lib.rs

//! Coordinate parsing, spherical geometry and proximity search for
//! geotagged pages.
//!
//! Text goes through the [`parser`] into a [`Coord`], coordinates of one
//! page are collected in a [`CoordinateSet`], and the [`reconcile`] module
//! writes the difference to a [`store::CoordStore`]. Reads go through
//! [`search`], which answers radius and bounding-box queries either with
//! range predicates over the store or through a search engine.

pub mod config;
pub mod coord;
pub mod coord_set;
pub mod error;
pub mod globe;
pub mod io;
pub mod math;
pub mod parser;
pub mod prelude;
pub mod reconcile;
pub mod search;
pub mod store;
pub mod text;

// Re-exports
pub use crate::config::{BackendKind, GeoConfig, WarningLevel, WarningPolicy};
pub use crate::coord::{BoundingBox, Coord, PageId};
pub use crate::coord_set::{AddOutcome, CoordinateSet, SetWarning};
pub use crate::error::{GeoError, ParseError, Result, SearchError};
pub use crate::globe::{Globe, GlobeRegistry};
pub use crate::parser::{CoordinateParser, ParsedTag, TagWarning, Token};
pub use crate::reconcile::{ReconcileStats, Reconciler};
pub use crate::search::{SearchParams, SearchResponse, SearchService};
pub use crate::store::{CoordStore, MemoryStore};
