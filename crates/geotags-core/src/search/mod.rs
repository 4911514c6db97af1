// crates/geotags-core/src/search/mod.rs

//! # Proximity search
//!
//! A search goes through three stages:
//!
//! 1. [`SearchRequest::from_params`] validates raw host parameters (one
//!    locator, radius / box / limit bounds),
//! 2. [`SearchRequest::resolve`] turns the locator into a centre and a
//!    candidate [`BoundingBox`](crate::coord::BoundingBox),
//! 3. a [`QueryBackend`] runs it: [`RangeBackend`] against a relational
//!    store, [`GeoIndexBackend`] against a search engine.
//!
//! [`SearchService`] wires the three together for the backend named in
//! [`GeoConfig::backend`].

pub mod engine;
pub mod geo_index;
pub mod listing;
pub mod range;
pub mod request;

pub use engine::SearchEngine;
#[cfg(feature = "http")]
pub use engine::HttpSearchEngine;
pub use geo_index::{index_document, GeoIndexBackend};
pub use listing::{list_coordinates, Cursor, ListOptions, Listing};
pub use range::{LonRange, RangeBackend, RangePredicate, TileSpan};
pub use request::{
    Locator, PrimaryFilter, PropSet, ResolvedSearch, SearchFilters, SearchParams, SearchRequest,
    SortMode,
};

use crate::config::{BackendKind, GeoConfig};
use crate::coord::{Coord, PageId};
use crate::error::{GeoError, Result};
use crate::globe::Globe;
use crate::parser::CoordinateParser;
use crate::store::{CoordStore, StoredRow};
use serde::Serialize;

/// One result row.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub page_id: PageId,
    /// Stored coordinate, reduced to the requested properties.
    pub coord: Coord,
    /// Metres from the search centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl SearchHit {
    pub(crate) fn from_row(row: &StoredRow, center: &Coord, globe: &Globe) -> Self {
        let mut coord = row.to_coord();
        let distance = center.distance_to(&coord, globe);
        coord.distance = Some(distance);
        Self {
            page_id: row.page_id,
            coord,
            distance: Some(distance),
        }
    }
}

/// Non-fatal conditions of a successful search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SearchWarning {
    /// The search engine timed out; results may be incomplete.
    TimedOut,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub warnings: Vec<SearchWarning>,
}

/// A way of answering a resolved search.
pub trait QueryBackend {
    fn search(&self, request: &ResolvedSearch) -> Result<SearchResponse>;
}

/// Shared tail of every backend: drop hits outside the searched area,
/// optionally sort by distance (stable), apply the limit, project fields.
pub(crate) fn finish_hits(
    mut hits: Vec<SearchHit>,
    request: &ResolvedSearch,
    sort_by_distance: bool,
) -> Vec<SearchHit> {
    hits.retain(|hit| request.within(&hit.coord, hit.distance.unwrap_or(0.0)));
    if sort_by_distance {
        hits.sort_by(|a, b| {
            a.distance
                .unwrap_or(0.0)
                .total_cmp(&b.distance.unwrap_or(0.0))
        });
    }
    hits.into_iter()
        .take(request.limit)
        .map(|mut hit| {
            hit.coord = request.props.project(hit.coord);
            hit
        })
        .collect()
}

/// Entry point for hosts: validates, resolves and runs a search on the
/// configured backend. `Send + Sync` whenever the store is, so one service
/// can answer searches from several threads.
pub struct SearchService<'a, S: ?Sized> {
    parser: CoordinateParser,
    store: &'a S,
    engine: Option<Box<dyn SearchEngine + Send + Sync + 'a>>,
}

impl<'a, S: CoordStore + ?Sized> SearchService<'a, S> {
    pub fn new(config: GeoConfig, store: &'a S) -> Self {
        Self {
            parser: CoordinateParser::new(config),
            store,
            engine: None,
        }
    }

    /// Search engine used when the configured backend is `geo_index`.
    pub fn with_engine(mut self, engine: impl SearchEngine + Send + Sync + 'a) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    pub fn config(&self) -> &GeoConfig {
        self.parser.config()
    }

    pub fn search(&self, params: SearchParams) -> Result<SearchResponse> {
        let request = SearchRequest::from_params(params, &self.parser)?
            .resolve(self.store, self.parser.registry())?;
        let config = self.parser.config();

        match config.backend {
            BackendKind::Relational => {
                RangeBackend::new(self.store, config.index_granularity).search(&request)
            }
            BackendKind::GeoIndex => {
                let engine = self.engine.as_deref().ok_or_else(|| {
                    GeoError::Config("backend geo_index needs a search engine".into())
                })?;
                GeoIndexBackend::new(engine, self.store, &config.geo_index.index).search(&request)
            }
        }
    }
}
