// crates/geotags-core/src/search/geo_index.rs

//! Search-engine backend.
//!
//! Pages are indexed as documents with a nested `coordinates` field (see
//! [`index_document`]). A search sends a native geo filter, then re-checks
//! every returned coordinate in application code and maps the hits back to
//! the authoritative rows in the [`CoordStore`]: the index may be stale or
//! coarser than the real filter.

use super::request::{PrimaryFilter, ResolvedSearch, SortMode};
use super::{finish_hits, QueryBackend, SearchEngine, SearchHit, SearchResponse, SearchWarning};
use crate::coord::{Coord, PageId};
use crate::error::{GeoError, Result, SearchError};
use crate::globe::EARTH;
use crate::store::{CoordStore, StoredRow};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

const NESTED_PATH: &str = "coordinates";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct GeoPoint {
    lat: f64,
    lon: f64,
}

/// One entry of a document's `coordinates` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedCoord {
    coord: GeoPoint,
    globe: String,
    #[serde(default)]
    primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dim: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
}

impl IndexedCoord {
    fn from_coord(c: &Coord) -> Self {
        Self {
            coord: GeoPoint {
                lat: c.lat,
                lon: c.lon,
            },
            globe: c.globe.clone(),
            primary: c.primary,
            dim: c.dim,
            type_: c.type_.clone(),
            name: c.name.clone(),
            country: c.country.clone(),
            region: c.region.clone(),
        }
    }

    fn to_coord(&self) -> Coord {
        Coord::new(self.coord.lat, self.coord.lon, self.globe.clone()).with_primary(self.primary)
    }
}

#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(default)]
    timed_out: bool,
    hits: EngineHits,
}

#[derive(Debug, Deserialize)]
struct EngineHits {
    #[serde(default)]
    hits: Vec<EngineHit>,
}

#[derive(Debug, Deserialize)]
struct EngineHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: EngineSource,
}

#[derive(Debug, Default, Deserialize)]
struct EngineSource {
    #[serde(default)]
    coordinates: Vec<IndexedCoord>,
}

/// Search-engine document for a page. Only Earth coordinates are indexed.
pub fn index_document<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Value {
    let coordinates: Vec<IndexedCoord> = coords
        .into_iter()
        .filter(|c| c.globe == EARTH)
        .map(IndexedCoord::from_coord)
        .collect();
    json!({ NESTED_PATH: coordinates })
}

fn field(name: &str) -> String {
    format!("{NESTED_PATH}.{name}")
}

fn point(c: &Coord) -> Value {
    json!({ "lat": c.lat, "lon": c.lon })
}

/// Filters that apply to each nested coordinate.
fn nested_filters(request: &ResolvedSearch) -> Vec<Value> {
    let mut filters = Vec::new();
    match request.radius {
        Some(radius) => filters.push(json!({
            "geo_distance": {
                "distance": format!("{radius}m"),
                field("coord"): point(&request.center),
            }
        })),
        None => filters.push(json!({
            "geo_bounding_box": {
                field("coord"): {
                    "top_left": point(&request.bbox.top_left()),
                    "bottom_right": point(&request.bbox.bottom_right()),
                }
            }
        })),
    }
    filters.push(json!({ "term": { field("globe"): request.globe.name() } }));
    match request.filters.primary {
        PrimaryFilter::Primary => filters.push(json!({ "term": { field("primary"): true } })),
        PrimaryFilter::Secondary => filters.push(json!({ "term": { field("primary"): false } })),
        PrimaryFilter::All => {}
    }
    if let Some(max_dim) = request.filters.max_dim {
        filters.push(json!({ "range": { field("dim"): { "lte": max_dim } } }));
    }
    filters
}

/// Builds the request body for a resolved search.
pub fn build_query(request: &ResolvedSearch) -> Value {
    let nested_filter = json!({ "bool": { "filter": nested_filters(request) } });

    let mut filter = vec![json!({
        "nested": { "path": NESTED_PATH, "query": nested_filter.clone() }
    })];
    if let Some(namespaces) = &request.filters.namespaces {
        filter.push(json!({ "terms": { "namespace": namespaces } }));
    }

    let mut bool_query = json!({ "filter": filter });
    if let Some(page) = request.filters.exclude_page {
        bool_query["must_not"] = json!([{ "term": { "_id": page.to_string() } }]);
    }

    let sort = match request.sort {
        SortMode::Distance => json!([{
            "_geo_distance": {
                field("coord"): point(&request.center),
                "order": "asc",
                "unit": "m",
                "nested": { "path": NESTED_PATH, "filter": nested_filter },
            }
        }]),
        SortMode::Relevance => json!(["_score"]),
    };

    json!({
        "query": { "bool": bool_query },
        "sort": sort,
        "size": request.limit,
        "_source": [NESTED_PATH],
    })
}

/// Search through a [`SearchEngine`], reconciled against a [`CoordStore`].
pub struct GeoIndexBackend<'a, E: ?Sized, S: ?Sized> {
    engine: &'a E,
    store: &'a S,
    index: String,
}

impl<'a, E, S> GeoIndexBackend<'a, E, S>
where
    E: SearchEngine + ?Sized,
    S: CoordStore + ?Sized,
{
    pub fn new(engine: &'a E, store: &'a S, index: &str) -> Self {
        Self {
            engine,
            store,
            index: index.to_string(),
        }
    }

    /// Engine hits that pass the business filters, in engine order.
    fn candidates(&self, hits: Vec<EngineHit>, request: &ResolvedSearch) -> Vec<(PageId, Coord)> {
        let mut out = Vec::new();
        for hit in hits {
            let page_id = match hit.id.parse::<PageId>() {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(id = %hit.id, "skipping hit with malformed id");
                    continue;
                }
            };
            if request.filters.exclude_page == Some(page_id) {
                continue;
            }
            for indexed in &hit.source.coordinates {
                let coord = indexed.to_coord();
                if coord.globe != request.globe.name()
                    || !request.filters.accepts_dim(indexed.dim)
                    || !request.filters.primary.accepts(coord.primary)
                {
                    continue;
                }
                let distance = request.center.distance_to(&coord, &request.globe);
                if request.within(&coord, distance) {
                    out.push((page_id, coord));
                }
            }
        }
        out
    }
}

impl<E, S> QueryBackend for GeoIndexBackend<'_, E, S>
where
    E: SearchEngine + ?Sized,
    S: CoordStore + ?Sized,
{
    fn search(&self, request: &ResolvedSearch) -> Result<SearchResponse> {
        let body = build_query(request);
        tracing::debug!(index = %self.index, query = %body, "geo index query");

        let raw = self
            .engine
            .search(&self.index, &body)
            .map_err(GeoError::into_backend_error)?;
        let response: EngineResponse = serde_json::from_value(raw)
            .map_err(|e| SearchError::BackendUnavailable(format!("malformed response: {e}")))?;

        let mut warnings = Vec::new();
        if response.timed_out {
            tracing::warn!(index = %self.index, "search engine timed out, results may be partial");
            warnings.push(SearchWarning::TimedOut);
        }

        let candidates = self.candidates(response.hits.hits, request);
        let mut page_ids: Vec<PageId> = candidates.iter().map(|(page, _)| *page).collect();
        page_ids.sort_unstable();
        page_ids.dedup();
        let rows = self
            .store
            .rows_for_pages(&page_ids)
            .map_err(GeoError::into_backend_error)?;

        // Map each candidate to its stored row; pages deleted since indexing
        // have no rows and drop out here.
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for (page_id, coord) in &candidates {
            let row: Option<&StoredRow> = rows
                .iter()
                .filter(|r| r.page_id == *page_id && !seen.contains(&r.row_id))
                .find(|r| r.to_coord().equals_to(coord));
            match row {
                Some(row) => {
                    seen.insert(row.row_id);
                    hits.push(SearchHit::from_row(row, &request.center, &request.globe));
                }
                None => tracing::debug!(page_id, "indexed coordinate no longer stored"),
            }
        }

        let hits = finish_hits(hits, request, request.sort == SortMode::Distance);
        Ok(SearchResponse { hits, warnings })
    }
}
