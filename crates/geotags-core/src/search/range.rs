// crates/geotags-core/src/search/range.rs

//! Relational search: range predicates over the coordinate table.
//!
//! Exact distance ordering cannot be pushed into an index, so the store is
//! asked for the unsorted rows inside the candidate box and the ordering is
//! done here:
//!
//! 1. quantized `lat_int` / `lon_int` spans narrow the scan to index cells,
//! 2. exact latitude and longitude ranges cut the cells down to the box,
//! 3. distances are computed, sorted (stable) and radius overflows dropped,
//! 4. the limit is applied last.

use super::request::{PrimaryFilter, ResolvedSearch};
use super::{finish_hits, QueryBackend, SearchHit, SearchResponse};
use crate::coord::PageId;
use crate::error::{GeoError, Result};
use crate::store::{quantize, CoordStore, StoredRow};
use std::fmt::Write as _;

/// Inclusive span of quantized index cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub min: i32,
    pub max: i32,
}

impl TileSpan {
    pub fn contains(&self, cell: i32) -> bool {
        cell >= self.min && cell <= self.max
    }
}

/// Exact longitude condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LonRange {
    /// `west <= lon <= east`
    Within { west: f64, east: f64 },
    /// `lon >= west OR lon <= east`, for boxes across the antimeridian.
    Crossing { west: f64, east: f64 },
}

impl LonRange {
    pub fn contains(&self, lon: f64) -> bool {
        match *self {
            LonRange::Within { west, east } => lon >= west && lon <= east,
            LonRange::Crossing { west, east } => lon >= west || lon <= east,
        }
    }
}

/// Everything a relational store needs to select candidate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePredicate {
    pub globe: String,
    pub lat_tiles: TileSpan,
    /// One span, or two when the box crosses the antimeridian.
    pub lon_tiles: Vec<TileSpan>,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon: LonRange,
    pub max_dim: Option<u32>,
    pub primary: PrimaryFilter,
    pub namespaces: Option<Vec<i32>>,
    pub exclude_page: Option<PageId>,
}

impl RangePredicate {
    pub fn build(request: &ResolvedSearch, granularity: u32) -> Self {
        let bbox = &request.bbox;
        let tile = |v: f64| quantize(v, granularity);

        let (lon, lon_tiles) = if bbox.crosses_antimeridian() {
            (
                LonRange::Crossing {
                    west: bbox.left,
                    east: bbox.right,
                },
                vec![
                    TileSpan {
                        min: tile(bbox.left),
                        max: tile(request.globe.max_longitude()),
                    },
                    TileSpan {
                        min: tile(request.globe.min_longitude()),
                        max: tile(bbox.right),
                    },
                ],
            )
        } else {
            (
                LonRange::Within {
                    west: bbox.left,
                    east: bbox.right,
                },
                vec![TileSpan {
                    min: tile(bbox.left),
                    max: tile(bbox.right),
                }],
            )
        };

        Self {
            globe: request.globe.name().to_string(),
            lat_tiles: TileSpan {
                min: tile(bbox.bottom),
                max: tile(bbox.top),
            },
            lon_tiles,
            lat_min: bbox.bottom,
            lat_max: bbox.top,
            lon,
            max_dim: request.filters.max_dim,
            primary: request.filters.primary,
            namespaces: request.filters.namespaces.clone(),
            exclude_page: request.filters.exclude_page,
        }
    }

    /// Evaluates the predicate against one row. `namespace` is the owning
    /// page's namespace, if the page is known.
    pub fn matches(&self, row: &StoredRow, namespace: Option<i32>) -> bool {
        row.globe == self.globe
            && self.lat_tiles.contains(row.lat_int)
            && self.lon_tiles.iter().any(|span| span.contains(row.lon_int))
            && row.lat >= self.lat_min
            && row.lat <= self.lat_max
            && self.lon.contains(row.lon)
            && match (self.max_dim, row.dim) {
                (Some(max), Some(dim)) => dim <= max,
                _ => true,
            }
            && self.primary.accepts(row.primary)
            && self
                .namespaces
                .as_ref()
                .map_or(true, |allowed| namespace.is_some_and(|ns| allowed.contains(&ns)))
            && self.exclude_page != Some(row.page_id)
    }

    /// SQL `WHERE` clause equivalent, for logs and SQL-backed stores.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("gt_globe = '{}'", self.globe.replace('\'', "''"));
        let _ = write!(
            sql,
            " AND gt_lat_int BETWEEN {} AND {}",
            self.lat_tiles.min, self.lat_tiles.max
        );
        let lon_tiles: Vec<String> = self
            .lon_tiles
            .iter()
            .map(|s| format!("gt_lon_int BETWEEN {} AND {}", s.min, s.max))
            .collect();
        let _ = write!(sql, " AND ({})", lon_tiles.join(" OR "));
        let _ = write!(sql, " AND gt_lat BETWEEN {} AND {}", self.lat_min, self.lat_max);
        match self.lon {
            LonRange::Within { west, east } => {
                let _ = write!(sql, " AND gt_lon BETWEEN {west} AND {east}");
            }
            LonRange::Crossing { west, east } => {
                let _ = write!(sql, " AND (gt_lon >= {west} OR gt_lon <= {east})");
            }
        }
        if let Some(max) = self.max_dim {
            let _ = write!(sql, " AND (gt_dim IS NULL OR gt_dim <= {max})");
        }
        match self.primary {
            PrimaryFilter::Primary => sql.push_str(" AND gt_primary = 1"),
            PrimaryFilter::Secondary => sql.push_str(" AND gt_primary = 0"),
            PrimaryFilter::All => {}
        }
        if let Some(namespaces) = &self.namespaces {
            let list: Vec<String> = namespaces.iter().map(i32::to_string).collect();
            let _ = write!(sql, " AND page_namespace IN ({})", list.join(", "));
        }
        if let Some(page) = self.exclude_page {
            let _ = write!(sql, " AND gt_page_id <> {page}");
        }
        sql
    }
}

/// Search over any [`CoordStore`] with range predicates.
pub struct RangeBackend<'s, S: ?Sized> {
    store: &'s S,
    granularity: u32,
}

impl<'s, S: CoordStore + ?Sized> RangeBackend<'s, S> {
    pub fn new(store: &'s S, granularity: u32) -> Self {
        Self { store, granularity }
    }
}

impl<S: CoordStore + ?Sized> QueryBackend for RangeBackend<'_, S> {
    fn search(&self, request: &ResolvedSearch) -> Result<SearchResponse> {
        let predicate = RangePredicate::build(request, self.granularity);
        tracing::debug!(sql = %predicate.to_sql(), "range predicate");

        let rows = self
            .store
            .select(&predicate)
            .map_err(GeoError::into_backend_error)?;
        let candidates = rows.len();
        let hits: Vec<SearchHit> = rows
            .iter()
            .map(|row| SearchHit::from_row(row, &request.center, &request.globe))
            .collect();

        // relevance has no meaning here; both modes sort by distance
        let hits = finish_hits(hits, request, true);
        tracing::debug!(candidates, returned = hits.len(), "range search done");
        Ok(SearchResponse {
            hits,
            warnings: Vec::new(),
        })
    }
}
