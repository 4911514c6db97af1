// crates/geotags-core/src/store/mod.rs

//! # Coordinate storage
//!
//! The relational side of the system: one row per stored coordinate, keyed
//! by a row id and owned by a page. Search and reconciliation only talk to
//! storage through [`CoordStore`], so a SQL-backed implementation can stand
//! in for the bundled [`MemoryStore`].

mod memory;
mod snapshot;

pub use memory::{MemoryStore, PageRecord};

use crate::coord::{Coord, PageId};
use crate::error::Result;
use crate::search::RangePredicate;
use serde::{Deserialize, Serialize};

/// Persisted shape of one coordinate.
///
/// `lat_int` / `lon_int` are the quantized index columns:
/// `round(value × granularity)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub row_id: u64,
    pub page_id: PageId,
    pub lat: f64,
    pub lon: f64,
    pub globe: String,
    pub primary: bool,
    pub dim: Option<u32>,
    pub type_: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub lat_int: i32,
    pub lon_int: i32,
}

/// Index column value for `value` at `granularity` cells per degree.
pub fn quantize(value: f64, granularity: u32) -> i32 {
    (value * f64::from(granularity)).round() as i32
}

impl StoredRow {
    /// Row for `coord` on `page_id`. The row id is taken from the coordinate
    /// (0 asks the store to allocate one).
    pub fn from_coord(coord: &Coord, page_id: PageId, granularity: u32) -> Self {
        Self {
            row_id: coord.id,
            page_id,
            lat: coord.lat,
            lon: coord.lon,
            globe: coord.globe.clone(),
            primary: coord.primary,
            dim: coord.dim,
            type_: coord.type_.clone(),
            name: coord.name.clone(),
            country: coord.country.clone(),
            region: coord.region.clone(),
            lat_int: quantize(coord.lat, granularity),
            lon_int: quantize(coord.lon, granularity),
        }
    }

    pub fn to_coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
            globe: self.globe.clone(),
            id: self.row_id,
            primary: self.primary,
            dim: self.dim,
            type_: self.type_.clone(),
            name: self.name.clone(),
            country: self.country.clone(),
            region: self.region.clone(),
            page_id: Some(self.page_id),
            distance: None,
        }
    }
}

/// Capabilities the search and reconciliation layers need from a store.
///
/// Writers take `&mut self`: holding the store mutably for a whole
/// read-diff-write cycle is what keeps two updates of one page from
/// interleaving.
pub trait CoordStore {
    /// Stored coordinates of a page in row id order.
    fn coordinates_for_page(&self, page_id: PageId) -> Result<Vec<Coord>>;

    fn primary_for_page(&self, page_id: PageId) -> Result<Option<Coord>> {
        Ok(self
            .coordinates_for_page(page_id)?
            .into_iter()
            .find(|c| c.primary))
    }

    fn page_exists(&self, page_id: PageId) -> Result<bool>;

    fn page_namespace(&self, page_id: PageId) -> Result<Option<i32>>;

    /// Rows matching `predicate`, unsorted (row id order).
    fn select(&self, predicate: &RangePredicate) -> Result<Vec<StoredRow>>;

    /// All rows of the given pages, in `(page_id, row_id)` order.
    fn rows_for_pages(&self, page_ids: &[PageId]) -> Result<Vec<StoredRow>>;

    /// Inserts rows, allocating ids for rows with `row_id == 0`. Returns the
    /// ids in input order.
    fn insert_rows(&mut self, rows: Vec<StoredRow>) -> Result<Vec<u64>>;

    /// Deletes rows by id. Returns how many existed.
    fn delete_rows(&mut self, row_ids: &[u64]) -> Result<usize>;

    /// Called between write batches, e.g. to commit and wait for replicas.
    fn commit_checkpoint(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_to_nearest_cell() {
        assert_eq!(quantize(10.04, 10), 100);
        assert_eq!(quantize(10.06, 10), 101);
        assert_eq!(quantize(-0.05, 10), -1);
        assert_eq!(quantize(-179.99, 10), -1800);
    }

    #[test]
    fn row_round_trips_coordinate_fields() {
        let coord = Coord::earth(1.5, -2.5)
            .with_primary(true)
            .with_dim(300)
            .with_type("city")
            .with_name("X");
        let row = StoredRow::from_coord(&coord, 9, 10);
        assert_eq!((row.lat_int, row.lon_int), (15, -25));
        let back = row.to_coord();
        assert!(back.fully_equals_to(&coord));
        assert_eq!(back.page_id, Some(9));
    }
}
