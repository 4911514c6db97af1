// crates/geotags-core/src/store/memory.rs

use super::{CoordStore, StoredRow};
use crate::coord::{Coord, PageId};
use crate::error::Result;
use crate::search::RangePredicate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub namespace: i32,
    pub title: Option<String>,
}

/// In-memory coordinate table plus page table.
///
/// Rows live in a `BTreeMap` keyed by row id, so scans come back in
/// insertion order. Row ids are allocated monotonically and never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    rows: BTreeMap<u64, StoredRow>,
    pages: BTreeMap<PageId, PageRecord>,
    next_id: u64,
    #[serde(skip)]
    checkpoints: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or updates a page.
    pub fn upsert_page(&mut self, page_id: PageId, namespace: i32, title: Option<String>) {
        self.pages.insert(page_id, PageRecord { namespace, title });
    }

    /// Removes a page and every coordinate it owns. Returns the number of
    /// deleted rows.
    pub fn remove_page(&mut self, page_id: PageId) -> usize {
        self.pages.remove(&page_id);
        let before = self.rows.len();
        self.rows.retain(|_, row| row.page_id != page_id);
        before - self.rows.len()
    }

    pub fn page(&self, page_id: PageId) -> Option<&PageRecord> {
        self.pages.get(&page_id)
    }

    pub fn pages(&self) -> impl Iterator<Item = (PageId, &PageRecord)> {
        self.pages.iter().map(|(id, record)| (*id, record))
    }

    pub fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.values()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// How many write batches were committed so far.
    pub fn checkpoints(&self) -> usize {
        self.checkpoints
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl CoordStore for MemoryStore {
    fn coordinates_for_page(&self, page_id: PageId) -> Result<Vec<Coord>> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.page_id == page_id)
            .map(StoredRow::to_coord)
            .collect())
    }

    fn page_exists(&self, page_id: PageId) -> Result<bool> {
        Ok(self.pages.contains_key(&page_id))
    }

    fn page_namespace(&self, page_id: PageId) -> Result<Option<i32>> {
        Ok(self.pages.get(&page_id).map(|p| p.namespace))
    }

    fn select(&self, predicate: &RangePredicate) -> Result<Vec<StoredRow>> {
        Ok(self
            .rows
            .values()
            .filter(|row| predicate.matches(row, self.pages.get(&row.page_id).map(|p| p.namespace)))
            .cloned()
            .collect())
    }

    fn rows_for_pages(&self, page_ids: &[PageId]) -> Result<Vec<StoredRow>> {
        let mut rows: Vec<StoredRow> = self
            .rows
            .values()
            .filter(|row| page_ids.contains(&row.page_id))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.page_id, row.row_id));
        Ok(rows)
    }

    fn insert_rows(&mut self, rows: Vec<StoredRow>) -> Result<Vec<u64>> {
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.row_id == 0 {
                row.row_id = self.allocate_id();
            } else {
                self.next_id = self.next_id.max(row.row_id);
            }
            self.pages.entry(row.page_id).or_insert(PageRecord {
                namespace: 0,
                title: None,
            });
            ids.push(row.row_id);
            self.rows.insert(row.row_id, row);
        }
        Ok(ids)
    }

    fn delete_rows(&mut self, row_ids: &[u64]) -> Result<usize> {
        Ok(row_ids
            .iter()
            .filter(|id| self.rows.remove(*id).is_some())
            .count())
    }

    fn commit_checkpoint(&mut self) -> Result<()> {
        self.checkpoints += 1;
        tracing::trace!(checkpoint = self.checkpoints, rows = self.rows.len(), "checkpoint");
        Ok(())
    }
}
