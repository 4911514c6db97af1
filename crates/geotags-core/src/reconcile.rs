// crates/geotags-core/src/reconcile.rs

//! # Reconciliation
//!
//! Keeps the stored coordinates of a page in sync with a freshly parsed
//! [`CoordinateSet`] using as few writes as possible. Stored coordinates
//! that are fully equal to a new one are kept untouched; only the
//! difference is written.

use crate::config::GeoConfig;
use crate::coord::{Coord, PageId};
use crate::coord_set::CoordinateSet;
use crate::error::Result;
use crate::store::{CoordStore, StoredRow};

/// Writes needed to move a page from its stored coordinates to a new set.
#[derive(Debug, Clone, Default)]
pub struct WritePlan {
    pub to_insert: Vec<Coord>,
    /// Stored coordinates to remove; their `id` is the row id.
    pub to_delete: Vec<Coord>,
}

impl WritePlan {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Diffs a new coordinate set against what is stored.
///
/// Secondary coordinates at the primary's location are not stored. A new
/// coordinate fully equal to a stored one consumes that stored one and
/// needs no write. Stored coordinates left over are deleted.
pub fn plan(new: &CoordinateSet, previous: &[Coord]) -> WritePlan {
    let mut candidates: Vec<&Coord> = previous.iter().collect();
    let mut to_insert = Vec::new();
    let primary = new.primary();

    for coord in new.iter() {
        if !coord.primary && primary.is_some_and(|p| coord.equals_to(p)) {
            continue;
        }
        match candidates.iter().position(|old| old.fully_equals_to(coord)) {
            Some(pos) => {
                candidates.remove(pos);
            }
            None => to_insert.push(coord.clone()),
        }
    }

    WritePlan {
        to_insert,
        to_delete: candidates.into_iter().cloned().collect(),
    }
}

/// Row counts written by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub inserted: usize,
    pub deleted: usize,
}

/// Applies [`plan`]s to a [`CoordStore`] in bounded batches.
#[derive(Debug, Clone)]
pub struct Reconciler {
    batch_size: usize,
    granularity: u32,
}

impl Reconciler {
    pub fn new(config: &GeoConfig) -> Self {
        Self {
            batch_size: config.update_batch_size.max(1),
            granularity: config.index_granularity,
        }
    }

    /// Brings `page_id`'s stored coordinates in line with `set`.
    ///
    /// Deletes go first, then inserts, each in batches of
    /// `update_batch_size` with a [`CoordStore::commit_checkpoint`] after
    /// every batch. The store is held mutably for the whole cycle.
    pub fn reconcile<S: CoordStore + ?Sized>(
        &self,
        store: &mut S,
        page_id: PageId,
        set: &CoordinateSet,
    ) -> Result<ReconcileStats> {
        let previous = store.coordinates_for_page(page_id)?;
        let plan = plan(set, &previous);
        tracing::debug!(
            page_id,
            stored = previous.len(),
            insert = plan.to_insert.len(),
            delete = plan.to_delete.len(),
            "reconcile plan"
        );
        if plan.is_empty() {
            return Ok(ReconcileStats::default());
        }

        let mut stats = ReconcileStats::default();

        let delete_ids: Vec<u64> = plan.to_delete.iter().map(|c| c.id).collect();
        for batch in delete_ids.chunks(self.batch_size) {
            stats.deleted += store.delete_rows(batch)?;
            store.commit_checkpoint()?;
            tracing::info!(page_id, rows = batch.len(), "committed delete batch");
        }

        for batch in plan.to_insert.chunks(self.batch_size) {
            let rows: Vec<StoredRow> = batch
                .iter()
                .map(|c| {
                    let mut row = StoredRow::from_coord(c, page_id, self.granularity);
                    row.row_id = 0;
                    row
                })
                .collect();
            stats.inserted += store.insert_rows(rows)?.len();
            store.commit_checkpoint()?;
            tracing::info!(page_id, rows = batch.len(), "committed insert batch");
        }

        Ok(stats)
    }

    /// Removes every stored coordinate of a deleted page.
    pub fn delete_page<S: CoordStore + ?Sized>(
        &self,
        store: &mut S,
        page_id: PageId,
    ) -> Result<ReconcileStats> {
        self.reconcile(store, page_id, &CoordinateSet::new(0))
    }
}
