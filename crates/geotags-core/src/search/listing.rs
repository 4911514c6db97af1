// crates/geotags-core/src/search/listing.rs

//! Non-geographic listing: the stored coordinates of a set of pages, in
//! `(page_id, coord_id)` order with a continuation cursor.

use super::request::{PrimaryFilter, PropSet, DEFAULT_LIMIT};
use super::SearchHit;
use crate::config::GeoConfig;
use crate::coord::{Coord, PageId};
use crate::error::{Result, SearchError};
use crate::store::CoordStore;
use std::fmt;
use std::str::FromStr;

/// Position of the next item to return, rendered as `pageId|coordId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub page_id: PageId,
    pub coord_id: u64,
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.page_id, self.coord_id)
    }
}

impl FromStr for Cursor {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || SearchError::BadContinuation(s.to_string());
        let (page, coord) = s.split_once('|').ok_or_else(bad)?;
        Ok(Cursor {
            page_id: page.trim().parse().map_err(|_| bad())?,
            coord_id: coord.trim().parse().map_err(|_| bad())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub primary: PrimaryFilter,
    pub limit: usize,
    pub cursor: Option<Cursor>,
    /// Report distances from this point. Coordinates on other globes get no
    /// distance.
    pub distance_from: Option<Coord>,
    pub props: PropSet,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            primary: PrimaryFilter::Primary,
            limit: DEFAULT_LIMIT,
            cursor: None,
            distance_from: None,
            props: PropSet::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<SearchHit>,
    /// Pass back as [`ListOptions::cursor`] to get the next batch.
    pub next: Option<Cursor>,
}

pub fn list_coordinates<S: CoordStore + ?Sized>(
    store: &S,
    pages: &[PageId],
    options: &ListOptions,
    config: &GeoConfig,
) -> Result<Listing> {
    if options.limit == 0 || options.limit > config.max_limit {
        return Err(SearchError::LimitOutOfRange {
            limit: options.limit,
            max: config.max_limit,
        }
        .into());
    }

    let registry = config.globe_registry();
    let mut rows = store
        .rows_for_pages(pages)?
        .into_iter()
        .filter(|row| options.primary.accepts(row.primary))
        .filter(|row| {
            options
                .cursor
                .map_or(true, |c| (row.page_id, row.row_id) >= (c.page_id, c.coord_id))
        })
        .peekable();

    let mut items = Vec::with_capacity(options.limit);
    while items.len() < options.limit {
        let Some(row) = rows.next() else { break };
        let mut coord = row.to_coord();
        let distance = options
            .distance_from
            .as_ref()
            .filter(|from| from.globe == coord.globe)
            .map(|from| from.distance_to(&coord, &registry.lookup(&coord.globe)));
        coord.distance = distance;
        items.push(SearchHit {
            page_id: row.page_id,
            coord: options.props.project(coord),
            distance,
        });
    }

    let next = rows.peek().map(|row| Cursor {
        page_id: row.page_id,
        coord_id: row.row_id,
    });
    Ok(Listing { items, next })
}
