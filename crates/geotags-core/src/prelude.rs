//! geotags-core prelude: common types and traits for hosts and demos.

pub use crate::config::{BackendKind, GeoConfig, WarningLevel, WarningPolicy};
pub use crate::coord::{BoundingBox, Coord, PageId};
pub use crate::coord_set::{AddOutcome, CoordinateSet, SetWarning};
pub use crate::error::{GeoError, ParseError, Result, SearchError};
pub use crate::globe::{Globe, GlobeRegistry};
pub use crate::parser::format::{to_decimal_tokens, to_dms_tokens};
pub use crate::parser::{CoordinateParser, ParsedTag, TagWarning, Token};
pub use crate::reconcile::{plan, ReconcileStats, Reconciler, WritePlan};
pub use crate::search::{
    list_coordinates, Cursor, ListOptions, PrimaryFilter, PropSet, QueryBackend, SearchHit,
    SearchParams, SearchResponse, SearchService, SearchWarning, SortMode,
};
pub use crate::store::{CoordStore, MemoryStore, StoredRow};
pub use crate::tokens;
