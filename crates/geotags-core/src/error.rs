// crates/geotags-core/src/error.rs

//! Error types shared by the parser, search and storage layers.

use crate::coord::PageId;
use thiserror::Error;

/// Why a piece of coordinate text was rejected.
///
/// The first three variants describe malformed input. The remaining ones are
/// only produced when the corresponding warning policy is set to `fail`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("coordinates must be given as 2, 4, 6 or 8 parts")]
    BadInputFormat,
    #[error("invalid latitude")]
    BadLatitude,
    #[error("invalid longitude")]
    BadLongitude,
    #[error("unknown globe: {0}")]
    BadGlobe(String),
    #[error("unknown coordinate type: {0}")]
    BadType(String),
    #[error("invalid region code: {0}")]
    BadRegion(String),
}

/// Request-level failures of a proximity search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[source] ParseError),
    #[error("only one of coord, page and bbox may be given")]
    AmbiguousLocator,
    #[error("one of coord, page or bbox is required")]
    MissingLocator,
    #[error("a radius is required for point searches")]
    MissingRadius,
    #[error("page {0} does not exist or has no primary coordinates")]
    NoCoordinates(PageId),
    #[error("bounding box is too big or too small")]
    BoxSizeInvalid,
    #[error("radius {radius} m is outside of 10..={max} m")]
    RadiusOutOfRange { radius: f64, max: f64 },
    #[error("limit {limit} is outside of 1..={max}")]
    LimitOutOfRange { limit: usize, max: usize },
    #[error("invalid continuation: {0}")]
    BadContinuation(String),
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, GeoError>;

impl GeoError {
    /// Turns storage and transport failures into the search-facing error so
    /// that callers of a backend see one fatal-for-this-request kind.
    pub(crate) fn into_backend_error(self) -> GeoError {
        match self {
            GeoError::Search(e) => GeoError::Search(e),
            other => GeoError::Search(SearchError::BackendUnavailable(other.to_string())),
        }
    }
}
