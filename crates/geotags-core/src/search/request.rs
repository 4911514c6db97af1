// crates/geotags-core/src/search/request.rs

//! Raw search parameters and their validated, resolved form.

use crate::config::GeoConfig;
use crate::coord::{BoundingBox, Coord, PageId};
use crate::error::{ParseError, Result, SearchError};
use crate::globe::{Globe, GlobeRegistry};
use crate::parser::{CoordinateParser, Token};
use crate::store::CoordStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Smallest radius a point search may use, in metres.
pub const MIN_RADIUS: f64 = 10.0;
/// Boxes smaller than this (m²) are rejected.
pub const MIN_BOX_AREA: f64 = 100.0;
pub const DEFAULT_LIMIT: usize = 10;

/// Which coordinates of a page take part in a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryFilter {
    #[default]
    Primary,
    Secondary,
    All,
}

impl PrimaryFilter {
    pub fn accepts(&self, primary: bool) -> bool {
        match self {
            PrimaryFilter::Primary => primary,
            PrimaryFilter::Secondary => !primary,
            PrimaryFilter::All => true,
        }
    }
}

impl FromStr for PrimaryFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(PrimaryFilter::Primary),
            "secondary" => Ok(PrimaryFilter::Secondary),
            "all" => Ok(PrimaryFilter::All),
            other => Err(format!("expected primary, secondary or all, got {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Distance,
    Relevance,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(SortMode::Distance),
            "relevance" => Ok(SortMode::Relevance),
            other => Err(format!("expected distance or relevance, got {other}")),
        }
    }
}

/// Optional coordinate properties returned with each result. Latitude,
/// longitude, primary flag and distance are always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropSet {
    #[serde(rename = "type")]
    pub type_: bool,
    pub name: bool,
    pub dim: bool,
    pub country: bool,
    pub region: bool,
    pub globe: bool,
}

impl Default for PropSet {
    fn default() -> Self {
        Self {
            type_: false,
            name: false,
            dim: false,
            country: false,
            region: false,
            globe: true,
        }
    }
}

impl PropSet {
    pub fn all() -> Self {
        Self {
            type_: true,
            name: true,
            dim: true,
            country: true,
            region: true,
            globe: true,
        }
    }

    pub fn none() -> Self {
        Self {
            globe: false,
            ..Self::default()
        }
    }

    /// Clears the optional fields that were not asked for.
    pub fn project(&self, mut coord: Coord) -> Coord {
        if !self.type_ {
            coord.type_ = None;
        }
        if !self.name {
            coord.name = None;
        }
        if !self.dim {
            coord.dim = None;
        }
        if !self.country {
            coord.country = None;
        }
        if !self.region {
            coord.region = None;
        }
        if !self.globe {
            coord.globe.clear();
        }
        coord
    }
}

impl FromStr for PropSet {
    type Err = String;

    /// Parses a `|` or `,` separated list such as `type|name|dim`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut props = PropSet::none();
        for item in s.split(['|', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            match item.to_ascii_lowercase().as_str() {
                "type" => props.type_ = true,
                "name" => props.name = true,
                "dim" => props.dim = true,
                "country" => props.country = true,
                "region" => props.region = true,
                "globe" => props.globe = true,
                other => return Err(format!("unknown property: {other}")),
            }
        }
        Ok(props)
    }
}

/// Search parameters as a host receives them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Centre as `lat|lon`.
    pub coord: Option<String>,
    /// Search around this page's primary coordinate.
    pub page: Option<PageId>,
    /// Box as `top|left|bottom|right`.
    pub bbox: Option<String>,
    /// Metres; required for `coord` and `page` searches.
    pub radius: Option<f64>,
    pub max_dim: Option<u32>,
    pub globe: Option<String>,
    pub primary: PrimaryFilter,
    pub namespaces: Option<Vec<i32>>,
    pub props: PropSet,
    pub sort: SortMode,
    pub limit: Option<usize>,
}

/// What the search is anchored on.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    Point { center: Coord, radius: f64 },
    Page { page_id: PageId, radius: f64 },
    Box(BoundingBox),
}

/// Filters shared by all backends.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub max_dim: Option<u32>,
    pub primary: PrimaryFilter,
    pub namespaces: Option<Vec<i32>>,
    pub exclude_page: Option<PageId>,
}

impl SearchFilters {
    pub fn accepts_dim(&self, dim: Option<u32>) -> bool {
        match (self.max_dim, dim) {
            (Some(max), Some(dim)) => dim <= max,
            _ => true,
        }
    }
}

/// A syntactically valid search, before page locators are resolved.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub locator: Locator,
    pub globe: Globe,
    pub filters: SearchFilters,
    pub props: PropSet,
    pub sort: SortMode,
    pub limit: usize,
}

/// A search ready for a backend: centre, optional radius and the box the
/// candidates must fall into.
#[derive(Debug, Clone)]
pub struct ResolvedSearch {
    pub center: Coord,
    /// `None` for box searches.
    pub radius: Option<f64>,
    pub bbox: BoundingBox,
    pub globe: Globe,
    pub filters: SearchFilters,
    pub props: PropSet,
    pub sort: SortMode,
    pub limit: usize,
}

impl ResolvedSearch {
    /// `true` if a point at `distance` metres from the centre is inside
    /// the searched area.
    pub fn within(&self, coord: &Coord, distance: f64) -> bool {
        match self.radius {
            Some(radius) => distance <= radius,
            None => self.bbox.contains(coord.lat, coord.lon),
        }
    }
}

fn split_parts(text: &str) -> Vec<Token> {
    text.split('|').map(|p| Token::Text(p.trim().to_string())).collect()
}

fn invalid(err: ParseError) -> SearchError {
    SearchError::InvalidCoordinate(err)
}

impl SearchRequest {
    /// Validates raw parameters: exactly one locator, radius and limit
    /// bounds, box size bounds.
    pub fn from_params(params: SearchParams, parser: &CoordinateParser) -> Result<Self> {
        let config = parser.config();
        let globe_name = params.globe.as_deref().unwrap_or(config.default_globe.as_str());
        let globe = parser.globe(globe_name);

        let given = [params.coord.is_some(), params.page.is_some(), params.bbox.is_some()]
            .iter()
            .filter(|g| **g)
            .count();
        match given {
            0 => return Err(SearchError::MissingLocator.into()),
            1 => {}
            _ => return Err(SearchError::AmbiguousLocator.into()),
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > config.max_limit {
            return Err(SearchError::LimitOutOfRange {
                limit,
                max: config.max_limit,
            }
            .into());
        }

        let mut exclude_page = None;
        let locator = if let Some(text) = params.coord.as_deref() {
            let center = parser
                .parse_coordinates(&split_parts(text), &globe)
                .map_err(invalid)?;
            Locator::Point {
                center,
                radius: check_radius(params.radius, config)?,
            }
        } else if let Some(page_id) = params.page {
            exclude_page = Some(page_id);
            Locator::Page {
                page_id,
                radius: check_radius(params.radius, config)?,
            }
        } else {
            let text = params.bbox.as_deref().unwrap_or_default();
            let parts = split_parts(text);
            if parts.len() != 4 {
                return Err(invalid(ParseError::BadInputFormat).into());
            }
            let top_left = parser.parse_coordinates(&parts[..2], &globe).map_err(invalid)?;
            let bottom_right = parser.parse_coordinates(&parts[2..], &globe).map_err(invalid)?;
            let bbox = BoundingBox::from_corners(&top_left, &bottom_right);
            let area = bbox.area(&globe);
            let max_area = 4.0 * config.max_search_radius * config.max_search_radius;
            if !(MIN_BOX_AREA..=max_area).contains(&area) {
                tracing::debug!(area, max_area, "rejecting bounding box");
                return Err(SearchError::BoxSizeInvalid.into());
            }
            Locator::Box(bbox)
        };

        Ok(Self {
            locator,
            globe,
            filters: SearchFilters {
                max_dim: params.max_dim,
                primary: params.primary,
                namespaces: params.namespaces,
                exclude_page,
            },
            props: params.props,
            sort: params.sort,
            limit,
        })
    }

    /// Turns the locator into a centre and a candidate box. Page locators
    /// are looked up in `store` and search on the globe of the page's
    /// primary coordinate.
    pub fn resolve<S: CoordStore + ?Sized>(
        self,
        store: &S,
        registry: &GlobeRegistry,
    ) -> Result<ResolvedSearch> {
        let SearchRequest {
            locator,
            mut globe,
            filters,
            props,
            sort,
            limit,
        } = self;

        let (center, radius, bbox) = match locator {
            Locator::Point { center, radius } => {
                let bbox = center.bbox_around(radius, &globe);
                (center, Some(radius), bbox)
            }
            Locator::Page { page_id, radius } => {
                if !store.page_exists(page_id)? {
                    return Err(SearchError::NoCoordinates(page_id).into());
                }
                let center = store
                    .primary_for_page(page_id)?
                    .ok_or(SearchError::NoCoordinates(page_id))?;
                if center.globe != globe.name() {
                    globe = registry.lookup(&center.globe);
                }
                let bbox = center.bbox_around(radius, &globe);
                (center, Some(radius), bbox)
            }
            Locator::Box(bbox) => (bbox.center(), None, bbox),
        };

        Ok(ResolvedSearch {
            center,
            radius,
            bbox,
            globe,
            filters,
            props,
            sort,
            limit,
        })
    }
}

fn check_radius(radius: Option<f64>, config: &GeoConfig) -> Result<f64> {
    let radius = radius.ok_or(SearchError::MissingRadius)?;
    if !(MIN_RADIUS..=config.max_search_radius).contains(&radius) {
        return Err(SearchError::RadiusOutOfRange {
            radius,
            max: config.max_search_radius,
        }
        .into());
    }
    Ok(radius)
}
