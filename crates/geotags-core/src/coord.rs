// crates/geotags-core/src/coord.rs

//! Point annotations and the bounding boxes derived from them.

use crate::globe::{Globe, EARTH};
use crate::math::{self, round_to, wrap_around};
use serde::{Deserialize, Serialize};

/// Identity of the content item (page) a coordinate belongs to.
pub type PageId = u64;

/// Decimal digits two coordinates must agree on to be "the same place".
pub const COORD_PRECISION: i32 = 6;

/// Latitude from which the longitude span of a box around a point no longer
/// follows `1 / cos(lat)`.
const POLAR_LATITUDE: f64 = 89.9;
/// Longitude half-width used for boxes around near-polar points.
const POLAR_LON_DELTA: f64 = 0.1;

fn default_globe() -> String {
    EARTH.to_string()
}

/// One point annotation on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
    /// Empty only on search results that did not ask for the globe.
    #[serde(default = "default_globe", skip_serializing_if = "String::is_empty")]
    pub globe: String,
    /// Row identity in the backing store; 0 until persisted.
    #[serde(default)]
    pub id: u64,
    /// Marks the canonical location of the page's subject.
    #[serde(default)]
    pub primary: bool,
    /// Approximate extent of the marked object in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO 3166-2 subdivision part, up to three alphanumerics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<PageId>,
    /// Only set on search results.
    #[serde(skip)]
    pub distance: Option<f64>,
}

impl Coord {
    pub fn new(lat: f64, lon: f64, globe: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            globe: globe.into(),
            id: 0,
            primary: false,
            dim: None,
            type_: None,
            name: None,
            country: None,
            region: None,
            page_id: None,
            distance: None,
        }
    }

    /// An Earth coordinate.
    pub fn earth(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, EARTH)
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_dim(mut self, dim: u32) -> Self {
        self.dim = Some(dim);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Loose equality: same globe, and latitude/longitude equal after
    /// rounding to [`COORD_PRECISION`] digits.
    pub fn equals_to(&self, other: &Coord) -> bool {
        self.equals_to_within(other, COORD_PRECISION)
    }

    pub fn equals_to_within(&self, other: &Coord, precision: i32) -> bool {
        round_to(self.lat, precision) == round_to(other.lat, precision)
            && round_to(self.lon, precision) == round_to(other.lon, precision)
            && self.globe == other.globe
    }

    /// Loose equality plus every stored attribute. Two fully equal
    /// coordinates need no write when one replaces the other.
    pub fn fully_equals_to(&self, other: &Coord) -> bool {
        self.equals_to(other)
            && self.primary == other.primary
            && self.dim == other.dim
            && self.type_ == other.type_
            && self.name == other.name
            && self.country == other.country
            && self.region == other.region
    }

    /// Great-circle distance to `other` in metres on `globe`.
    pub fn distance_to(&self, other: &Coord, globe: &Globe) -> f64 {
        math::distance(
            self.lat,
            self.lon,
            other.lat,
            other.lon,
            globe.radius_or_default(),
        )
    }

    /// Approximate square box with half-width `radius` metres around this
    /// point.
    ///
    /// Near the poles the longitude correction degenerates, so a fixed
    /// half-width of 0.1° is used there. Latitudes are clamped to ±90 and
    /// longitudes are wrapped into the globe's domain.
    pub fn bbox_around(&self, radius: f64, globe: &Globe) -> BoundingBox {
        if radius <= 0.0 {
            return BoundingBox::new(self.lat, self.lon, self.lat, self.lon, &self.globe);
        }
        let r = globe.radius_or_default();
        let d_lat = (radius / r).to_degrees();
        let d_lon = if self.lat.abs() < POLAR_LATITUDE {
            (radius / self.lat.to_radians().cos() / r).to_degrees()
        } else {
            POLAR_LON_DELTA
        };
        let top = (self.lat + d_lat).min(90.0);
        let bottom = (self.lat - d_lat).max(-90.0);
        let (left, right) = wrap_around(
            self.lon - d_lon,
            self.lon + d_lon,
            globe.min_longitude(),
            globe.max_longitude(),
        );
        BoundingBox::new(top, left, bottom, right, &self.globe)
    }
}

/// A latitude/longitude rectangle given by its top-left and bottom-right
/// corners. `left > right` means the box crosses the antimeridian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub globe: String,
}

impl BoundingBox {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64, globe: &str) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            globe: globe.to_string(),
        }
    }

    /// Box spanned by two corner points. Latitudes are ordered so `top` is
    /// the northern edge; longitudes keep their order, which decides whether
    /// the box crosses the antimeridian.
    pub fn from_corners(top_left: &Coord, bottom_right: &Coord) -> Self {
        Self::new(
            top_left.lat.max(bottom_right.lat),
            top_left.lon,
            top_left.lat.min(bottom_right.lat),
            bottom_right.lon,
            &top_left.globe,
        )
    }

    pub fn top_left(&self) -> Coord {
        Coord::new(self.top, self.left, self.globe.clone())
    }

    pub fn bottom_right(&self) -> Coord {
        Coord::new(self.bottom, self.right, self.globe.clone())
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.left > self.right
    }

    /// Midpoint of the box, on the correct side when it crosses the
    /// antimeridian.
    pub fn center(&self) -> Coord {
        let mut lon = (self.left + self.right) / 2.0;
        if self.crosses_antimeridian() {
            lon += if lon < 0.0 { 180.0 } else { -180.0 };
        }
        Coord::new((self.top + self.bottom) / 2.0, lon, self.globe.clone())
    }

    /// Rough area in square metres: north-south extent times east-west
    /// extent at the middle latitude. Only meant for sanity bounds.
    ///
    /// The east-west extent runs eastwards from `left` to `right`, so a box
    /// spanning most of the globe is measured as wide, not as the short gap.
    pub fn area(&self, globe: &Globe) -> f64 {
        let r = globe.radius_or_default();
        let mid_lat = (self.top + self.bottom) / 2.0;
        let vertical = math::distance(self.top, 0.0, self.bottom, 0.0, r);
        let span = (self.right - self.left).rem_euclid(360.0);
        let horizontal = span.to_radians() * r * mid_lat.to_radians().cos().abs();
        vertical * horizontal
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if lat < self.bottom || lat > self.top {
            return false;
        }
        if self.crosses_antimeridian() {
            lon >= self.left || lon <= self.right
        } else {
            lon >= self.left && lon <= self.right
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::GlobeRegistry;

    #[test]
    fn loose_equality_rounds_to_six_digits() {
        let a = Coord::earth(10.0000001, 20.0);
        let b = Coord::earth(10.0000002, 20.0);
        assert!(a.equals_to(&b));
        assert!(b.equals_to(&a));
        let c = Coord::earth(10.00001, 20.0);
        assert!(!a.equals_to(&c));
    }

    #[test]
    fn different_globes_are_never_equal() {
        let a = Coord::new(1.0, 2.0, "earth");
        let b = Coord::new(1.0, 2.0, "moon");
        assert!(!a.equals_to(&b));
        assert!(!b.equals_to(&a));
    }

    #[test]
    fn full_equality_compares_attributes() {
        let a = Coord::earth(1.0, 2.0).with_name("Here").with_dim(1000);
        let mut b = a.clone();
        b.id = 99;
        b.page_id = Some(7);
        assert!(a.fully_equals_to(&b));
        b.name = Some("There".into());
        assert!(b.equals_to(&a));
        assert!(!a.fully_equals_to(&b));
    }

    #[test]
    fn distance_is_zero_to_self() {
        let earth = Globe::earth();
        let a = Coord::earth(51.5, -0.12);
        assert_eq!(a.distance_to(&a, &earth), 0.0);
    }

    #[test]
    fn bbox_around_small_radius_is_centred() {
        let earth = Globe::earth();
        let c = Coord::earth(37.786971, -122.399677);
        let center = c.bbox_around(500.0, &earth).center();
        assert!((center.lat - c.lat).abs() < 1e-9);
        assert!((center.lon - c.lon).abs() < 1e-9);
    }

    #[test]
    fn bbox_around_zero_radius_is_a_point() {
        let earth = Globe::earth();
        let c = Coord::earth(10.0, 20.0);
        let bbox = c.bbox_around(0.0, &earth);
        assert_eq!((bbox.top, bbox.left, bbox.bottom, bbox.right), (10.0, 20.0, 10.0, 20.0));
        assert_eq!(bbox.area(&earth), 0.0);
    }

    #[test]
    fn bbox_around_wraps_at_antimeridian() {
        let earth = Globe::earth();
        let c = Coord::earth(0.0, 179.99);
        let bbox = c.bbox_around(10_000.0, &earth);
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains(0.0, 179.995));
        assert!(bbox.contains(0.0, -179.99));
        assert!(!bbox.contains(0.0, 0.0));
        let center = bbox.center();
        assert!((center.lon - 179.99).abs() < 1e-6, "got {}", center.lon);
    }

    #[test]
    fn bbox_around_pole_uses_fixed_longitude_span() {
        let earth = Globe::earth();
        let c = Coord::earth(89.95, 10.0);
        let bbox = c.bbox_around(10_000.0, &earth);
        assert_eq!(bbox.top, 90.0);
        assert!((bbox.left - 9.9).abs() < 1e-9);
        assert!((bbox.right - 10.1).abs() < 1e-9);
    }

    #[test]
    fn bbox_around_uses_globe_domain() {
        let mars = GlobeRegistry::builtin().lookup("mars");
        let c = Coord::new(0.0, 0.01, "mars");
        let bbox = c.bbox_around(5_000.0, &mars);
        assert!(bbox.left > 359.0);
        assert!(bbox.right < 1.0);
    }

    #[test]
    fn corners_are_normalized() {
        let bbox = BoundingBox::from_corners(&Coord::earth(10.0, 170.0), &Coord::earth(20.0, -170.0));
        assert_eq!(bbox.top, 20.0);
        assert_eq!(bbox.bottom, 10.0);
        assert!(bbox.crosses_antimeridian());
        assert_eq!(bbox.center().lon.abs(), 180.0);
    }

    #[test]
    fn area_of_one_degree_box_at_equator() {
        let earth = Globe::earth();
        let bbox = BoundingBox::new(0.5, 0.0, -0.5, 1.0, "earth");
        let side = math::distance(0.0, 0.0, 1.0, 0.0, math::EARTH_RADIUS);
        assert!((bbox.area(&earth) - side * side).abs() / (side * side) < 1e-3);
    }

    #[test]
    fn area_measures_eastward_span() {
        let earth = Globe::earth();
        // nearly the whole equator, not the 0.1 degree gap across the antimeridian
        let wide = BoundingBox::new(0.05, -179.95, -0.05, 179.95, "earth");
        let narrow = BoundingBox::new(0.05, 179.95, -0.05, -179.95, "earth");
        assert!(!wide.crosses_antimeridian());
        assert!(narrow.crosses_antimeridian());
        assert!(wide.area(&earth) > 3000.0 * narrow.area(&earth));
        assert!(narrow.area(&earth) > 0.0);
    }
}
