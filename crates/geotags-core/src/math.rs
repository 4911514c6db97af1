// crates/geotags-core/src/math.rs

//! Spherical helpers used by coordinates, bounding boxes and search.
//!
//! Everything here treats the body as a perfect sphere. Distances are
//! haversine great-circle distances, which is accurate enough for the short
//! and medium ranges proximity search deals with.

/// Mean radius of the Earth in metres.
pub const EARTH_RADIUS: f64 = 6_371_010.0;

/// Sign of `x`, where zero counts as positive.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Great-circle distance in metres between two points given in degrees, on a
/// sphere of the given `radius`.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();
    let sin_lat = ((lat2 - lat1) / 2.0).sin();
    let sin_lon = ((lon2 - lon1) / 2.0).sin();
    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * radius * h.min(1.0).sqrt().asin()
}

/// Folds the interval `[from, to]` into the circular domain `[min, max]`.
///
/// Values already inside the domain are returned unchanged, including an exact
/// `max`. Values outside are reduced modulo the domain width. A right edge
/// that reduces to exactly `min` is reported as `max`, so a box ending on the
/// antimeridian keeps ending there instead of flipping to the other side.
pub fn wrap_around(from: f64, to: f64, min: f64, max: f64) -> (f64, f64) {
    let range = max - min;
    if range <= 0.0 {
        return (from, to);
    }
    let wrap = |v: f64| {
        if (min..=max).contains(&v) {
            v
        } else {
            min + (v - min).rem_euclid(range)
        }
    };
    let from = wrap(from);
    let mut to_wrapped = wrap(to);
    if to_wrapped == min && to != min {
        to_wrapped = max;
    }
    (from, to_wrapped)
}

/// Rounds `value` to `precision` decimal digits, halves away from zero.
#[inline]
pub fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance(37.5, -122.1, 37.5, -122.1, EARTH_RADIUS), 0.0);
    }

    #[test]
    fn distance_across_antimeridian() {
        let d = distance(0.0, 179.0, 0.0, -179.0, EARTH_RADIUS);
        assert!((d - 222_390.0).abs() < 2_223.9, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = distance(10.0, 20.0, -33.0, 151.0, EARTH_RADIUS);
        let b = distance(-33.0, 151.0, 10.0, 20.0, EARTH_RADIUS);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance(0.0, 0.0, 0.0, 180.0, EARTH_RADIUS);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS).abs() < 1.0);
    }

    #[test]
    fn wrap_keeps_values_inside_domain() {
        assert_eq!(wrap_around(-10.0, 10.0, -180.0, 180.0), (-10.0, 10.0));
        assert_eq!(wrap_around(-180.0, 180.0, -180.0, 180.0), (-180.0, 180.0));
    }

    #[test]
    fn wrap_folds_overflowing_edges() {
        let (from, to) = wrap_around(170.0, 190.0, -180.0, 180.0);
        assert_eq!(from, 170.0);
        assert!((to - -170.0).abs() < 1e-9);

        let (from, to) = wrap_around(-190.0, -170.0, -180.0, 180.0);
        assert!((from - 170.0).abs() < 1e-9);
        assert_eq!(to, -170.0);
    }

    #[test]
    fn wrap_right_edge_landing_on_min_stays_at_max() {
        let (_, to) = wrap_around(0.0, 540.0, -180.0, 180.0);
        assert_eq!(to, 180.0);
    }

    #[test]
    fn wrap_zero_based_domain() {
        let (from, to) = wrap_around(-5.0, 5.0, 0.0, 360.0);
        assert_eq!(from, 355.0);
        assert_eq!(to, 5.0);
    }

    #[test]
    fn wrap_is_idempotent() {
        let once = wrap_around(-200.0, 361.5, -180.0, 180.0);
        let twice = wrap_around(once.0, once.1, -180.0, 180.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn sign_of_zero_is_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.5), -1.0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(1.23456789, 6), 1.234568);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }
}
