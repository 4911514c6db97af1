// crates/geotags-core/src/globe.rs

//! # Globe Registry
//!
//! Every coordinate lives on a named celestial body. Bodies differ in how
//! longitudes are written: Earth and the Moon use −180..180 with east
//! positive, while most planetary nomenclature uses 0..360 counted either
//! eastwards or westwards. The registry is a static table of the bodies we
//! know about; configuration may override or extend it.
//!
//! Lookups never fail. An unknown body gets a permissive globe that accepts
//! any longitude in −360..360, so data for bodies we do not model is not
//! rejected by validation.

use crate::math::EARTH_RADIUS;
use crate::text::fold_key;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the default body.
pub const EARTH: &str = "earth";

/// Geometry parameters of one celestial body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Globe {
    name: String,
    min_longitude: f64,
    max_longitude: f64,
    east_sign: i8,
    radius: Option<f64>,
    known: bool,
}

/// A globe definition as found in the built-in table or in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobeDef {
    pub min_longitude: f64,
    pub max_longitude: f64,
    /// +1 if longitudes grow eastwards, −1 if they grow westwards.
    #[serde(default = "default_east_sign")]
    pub east_sign: i8,
    /// Mean radius in metres; `None` for irregular bodies.
    #[serde(default)]
    pub radius: Option<f64>,
}

fn default_east_sign() -> i8 {
    1
}

impl GlobeDef {
    const EARTH_LIKE: GlobeDef = GlobeDef::new(-180.0, 180.0, 1);
    const EAST_360: GlobeDef = GlobeDef::new(0.0, 360.0, 1);
    const WEST_360: GlobeDef = GlobeDef::new(0.0, 360.0, -1);

    const fn new(min_longitude: f64, max_longitude: f64, east_sign: i8) -> Self {
        Self {
            min_longitude,
            max_longitude,
            east_sign,
            radius: None,
        }
    }

    fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Checks the invariants a definition loaded from configuration must hold.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if !(self.min_longitude.is_finite() && self.max_longitude.is_finite()) {
            return Err(format!("globe '{name}': longitude bounds must be finite"));
        }
        if self.max_longitude - self.min_longitude < 360.0 {
            return Err(format!("globe '{name}': longitude domain must span 360 degrees"));
        }
        if self.east_sign != 1 && self.east_sign != -1 {
            return Err(format!("globe '{name}': east_sign must be 1 or -1"));
        }
        if self.radius.is_some_and(|r| !(r.is_finite() && r > 0.0)) {
            return Err(format!("globe '{name}': radius must be positive"));
        }
        Ok(())
    }
}

// Mean radii in metres. Irregular bodies carry no radius.
static BUILTIN_GLOBES: Lazy<BTreeMap<&'static str, GlobeDef>> = Lazy::new(|| {
    use GlobeDef as G;
    BTreeMap::from([
        (EARTH, G::EARTH_LIKE.with_radius(EARTH_RADIUS)),
        ("moon", G::EARTH_LIKE.with_radius(1_737_400.0)),
        ("mercury", G::WEST_360.with_radius(2_439_700.0)),
        ("venus", G::EAST_360.with_radius(6_051_800.0)),
        ("mars", G::WEST_360.with_radius(3_389_500.0)),
        ("phobos", G::WEST_360),
        ("deimos", G::WEST_360),
        ("ceres", G::EAST_360.with_radius(469_700.0)),
        ("vesta", G::EAST_360),
        ("io", G::WEST_360.with_radius(1_821_600.0)),
        ("europa", G::WEST_360.with_radius(1_560_800.0)),
        ("ganymede", G::WEST_360.with_radius(2_634_100.0)),
        ("callisto", G::WEST_360.with_radius(2_410_300.0)),
        ("mimas", G::WEST_360.with_radius(198_200.0)),
        ("enceladus", G::WEST_360.with_radius(252_100.0)),
        ("tethys", G::WEST_360.with_radius(531_100.0)),
        ("dione", G::WEST_360.with_radius(561_400.0)),
        ("rhea", G::WEST_360.with_radius(763_800.0)),
        ("titan", G::WEST_360.with_radius(2_574_700.0)),
        ("iapetus", G::WEST_360.with_radius(734_500.0)),
        ("phoebe", G::WEST_360),
        ("miranda", G::EAST_360.with_radius(235_800.0)),
        ("ariel", G::EAST_360.with_radius(578_900.0)),
        ("umbriel", G::EAST_360.with_radius(584_700.0)),
        ("titania", G::EAST_360.with_radius(788_400.0)),
        ("oberon", G::EAST_360.with_radius(761_400.0)),
        ("pluto", G::EAST_360.with_radius(1_188_300.0)),
        ("charon", G::EAST_360.with_radius(606_000.0)),
    ])
});

impl Globe {
    fn from_def(name: String, def: &GlobeDef) -> Self {
        Self {
            name,
            min_longitude: def.min_longitude,
            max_longitude: def.max_longitude,
            east_sign: def.east_sign,
            radius: def.radius,
            known: true,
        }
    }

    /// The permissive globe used for bodies missing from the registry.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_longitude: -360.0,
            max_longitude: 360.0,
            east_sign: 1,
            radius: None,
            known: false,
        }
    }

    /// Earth, straight from the built-in table.
    pub fn earth() -> Self {
        BUILTIN_GLOBES
            .get(EARTH)
            .map_or_else(|| Globe::unknown(EARTH), |def| Globe::from_def(EARTH.to_string(), def))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_longitude(&self) -> f64 {
        self.min_longitude
    }

    pub fn max_longitude(&self) -> f64 {
        self.max_longitude
    }

    pub fn east_sign(&self) -> i8 {
        self.east_sign
    }

    /// Mean radius in metres, if the body has a meaningful one.
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// Radius to use for distance maths: the body's own, or Earth's.
    pub fn radius_or_default(&self) -> f64 {
        self.radius.unwrap_or(EARTH_RADIUS)
    }

    pub fn is_known(&self) -> bool {
        self.known
    }

    /// `true` if the pair is numeric and inside this body's domain.
    pub fn coordinates_are_valid(&self, lat: f64, lon: f64) -> bool {
        lat.is_finite()
            && lon.is_finite()
            && lat.abs() <= 90.0
            && lon >= self.min_longitude
            && lon <= self.max_longitude
    }

    /// Directional suffixes for longitudes and the sign each one applies.
    pub fn longitude_suffixes(&self) -> [(&'static str, f64); 2] {
        let east = f64::from(self.east_sign);
        [("E", east), ("W", -east)]
    }

    /// Sign a longitude suffix applies on this body, if it is one.
    pub fn east_sign_for(&self, suffix: &str) -> Option<f64> {
        let suffix = suffix.trim();
        self.longitude_suffixes()
            .into_iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
            .map(|(_, sign)| sign)
    }
}

/// Name → definition table, built-ins merged with configured overrides.
#[derive(Debug, Clone)]
pub struct GlobeRegistry {
    globes: BTreeMap<String, GlobeDef>,
}

impl Default for GlobeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GlobeRegistry {
    /// Registry holding only the built-in bodies.
    pub fn builtin() -> Self {
        Self {
            globes: BUILTIN_GLOBES
                .iter()
                .map(|(name, def)| (name.to_string(), *def))
                .collect(),
        }
    }

    /// Built-in bodies with `overrides` merged on top. An override replaces a
    /// built-in definition of the same (folded) name or adds a new body.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a GlobeDef)>,
    {
        let mut registry = Self::builtin();
        for (name, def) in overrides {
            registry.globes.insert(fold_key(name), *def);
        }
        registry
    }

    /// Looks a body up by name. Never fails: unknown names get
    /// [`Globe::unknown`].
    pub fn lookup(&self, name: &str) -> Globe {
        let key = fold_key(name);
        match self.globes.get(&key) {
            Some(def) => Globe::from_def(key, def),
            None => Globe::unknown(key),
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.globes.contains_key(&fold_key(name))
    }

    /// Known body names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.globes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.globes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_expected_bodies() {
        let registry = GlobeRegistry::builtin();
        assert_eq!(registry.len(), 28);
        for name in ["earth", "moon", "mars", "titan", "charon"] {
            assert!(registry.is_known(name), "{name} missing");
        }
    }

    #[test]
    fn earth_conventions() {
        let earth = Globe::earth();
        assert_eq!(earth.name(), "earth");
        assert_eq!(earth.min_longitude(), -180.0);
        assert_eq!(earth.max_longitude(), 180.0);
        assert_eq!(earth.east_sign(), 1);
        assert_eq!(earth.radius(), Some(EARTH_RADIUS));
        assert!(earth.coordinates_are_valid(90.0, 180.0));
        assert!(!earth.coordinates_are_valid(0.0, 180.5));
        assert!(!earth.coordinates_are_valid(90.5, 0.0));
        assert!(!earth.coordinates_are_valid(f64::NAN, 0.0));
    }

    #[test]
    fn mars_counts_longitude_westwards() {
        let mars = GlobeRegistry::builtin().lookup("Mars");
        assert!(mars.is_known());
        assert_eq!(mars.east_sign(), -1);
        assert_eq!(mars.east_sign_for("e"), Some(-1.0));
        assert_eq!(mars.east_sign_for("W"), Some(1.0));
        assert!(mars.coordinates_are_valid(0.0, 359.0));
        assert!(!mars.coordinates_are_valid(0.0, -1.0));
    }

    #[test]
    fn irregular_bodies_have_no_radius() {
        let phobos = GlobeRegistry::builtin().lookup("phobos");
        assert!(phobos.is_known());
        assert_eq!(phobos.radius(), None);
        assert_eq!(phobos.radius_or_default(), EARTH_RADIUS);
    }

    #[test]
    fn unknown_globe_is_permissive() {
        let globe = GlobeRegistry::builtin().lookup("zorblax");
        assert!(!globe.is_known());
        assert_eq!(globe.name(), "zorblax");
        assert_eq!(globe.radius(), None);
        assert!(globe.coordinates_are_valid(-90.0, -360.0));
        assert!(globe.coordinates_are_valid(90.0, 360.0));
        assert!(!globe.coordinates_are_valid(0.0, 360.1));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let overrides = BTreeMap::from([
            ("Moon".to_string(), GlobeDef::EAST_360),
            ("arrokoth".to_string(), GlobeDef::WEST_360),
        ]);
        let registry = GlobeRegistry::with_overrides(&overrides);
        let moon = registry.lookup("moon");
        assert_eq!(moon.min_longitude(), 0.0);
        assert_eq!(moon.radius(), None);
        assert!(registry.lookup("arrokoth").is_known());
        assert_eq!(registry.len(), 29);
    }

    #[test]
    fn validates_configured_definitions() {
        assert!(GlobeDef::EARTH_LIKE.validate("earth").is_ok());
        assert!(GlobeDef::new(0.0, 180.0, 1).validate("half").is_err());
        assert!(GlobeDef::new(0.0, 360.0, 2).validate("odd").is_err());
    }
}
