// crates/geotags-core/src/config.rs

//! # Configuration
//!
//! All tunables live in one [`GeoConfig`] that is handed to the parser,
//! the search layer and the reconciler when they are built. Nothing reads
//! ambient global state.
//!
//! Configuration files are JSON (optionally gzipped) and only need to list
//! the keys they change:
//!
//! ```json
//! {
//!   "backend": "geo_index",
//!   "max_search_radius": 20000,
//!   "warning_level": { "unknown_type": "fail" },
//!   "globes": { "arrokoth": { "min_longitude": 0, "max_longitude": 360, "east_sign": -1 } }
//! }
//! ```

use crate::error::{GeoError, Result};
use crate::globe::{GlobeDef, GlobeRegistry, EARTH};
use crate::io;
use crate::parser::NumberFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What to do when a tag argument refers to something we do not recognize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    /// Accept silently.
    Ignore,
    /// Accept, but record a warning on the page.
    #[default]
    Warn,
    /// Reject the coordinate.
    Fail,
}

/// Per-condition [`WarningLevel`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningPolicy {
    pub unknown_type: WarningLevel,
    pub unknown_globe: WarningLevel,
    pub invalid_region: WarningLevel,
}

/// Which store answers proximity searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Relational table with range pre-filters, sorted in the application.
    #[default]
    Relational,
    /// Search engine with native geo filters and geo-distance sort.
    GeoIndex,
}

impl FromStr for BackendKind {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relational" | "db" => Ok(BackendKind::Relational),
            "geo_index" | "geo-index" | "elastic" => Ok(BackendKind::GeoIndex),
            other => Err(GeoError::Config(format!("unrecognized backend: {other}"))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Relational => f.write_str("relational"),
            BackendKind::GeoIndex => f.write_str("geo_index"),
        }
    }
}

/// Where the search engine lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoIndexConfig {
    pub url: String,
    pub index: String,
    pub timeout_secs: u64,
}

impl Default for GeoIndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "geotags".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Globe used when a tag does not name one.
    pub default_globe: String,
    /// Dim (metres) for coordinates without `dim`, `type` or `scale`.
    pub default_dim: u32,
    /// Dim (metres) implied by a coordinate type.
    pub type_to_dim: BTreeMap<String, u32>,
    pub max_coordinates_per_page: usize,
    pub warning_level: WarningPolicy,
    /// Cells per degree of the quantized lat/lon index columns.
    pub index_granularity: u32,
    /// Largest radius (metres) a proximity search may ask for.
    pub max_search_radius: f64,
    pub max_limit: usize,
    /// Rows per write batch during reconciliation.
    pub update_batch_size: usize,
    pub backend: BackendKind,
    /// Extra or replacement globe definitions, keyed by name.
    pub globes: BTreeMap<String, GlobeDef>,
    pub number_format: NumberFormat,
    pub geo_index: GeoIndexConfig,
}

fn default_type_to_dim() -> BTreeMap<String, u32> {
    [
        ("country", 1_000_000),
        ("satellite", 1_000_000),
        ("state", 300_000),
        ("adm1st", 100_000),
        ("adm2nd", 30_000),
        ("adm3rd", 10_000),
        ("city", 10_000),
        ("isle", 10_000),
        ("mountain", 10_000),
        ("river", 10_000),
        ("waterbody", 10_000),
        ("event", 5_000),
        ("forest", 5_000),
        ("glacier", 5_000),
        ("airport", 3_000),
        ("railwaystation", 1_000),
        ("edu", 1_000),
        ("pass", 1_000),
        ("camera", 1_000),
        ("landmark", 1_000),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            default_globe: EARTH.to_string(),
            default_dim: 1_000,
            type_to_dim: default_type_to_dim(),
            max_coordinates_per_page: 500,
            warning_level: WarningPolicy::default(),
            index_granularity: 10,
            max_search_radius: 10_000.0,
            max_limit: 500,
            update_batch_size: 100,
            backend: BackendKind::default(),
            globes: BTreeMap::new(),
            number_format: NumberFormat::default(),
            geo_index: GeoIndexConfig::default(),
        }
    }
}

impl GeoConfig {
    /// Reads a JSON configuration file (plain or gzipped) and validates it.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = io::open_stream(path)?;
        let config: GeoConfig = serde_json::from_reader(reader)
            .map_err(|e| GeoError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), backend = %config.backend, "loaded configuration");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GeoConfig =
            serde_json::from_str(json).map_err(|e| GeoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.index_granularity == 0 {
            return Err(GeoError::Config("index_granularity must be positive".into()));
        }
        if self.update_batch_size == 0 {
            return Err(GeoError::Config("update_batch_size must be positive".into()));
        }
        if self.max_limit == 0 {
            return Err(GeoError::Config("max_limit must be positive".into()));
        }
        if !(self.max_search_radius.is_finite() && self.max_search_radius >= 10.0) {
            return Err(GeoError::Config("max_search_radius must be at least 10 m".into()));
        }
        if self.default_globe.trim().is_empty() {
            return Err(GeoError::Config("default_globe must not be empty".into()));
        }
        for (name, def) in &self.globes {
            def.validate(name).map_err(GeoError::Config)?;
        }
        Ok(())
    }

    /// Built-in globes merged with the configured overrides.
    pub fn globe_registry(&self) -> GlobeRegistry {
        GlobeRegistry::with_overrides(&self.globes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.type_to_dim.get("city"), Some(&10_000));
        assert_eq!(config.type_to_dim.len(), 20);
        assert_eq!(config.backend, BackendKind::Relational);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GeoConfig::from_json_str(
            r#"{ "backend": "geo_index", "warning_level": { "unknown_type": "fail" } }"#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::GeoIndex);
        assert_eq!(config.warning_level.unknown_type, WarningLevel::Fail);
        assert_eq!(config.warning_level.unknown_globe, WarningLevel::Warn);
        assert_eq!(config.max_coordinates_per_page, 500);
    }

    #[test]
    fn unknown_backend_fails_loudly() {
        let err = GeoConfig::from_json_str(r#"{ "backend": "mongo" }"#).unwrap_err();
        assert!(matches!(err, GeoError::Config(_)));
        assert!("mongo".parse::<BackendKind>().is_err());
        assert_eq!("elastic".parse::<BackendKind>().unwrap(), BackendKind::GeoIndex);
    }

    #[test]
    fn rejects_bad_globe_override() {
        let err = GeoConfig::from_json_str(
            r#"{ "globes": { "half": { "min_longitude": 0, "max_longitude": 90 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeoError::Config(_)));
    }

    #[test]
    fn registry_includes_overrides() {
        let config = GeoConfig::from_json_str(
            r#"{ "globes": { "arrokoth": { "min_longitude": 0, "max_longitude": 360, "east_sign": -1 } } }"#,
        )
        .unwrap();
        let globe = config.globe_registry().lookup("arrokoth");
        assert!(globe.is_known());
        assert_eq!(globe.east_sign(), -1);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geotags.json");
        std::fs::write(&path, r#"{ "max_search_radius": 20000 }"#).unwrap();
        let config = GeoConfig::load_from_path(&path).unwrap();
        assert_eq!(config.max_search_radius, 20_000.0);
    }
}
