// crates/geotags-core/src/parser/mod.rs

//! # Coordinate parser
//!
//! Turns positional coordinate tokens (`40 26 46 N 79 58 56 W`, `10.5 -20`)
//! into a validated [`Coord`] on a given [`Globe`], and full tag invocations
//! (tokens plus named arguments) into a [`ParsedTag`].
//!
//! Tokens are split evenly into a latitude group and a longitude group. Each
//! group holds degrees, optionally minutes and seconds, and optionally a
//! directional suffix as its last token.

pub mod args;
pub mod format;
mod number;

pub use args::{Invocation, TagArgs};
pub use number::{NumberFormat, Token};

use crate::config::{GeoConfig, WarningLevel};
use crate::coord::Coord;
use crate::error::ParseError;
use crate::globe::{Globe, GlobeRegistry};
use crate::math::sign;
use crate::text::normalize_type;
use once_cell::sync::Lazy;
use regex::Regex;

const LATITUDE_SUFFIXES: [(&str, f64); 2] = [("N", 1.0), ("S", -1.0)];

/// Upper bound for minutes and seconds.
const MAX_SUBCOMPONENT: f64 = 59.999_999_99;

static DIM_WITH_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)(km|m)$").expect("static regex"));

static REGION_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2})(?:-([A-Z0-9]{1,3}))?$").expect("static regex"));

/// A non-fatal problem found while applying tag arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWarning {
    UnknownGlobe(String),
    UnknownType(String),
    InvalidRegion(String),
}

impl TagWarning {
    /// Tracking category the host attaches to the page.
    pub fn tracking_category(&self) -> &'static str {
        match self {
            TagWarning::UnknownGlobe(_) => "geotags-unknown-globe",
            TagWarning::UnknownType(_) => "geotags-unknown-type",
            TagWarning::InvalidRegion(_) => "geotags-unknown-region",
        }
    }
}

/// Result of parsing one tag invocation.
#[derive(Debug, Clone)]
pub struct ParsedTag {
    pub coord: Coord,
    pub warnings: Vec<TagWarning>,
}

/// Parses coordinates with the globes, number format and policies of one
/// [`GeoConfig`]. Cheap to share between threads.
#[derive(Debug, Clone)]
pub struct CoordinateParser {
    config: GeoConfig,
    registry: GlobeRegistry,
}

impl Default for CoordinateParser {
    fn default() -> Self {
        Self::new(GeoConfig::default())
    }
}

impl CoordinateParser {
    pub fn new(config: GeoConfig) -> Self {
        let registry = config.globe_registry();
        Self { config, registry }
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    pub fn registry(&self) -> &GlobeRegistry {
        &self.registry
    }

    pub fn globe(&self, name: &str) -> Globe {
        self.registry.lookup(name)
    }

    /// Parses 2, 4, 6 or 8 positional tokens into a coordinate on `globe`.
    pub fn parse_coordinates(&self, tokens: &[Token], globe: &Globe) -> Result<Coord, ParseError> {
        let count = tokens.len();
        if count < 2 || count > 8 || count % 2 != 0 {
            return Err(ParseError::BadInputFormat);
        }
        let (lat_tokens, lon_tokens) = tokens.split_at(count / 2);

        let lat = self
            .parse_component(lat_tokens, -90.0, 90.0, latitude_sign)
            .ok_or(ParseError::BadLatitude)?;
        let lon = self
            .parse_component(
                lon_tokens,
                globe.min_longitude(),
                globe.max_longitude(),
                |suffix| globe.east_sign_for(suffix),
            )
            .ok_or(ParseError::BadLongitude)?;

        if !globe.coordinates_are_valid(lat, lon) {
            return Err(ParseError::BadInputFormat);
        }
        Ok(Coord::new(lat, lon, globe.name()))
    }

    /// Folds one degrees/minutes/seconds group into decimal degrees.
    fn parse_component(
        &self,
        tokens: &[Token],
        min: f64,
        max: f64,
        suffix_sign: impl Fn(&str) -> Option<f64>,
    ) -> Option<f64> {
        let count = tokens.len();
        let mut value = 0.0_f64;
        let mut multiplier = 1.0_f64;
        let mut already_fractional = false;

        for (i, token) in tokens.iter().enumerate() {
            if i > 0 && i == count - 1 {
                if let Some(sign) = token.as_text().and_then(&suffix_sign) {
                    // "-60° S" is ambiguous
                    if value < 0.0 {
                        return None;
                    }
                    value *= sign;
                    break;
                } else if i == 3 {
                    return None;
                }
            }

            let part = token.number(&self.config.number_format)?;
            if already_fractional && part != 0.0 {
                return None;
            }
            let (lo, hi) = if i == 0 { (min, max) } else { (0.0, MAX_SUBCOMPONENT) };
            if part < lo || part > hi {
                return None;
            }
            already_fractional = part.fract() != 0.0;
            value += part * multiplier * sign(value);
            multiplier /= 60.0;
        }

        if min == 0.0 && value < 0.0 {
            value += max;
        }
        if value < min || value > max {
            return None;
        }
        Some(value)
    }

    /// Parses a whole tag invocation: coordinate tokens, the `primary`
    /// keyword and named arguments.
    ///
    /// Tag arguments are applied after the coordinates were parsed, so a
    /// malformed coordinate is reported before any policy failure.
    pub fn parse_invocation<S: AsRef<str>>(&self, parts: &[S]) -> Result<ParsedTag, ParseError> {
        let Invocation { tokens, args } = Invocation::split(parts);
        self.parse_with_args(&tokens, args)
    }

    /// Same as [`parse_invocation`](Self::parse_invocation) for callers that
    /// already separated tokens from arguments.
    pub fn parse_with_args(&self, tokens: &[Token], args: TagArgs) -> Result<ParsedTag, ParseError> {
        let mut warnings = Vec::new();
        let policy = self.config.warning_level;

        let globe_name = args
            .globe
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .unwrap_or(self.config.default_globe.as_str());
        let globe = self.registry.lookup(globe_name);

        let mut coord = self.parse_coordinates(tokens, &globe)?;
        coord.primary = args.primary;

        if !globe.is_known() {
            apply_policy(
                policy.unknown_globe,
                &mut warnings,
                TagWarning::UnknownGlobe(globe.name().to_string()),
                || ParseError::BadGlobe(globe.name().to_string()),
            )?;
        }

        let type_ = args
            .type_
            .as_deref()
            .map(normalize_type)
            .filter(|t| !t.is_empty());
        let type_dim = match &type_ {
            Some(t) => {
                let dim = self.config.type_to_dim.get(t).copied();
                if dim.is_none() {
                    apply_policy(
                        policy.unknown_type,
                        &mut warnings,
                        TagWarning::UnknownType(t.clone()),
                        || ParseError::BadType(t.clone()),
                    )?;
                }
                dim
            }
            None => None,
        };

        coord.dim = Some(
            args.dim
                .as_deref()
                .and_then(parse_dim)
                .or(type_dim)
                .or_else(|| args.scale.as_deref().and_then(parse_scale))
                .unwrap_or(self.config.default_dim),
        );
        coord.type_ = type_;
        coord.name = args.name.filter(|n| !n.trim().is_empty());

        if let Some(raw) = args.region.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            let upper = raw.to_uppercase();
            match REGION_CODE.captures(&upper) {
                Some(caps) => {
                    coord.country = caps.get(1).map(|m| m.as_str().to_string());
                    coord.region = caps.get(2).map(|m| m.as_str().to_string());
                }
                None => apply_policy(
                    policy.invalid_region,
                    &mut warnings,
                    TagWarning::InvalidRegion(raw.to_string()),
                    || ParseError::BadRegion(raw.to_string()),
                )?,
            }
        }

        Ok(ParsedTag { coord, warnings })
    }
}

fn latitude_sign(suffix: &str) -> Option<f64> {
    let suffix = suffix.trim();
    LATITUDE_SUFFIXES
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
        .map(|(_, sign)| *sign)
}

fn apply_policy(
    level: WarningLevel,
    warnings: &mut Vec<TagWarning>,
    warning: TagWarning,
    error: impl FnOnce() -> ParseError,
) -> Result<(), ParseError> {
    match level {
        WarningLevel::Ignore => Ok(()),
        WarningLevel::Warn => {
            tracing::warn!(category = warning.tracking_category(), ?warning, "tag argument warning");
            warnings.push(warning);
            Ok(())
        }
        WarningLevel::Fail => Err(error()),
    }
}

/// `dim` argument: a bare positive number of metres, or `NNNm` / `NNNkm`.
pub fn parse_dim(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(v) = text.parse::<f64>() {
        return positive_metres(v);
    }
    let caps = DIM_WITH_UNIT.captures(text)?;
    let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
    let factor = if caps.get(2)?.as_str().eq_ignore_ascii_case("km") { 1000 } else { 1 };
    u32::try_from(amount.checked_mul(factor)?)
        .ok()
        .filter(|&d| d > 0)
}

/// `scale` argument: map scale denominator, giving a dim of a tenth of it.
pub fn parse_scale(text: &str) -> Option<u32> {
    let scale = text.trim().parse::<f64>().ok()?;
    positive_metres(scale).map(|s| s / 10).filter(|&d| d > 0)
}

fn positive_metres(v: f64) -> Option<u32> {
    if !v.is_finite() || v <= 0.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v as u32).filter(|&d| d > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarningPolicy;
    use crate::tokens;

    fn parser() -> CoordinateParser {
        CoordinateParser::default()
    }

    fn earth_parse(tokens: &[Token]) -> Result<Coord, ParseError> {
        parser().parse_coordinates(tokens, &Globe::earth())
    }

    #[test]
    fn decimal_with_suffixes() {
        let c = earth_parse(&tokens![10, "N", 20, "E"]).unwrap();
        assert_eq!((c.lat, c.lon, c.globe.as_str()), (10.0, 20.0, "earth"));

        let c = earth_parse(&tokens![10.5, "S", 20.25, "W"]).unwrap();
        assert_eq!((c.lat, c.lon), (-10.5, -20.25));
    }

    #[test]
    fn plain_signed_decimals() {
        let c = earth_parse(&tokens![-33.5, 151.2]).unwrap();
        assert_eq!((c.lat, c.lon), (-33.5, 151.2));
    }

    #[test]
    fn degrees_minutes_seconds() {
        let c = earth_parse(&tokens![20, 30, 40, "S", 40, 45, 55, "E"]).unwrap();
        assert!((c.lat - -20.511_111_1).abs() < 1e-6, "lat {}", c.lat);
        assert!((c.lon - 40.765_277_7).abs() < 1e-6, "lon {}", c.lon);
    }

    #[test]
    fn negative_degrees_carry_sign_into_minutes() {
        let c = earth_parse(&tokens![-10, 30, 20, 15]).unwrap();
        assert_eq!(c.lat, -10.5);
        assert_eq!(c.lon, 20.25);
    }

    #[test]
    fn rejects_bad_token_counts() {
        assert_eq!(earth_parse(&tokens![10]), Err(ParseError::BadInputFormat));
        assert_eq!(earth_parse(&tokens![10, 20, 30]), Err(ParseError::BadInputFormat));
        let ten: Vec<Token> = (0..10).map(Token::from).collect();
        assert_eq!(earth_parse(&ten), Err(ParseError::BadInputFormat));
        assert_eq!(earth_parse(&[]), Err(ParseError::BadInputFormat));
    }

    #[test]
    fn rejects_negative_value_with_suffix() {
        assert_eq!(earth_parse(&tokens![-60, "S", 20, "E"]), Err(ParseError::BadLatitude));
        assert_eq!(earth_parse(&tokens![60, "S", -20, "E"]), Err(ParseError::BadLongitude));
    }

    #[test]
    fn rejects_wrong_or_misplaced_suffix() {
        assert_eq!(earth_parse(&tokens![10, "E", 20, "N"]), Err(ParseError::BadLatitude));
        assert_eq!(earth_parse(&tokens!["N", 10, 20, "E"]), Err(ParseError::BadLatitude));
        // four tokens per group need a suffix at the end
        assert_eq!(
            earth_parse(&tokens![10, 20, 30, 40, 10, 20, 30, "E"]),
            Err(ParseError::BadLatitude)
        );
    }

    #[test]
    fn rejects_fraction_before_further_components() {
        assert_eq!(earth_parse(&tokens![20, 15.5, 20, 10, 0, 0]), Err(ParseError::BadLatitude));
        // a trailing zero after a fraction is fine
        let c = earth_parse(&tokens![20, 15.5, 0, 10, 0, 0]).unwrap();
        assert!((c.lat - (20.0 + 15.5 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert_eq!(earth_parse(&tokens![91, 0]), Err(ParseError::BadLatitude));
        assert_eq!(earth_parse(&tokens![10, 60, 20, 0]), Err(ParseError::BadLatitude));
        assert_eq!(earth_parse(&tokens![10, 181]), Err(ParseError::BadLongitude));
    }

    #[test]
    fn west_positive_globes_flip_suffixes() {
        let p = parser();
        let mars = p.globe("mars");
        let c = p.parse_coordinates(&tokens![10, "N", 20, "W"], &mars).unwrap();
        assert_eq!(c.lon, 20.0);
        // east on a west-positive 0..360 body wraps around
        let c = p.parse_coordinates(&tokens![10, "N", 20, "E"], &mars).unwrap();
        assert_eq!(c.lon, 340.0);
        assert_eq!(c.globe, "mars");
    }

    #[test]
    fn unknown_globe_accepts_wide_longitudes() {
        let p = parser();
        let zorblax = p.globe("zorblax");
        let c = p.parse_coordinates(&tokens![10, -350], &zorblax).unwrap();
        assert_eq!(c.lon, -350.0);
    }

    #[test]
    fn text_tokens_use_number_format() {
        let c = earth_parse(&tokens!["10.5", "N", "\u{2212}20", "0"]).unwrap();
        assert_eq!((c.lat, c.lon), (10.5, -20.0));

        let comma = CoordinateParser::new(GeoConfig {
            number_format: NumberFormat {
                decimal_separator: ',',
                group_separator: Some('.'),
            },
            ..GeoConfig::default()
        });
        let c = comma
            .parse_coordinates(&tokens!["10,5", "N", "20,25", "E"], &Globe::earth())
            .unwrap();
        assert_eq!((c.lat, c.lon), (10.5, 20.25));
    }

    #[test]
    fn invocation_applies_tag_arguments() {
        let tag = parser()
            .parse_invocation(&[
                "10", "N", "20", "E", "primary", "type=city(30000)", "name=Somewhere", "region=us-ca",
            ])
            .unwrap();
        assert!(tag.warnings.is_empty());
        let c = tag.coord;
        assert!(c.primary);
        assert_eq!(c.type_.as_deref(), Some("city"));
        assert_eq!(c.dim, Some(10_000));
        assert_eq!(c.name.as_deref(), Some("Somewhere"));
        assert_eq!(c.country.as_deref(), Some("US"));
        assert_eq!(c.region.as_deref(), Some("CA"));
    }

    #[test]
    fn dim_precedence() {
        let p = parser();
        let dim = |parts: &[&str]| p.parse_invocation(parts).unwrap().coord.dim;
        assert_eq!(dim(&["1", "2", "dim=5km", "type=city", "scale=50000"]), Some(5_000));
        assert_eq!(dim(&["1", "2", "type=city", "scale=50000"]), Some(10_000));
        assert_eq!(dim(&["1", "2", "scale=50000"]), Some(5_000));
        assert_eq!(dim(&["1", "2", "dim=-3", "scale=0"]), Some(1_000));
        assert_eq!(dim(&["1", "2", "dim=250m"]), Some(250));
        assert_eq!(dim(&["1", "2", "geohack=dim:2km"]), Some(2_000));
    }

    #[test]
    fn policies_control_unknown_arguments() {
        let tag = parser()
            .parse_invocation(&["1", "2", "globe=zorblax", "type=spaceport", "region=XYZ-1234"])
            .unwrap();
        assert_eq!(tag.coord.globe, "zorblax");
        assert_eq!(tag.coord.country, None);
        assert_eq!(
            tag.warnings,
            vec![
                TagWarning::UnknownGlobe("zorblax".into()),
                TagWarning::UnknownType("spaceport".into()),
                TagWarning::InvalidRegion("XYZ-1234".into()),
            ]
        );

        let strict = CoordinateParser::new(GeoConfig {
            warning_level: WarningPolicy {
                unknown_type: WarningLevel::Fail,
                unknown_globe: WarningLevel::Ignore,
                invalid_region: WarningLevel::Ignore,
            },
            ..GeoConfig::default()
        });
        let err = strict.parse_invocation(&["1", "2", "type=spaceport"]).unwrap_err();
        assert_eq!(err, ParseError::BadType("spaceport".into()));
        let ok = strict
            .parse_invocation(&["1", "2", "globe=zorblax", "region=??"])
            .unwrap();
        assert!(ok.warnings.is_empty());
    }

    #[test]
    fn coordinates_are_checked_before_arguments() {
        let strict = CoordinateParser::new(GeoConfig {
            warning_level: WarningPolicy {
                unknown_type: WarningLevel::Fail,
                ..WarningPolicy::default()
            },
            ..GeoConfig::default()
        });
        let err = strict.parse_invocation(&["100", "2", "type=spaceport"]).unwrap_err();
        assert_eq!(err, ParseError::BadLatitude);
    }

    #[test]
    fn dim_and_scale_parsing() {
        assert_eq!(parse_dim("100"), Some(100));
        assert_eq!(parse_dim("10KM"), Some(10_000));
        assert_eq!(parse_dim("0"), None);
        assert_eq!(parse_dim("ten"), None);
        assert_eq!(parse_scale("25000"), Some(2_500));
        assert_eq!(parse_scale("5"), None);
        assert_eq!(parse_scale("-100"), None);
    }
}
