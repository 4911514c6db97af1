// crates/geotags-core/src/parser/format.rs

//! Renders coordinates back into parser tokens.

use super::Token;
use crate::coord::Coord;
use crate::globe::Globe;

/// 1e-4 arcseconds per degree.
const DMS_UNITS_PER_DEGREE: u64 = 3600 * 10_000;
const DMS_UNITS_PER_MINUTE: u64 = 60 * 10_000;

fn latitude_suffix(lat: f64) -> &'static str {
    if lat < 0.0 {
        "S"
    } else {
        "N"
    }
}

fn longitude_suffix(lon: f64, globe: &Globe) -> &'static str {
    let wanted = if lon < 0.0 { -1.0 } else { 1.0 };
    globe
        .longitude_suffixes()
        .into_iter()
        .find(|(_, sign)| *sign == wanted)
        .map_or("E", |(suffix, _)| suffix)
}

/// `[lat, N|S, lon, E|W]` with six decimal digits.
pub fn to_decimal_tokens(coord: &Coord, globe: &Globe) -> Vec<Token> {
    vec![
        Token::Text(format!("{:.6}", coord.lat.abs())),
        Token::from(latitude_suffix(coord.lat)),
        Token::Text(format!("{:.6}", coord.lon.abs())),
        Token::from(longitude_suffix(coord.lon, globe)),
    ]
}

/// `[d, m, s, N|S, d, m, s, E|W]` with seconds to four decimal digits.
pub fn to_dms_tokens(coord: &Coord, globe: &Globe) -> Vec<Token> {
    let mut tokens = dms(coord.lat);
    tokens.push(Token::from(latitude_suffix(coord.lat)));
    tokens.extend(dms(coord.lon));
    tokens.push(Token::from(longitude_suffix(coord.lon, globe)));
    tokens
}

fn dms(value: f64) -> Vec<Token> {
    let units = (value.abs() * DMS_UNITS_PER_DEGREE as f64).round() as u64;
    let degrees = units / DMS_UNITS_PER_DEGREE;
    let rest = units % DMS_UNITS_PER_DEGREE;
    let minutes = rest / DMS_UNITS_PER_MINUTE;
    let seconds = (rest % DMS_UNITS_PER_MINUTE) as f64 / 10_000.0;
    vec![
        Token::Number(degrees as f64),
        Token::Number(minutes as f64),
        Token::Text(format!("{seconds:.4}")),
    ]
}
