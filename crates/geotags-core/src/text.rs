// crates/geotags-core/src/text.rs

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\).*$").expect("static regex"));

/// Convert a string into a folded key suitable for lookups.
///
/// Trims, transliterates Unicode to ASCII with `deunicode` and lowercases,
/// so `" Ganymède "` and `"ganymede"` address the same globe.
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s.trim()).to_lowercase()
}

/// Normalizes a coordinate `type` argument: everything from the first
/// parenthesis on is dropped (`"city(30000)"` → `"city"`) and the rest is
/// lowercased.
pub fn normalize_type(raw: &str) -> String {
    TRAILING_PARENTHETICAL
        .replace(raw, "")
        .trim()
        .to_lowercase()
}
