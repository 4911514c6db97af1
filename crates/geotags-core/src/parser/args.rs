// crates/geotags-core/src/parser/args.rs

//! Named arguments of a coordinate tag.
//!
//! A tag invocation such as
//! `10|N|20|E|primary|type=city(30000)|region=us-ca|geohack=scale:50000`
//! carries coordinate tokens, the bare `primary` keyword and `key=value`
//! pairs. The pairs land in the explicit [`TagArgs`] struct through a fixed
//! key table; unknown keys are dropped.

use super::Token;

/// Recognized tag argument keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKey {
    Globe,
    Type,
    Dim,
    Scale,
    Name,
    Region,
}

const TAG_KEYS: &[(&str, TagKey)] = &[
    ("globe", TagKey::Globe),
    ("type", TagKey::Type),
    ("dim", TagKey::Dim),
    ("scale", TagKey::Scale),
    ("name", TagKey::Name),
    ("region", TagKey::Region),
];

const PRIMARY_KEYWORD: &str = "primary";
const GEOHACK_KEY: &str = "geohack";

/// Tag arguments as given, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArgs {
    pub primary: bool,
    pub globe: Option<String>,
    pub type_: Option<String>,
    pub dim: Option<String>,
    pub scale: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
}

impl TagArgs {
    /// Sets `key` to `value`. Returns `false` if the key is not recognized.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim();
        let Some((_, tag_key)) = TAG_KEYS.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)) else {
            return false;
        };
        let value = Some(value.trim().to_string());
        match tag_key {
            TagKey::Globe => self.globe = value,
            TagKey::Type => self.type_ = value,
            TagKey::Dim => self.dim = value,
            TagKey::Scale => self.scale = value,
            TagKey::Name => self.name = value,
            TagKey::Region => self.region = value,
        }
        true
    }

    /// Decodes the compact `key:value key:value` form. Underscores and
    /// spaces are interchangeable; words without a colon are skipped.
    pub fn from_geohack(encoded: &str) -> Self {
        let mut args = TagArgs::default();
        let decoded = encoded.replace('_', " ");
        for word in decoded.split(' ') {
            if let Some((key, value)) = word.split_once(':') {
                if !args.set(key, value) {
                    tracing::debug!(key, "ignoring unknown geohack parameter");
                }
            }
        }
        args
    }

    /// Fills every field missing in `self` from `fallback`.
    pub fn or(self, fallback: TagArgs) -> TagArgs {
        TagArgs {
            primary: self.primary || fallback.primary,
            globe: self.globe.or(fallback.globe),
            type_: self.type_.or(fallback.type_),
            dim: self.dim.or(fallback.dim),
            scale: self.scale.or(fallback.scale),
            name: self.name.or(fallback.name),
            region: self.region.or(fallback.region),
        }
    }
}

/// A tag invocation split into coordinate tokens and named arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub tokens: Vec<Token>,
    pub args: TagArgs,
}

impl Invocation {
    /// Splits raw invocation parts. `primary` sets the flag, `key=value`
    /// pairs become named arguments (a `geohack` pair has the lowest
    /// precedence), everything else is a coordinate token.
    pub fn split<S: AsRef<str>>(parts: &[S]) -> Self {
        let mut tokens = Vec::new();
        let mut args = TagArgs::default();
        let mut geohack = None;

        for part in parts {
            let part = part.as_ref().trim();
            if part.eq_ignore_ascii_case(PRIMARY_KEYWORD) {
                args.primary = true;
            } else if let Some((key, value)) = part.split_once('=') {
                if key.trim().eq_ignore_ascii_case(GEOHACK_KEY) {
                    geohack = Some(value.to_string());
                } else if !args.set(key, value) {
                    tracing::debug!(key, "ignoring unknown tag argument");
                }
            } else {
                tokens.push(Token::Text(part.to_string()));
            }
        }

        if let Some(encoded) = geohack {
            args = args.or(TagArgs::from_geohack(&encoded));
        }
        Invocation { tokens, args }
    }
}
