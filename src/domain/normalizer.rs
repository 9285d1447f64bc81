//! Field normalization for harvested listing text
//!
//! Prices are cleaned with a single character-class pass; descriptions are
//! only trimmed. Nothing here parses numbers, output stays textual.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters removed from raw price text: any whitespace (newlines included),
/// currency and percent signs, the `c`/`u` unit letters, dots and dashes.
static PRICE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n\s$%cu.\-]").expect("price noise pattern is valid"));

/// Strip whitespace and currency/unit noise from a raw price string.
///
/// The character set is narrow and locale-specific: `"1.299,00 $"` becomes
/// `"1299,00"`, while a trailing currency code such as `"EUR"` is kept.
pub fn clean_price(raw: &str) -> String {
    PRICE_NOISE.replace_all(raw, "").into_owned()
}

/// Descriptions are only trimmed.
pub fn clean_description(raw: &str) -> String {
    raw.trim().to_string()
}
