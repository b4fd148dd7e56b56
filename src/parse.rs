// src/parse.rs
//
// Cell cleanup and numeric coercion for scraped text.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("header regex should compile"));

/// Placeholders the sources use for "no value".
const MISSING: &[&str] = &["", "N/A", "Unknown"];

/// Trim whitespace and drop stray line breaks inside a cell.
pub fn clean_str(raw: &str) -> String {
    raw.trim().replace(['\n', '\r'], "")
}

/// Drop thousands separators and keep only the part after the last `+`,
/// so `"+1,234"` becomes `"1234"`.
fn strip_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let tail = trimmed.rsplit('+').next().unwrap_or(trimmed);
    tail.trim().replace(',', "")
}

/// Lenient non-negative count.
///
/// Placeholders (`""`, `"N/A"`, `"Unknown"`) and anything that still fails to
/// parse after cleanup yield 0.
pub fn count(raw: &str) -> u64 {
    strict_count(raw).unwrap_or(0)
}

/// Like [`count`] but reports missing or malformed cells as `None`.
pub fn strict_count(raw: &str) -> Option<u64> {
    let cleaned = strip_number(raw);
    if MISSING.contains(&cleaned.as_str()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Signed integer for daily feeds that publish downward corrections.
/// Falls back to 0 like [`count`].
pub fn signed(raw: &str) -> i64 {
    let cleaned = raw.trim().replace(',', "");
    if MISSING.contains(&cleaned.as_str()) {
        return 0;
    }
    cleaned
        .parse::<i64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().and_then(float_count))
        .unwrap_or(0)
}

/// Truncate a float count. Non-finite values and values outside `i64` are
/// malformed and yield `None`.
pub fn float_count(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| f as i64)
}

/// Header labels are compared lower-cased with punctuation and spaces removed,
/// so `"Country,\nOther"` matches `"country"`.
pub fn header_key(raw: &str) -> String {
    NON_ALNUM
        .replace_all(&raw.to_lowercase(), "")
        .into_owned()
}
