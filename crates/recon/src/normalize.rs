//! Numeric cell cleanup for semi-structured schedule sheets.

use crate::model::{is_missing_marker, Cell};

/// Substrings that mark a cell as a header/label leaking into the data area.
pub const HEADER_KEYWORDS: &[&str] = &[
    "qty",
    "quantity",
    "rate",
    "amount",
    "sno",
    "serial",
    "unit",
    "description",
    "item",
    "total",
    "grand",
    "sub",
    "header",
];

/// True when `text` contains a header keyword (case-insensitive).
pub fn looks_like_header(text: &str) -> bool {
    let lower = text.to_lowercase();
    HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Clean a raw cell into a number.
///
/// Blank cells and missing-value markers (`N/A`, `NULL`, `#N/A`, ...) are
/// `0.0`. Text is trimmed and one trailing `%` dropped before
/// parsing. Returns `None` ("not usable") for header-like text, unparseable
/// text and infinities; the caller decides what to do with the row.
pub fn normalize(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => Some(0.0),
        Cell::Number(n) if n.is_nan() => Some(0.0),
        Cell::Number(n) => n.is_finite().then_some(*n),
        Cell::Text(s) if s.is_empty() || is_missing_marker(s) => Some(0.0),
        Cell::Text(s) => normalize_text(s),
    }
}

fn normalize_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    if looks_like_header(stripped) {
        return None;
    }

    stripped.parse::<f64>().ok().filter(|n| n.is_finite())
}
