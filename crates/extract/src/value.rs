//! Stateless cell value parsers.
//!
//! Every function here is total: malformed input yields `None` (or an empty
//! key), never an error. Human-authored spreadsheets contain every kind of
//! garbage and a parser that panics on it takes the whole import down.

use chrono::NaiveDate;

/// Trim a raw cell, mapping blank to `None`.
pub fn clean_cell(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse a currency cell: `$1,234.56` → 1234.56, `(500.00)` → -500.0.
///
/// Blank, a bare dash, or anything that is not a number after stripping
/// currency decoration yields `None`.
pub fn parse_money(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() || s == "-" || s == "--" {
        return None;
    }
    let negative = s.starts_with('(') && s.ends_with(')');
    let stripped: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | ' '))
        .collect();
    if stripped.is_empty() {
        return None;
    }
    let n: f64 = stripped.parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Parse a percent cell, preserving the value as written: `"40%"` → 40.0,
/// never 0.4. Rescaling is the caller's decision, not the parser's.
pub fn parse_percent(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let stripped: String = s.chars().filter(|c| !matches!(c, '%' | ',' | ' ')).collect();
    stripped.parse().ok()
}

/// Parse an integer cell, tolerating thousands separators and a stray
/// decimal point from Excel (`"1,250"` → 1250, `"42.0"` → 42).
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let stripped: String = s.chars().filter(|c| *c != ',' && *c != ' ').collect();
    if let Ok(n) = stripped.parse::<i64>() {
        return Some(n);
    }
    // Excel sometimes renders integral counts as floats
    let f: f64 = stripped.parse().ok()?;
    if f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a date cell into a `NaiveDate`.
///
/// Accepted forms: `YYYY-MM-DD` (optionally with a time suffix),
/// `MM/DD/YYYY`, `M/D/YY`, and `Month D, YYYY`. Ambiguous or unparseable
/// input yields `None` rather than a guessed date.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    // Canonical form first (the normalizer emits this for Excel date cells)
    let date_part = s.split(' ').next().unwrap_or(s);
    if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%m/%d/%Y", "%m/%d/%y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Normalize a person name into its matching key: lowercase, trimmed,
/// internal whitespace collapsed, everything outside `[a-z0-9 -]` stripped.
///
/// This is the single shared implementation; every site that compares names
/// (employee lookup, directive targets, calc joins) must go through it —
/// two diverging copies would silently stop matching.
pub fn normalize_name_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Extract the leading positive integer from free text:
/// `"285137 open_in_new"` → 285137. No leading digits → `None`.
pub fn extract_quote_id(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim();
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let id: i64 = digits.parse().ok()?;
    if id > 0 {
        Some(id)
    } else {
        None
    }
}
