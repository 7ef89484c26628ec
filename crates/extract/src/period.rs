//! Pay-period resolution from worksheet tab names.

use chrono::NaiveDate;

const MONTHS: [(&str, u32); 12] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Resolve a commission worksheet tab name like `"July 2025"` or
/// `"Comm - Aug 2025 (final)"` to the first of that month. Needs a month
/// name (full or 3-letter) and a `20xx` year anywhere in the string.
pub fn parse_period_from_sheet_name(name: &str) -> Option<NaiveDate> {
    let lower = name.to_lowercase();

    let month = MONTHS
        .iter()
        .find(|(m, _)| lower.contains(m) || lower.contains(&m[..3]))
        .map(|(_, n)| *n)?;

    let bytes = lower.as_bytes();
    let mut year: Option<i32> = None;
    for i in 0..bytes.len().saturating_sub(3) {
        if bytes[i] == b'2' && bytes[i + 1] == b'0' {
            let tail = &lower[i..i + 4];
            if tail.chars().all(|c| c.is_ascii_digit()) {
                year = tail.parse().ok();
                if year.is_some() {
                    break;
                }
            }
        }
    }

    NaiveDate::from_ymd_opt(year?, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn full_month_name() {
        assert_eq!(parse_period_from_sheet_name("July 2025"), Some(d(2025, 7)));
        assert_eq!(parse_period_from_sheet_name("December 2024"), Some(d(2024, 12)));
    }

    #[test]
    fn abbreviated_and_decorated() {
        assert_eq!(
            parse_period_from_sheet_name("Comm - Aug 2025 (final)"),
            Some(d(2025, 8))
        );
        assert_eq!(parse_period_from_sheet_name("sep2026"), Some(d(2026, 9)));
    }

    #[test]
    fn missing_pieces() {
        assert_eq!(parse_period_from_sheet_name("Sheet1"), None);
        assert_eq!(parse_period_from_sheet_name("July"), None);
        assert_eq!(parse_period_from_sheet_name("2025 totals"), None);
    }
}
