//! Free-text commission-adjustment directive parsing.
//!
//! Lead-status cells carry hand-typed instructions like
//! `"40% of the move to Jimmy"`. Patterns are tried in order, first match
//! wins; anything unrecognized degrades to [`Directive::None`] — the source
//! text is uncontrolled human input, so an unknown phrasing is expected,
//! not an error.

use regex::Regex;

use crate::value::normalize_name_key;

/// The adjustment target: the raw name as typed plus its matching key.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub raw: String,
    pub key: String,
}

impl Target {
    fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let key = normalize_name_key(&raw);
        Self { raw, key }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Directive {
    /// No adjustment (blank, "default", or unrecognized text).
    #[default]
    None,
    /// A percentage of the invoiced amount moves to the target.
    PercentSplit { pct: f64, target: Target },
    /// A fixed dollar amount of revenue moves to the target.
    FixedRevTransfer { amount: f64, target: Target },
    /// A fixed dollar booking bonus moves to the target.
    FixedBookingTransfer { amount: f64, target: Target },
}

impl Directive {
    pub fn is_none(&self) -> bool {
        matches!(self, Directive::None)
    }
}

/// Parse one lead-status cell into a [`Directive`]. Never errors.
pub fn parse_directive(raw: &str) -> Directive {
    let text = raw.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("default") {
        return Directive::None;
    }

    // Anchored: the whole cell must be the directive. A note that merely
    // mentions a split ("do not split with Sam") moves no money.
    let split_with = Regex::new(r"(?i)^split\s+(?:the\s+move\s+)?with\s+(.+)$").unwrap();
    if let Some(caps) = split_with.captures(text) {
        return Directive::PercentSplit {
            pct: 50.0,
            target: Target::new(&caps[1]),
        };
    }

    let pct_of_move =
        Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*%\s+of\s+(?:the\s+)?move\s+to\s+(.+)$").unwrap();
    if let Some(caps) = pct_of_move.captures(text) {
        if let Ok(pct) = caps[1].parse::<f64>() {
            return Directive::PercentSplit {
                pct,
                target: Target::new(&caps[2]),
            };
        }
    }

    let deduction = Regex::new(
        r"(?i)^\$\s*(\d+(?:,\d{3})*(?:\.\d+)?)\s+deduction\s+off\s+revenue\s+goes\s+to\s+(.+)$",
    )
    .unwrap();
    if let Some(caps) = deduction.captures(text) {
        if let Ok(amount) = caps[1].replace(',', "").parse::<f64>() {
            return Directive::FixedRevTransfer {
                amount,
                target: Target::new(&caps[2]),
            };
        }
    }

    let bonus =
        Regex::new(r"(?i)^\$\s*(\d+(?:,\d{3})*(?:\.\d+)?)\s+bonus\s+(?:to|for)\s+(.+)$").unwrap();
    if let Some(caps) = bonus.captures(text) {
        if let Ok(amount) = caps[1].replace(',', "").parse::<f64>() {
            return Directive::FixedBookingTransfer {
                amount,
                target: Target::new(&caps[2]),
            };
        }
    }

    Directive::None
}
