//! Import result reporting.
//!
//! Every import call returns a summary, never a silent no-op. Error,
//! warning, and debug lists are bounded at [`MAX_LOG_ENTRIES`] so a
//! pathological file cannot balloon the response; the counters keep
//! counting past the cap.

use chrono::NaiveDate;
use serde::Serialize;

/// Cap on stored errors/warnings/debug lines per list.
pub const MAX_LOG_ENTRIES: usize = 20;

/// One recorded row-level failure. `row` is the 1-based sheet row number.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn push_capped<T>(list: &mut Vec<T>, entry: T) {
    if list.len() < MAX_LOG_ENTRIES {
        list.push(entry);
    }
}

/// Summary of a single-table import (lead status, booked, performance).
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub sheet: String,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
    pub warnings: Vec<String>,
    pub debug_log: Vec<String>,
}

impl ImportSummary {
    pub fn new(file: &str, sheet: &str) -> Self {
        Self {
            file: file.to_string(),
            sheet: sheet.to_string(),
            inserted: 0,
            updated: 0,
            skipped: 0,
            error_count: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            debug_log: Vec::new(),
        }
    }

    pub fn add_error(&mut self, row: usize, reason: impl Into<String>, context: Option<String>) {
        self.error_count += 1;
        push_capped(&mut self.errors, RowError { row, reason: reason.into(), context });
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        push_capped(&mut self.warnings, message.into());
    }

    pub fn add_debug(&mut self, message: impl Into<String>) {
        push_capped(&mut self.debug_log, message.into());
    }
}

/// Counts for one section of the three-block commission workbook.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionCounts {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
}

impl SectionCounts {
    pub fn add_error(&mut self, row: usize, reason: impl Into<String>, context: Option<String>) {
        self.error_count += 1;
        push_capped(&mut self.errors, RowError { row, reason: reason.into(), context });
    }
}

/// Summary of a commission workbook import: up to three independent
/// sections plus shared warnings and the resolved pay period.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookSummary {
    pub file: String,
    pub sheet: String,
    pub period_month: NaiveDate,
    pub main: SectionCounts,
    pub agents_us: SectionCounts,
    pub hourly: SectionCounts,
    pub warnings: Vec<String>,
    pub debug_log: Vec<String>,
}

impl WorkbookSummary {
    pub fn new(file: &str, sheet: &str, period_month: NaiveDate) -> Self {
        Self {
            file: file.to_string(),
            sheet: sheet.to_string(),
            period_month,
            main: SectionCounts::default(),
            agents_us: SectionCounts::default(),
            hourly: SectionCounts::default(),
            warnings: Vec::new(),
            debug_log: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        push_capped(&mut self.warnings, message.into());
    }

    pub fn add_debug(&mut self, message: impl Into<String>) {
        push_capped(&mut self.debug_log, message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_list_caps_but_counter_does_not() {
        let mut s = ImportSummary::new("f.csv", "Sheet1");
        for row in 1..=50 {
            s.add_error(row, "bad row", None);
        }
        assert_eq!(s.errors.len(), MAX_LOG_ENTRIES);
        assert_eq!(s.error_count, 50);
        assert_eq!(s.errors[0].row, 1);
    }

    #[test]
    fn serializes_without_context_field_when_absent() {
        let mut s = ImportSummary::new("f.csv", "Sheet1");
        s.add_error(3, "bad", None);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"row\":3"));
        assert!(!json.contains("context"));
    }
}
