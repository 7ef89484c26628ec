//! `payline-matrix` — the matrix-of-cells abstraction shared by every
//! importer.
//!
//! A [`CellMatrix`] is what a spreadsheet looks like after the container
//! format (CSV or Excel) has been stripped away: ordered rows of
//! optionally-empty canonical cell strings. Identical logical content must
//! produce identical matrices regardless of source format, so everything
//! downstream (block detection, value parsing, upserts) behaves the same
//! for a CSV export and its Excel twin.

use serde::Serialize;

/// Canonical cell grid. Rows may have different widths; out-of-range reads
/// return `None`, same as an empty cell.
///
/// Canonical form contract (enforced by the normalizers in `payline-io`):
/// - empty cells are `None`, never `Some("")`
/// - whole numbers carry no trailing `.0`
/// - dates render as `YYYY-MM-DD` (plus ` HH:MM:SS` only when a time part
///   exists)
/// - booleans render as `TRUE` / `FALSE`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellMatrix {
    rows: Vec<Vec<Option<String>>>,
}

impl CellMatrix {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a row. Empty-string cells are normalized to `None` here so a
    /// careless caller cannot break the canonical-form contract.
    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        let row = row
            .into_iter()
            .map(|cell| cell.filter(|s| !s.is_empty()))
            .collect();
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the matrix.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    pub fn row(&self, row: usize) -> Option<&[Option<String>]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// True when the row holds no non-empty cell (or does not exist).
    pub fn is_row_empty(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().all(|c| c.is_none()),
            None => true,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

impl FromIterator<Vec<Option<String>>> for CellMatrix {
    fn from_iter<I: IntoIterator<Item = Vec<Option<String>>>>(iter: I) -> Self {
        let mut matrix = CellMatrix::new();
        for row in iter {
            matrix.push_row(row);
        }
        matrix
    }
}
