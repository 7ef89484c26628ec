//! Shared header handling for the single-table report importers.

use std::collections::HashMap;

use payline_matrix::CellMatrix;

use crate::error::ImportError;

/// Rows scanned from the top when locating a report's header row.
pub(crate) const HEADER_SCAN_ROWS: usize = 10;

/// Find the header row: the first row within the scan window whose joined
/// text contains every identifying keyword (case-insensitive).
pub(crate) fn find_header_row(matrix: &CellMatrix, keywords: &[&str]) -> Option<usize> {
    for row in 0..matrix.row_count().min(HEADER_SCAN_ROWS) {
        let joined = match matrix.row(row) {
            Some(cells) => cells
                .iter()
                .filter_map(|c| c.as_deref())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            None => continue,
        };
        if keywords.iter().all(|k| joined.contains(&k.to_lowercase())) {
            return Some(row);
        }
    }
    None
}

/// Map every non-empty header cell to its column index; duplicate names
/// get `__2`, `__3`… suffixes.
pub(crate) fn map_header(matrix: &CellMatrix, row: usize) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    let mut dup_counts: HashMap<String, usize> = HashMap::new();
    for col in 0..matrix.width() {
        let Some(text) = matrix.cell(row, col) else {
            continue;
        };
        let header = text.trim();
        if header.is_empty() {
            continue;
        }
        let key = if columns.contains_key(header) {
            let n = dup_counts.entry(header.to_string()).or_insert(1);
            *n += 1;
            format!("{header}__{n}")
        } else {
            header.to_string()
        };
        columns.insert(key, col);
    }
    columns
}

/// Resolve a column by name: exact case-insensitive match first, then
/// prefix match (reports sometimes carry trailing decorations).
pub(crate) fn column(columns: &HashMap<String, usize>, name: &str) -> Option<usize> {
    let lower = name.to_lowercase();
    columns
        .iter()
        .find(|(k, _)| k.to_lowercase() == lower)
        .map(|(_, &idx)| idx)
        .or_else(|| {
            columns
                .iter()
                .filter(|(k, _)| k.to_lowercase().starts_with(&lower))
                .map(|(_, &idx)| idx)
                .min()
        })
}

/// Fail with `InvalidFileFormat` unless every required header resolves.
pub(crate) fn require_columns(
    columns: &HashMap<String, usize>,
    required: &[&str],
) -> Result<(), ImportError> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|name| column(columns, name).is_none())
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::InvalidFileFormat(format!(
            "missing required headers: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[&str]]) -> CellMatrix {
        rows.iter()
            .map(|row| row.iter().map(|s| Some(s.to_string())).collect())
            .collect()
    }

    #[test]
    fn header_found_within_window() {
        let m = matrix(&[
            &["Lead Status Report"],
            &[],
            &["Quote #", "Branch Name", "Status"],
        ]);
        assert_eq!(find_header_row(&m, &["quote", "status"]), Some(2));
        assert_eq!(find_header_row(&m, &["invoiced"]), None);
    }

    #[test]
    fn column_resolution_prefers_exact() {
        let m = matrix(&[&["Status", "Status Detail", "Quote # "]]);
        let cols = map_header(&m, 0);
        assert_eq!(column(&cols, "Status"), Some(0));
        assert_eq!(column(&cols, "Quote #"), Some(2));
        assert_eq!(column(&cols, "Nope"), None);
    }

    #[test]
    fn missing_required_headers_fail() {
        let m = matrix(&[&["Quote #", "Status"]]);
        let cols = map_header(&m, 0);
        let err = require_columns(&cols, &["Quote #", "Branch Name"]).unwrap_err();
        assert!(err.to_string().contains("Branch Name"));
    }
}
