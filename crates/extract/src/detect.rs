//! Heuristic block detection.
//!
//! A commission worksheet is one loosely formatted sheet holding up to three
//! independent tables (main commission, US-agent commission, hourly payout),
//! each starting wherever the author left off. The detector scores rows
//! against per-shape keyword sets to find header rows, then scans forward to
//! find where each table's data ends. Shapes are searched sequentially, each
//! restricted to rows after the previous block, so detected blocks can never
//! overlap.

use std::collections::HashMap;

use payline_matrix::CellMatrix;

use crate::config::DetectorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Main,
    AgentsUs,
    Hourly,
}

impl BlockKind {
    /// Detection order. Sheets are authored top-down in this sequence.
    pub const ALL: [BlockKind; 3] = [BlockKind::Main, BlockKind::AgentsUs, BlockKind::Hourly];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::AgentsUs => "agents_us",
            Self::Hourly => "hourly",
        }
    }

    /// Header vocabulary for this shape, drawn from the real worksheets.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Main => &[
                "Name",
                "Hourly Rate",
                "Total Revenue",
                "Booking %",
                "Commission %",
                "Commission Earned",
                "Spiff Bonus",
                "Revenue Bonus",
                "Booking Bonus",
                "Hourly Paid Out",
                "Total Due",
                "Amount Paid",
                "Remaining Amount",
            ],
            Self::AgentsUs => &[
                "Agents",
                "Total US Revenue",
                "Commission %",
                "Commission Earned",
                "Commission 1.25x",
                "Bonus",
            ],
            Self::Hourly => &["Hourly Paid Out", "Name", "Hours", "Hourly Rate", "Total Paid"],
        }
    }

    /// Header cells that designate the name column, in preference order.
    fn name_keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Main => &["name", "employee"],
            Self::AgentsUs => &["agents", "agent"],
            Self::Hourly => &["hourly paid out", "name"],
        }
    }

    /// Name-column tokens that mark the start of a *different* shape's
    /// section, ending this block's data early.
    fn stop_tokens(&self) -> &'static [&'static str] {
        match self {
            Self::Main => &["agents", "agents us", "hourly paid out", "hourly payout"],
            Self::AgentsUs => &["hourly paid out", "hourly payout"],
            Self::Hourly => &["agents", "agents us"],
        }
    }
}

/// One located table within the matrix. `data_end` is exclusive.
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    pub header_row: usize,
    pub data_start: usize,
    pub data_end: usize,
    /// Header name → column index; duplicates suffixed `__2`, `__3`…
    pub columns: HashMap<String, usize>,
    pub name_col: usize,
}

/// One extracted data row with by-column-name access.
#[derive(Debug, Clone)]
pub struct BlockRow {
    /// Zero-based matrix row index (for error reporting).
    pub row_index: usize,
    pub name_raw: Option<String>,
    values: HashMap<String, String>,
}

impl BlockRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Block {
    pub fn data_row_count(&self) -> usize {
        self.data_end.saturating_sub(self.data_start)
    }

    /// Materialize the block's data rows. Fully empty rows are kept (with
    /// empty value maps) so reported row numbers stay aligned to the sheet.
    pub fn extract(&self, matrix: &CellMatrix) -> Vec<BlockRow> {
        let mut rows = Vec::with_capacity(self.data_row_count());
        for row_index in self.data_start..self.data_end {
            let mut values = HashMap::new();
            for (name, &col) in &self.columns {
                if let Some(text) = matrix.cell(row_index, col) {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        values.insert(name.clone(), trimmed.to_string());
                    }
                }
            }
            let name_raw = matrix
                .cell(row_index, self.name_col)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            rows.push(BlockRow { row_index, name_raw, values });
        }
        rows
    }
}

/// Fuzzy keyword match: exact (case-insensitive), substring either way, or
/// at least `word_overlap` of the keyword's words present in the cell.
fn fuzzy_match(cell_lower: &str, keyword_lower: &str, word_overlap: f64) -> bool {
    if cell_lower == keyword_lower {
        return true;
    }
    if cell_lower.contains(keyword_lower) || keyword_lower.contains(cell_lower) {
        return true;
    }
    let keyword_words: Vec<&str> = keyword_lower.split_whitespace().collect();
    if keyword_words.is_empty() {
        return false;
    }
    let cell_words: Vec<&str> = cell_lower.split_whitespace().collect();
    let hits = keyword_words
        .iter()
        .filter(|w| cell_words.contains(w))
        .count();
    hits as f64 / keyword_words.len() as f64 >= word_overlap
}

/// Score a row for a shape: one point per cell matching any keyword; a
/// cell counts at most once no matter how many keywords it resembles.
fn score_row(matrix: &CellMatrix, row: usize, kind: BlockKind, config: &DetectorConfig) -> usize {
    let keywords: Vec<String> = kind.keywords().iter().map(|k| k.to_lowercase()).collect();
    let mut score = 0;
    for col in 0..matrix.width() {
        let Some(text) = matrix.cell(row, col) else {
            continue;
        };
        let cell_lower = text.trim().to_lowercase();
        if cell_lower.is_empty() {
            continue;
        }
        if keywords
            .iter()
            .any(|k| fuzzy_match(&cell_lower, k, config.word_overlap))
        {
            score += 1;
        }
    }
    score
}

/// Find the header row for a shape at or after `from`: the highest-scoring
/// row at or above threshold, ties broken by lowest row index.
fn find_header(
    matrix: &CellMatrix,
    from: usize,
    kind: BlockKind,
    config: &DetectorConfig,
) -> Option<usize> {
    let threshold = config.threshold(kind.keywords().len());
    let limit = matrix.row_count().min(config.max_scan_rows);

    let mut best: Option<(usize, usize)> = None;
    for row in from..limit {
        let score = score_row(matrix, row, kind, config);
        if score < threshold {
            continue;
        }
        match best {
            // strictly greater keeps the first occurrence on ties
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((row, score)),
        }
    }
    best.map(|(row, _)| row)
}

/// Map every non-empty header cell to its column index, suffixing
/// duplicates, and pick the name column.
fn map_columns(
    matrix: &CellMatrix,
    header_row: usize,
    kind: BlockKind,
) -> (HashMap<String, usize>, usize) {
    let mut columns = HashMap::new();
    let mut dup_counts: HashMap<String, usize> = HashMap::new();
    let mut name_col: Option<usize> = None;
    let mut first_col: Option<usize> = None;

    for col in 0..matrix.width() {
        let Some(text) = matrix.cell(header_row, col) else {
            continue;
        };
        let header = text.trim();
        if header.is_empty() {
            continue;
        }
        first_col.get_or_insert(col);

        let key = if columns.contains_key(header) {
            let n = dup_counts.entry(header.to_string()).or_insert(1);
            *n += 1;
            format!("{header}__{n}")
        } else {
            header.to_string()
        };
        columns.insert(key, col);

        if name_col.is_none() {
            let lower = header.to_lowercase();
            if kind.name_keywords().iter().any(|k| lower == *k) {
                name_col = Some(col);
            }
        }
    }

    (columns, name_col.or(first_col).unwrap_or(0))
}

/// Scan forward from `start` for the end of a block's data (exclusive).
///
/// Stops at the first row whose name-column text resembles another shape's
/// section token, or once `empty_row_run` consecutive name-column-empty
/// rows have passed (backing up to exclude the empty run). Otherwise runs
/// to the end of the matrix.
fn find_data_end(
    matrix: &CellMatrix,
    start: usize,
    name_col: usize,
    kind: BlockKind,
    config: &DetectorConfig,
) -> usize {
    let mut empty_run = 0;
    for row in start..matrix.row_count() {
        let name_lower = matrix
            .cell(row, name_col)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        if !name_lower.is_empty()
            && kind
                .stop_tokens()
                .iter()
                .any(|t| name_lower == *t || name_lower.contains(t))
        {
            return row;
        }

        if name_lower.is_empty() {
            empty_run += 1;
            if empty_run >= config.empty_row_run {
                return row + 1 - empty_run;
            }
        } else {
            empty_run = 0;
        }
    }
    matrix.row_count()
}

/// Detect every block present in the matrix, in shape order.
///
/// Each shape's search starts after the previous block's data end, so for
/// any two returned blocks `a` then `b`, `a.data_end <= b.header_row`.
/// A shape with no qualifying header row is simply absent.
pub fn detect_blocks(matrix: &CellMatrix, config: &DetectorConfig) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    for kind in BlockKind::ALL {
        let Some(header_row) = find_header(matrix, cursor, kind, config) else {
            continue;
        };
        let (columns, name_col) = map_columns(matrix, header_row, kind);
        let data_start = header_row + 1;
        let data_end = find_data_end(matrix, data_start, name_col, kind, config);

        cursor = data_end;
        blocks.push(Block {
            kind,
            header_row,
            data_start,
            data_end,
            columns,
            name_col,
        });
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[&str]]) -> CellMatrix {
        let mut m = CellMatrix::new();
        for row in rows {
            m.push_row(row.iter().map(|s| Some(s.to_string())).collect());
        }
        m
    }

    const MAIN_HEADER: &[&str] = &[
        "Name",
        "Hourly Rate",
        "Total Revenue",
        "Booking %",
        "Commission %",
        "Commission Earned",
        "Total Due",
    ];

    #[test]
    fn fuzzy_match_modes() {
        assert!(fuzzy_match("commission earned", "commission earned", 0.3));
        assert!(fuzzy_match("total commission earned ytd", "commission earned", 0.3));
        // substring either direction
        assert!(fuzzy_match("bonus", "spiff bonus", 0.3));
        // word overlap: 1 of 2 keyword words present = 0.5 >= 0.3
        assert!(fuzzy_match("earned amount", "commission earned", 0.3));
        assert!(!fuzzy_match("quote number", "commission earned", 0.3));
    }

    #[test]
    fn main_header_found_and_columns_mapped() {
        let m = matrix(&[
            &["Commission Worksheet"],
            &[],
            MAIN_HEADER,
            &["Alice", "25", "100000", "40", "5", "5000", "5000"],
        ]);
        let blocks = detect_blocks(&m, &DetectorConfig::default());
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.kind, BlockKind::Main);
        assert_eq!(b.header_row, 2);
        assert_eq!(b.data_start, 3);
        assert_eq!(b.columns["Name"], 0);
        assert_eq!(b.columns["Total Due"], 6);
        assert_eq!(b.name_col, 0);
    }

    #[test]
    fn no_header_below_threshold() {
        let m = matrix(&[
            &["Name", "Notes"],
            &["Alice", "called back"],
        ]);
        // only one keyword cell ("Name") scores, below the floor of 3
        assert!(detect_blocks(&m, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn duplicate_headers_suffixed() {
        let m = matrix(&[
            &["Name", "Commission Earned", "Total Due", "Commission Earned"],
        ]);
        let (columns, _) = map_columns(&m, 0, BlockKind::Main);
        assert_eq!(columns["Commission Earned"], 1);
        assert_eq!(columns["Commission Earned__2"], 3);
    }

    #[test]
    fn empty_run_ends_block_and_backs_up() {
        let mut rows: Vec<Vec<Option<String>>> = vec![
            MAIN_HEADER.iter().map(|s| Some(s.to_string())).collect(),
            vec![Some("Alice".into()), Some("25".into())],
            vec![Some("Bob".into()), Some("30".into())],
        ];
        for _ in 0..12 {
            rows.push(vec![None, Some("stray".into())]);
        }
        rows.push(vec![Some("Orphan".into())]);
        let mut m = CellMatrix::new();
        for r in rows {
            m.push_row(r);
        }

        let blocks = detect_blocks(&m, &DetectorConfig::default());
        assert_eq!(blocks.len(), 1);
        // data ends right after Bob: the 10-row empty run is excluded
        assert_eq!(blocks[0].data_end, 3);
    }

    #[test]
    fn stop_token_ends_block() {
        let m = matrix(&[
            MAIN_HEADER,
            &["Alice", "25", "100000", "40", "5", "5000", "5000"],
            &["Agents"],
            &["should not be in main"],
        ]);
        let blocks = detect_blocks(&m, &DetectorConfig::default());
        assert_eq!(blocks[0].data_end, 2);
    }

    #[test]
    fn three_blocks_never_overlap() {
        let m = matrix(&[
            MAIN_HEADER,
            &["Alice", "25", "100000", "40", "5", "5000", "5000"],
            &["Bob", "30", "200000", "50", "6", "12000", "12000"],
            &[],
            &["Agents", "Total US Revenue", "Commission %", "Commission Earned", "Bonus"],
            &["Carol", "50000", "4", "2000", "0"],
            &[],
            &["Hourly Paid Out", "Hours", "Hourly Rate", "Total Paid"],
            &["Dave", "80", "25", "2000"],
        ]);
        let blocks = detect_blocks(&m, &DetectorConfig::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Main);
        assert_eq!(blocks[1].kind, BlockKind::AgentsUs);
        assert_eq!(blocks[2].kind, BlockKind::Hourly);
        for pair in blocks.windows(2) {
            assert!(pair[0].data_end <= pair[1].header_row);
        }
    }

    #[test]
    fn extract_rows_by_column_name() {
        let m = matrix(&[
            MAIN_HEADER,
            &["Alice", "25", "100000", "40", "5", "5000", "5000"],
            &["", "", "", "", "", "", ""],
            &["Bob", "30", "", "50", "6", "12000", "12000"],
        ]);
        let blocks = detect_blocks(&m, &DetectorConfig::default());
        let rows = blocks[0].extract(&m);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name_raw.as_deref(), Some("Alice"));
        assert_eq!(rows[0].get("Total Revenue"), Some("100000"));
        assert!(rows[1].is_empty());
        assert_eq!(rows[2].get("Total Revenue"), None);
        assert_eq!(rows[2].get("Booking %"), Some("50"));
        assert_eq!(rows[2].row_index, 3);
    }
}
