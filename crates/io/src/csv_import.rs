// CSV decoding to the canonical matrix form

use payline_matrix::CellMatrix;

use crate::error::NormalizeError;
use crate::xlsx::canonical_float;
use crate::{NamedSheet, Workbook};

/// Decode bytes as UTF-8, falling back to Windows-1252 (common for
/// Excel-exported CSVs).
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// A "plain number" field: optional sign, digits, optional decimals, no
/// leading zeros (so zip-code-like text survives untouched). Only these are
/// re-rendered canonically; anything else keeps its exact text.
fn is_plain_number(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Canonicalize one raw CSV field. Matches what the Excel path emits for
/// the same logical value, so the two formats normalize identically.
fn canonical_cell(field: &str) -> Option<String> {
    if field.is_empty() {
        return None;
    }
    if is_plain_number(field) {
        if let Ok(n) = field.parse::<f64>() {
            return Some(canonical_float(n));
        }
    }
    Some(field.to_string())
}

pub(crate) fn normalize_csv(bytes: &[u8]) -> Result<Workbook, NormalizeError> {
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut matrix = CellMatrix::new();
    // The csv reader skips fully blank lines, but block detection depends
    // on empty rows between tables, so re-insert them from line positions.
    let mut next_line: u64 = 1;

    for result in reader.records() {
        let record = result.map_err(|e| NormalizeError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(next_line);
        while next_line < line {
            matrix.push_row(Vec::new());
            next_line += 1;
        }

        let row: Vec<Option<String>> = record.iter().map(canonical_cell).collect();
        // Quoted fields may span lines; account for them when computing
        // the next expected line number.
        let embedded: u64 = record.iter().map(|f| f.matches('\n').count() as u64).sum();
        matrix.push_row(row);
        next_line = line + 1 + embedded;
    }

    Ok(Workbook {
        sheets: vec![NamedSheet { name: "Sheet1".to_string(), matrix }],
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_matrix(bytes: &[u8]) -> CellMatrix {
        normalize_csv(bytes).unwrap().sheets.remove(0).matrix
    }

    #[test]
    fn quoted_fields_with_commas() {
        let m = first_matrix(b"Name,Note\n\"Doe, Jane\",\"says \"\"hi\"\"\"\n");
        assert_eq!(m.cell(1, 0), Some("Doe, Jane"));
        assert_eq!(m.cell(1, 1), Some("says \"hi\""));
    }

    #[test]
    fn empty_fields_are_null_not_empty_string() {
        let m = first_matrix(b"a,,c\n");
        assert_eq!(m.cell(0, 0), Some("a"));
        assert_eq!(m.cell(0, 1), None);
        assert_eq!(m.cell(0, 2), Some("c"));
    }

    #[test]
    fn blank_lines_preserved_as_empty_rows() {
        let m = first_matrix(b"a\n\n\nb\n");
        assert_eq!(m.row_count(), 4);
        assert_eq!(m.cell(0, 0), Some("a"));
        assert!(m.is_row_empty(1));
        assert!(m.is_row_empty(2));
        assert_eq!(m.cell(3, 0), Some("b"));
    }

    #[test]
    fn multiline_quoted_field_does_not_shift_rows() {
        let m = first_matrix(b"a,\"line1\nline2\"\nb,x\n");
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.cell(1, 0), Some("b"));
    }

    #[test]
    fn plain_numbers_canonicalized() {
        let m = first_matrix(b"1.50,007,12,-3.0\n");
        assert_eq!(m.cell(0, 0), Some("1.5"));
        // leading zeros are identity-like text, not numbers
        assert_eq!(m.cell(0, 1), Some("007"));
        assert_eq!(m.cell(0, 2), Some("12"));
        assert_eq!(m.cell(0, 3), Some("-3"));
    }

    #[test]
    fn currency_text_left_untouched() {
        let m = first_matrix(b"$1,234.56\n");
        // one field thanks to no quoting: "$1" then "234.56"
        assert_eq!(m.cell(0, 0), Some("$1"));
        let m = first_matrix(b"\"$1,234.56\",(500.00)\n");
        assert_eq!(m.cell(0, 0), Some("$1,234.56"));
        assert_eq!(m.cell(0, 1), Some("(500.00)"));
    }

    #[test]
    fn windows_1252_fallback() {
        // 0xE9 = e-acute in Windows-1252, invalid alone in UTF-8
        let m = first_matrix(b"Jos\xE9,1\n");
        assert_eq!(m.cell(0, 0), Some("Jos\u{e9}"));
    }
}
