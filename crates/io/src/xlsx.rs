// Excel decoding via calamine (xlsx, xls)

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use payline_matrix::CellMatrix;

use crate::error::NormalizeError;
use crate::{NamedSheet, Workbook};

/// Hard cap on imported cells across all sheets (a hostile workbook can
/// declare an enormous dense range).
const MAX_CELLS: usize = 2_000_000;

/// Render a float the canonical way: integers without decimals.
pub(crate) fn canonical_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Render an Excel date serial (1900 system, epoch 1899-12-30) as a
/// canonical date/time string.
fn serial_to_string(serial: f64) -> String {
    let days = serial.floor() as i64;
    let frac = serial - serial.floor();
    // Small epsilon: serials round-trip through floats
    let has_time = frac.abs() > 0.0001;
    let has_date = days > 0;

    let time_str = || {
        let total_secs = (frac * 86_400.0).round() as u32 % 86_400;
        format!(
            "{:02}:{:02}:{:02}",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60
        )
    };

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch");
    let date = epoch + Duration::days(days);

    match (has_date, has_time) {
        (true, true) => format!("{} {}", date.format("%Y-%m-%d"), time_str()),
        (false, true) => time_str(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

fn canonical_data(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => Some(canonical_float(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(serial_to_string(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

pub(crate) fn normalize_excel(bytes: &[u8]) -> Result<Workbook, NormalizeError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| NormalizeError::Workbook(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(NormalizeError::Workbook("workbook contains no sheets".into()));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut warnings = Vec::new();
    let mut total_cells = 0usize;

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| NormalizeError::Workbook(format!("sheet '{sheet_name}': {e}")))?;

        let mut matrix = CellMatrix::new();

        // The range may not begin at A1; pad so matrix coordinates stay
        // true sheet coordinates.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for _ in 0..start_row {
            matrix.push_row(Vec::new());
        }

        'sheet: for row in range.rows() {
            let mut cells: Vec<Option<String>> = vec![None; start_col as usize];
            for cell in row {
                if total_cells >= MAX_CELLS {
                    warnings.push(format!(
                        "sheet '{sheet_name}' truncated at {MAX_CELLS} cells"
                    ));
                    matrix.push_row(cells);
                    break 'sheet;
                }
                let value = canonical_data(cell);
                if value.is_some() {
                    total_cells += 1;
                }
                cells.push(value);
            }
            matrix.push_row(cells);
        }

        sheets.push(NamedSheet { name: sheet_name.clone(), matrix });
    }

    Ok(Workbook { sheets, warnings })
}
