//! Lead Status report importer.
//!
//! One row per quote, keyed by the id extracted from the `Quote #` cell.
//! The free-text `Lead Status` cell is parsed into a structured directive
//! and flattened into the row for later adjustment aggregation.

use payline_extract::value::{
    clean_cell, extract_quote_id, normalize_name_key, parse_date, parse_money,
};
use payline_extract::parse_directive;
use payline_io::Workbook;
use rusqlite::Connection;

use crate::error::ImportError;
use crate::store::{self, LeadStatusRecord, Upsert};
use crate::summary::ImportSummary;
use crate::tabular;
use crate::unit_of_work::{row_scope, RowFailure};

const REQUIRED_HEADERS: &[&str] =
    &["Quote #", "Branch Name", "Status", "Lead Status", "Service Type"];

pub fn import(
    conn: &mut Connection,
    bytes: &[u8],
    filename: &str,
    sheet_hint: Option<&str>,
) -> Result<ImportSummary, ImportError> {
    let wb = payline_io::normalize(bytes, filename)?;
    let sheet = resolve_sheet(&wb, sheet_hint)?;
    let matrix = &sheet.matrix;

    let header_row = tabular::find_header_row(matrix, &["quote", "status"]).ok_or_else(|| {
        ImportError::InvalidFileFormat("no Lead Status header row found".to_string())
    })?;
    let columns = tabular::map_header(matrix, header_row);
    tabular::require_columns(&columns, REQUIRED_HEADERS)?;
    if header_row + 1 >= matrix.row_count() {
        return Err(ImportError::NoData);
    }

    let col = |name: &str| tabular::column(&columns, name);
    // required columns resolved above
    let quote_col = col("Quote #");
    let branch_col = col("Branch Name");
    let status_col = col("Status");
    let lead_status_col = col("Lead Status");
    let service_type_col = col("Service Type");
    let service_date_col = col("Service Date");
    let sales_person_col = col("Sales Person");
    let revenue_col = col("Estimated Revenue");

    let mut summary = ImportSummary::new(filename, &sheet.name);
    summary.add_debug(format!("header row at sheet row {}", header_row + 1));

    let cell = |row: usize, col: Option<usize>| col.and_then(|c| matrix.cell(row, c));

    let mut tx = conn
        .transaction()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;

    for row in header_row + 1..matrix.row_count() {
        if matrix.is_row_empty(row) {
            continue;
        }

        let outcome = row_scope(&mut tx, |conn| {
            let quote_raw = cell(row, quote_col);
            let quote_id = extract_quote_id(quote_raw).ok_or_else(|| {
                RowFailure::with_context(
                    "missing or invalid Quote #",
                    quote_raw.unwrap_or("").to_string(),
                )
            })?;

            let status_raw = clean_cell(cell(row, status_col));
            let lead_status_raw = clean_cell(cell(row, lead_status_col));
            let sales_person_raw = clean_cell(cell(row, sales_person_col));

            let rec = LeadStatusRecord {
                quote_id,
                branch_name: clean_cell(cell(row, branch_col)),
                status_norm: status_raw.as_deref().map(|s| s.to_lowercase()),
                status_raw,
                directive: parse_directive(lead_status_raw.as_deref().unwrap_or("")),
                lead_status_raw,
                service_type: clean_cell(cell(row, service_type_col)),
                service_date: parse_date(cell(row, service_date_col)),
                sales_person_key: sales_person_raw.as_deref().map(normalize_name_key),
                sales_person_raw,
                estimated_revenue: parse_money(cell(row, revenue_col)),
            };
            Ok(store::upsert_lead_status(conn, &rec, filename, &sheet.name)?)
        })?;

        match outcome {
            Ok(Upsert::Inserted) => summary.inserted += 1,
            Ok(Upsert::Updated) => summary.updated += 1,
            Err(failure) => {
                summary.add_error(row + 1, failure.reason, failure.context);
                summary.skipped += 1;
            }
        }
    }

    tx.commit()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;
    Ok(summary)
}

pub(crate) fn resolve_sheet<'a>(
    wb: &'a Workbook,
    hint: Option<&str>,
) -> Result<&'a payline_io::NamedSheet, ImportError> {
    match hint {
        Some(name) => wb.sheet_by_name(name).ok_or_else(|| {
            ImportError::InvalidFileFormat(format!("sheet '{name}' not found in workbook"))
        }),
        None => wb.first_sheet().ok_or(ImportError::NoData),
    }
}
