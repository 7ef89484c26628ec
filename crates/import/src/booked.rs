//! Booked Opportunities report importer.
//!
//! Revenue source of record for commission runs: each row is a booked
//! quote with an invoiced amount and a service date. Service date is
//! required per row since period filtering keys on it.

use payline_extract::value::{
    clean_cell, extract_quote_id, normalize_name_key, parse_date, parse_money,
};
use rusqlite::Connection;

use crate::error::ImportError;
use crate::lead_status::resolve_sheet;
use crate::store::{self, BookedRecord, Upsert};
use crate::summary::ImportSummary;
use crate::tabular;
use crate::unit_of_work::{row_scope, RowFailure};

const REQUIRED_HEADERS: &[&str] = &["Quote #", "Status", "Service Date", "Invoiced Amount"];

pub fn import(
    conn: &mut Connection,
    bytes: &[u8],
    filename: &str,
    sheet_hint: Option<&str>,
) -> Result<ImportSummary, ImportError> {
    let wb = payline_io::normalize(bytes, filename)?;
    let sheet = resolve_sheet(&wb, sheet_hint)?;
    let matrix = &sheet.matrix;

    let header_row = tabular::find_header_row(matrix, &["quote", "invoiced"]).ok_or_else(|| {
        ImportError::InvalidFileFormat("no Booked Opportunities header row found".to_string())
    })?;
    let columns = tabular::map_header(matrix, header_row);
    tabular::require_columns(&columns, REQUIRED_HEADERS)?;
    if header_row + 1 >= matrix.row_count() {
        return Err(ImportError::NoData);
    }

    let col = |name: &str| tabular::column(&columns, name);
    let quote_col = col("Quote #");
    let status_col = col("Status");
    let branch_col = col("Branch Name");
    let service_type_col = col("Service Type");
    let service_date_col = col("Service Date");
    let booked_date_col = col("Booked Date");
    let estimated_col = col("Estimated Amount");
    let invoiced_col = col("Invoiced Amount");
    let sales_person_col = col("Sales Person");

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

            let service_date_raw = cell(row, service_date_col);
            let service_date = parse_date(service_date_raw).ok_or_else(|| {
                RowFailure::with_context(
                    "missing or unparseable Service Date",
                    service_date_raw.unwrap_or("").to_string(),
                )
            })?;

            let status_raw = clean_cell(cell(row, status_col));
            let sales_person_raw = clean_cell(cell(row, sales_person_col));

            let rec = BookedRecord {
                quote_id,
                status_norm: status_raw.as_deref().map(|s| s.to_lowercase()),
                status_raw,
                branch_name: clean_cell(cell(row, branch_col)),
                service_type: clean_cell(cell(row, service_type_col)),
                service_date,
                booked_date: parse_date(cell(row, booked_date_col)),
                estimated_amount: parse_money(cell(row, estimated_col)),
                invoiced_amount: parse_money(cell(row, invoiced_col)),
                sales_person_key: sales_person_raw.as_deref().map(normalize_name_key),
                sales_person_raw,
            };
            Ok(store::upsert_booked(conn, &rec, filename, &sheet.name)?)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::init_schema;

    const HEADER: &str = "Quote #,Customer Name,Branch Name,Status,Service Type,Booked Date,Service Date,Estimated Amount,Invoiced Amount,Sales Person\n";

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn imports_booked_quote() {
        let mut conn = conn();
        let csv = format!(
            "{HEADER}300,Acme,East,Booked,Local,07/01/2025,07/15/2025,\"$2,000\",\"$2,350.50\",Alice\n"
        );
        let summary = import(&mut conn, csv.as_bytes(), "booked.csv", None).unwrap();
        assert_eq!(summary.inserted, 1);

        let (service_date, invoiced, key): (String, Option<f64>, Option<String>) = conn
            .query_row(
                "SELECT service_date, invoiced_amount, sales_person_key
                 FROM booked_quotes WHERE quote_id = 300",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(service_date, "2025-07-15");
        assert_eq!(invoiced, Some(2350.5));
        assert_eq!(key.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_service_date_is_a_row_error() {
        let mut conn = conn();
        let csv = format!(
            "{HEADER}300,Acme,East,Booked,Local,,07/15/2025,,\"$100\",Alice\n\
             301,Acme,East,Booked,Local,,,,\"$200\",Bob\n"
        );
        let summary = import(&mut conn, csv.as_bytes(), "booked.csv", None).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.errors[0].reason.contains("Service Date"));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM booked_quotes", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn blank_invoiced_amount_stays_null() {
        let mut conn = conn();
        let csv = format!("{HEADER}300,Acme,East,Booked,Local,,07/15/2025,,,Alice\n");
        import(&mut conn, csv.as_bytes(), "booked.csv", None).unwrap();

        let invoiced: Option<f64> = conn
            .query_row(
                "SELECT invoiced_amount FROM booked_quotes WHERE quote_id = 300",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(invoiced, None);
    }

    #[test]
    fn reimport_updates_in_place() {
        let mut conn = conn();
        let csv = format!("{HEADER}300,Acme,East,Booked,Local,,07/15/2025,,\"$100\",Alice\n");
        import(&mut conn, csv.as_bytes(), "booked.csv", None).unwrap();

        let csv2 = format!("{HEADER}300,Acme,East,Completed,Local,,07/15/2025,,\"$150\",Alice\n");
        let summary = import(&mut conn, csv2.as_bytes(), "booked.csv", None).unwrap();
        assert_eq!(summary.updated, 1);

        let (status_norm, invoiced): (String, Option<f64>) = conn
            .query_row(
                "SELECT status_norm, invoiced_amount FROM booked_quotes WHERE quote_id = 300",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(status_norm, "completed");
        assert_eq!(invoiced, Some(150.0));
    }
}
