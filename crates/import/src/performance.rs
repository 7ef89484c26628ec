//! Sales Performance report importer.
//!
//! This report has a fixed 16-column layout and is read by position, not
//! by header name. The header row is validated cell-for-cell before any
//! row is touched; a layout drift is a whole-file error since silently
//! shifted columns would corrupt booking percentages.

use chrono::NaiveDate;
use payline_extract::value::{clean_cell, normalize_name_key, parse_int, parse_money, parse_percent};
use rusqlite::Connection;

use crate::error::ImportError;
use crate::lead_status::resolve_sheet;
use crate::store::{self, PerformanceRecord, Upsert};
use crate::summary::ImportSummary;
use crate::unit_of_work::{row_scope, RowFailure};

/// Expected header cells, in order. Compared case-insensitively after trim.
const EXPECTED_HEADERS: [&str; 16] = [
    "Name",
    "# Leads Received",
    "Bad",
    "% Bad",
    "Sent",
    "% Sent",
    "Pending",
    "% Pending",
    "Booked",
    "% Booked",
    "Lost",
    "% Lost",
    "Cancelled",
    "% Cancelled",
    "Booked Total",
    "Average Booking",
];

const COL_NAME: usize = 0;
const COL_LEADS: usize = 1;
const COL_BOOKED_COUNT: usize = 8;
const COL_BOOKED_PCT: usize = 9;
const COL_BOOKED_TOTAL: usize = 14;

pub fn import(
    conn: &mut Connection,
    bytes: &[u8],
    filename: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    sheet_hint: Option<&str>,
) -> Result<ImportSummary, ImportError> {
    let wb = payline_io::normalize(bytes, filename)?;
    let sheet = resolve_sheet(&wb, sheet_hint)?;
    let matrix = &sheet.matrix;

    if matrix.row_count() == 0 {
        return Err(ImportError::NoData);
    }
    validate_header(matrix.row(0))?;
    if matrix.row_count() < 2 {
        return Err(ImportError::NoData);
    }

    let mut summary = ImportSummary::new(filename, &sheet.name);
    summary.add_debug(format!(
        "period {} .. {}",
        period_start.format("%Y-%m-%d"),
        period_end.format("%Y-%m-%d")
    ));

    let mut tx = conn
        .transaction()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;

    for row in 1..matrix.row_count() {
        if matrix.is_row_empty(row) {
            continue;
        }

        let outcome = row_scope(&mut tx, |conn| {
            let name_raw = clean_cell(matrix.cell(row, COL_NAME))
                .ok_or_else(|| RowFailure::new("missing Name"))?;
            let name_key = normalize_name_key(&name_raw);
            if name_key.is_empty() {
                return Err(RowFailure::with_context(
                    "Name normalizes to empty",
                    name_raw,
                ));
            }

            let rec = PerformanceRecord {
                leads_received: parse_int(matrix.cell(row, COL_LEADS)),
                booked_count: parse_int(matrix.cell(row, COL_BOOKED_COUNT)),
                booked_pct: parse_percent(matrix.cell(row, COL_BOOKED_PCT)),
                booked_total: parse_money(matrix.cell(row, COL_BOOKED_TOTAL)),
                name_raw,
                name_key,
            };
            Ok(store::upsert_performance_row(
                conn,
                &rec,
                period_start,
                period_end,
                filename,
                &sheet.name,
            )?)
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

fn validate_header(row: Option<&[Option<String>]>) -> Result<(), ImportError> {
    let cells = row.unwrap_or(&[]);
    for (i, expected) in EXPECTED_HEADERS.iter().enumerate() {
        let actual = cells
            .get(i)
            .and_then(|c| c.as_deref())
            .map(str::trim)
            .unwrap_or("");
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ImportError::InvalidFileFormat(format!(
                "performance header mismatch at column {}: expected '{}', found '{}'",
                i + 1,
                expected,
                actual
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::init_schema;

    const HEADER: &str = "Name,# Leads Received,Bad,% Bad,Sent,% Sent,Pending,% Pending,Booked,% Booked,Lost,% Lost,Cancelled,% Cancelled,Booked Total,Average Booking\n";

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn period() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
        )
    }

    #[test]
    fn reads_columns_by_position() {
        let mut conn = conn();
        let csv = format!(
            "{HEADER}Alice,120,5,4.2%,80,66.7%,10,8.3%,40,33.3%,15,12.5%,5,4.2%,\"$210,000\",\"$5,250\"\n"
        );
        let (start, end) = period();
        let summary = import(&mut conn, csv.as_bytes(), "perf.csv", start, end, None).unwrap();
        assert_eq!(summary.inserted, 1);

        let (leads, booked, pct, total): (Option<i64>, Option<i64>, Option<f64>, Option<f64>) =
            conn.query_row(
                "SELECT leads_received, booked_count, booked_pct, booked_total
                 FROM performance_rows WHERE name_key = 'alice'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(leads, Some(120));
        assert_eq!(booked, Some(40));
        assert_eq!(pct, Some(33.3));
        assert_eq!(total, Some(210_000.0));
    }

    #[test]
    fn shifted_header_is_whole_file_fatal() {
        let mut conn = conn();
        let csv = "Name,Bad,# Leads Received\nAlice,5,120\n";
        let (start, end) = period();
        let err = import(&mut conn, csv.as_bytes(), "perf.csv", start, end, None).unwrap_err();
        match err {
            ImportError::InvalidFileFormat(msg) => {
                assert!(msg.contains("column 2"));
                assert!(msg.contains("# Leads Received"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_name_is_a_row_error() {
        let mut conn = conn();
        let csv = format!(
            "{HEADER},120,5,4.2%,80,66.7%,10,8.3%,40,33.3%,15,12.5%,5,4.2%,\"$210,000\",\"$5,250\"\n\
             Bob,50,1,2%,30,60%,5,10%,14,28%,5,10%,1,2%,\"$70,000\",\"$5,000\"\n"
        );
        let (start, end) = period();
        let summary = import(&mut conn, csv.as_bytes(), "perf.csv", start, end, None).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.errors[0].reason.contains("Name"));
    }

    #[test]
    fn same_period_reimport_updates() {
        let mut conn = conn();
        let row = "Alice,120,5,4.2%,80,66.7%,10,8.3%,40,33.3%,15,12.5%,5,4.2%,\"$210,000\",\"$5,250\"\n";
        let csv = format!("{HEADER}{row}");
        let (start, end) = period();
        import(&mut conn, csv.as_bytes(), "perf.csv", start, end, None).unwrap();
        let second = import(&mut conn, csv.as_bytes(), "perf.csv", start, end, None).unwrap();
        assert_eq!(second.updated, 1);

        // a different period is a separate row
        let aug_start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let aug_end = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let third =
            import(&mut conn, csv.as_bytes(), "perf.csv", aug_start, aug_end, None).unwrap();
        assert_eq!(third.inserted, 1);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM performance_rows", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
