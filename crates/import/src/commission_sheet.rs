//! Commission workbook importer.
//!
//! One worksheet holds up to three independent blocks (main commission,
//! US-agent commission, hourly payout) at author-chosen positions. The
//! block detector locates them; each block's rows are upserted into its
//! own table, keyed by normalized name and the pay period taken from the
//! sheet name. Employee directory matches are best-effort: an unknown
//! name still imports, just without an `employee_id`.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use payline_extract::value::{normalize_name_key, parse_money, parse_percent};
use payline_extract::{
    detect_blocks, parse_period_from_sheet_name, Block, BlockKind, BlockRow, DetectorConfig,
};
use payline_io::Workbook;
use rusqlite::{Connection, Transaction};

use crate::directory::{EmployeeDirectory, SqliteDirectory};
use crate::error::ImportError;
use crate::store::{self, AgentUsRecord, CommissionRecord, HourlyRecord, Upsert};
use crate::summary::{SectionCounts, WorkbookSummary};
use crate::unit_of_work::{row_scope, RowFailure};

pub fn import(
    conn: &mut Connection,
    bytes: &[u8],
    filename: &str,
    sheet_hint: Option<&str>,
    config: &DetectorConfig,
) -> Result<WorkbookSummary, ImportError> {
    let wb = payline_io::normalize(bytes, filename)?;
    let sheet = wb
        .resolve_sheet(sheet_hint, Workbook::last_sheet)
        .ok_or_else(|| match sheet_hint {
            Some(name) => {
                ImportError::InvalidFileFormat(format!("sheet '{name}' not found in workbook"))
            }
            None => ImportError::NoData,
        })?;
    let matrix = &sheet.matrix;

    let blocks = detect_blocks(matrix, config);
    if blocks.is_empty() {
        return Err(ImportError::InvalidFileFormat(
            "no recognizable commission blocks".to_string(),
        ));
    }

    let (period_month, period_warning) = match parse_period_from_sheet_name(&sheet.name) {
        Some(d) => (d, None),
        None => {
            let today = Utc::now().date_naive();
            let fallback = today.with_day(1).unwrap_or(today);
            let warning = format!(
                "sheet name '{}' carries no recognizable period; defaulting to {}",
                sheet.name,
                fallback.format("%Y-%m-%d")
            );
            (fallback, Some(warning))
        }
    };

    let mut summary = WorkbookSummary::new(filename, &sheet.name, period_month);
    for w in &wb.warnings {
        summary.add_warning(w.clone());
    }
    if let Some(w) = period_warning {
        summary.add_warning(w);
    }
    for b in &blocks {
        summary.add_debug(format!(
            "{} block: header at sheet row {}, {} data rows",
            b.kind.label(),
            b.header_row + 1,
            b.data_row_count()
        ));
    }

    let mut tx = conn
        .transaction()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;

    for block in &blocks {
        let rows = block.extract(matrix);
        let section = match block.kind {
            BlockKind::Main => {
                import_main(&mut tx, block, &rows, period_month, filename, &sheet.name)?
            }
            BlockKind::AgentsUs => {
                import_agents_us(&mut tx, block, &rows, period_month, filename, &sheet.name)?
            }
            BlockKind::Hourly => {
                import_hourly(&mut tx, block, &rows, period_month, filename, &sheet.name)?
            }
        };
        match block.kind {
            BlockKind::Main => summary.main = section,
            BlockKind::AgentsUs => summary.agents_us = section,
            BlockKind::Hourly => summary.hourly = section,
        }
    }

    tx.commit()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;
    Ok(summary)
}

/// Resolve a column key against a block's header map: the first candidate
/// with an exact case-insensitive key match wins, then the first with a
/// prefix match (lowest column index).
fn column_key<'a>(columns: &'a HashMap<String, usize>, candidates: &[&str]) -> Option<&'a String> {
    for cand in candidates {
        let lower = cand.to_lowercase();
        if let Some(key) = columns.keys().find(|k| k.to_lowercase() == lower) {
            return Some(key);
        }
    }
    for cand in candidates {
        let lower = cand.to_lowercase();
        let hit = columns
            .iter()
            .filter(|(k, _)| k.to_lowercase().starts_with(&lower))
            .min_by_key(|(_, &idx)| idx)
            .map(|(k, _)| k);
        if hit.is_some() {
            return hit;
        }
    }
    None
}

fn money(row: &BlockRow, key: Option<&String>) -> Option<f64> {
    key.and_then(|k| parse_money(row.get(k)))
}

fn pct(row: &BlockRow, key: Option<&String>) -> Option<f64> {
    key.and_then(|k| parse_percent(row.get(k)))
}

/// Pull the row's name and normalize it, or fail the row.
fn required_name(row: &BlockRow) -> Result<(String, String), RowFailure> {
    let name_raw = row
        .name_raw
        .clone()
        .ok_or_else(|| RowFailure::new("missing employee name"))?;
    let name_key = normalize_name_key(&name_raw);
    if name_key.is_empty() {
        return Err(RowFailure::with_context("name normalizes to empty", name_raw));
    }
    Ok((name_raw, name_key))
}

fn tally(counts: &mut SectionCounts, row: &BlockRow, outcome: Result<Upsert, RowFailure>) {
    match outcome {
        Ok(Upsert::Inserted) => counts.inserted += 1,
        Ok(Upsert::Updated) => counts.updated += 1,
        Err(failure) => {
            counts.add_error(row.row_index + 1, failure.reason, failure.context);
            counts.skipped += 1;
        }
    }
}

fn import_main(
    tx: &mut Transaction<'_>,
    block: &Block,
    rows: &[BlockRow],
    period_month: NaiveDate,
    file: &str,
    sheet: &str,
) -> Result<SectionCounts, ImportError> {
    let cols = &block.columns;
    let hourly_rate = column_key(cols, &["Hourly Rate"]);
    let total_revenue = column_key(cols, &["Total Revenue"]);
    let booking_pct = column_key(cols, &["Booking %"]);
    let commission_pct = column_key(cols, &["Commission %"]);
    let commission_earned = column_key(cols, &["Commission Earned"]);
    let spiff_bonus = column_key(cols, &["Spiff Bonus"]);
    let revenue_bonus = column_key(cols, &["Revenue Bonus"]);
    // the worksheet repeats "Booking Bonus" for the + and - columns; the
    // detector suffixes the second occurrence
    let booking_bonus_plus = column_key(cols, &["+ Booking Bonus", "Booking Bonus"]);
    let booking_bonus_minus = column_key(cols, &["- Booking Bonus", "Booking Bonus__2"]);
    let hourly_paid_out = column_key(cols, &["- Hourly Paid Out", "Hourly Paid Out"]);
    let total_due = column_key(cols, &["Total Due"]);
    let amount_paid = column_key(cols, &["Amount Paid"]);
    let remaining_amount = column_key(cols, &["Remaining Amount"]);

    let mut counts = SectionCounts::default();
    for row in rows {
        if row.is_empty() {
            continue;
        }
        let outcome = row_scope(tx, |conn| {
            let (name_raw, name_key) = required_name(row)?;
            let employee_id = SqliteDirectory::new(conn).find_by_name_key(&name_key);
            let rec = CommissionRecord {
                name_raw,
                name_key,
                employee_id,
                hourly_rate: money(row, hourly_rate),
                total_revenue: money(row, total_revenue),
                booking_pct: pct(row, booking_pct),
                commission_pct: pct(row, commission_pct),
                commission_earned: money(row, commission_earned),
                spiff_bonus: money(row, spiff_bonus),
                revenue_bonus: money(row, revenue_bonus),
                booking_bonus_plus: money(row, booking_bonus_plus),
                booking_bonus_minus: money(row, booking_bonus_minus),
                hourly_paid_out: money(row, hourly_paid_out),
                total_due: money(row, total_due),
                amount_paid: money(row, amount_paid),
                remaining_amount: money(row, remaining_amount),
            };
            Ok(store::upsert_commission_row(conn, &rec, period_month, file, sheet)?)
        })?;
        tally(&mut counts, row, outcome);
    }
    Ok(counts)
}

fn import_agents_us(
    tx: &mut Transaction<'_>,
    block: &Block,
    rows: &[BlockRow],
    period_month: NaiveDate,
    file: &str,
    sheet: &str,
) -> Result<SectionCounts, ImportError> {
    let cols = &block.columns;
    let total_us_revenue = column_key(cols, &["Total US Revenue"]);
    let commission_pct = column_key(cols, &["Commission %"]);
    let commission_earned = column_key(cols, &["Commission Earned"]);
    let commission_125x = column_key(cols, &["Commission 1.25x"]);
    let bonus = column_key(cols, &["Bonus"]);

    let mut counts = SectionCounts::default();
    for row in rows {
        if row.is_empty() {
            continue;
        }
        let outcome = row_scope(tx, |conn| {
            let (name_raw, name_key) = required_name(row)?;
            let employee_id = SqliteDirectory::new(conn).find_by_name_key(&name_key);
            let rec = AgentUsRecord {
                name_raw,
                name_key,
                employee_id,
                total_us_revenue: money(row, total_us_revenue),
                commission_pct: pct(row, commission_pct),
                commission_earned: money(row, commission_earned),
                commission_125x: money(row, commission_125x),
                bonus: money(row, bonus),
            };
            Ok(store::upsert_agent_us_row(conn, &rec, period_month, file, sheet)?)
        })?;
        tally(&mut counts, row, outcome);
    }
    Ok(counts)
}

fn import_hourly(
    tx: &mut Transaction<'_>,
    block: &Block,
    rows: &[BlockRow],
    period_month: NaiveDate,
    file: &str,
    sheet: &str,
) -> Result<SectionCounts, ImportError> {
    let cols = &block.columns;
    let hours = column_key(cols, &["Hours"]);
    let hourly_rate = column_key(cols, &["Hourly Rate"]);
    let total_paid = column_key(cols, &["Total Paid"]);
    let period = column_key(cols, &["Period"]);

    let mut counts = SectionCounts::default();
    for row in rows {
        if row.is_empty() {
            continue;
        }
        let outcome = row_scope(tx, |conn| {
            let (name_raw, name_key) = required_name(row)?;
            let employee_id = SqliteDirectory::new(conn).find_by_name_key(&name_key);
            let period_label = period
                .and_then(|k| row.get(k))
                .unwrap_or(sheet)
                .to_string();
            let rec = HourlyRecord {
                name_raw,
                name_key,
                period_label,
                employee_id,
                hours: money(row, hours),
                hourly_rate: money(row, hourly_rate),
                total_paid: money(row, total_paid),
            };
            Ok(store::upsert_hourly_row(conn, &rec, period_month, file, sheet)?)
        })?;
        tally(&mut counts, row, outcome);
    }
    Ok(counts)
}
