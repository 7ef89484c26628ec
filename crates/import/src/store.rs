//! SQLite storage: schema, upserts, and the calc-input loader.
//!
//! Every imported table carries `source_file`, `sheet_name`, `updated_at`
//! provenance so a re-import can be audited. Upserts are last-write-wins
//! on the natural key; insert-versus-update is reported via a pre-existence
//! check so summaries can distinguish the two. Dates are stored as
//! `YYYY-MM-DD` text, timestamps as RFC 3339.

use chrono::NaiveDate;
use payline_calc::model::{
    BookedQuote, CalcInput, Employee, LeadDirectiveRow, PerformanceRow, SalesRole,
};
use payline_extract::directive::Target;
use payline_extract::Directive;
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    nickname_key TEXT,
    nickname_key_2 TEXT,
    nickname_key_3 TEXT,
    sales_role TEXT NOT NULL DEFAULT 'agent',  -- agent, manager, international_closer
    terminated INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS lead_status_quotes (
    quote_id INTEGER PRIMARY KEY,
    branch_name TEXT,
    status_raw TEXT,
    status_norm TEXT,
    lead_status_raw TEXT,
    service_type TEXT,
    service_date TEXT,
    sales_person_raw TEXT,
    sales_person_key TEXT,
    estimated_revenue REAL,
    directive_type TEXT NOT NULL DEFAULT 'none',
    directive_pct REAL,
    directive_amount REAL,
    target_name_raw TEXT,
    target_name_key TEXT,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS booked_quotes (
    quote_id INTEGER PRIMARY KEY,
    status_raw TEXT,
    status_norm TEXT,
    branch_name TEXT,
    service_type TEXT,
    service_date TEXT NOT NULL,
    booked_date TEXT,
    estimated_amount REAL,
    invoiced_amount REAL,
    sales_person_raw TEXT,
    sales_person_key TEXT,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Main commission table; numeric fields stay NULL when the sheet left them
-- blank ("not reported" is not "reported as zero").
CREATE TABLE IF NOT EXISTS commission_rows (
    name_key TEXT NOT NULL,
    period_month TEXT NOT NULL,
    name_raw TEXT NOT NULL,
    employee_id INTEGER,
    hourly_rate REAL,
    total_revenue REAL,
    booking_pct REAL,
    commission_pct REAL,
    commission_earned REAL,
    spiff_bonus REAL,
    revenue_bonus REAL,
    booking_bonus_plus REAL,
    booking_bonus_minus REAL,
    hourly_paid_out REAL,
    total_due REAL,
    amount_paid REAL,
    remaining_amount REAL,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (name_key, period_month)
);

CREATE TABLE IF NOT EXISTS agent_us_rows (
    name_key TEXT NOT NULL,
    period_month TEXT NOT NULL,
    name_raw TEXT NOT NULL,
    employee_id INTEGER,
    total_us_revenue REAL,
    commission_pct REAL,
    commission_earned REAL,
    commission_125x REAL,
    bonus REAL,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (name_key, period_month)
);

CREATE TABLE IF NOT EXISTS hourly_payout_rows (
    name_key TEXT NOT NULL,
    period_month TEXT NOT NULL,
    period_label TEXT NOT NULL,
    name_raw TEXT NOT NULL,
    employee_id INTEGER,
    hours REAL,
    hourly_rate REAL,
    total_paid REAL,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (name_key, period_month, period_label)
);

CREATE TABLE IF NOT EXISTS performance_rows (
    period_start TEXT NOT NULL,
    period_end TEXT NOT NULL,
    name_key TEXT NOT NULL,
    name_raw TEXT NOT NULL,
    leads_received INTEGER,
    booked_count INTEGER,
    booked_pct REAL,
    booked_total REAL,
    source_file TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (period_start, period_end, name_key)
);
"#;

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Whether an upsert created a row or overwrote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn date_str(d: Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d").to_string())
}

fn directive_columns(d: &Directive) -> (&'static str, Option<f64>, Option<f64>, Option<&str>, Option<&str>) {
    match d {
        Directive::None => ("none", None, None, None, None),
        Directive::PercentSplit { pct, target } => {
            ("percent_split", Some(*pct), None, Some(target.raw.as_str()), Some(target.key.as_str()))
        }
        Directive::FixedRevTransfer { amount, target } => (
            "fixed_rev_transfer",
            None,
            Some(*amount),
            Some(target.raw.as_str()),
            Some(target.key.as_str()),
        ),
        Directive::FixedBookingTransfer { amount, target } => (
            "fixed_booking_transfer",
            None,
            Some(*amount),
            Some(target.raw.as_str()),
            Some(target.key.as_str()),
        ),
    }
}

fn rehydrate_directive(
    kind: &str,
    pct: Option<f64>,
    amount: Option<f64>,
    target_raw: Option<String>,
    target_key: Option<String>,
) -> Directive {
    let target = || Target {
        raw: target_raw.clone().unwrap_or_default(),
        key: target_key.clone().unwrap_or_default(),
    };
    match kind {
        "percent_split" => Directive::PercentSplit { pct: pct.unwrap_or(0.0), target: target() },
        "fixed_rev_transfer" => {
            Directive::FixedRevTransfer { amount: amount.unwrap_or(0.0), target: target() }
        }
        "fixed_booking_transfer" => {
            Directive::FixedBookingTransfer { amount: amount.unwrap_or(0.0), target: target() }
        }
        _ => Directive::None,
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LeadStatusRecord {
    pub quote_id: i64,
    pub branch_name: Option<String>,
    pub status_raw: Option<String>,
    pub status_norm: Option<String>,
    pub lead_status_raw: Option<String>,
    pub service_type: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub sales_person_raw: Option<String>,
    pub sales_person_key: Option<String>,
    pub estimated_revenue: Option<f64>,
    pub directive: Directive,
}

#[derive(Debug, Clone)]
pub struct BookedRecord {
    pub quote_id: i64,
    pub status_raw: Option<String>,
    pub status_norm: Option<String>,
    pub branch_name: Option<String>,
    pub service_type: Option<String>,
    pub service_date: NaiveDate,
    pub booked_date: Option<NaiveDate>,
    pub estimated_amount: Option<f64>,
    pub invoiced_amount: Option<f64>,
    pub sales_person_raw: Option<String>,
    pub sales_person_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommissionRecord {
    pub name_raw: String,
    pub name_key: String,
    pub employee_id: Option<i64>,
    pub hourly_rate: Option<f64>,
    pub total_revenue: Option<f64>,
    pub booking_pct: Option<f64>,
    pub commission_pct: Option<f64>,
    pub commission_earned: Option<f64>,
    pub spiff_bonus: Option<f64>,
    pub revenue_bonus: Option<f64>,
    pub booking_bonus_plus: Option<f64>,
    pub booking_bonus_minus: Option<f64>,
    pub hourly_paid_out: Option<f64>,
    pub total_due: Option<f64>,
    pub amount_paid: Option<f64>,
    pub remaining_amount: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AgentUsRecord {
    pub name_raw: String,
    pub name_key: String,
    pub employee_id: Option<i64>,
    pub total_us_revenue: Option<f64>,
    pub commission_pct: Option<f64>,
    pub commission_earned: Option<f64>,
    pub commission_125x: Option<f64>,
    pub bonus: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct HourlyRecord {
    pub name_raw: String,
    pub name_key: String,
    pub period_label: String,
    pub employee_id: Option<i64>,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub total_paid: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    pub name_raw: String,
    pub name_key: String,
    pub leads_received: Option<i64>,
    pub booked_count: Option<i64>,
    pub booked_pct: Option<f64>,
    pub booked_total: Option<f64>,
}

// ---------------------------------------------------------------------------
// Upserts
// ---------------------------------------------------------------------------

fn exists_by_quote(conn: &Connection, table: &str, quote_id: i64) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE quote_id = ?1");
    Ok(conn
        .query_row(&sql, params![quote_id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn upsert_lead_status(
    conn: &Connection,
    rec: &LeadStatusRecord,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let existed = exists_by_quote(conn, "lead_status_quotes", rec.quote_id)?;
    let (dtype, pct, amount, target_raw, target_key) = directive_columns(&rec.directive);
    conn.execute(
        "INSERT INTO lead_status_quotes (
            quote_id, branch_name, status_raw, status_norm, lead_status_raw,
            service_type, service_date, sales_person_raw, sales_person_key,
            estimated_revenue, directive_type, directive_pct, directive_amount,
            target_name_raw, target_name_key, source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        ON CONFLICT (quote_id) DO UPDATE SET
            branch_name = excluded.branch_name,
            status_raw = excluded.status_raw,
            status_norm = excluded.status_norm,
            lead_status_raw = excluded.lead_status_raw,
            service_type = excluded.service_type,
            service_date = excluded.service_date,
            sales_person_raw = excluded.sales_person_raw,
            sales_person_key = excluded.sales_person_key,
            estimated_revenue = excluded.estimated_revenue,
            directive_type = excluded.directive_type,
            directive_pct = excluded.directive_pct,
            directive_amount = excluded.directive_amount,
            target_name_raw = excluded.target_name_raw,
            target_name_key = excluded.target_name_key,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            rec.quote_id,
            rec.branch_name,
            rec.status_raw,
            rec.status_norm,
            rec.lead_status_raw,
            rec.service_type,
            date_str(rec.service_date),
            rec.sales_person_raw,
            rec.sales_person_key,
            rec.estimated_revenue,
            dtype,
            pct,
            amount,
            target_raw,
            target_key,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

pub fn upsert_booked(
    conn: &Connection,
    rec: &BookedRecord,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let existed = exists_by_quote(conn, "booked_quotes", rec.quote_id)?;
    conn.execute(
        "INSERT INTO booked_quotes (
            quote_id, status_raw, status_norm, branch_name, service_type,
            service_date, booked_date, estimated_amount, invoiced_amount,
            sales_person_raw, sales_person_key, source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT (quote_id) DO UPDATE SET
            status_raw = excluded.status_raw,
            status_norm = excluded.status_norm,
            branch_name = excluded.branch_name,
            service_type = excluded.service_type,
            service_date = excluded.service_date,
            booked_date = excluded.booked_date,
            estimated_amount = excluded.estimated_amount,
            invoiced_amount = excluded.invoiced_amount,
            sales_person_raw = excluded.sales_person_raw,
            sales_person_key = excluded.sales_person_key,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            rec.quote_id,
            rec.status_raw,
            rec.status_norm,
            rec.branch_name,
            rec.service_type,
            rec.service_date.format("%Y-%m-%d").to_string(),
            date_str(rec.booked_date),
            rec.estimated_amount,
            rec.invoiced_amount,
            rec.sales_person_raw,
            rec.sales_person_key,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

pub fn upsert_commission_row(
    conn: &Connection,
    rec: &CommissionRecord,
    period_month: NaiveDate,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let period = period_month.format("%Y-%m-%d").to_string();
    let existed = conn
        .query_row(
            "SELECT 1 FROM commission_rows WHERE name_key = ?1 AND period_month = ?2",
            params![rec.name_key, period],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    conn.execute(
        "INSERT INTO commission_rows (
            name_key, period_month, name_raw, employee_id, hourly_rate,
            total_revenue, booking_pct, commission_pct, commission_earned,
            spiff_bonus, revenue_bonus, booking_bonus_plus, booking_bonus_minus,
            hourly_paid_out, total_due, amount_paid, remaining_amount,
            source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
        ON CONFLICT (name_key, period_month) DO UPDATE SET
            name_raw = excluded.name_raw,
            employee_id = excluded.employee_id,
            hourly_rate = excluded.hourly_rate,
            total_revenue = excluded.total_revenue,
            booking_pct = excluded.booking_pct,
            commission_pct = excluded.commission_pct,
            commission_earned = excluded.commission_earned,
            spiff_bonus = excluded.spiff_bonus,
            revenue_bonus = excluded.revenue_bonus,
            booking_bonus_plus = excluded.booking_bonus_plus,
            booking_bonus_minus = excluded.booking_bonus_minus,
            hourly_paid_out = excluded.hourly_paid_out,
            total_due = excluded.total_due,
            amount_paid = excluded.amount_paid,
            remaining_amount = excluded.remaining_amount,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            rec.name_key,
            period,
            rec.name_raw,
            rec.employee_id,
            rec.hourly_rate,
            rec.total_revenue,
            rec.booking_pct,
            rec.commission_pct,
            rec.commission_earned,
            rec.spiff_bonus,
            rec.revenue_bonus,
            rec.booking_bonus_plus,
            rec.booking_bonus_minus,
            rec.hourly_paid_out,
            rec.total_due,
            rec.amount_paid,
            rec.remaining_amount,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

pub fn upsert_agent_us_row(
    conn: &Connection,
    rec: &AgentUsRecord,
    period_month: NaiveDate,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let period = period_month.format("%Y-%m-%d").to_string();
    let existed = conn
        .query_row(
            "SELECT 1 FROM agent_us_rows WHERE name_key = ?1 AND period_month = ?2",
            params![rec.name_key, period],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    conn.execute(
        "INSERT INTO agent_us_rows (
            name_key, period_month, name_raw, employee_id, total_us_revenue,
            commission_pct, commission_earned, commission_125x, bonus,
            source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT (name_key, period_month) DO UPDATE SET
            name_raw = excluded.name_raw,
            employee_id = excluded.employee_id,
            total_us_revenue = excluded.total_us_revenue,
            commission_pct = excluded.commission_pct,
            commission_earned = excluded.commission_earned,
            commission_125x = excluded.commission_125x,
            bonus = excluded.bonus,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            rec.name_key,
            period,
            rec.name_raw,
            rec.employee_id,
            rec.total_us_revenue,
            rec.commission_pct,
            rec.commission_earned,
            rec.commission_125x,
            rec.bonus,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

pub fn upsert_hourly_row(
    conn: &Connection,
    rec: &HourlyRecord,
    period_month: NaiveDate,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let period = period_month.format("%Y-%m-%d").to_string();
    let existed = conn
        .query_row(
            "SELECT 1 FROM hourly_payout_rows
             WHERE name_key = ?1 AND period_month = ?2 AND period_label = ?3",
            params![rec.name_key, period, rec.period_label],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    conn.execute(
        "INSERT INTO hourly_payout_rows (
            name_key, period_month, period_label, name_raw, employee_id,
            hours, hourly_rate, total_paid, source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT (name_key, period_month, period_label) DO UPDATE SET
            name_raw = excluded.name_raw,
            employee_id = excluded.employee_id,
            hours = excluded.hours,
            hourly_rate = excluded.hourly_rate,
            total_paid = excluded.total_paid,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            rec.name_key,
            period,
            rec.period_label,
            rec.name_raw,
            rec.employee_id,
            rec.hours,
            rec.hourly_rate,
            rec.total_paid,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

pub fn upsert_performance_row(
    conn: &Connection,
    rec: &PerformanceRecord,
    period_start: NaiveDate,
    period_end: NaiveDate,
    source_file: &str,
    sheet_name: &str,
) -> rusqlite::Result<Upsert> {
    let start = period_start.format("%Y-%m-%d").to_string();
    let end = period_end.format("%Y-%m-%d").to_string();
    let existed = conn
        .query_row(
            "SELECT 1 FROM performance_rows
             WHERE period_start = ?1 AND period_end = ?2 AND name_key = ?3",
            params![start, end, rec.name_key],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    conn.execute(
        "INSERT INTO performance_rows (
            period_start, period_end, name_key, name_raw, leads_received,
            booked_count, booked_pct, booked_total, source_file, sheet_name, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT (period_start, period_end, name_key) DO UPDATE SET
            name_raw = excluded.name_raw,
            leads_received = excluded.leads_received,
            booked_count = excluded.booked_count,
            booked_pct = excluded.booked_pct,
            booked_total = excluded.booked_total,
            source_file = excluded.source_file,
            sheet_name = excluded.sheet_name,
            updated_at = excluded.updated_at",
        params![
            start,
            end,
            rec.name_key,
            rec.name_raw,
            rec.leads_received,
            rec.booked_count,
            rec.booked_pct,
            rec.booked_total,
            source_file,
            sheet_name,
            now_rfc3339(),
        ],
    )?;
    Ok(if existed { Upsert::Updated } else { Upsert::Inserted })
}

// ---------------------------------------------------------------------------
// Calc input loader (read-only)
// ---------------------------------------------------------------------------

fn parse_role(role: &str) -> SalesRole {
    match role {
        "manager" => SalesRole::Manager,
        "international_closer" => SalesRole::InternationalCloser,
        _ => SalesRole::Agent,
    }
}

/// Load everything the calculation engine needs for one period.
pub fn load_calc_input(
    conn: &Connection,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> rusqlite::Result<CalcInput> {
    let start = period_start.format("%Y-%m-%d").to_string();
    let end = period_end.format("%Y-%m-%d").to_string();

    let mut employees = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT id, name, name_key, nickname_key, nickname_key_2, nickname_key_3,
                    sales_role, terminated
             FROM employees",
        )?;
        let rows = stmt.query_map([], |row| {
            let nick1: Option<String> = row.get(3)?;
            let nick2: Option<String> = row.get(4)?;
            let nick3: Option<String> = row.get(5)?;
            let role: String = row.get(6)?;
            let name_key: String = row.get(2)?;
            let mut name_keys = vec![name_key];
            name_keys.extend([nick1, nick2, nick3].into_iter().flatten());
            Ok(Employee {
                id: row.get(0)?,
                name: row.get(1)?,
                name_keys,
                role: parse_role(&role),
                terminated: row.get::<_, i64>(7)? != 0,
            })
        })?;
        for emp in rows {
            employees.push(emp?);
        }
    }

    let mut performance = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT name_raw, name_key, booked_pct, booked_total
             FROM performance_rows
             WHERE period_start = ?1 AND period_end = ?2",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(PerformanceRow {
                name_raw: row.get(0)?,
                name_key: row.get(1)?,
                booking_pct: row.get(2)?,
                booked_total: row.get(3)?,
            })
        })?;
        for r in rows {
            performance.push(r?);
        }
    }

    let mut booked = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT quote_id, sales_person_raw, sales_person_key, invoiced_amount
             FROM booked_quotes
             WHERE service_date >= ?1 AND service_date <= ?2
               AND invoiced_amount IS NOT NULL",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(BookedQuote {
                quote_id: row.get(0)?,
                sales_person_raw: row.get(1)?,
                sales_person_key: row.get(2)?,
                invoiced_amount: row.get(3)?,
            })
        })?;
        for r in rows {
            booked.push(r?);
        }
    }

    let mut lead_directives = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT quote_id, status_norm, sales_person_raw, sales_person_key,
                    directive_type, directive_pct, directive_amount,
                    target_name_raw, target_name_key
             FROM lead_status_quotes
             WHERE directive_type <> 'none'",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(4)?;
            Ok(LeadDirectiveRow {
                quote_id: row.get(0)?,
                status_norm: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                sales_person_raw: row.get(2)?,
                sales_person_key: row.get(3)?,
                directive: rehydrate_directive(
                    &kind,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ),
            })
        })?;
        for r in rows {
            lead_directives.push(r?);
        }
    }

    Ok(CalcInput {
        period_start,
        period_end,
        employees,
        performance,
        booked,
        lead_directives,
    })
}
