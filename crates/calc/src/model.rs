//! Input and result shapes for the calculation engine.
//!
//! Inputs mirror the persisted tables the import crate fills; results are
//! serialized as-is by the surrounding application.

use chrono::NaiveDate;
use payline_extract::Directive;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesRole {
    Agent,
    Manager,
    /// Functionally identical to an agent for commission purposes.
    InternationalCloser,
}

impl SalesRole {
    pub fn is_agent_like(&self) -> bool {
        matches!(self, Self::Agent | Self::InternationalCloser)
    }
}

/// A commission-enabled sales employee, as provided by the directory.
/// Terminated employees still appear (commission may be owed) but are
/// excluded from manager payouts.
#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// Every key this employee answers to (full name plus nicknames),
    /// already normalized.
    pub name_keys: Vec<String>,
    pub role: SalesRole,
    pub terminated: bool,
}

/// One performance staging row: the booking_pct source. Revenue comes from
/// booked quotes, not from here; `booked_total` is kept for audit only.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRow {
    pub name_raw: String,
    pub name_key: String,
    pub booking_pct: Option<f64>,
    pub booked_total: Option<f64>,
}

/// One booked-opportunity quote: the revenue source.
#[derive(Debug, Clone, Serialize)]
pub struct BookedQuote {
    pub quote_id: i64,
    pub sales_person_raw: Option<String>,
    pub sales_person_key: Option<String>,
    pub invoiced_amount: Option<f64>,
}

/// One lead-status row carrying a parsed adjustment directive.
#[derive(Debug, Clone)]
pub struct LeadDirectiveRow {
    pub quote_id: i64,
    /// Lead status, lowercased and trimmed.
    pub status_norm: String,
    pub sales_person_raw: Option<String>,
    pub sales_person_key: Option<String>,
    pub directive: Directive,
}

#[derive(Debug, Clone)]
pub struct CalcInput {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub employees: Vec<Employee>,
    pub performance: Vec<PerformanceRow>,
    pub booked: Vec<BookedQuote>,
    pub lead_directives: Vec<LeadDirectiveRow>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AgentCommission {
    pub employee_id: i64,
    pub employee_name: String,
    pub booking_pct: f64,
    pub revenue: f64,
    pub quote_count: usize,
    pub commission_pct: f64,
    pub commission_amount: f64,
    /// Vacation-package award unlocked by the top tier; metadata, never
    /// folded into the percentage.
    pub vacation_award_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketBreakdown {
    pub bucket_label: String,
    pub bucket_rate_pct: f64,
    pub agent_count: usize,
    pub bucket_revenue: f64,
    pub bucket_commission: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerMethod {
    BucketSum,
    FixedOverride,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerCommission {
    pub employee_id: i64,
    pub employee_name: String,
    pub method: ManagerMethod,
    pub override_pct: Option<f64>,
    pub pooled_revenue: f64,
    pub commission_amount: f64,
    /// Per-bucket detail; empty for the fixed-override path.
    pub breakdown: Vec<BucketBreakdown>,
}

/// Per-employee adjustment totals across the four buckets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdjustmentTotals {
    pub revenue_add_ons: f64,
    pub revenue_deductions: f64,
    pub booking_bonus_plus: f64,
    pub booking_bonus_minus: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeAdjustments {
    pub employee_id: i64,
    pub employee_name: String,
    pub totals: AdjustmentTotals,
}

/// Names that appeared in directive rows but matched no employee. Reported
/// rather than dropped so adjustment totals stay auditable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnmatchedNames {
    pub original_agents: Vec<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerfWithoutRevenue {
    pub employee_id: i64,
    pub employee_name: String,
    pub booking_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedBookedPerson {
    pub sales_person_raw: String,
    pub quote_count: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CalcWarnings {
    /// Booking percentage present in staging, but no booked revenue.
    pub performance_without_revenue: Vec<PerfWithoutRevenue>,
    /// Booked quotes whose sales person matched no employee.
    pub unmatched_booked_persons: Vec<UnmatchedBookedPerson>,
    /// Performance names that matched no employee.
    pub unmatched_performance_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcMeta {
    pub engine_version: &'static str,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcResult {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub agent_commissions: Vec<AgentCommission>,
    pub manager_commissions: Vec<ManagerCommission>,
    pub adjustments: Vec<EmployeeAdjustments>,
    pub unmatched_adjustment_names: UnmatchedNames,
    pub warnings: CalcWarnings,
    pub pooled_revenue: f64,
    pub total_agent_commission: f64,
    pub total_manager_commission: f64,
    pub total_vacation_awards: f64,
    pub meta: CalcMeta,
}
