//! Calculation orchestration.
//!
//! Booking percentages come from performance staging rows; revenue comes
//! from booked quotes. The two are joined through the employee directory's
//! normalized name keys, and every failed join surfaces as a warning rather
//! than vanishing.

use std::collections::HashMap;

use crate::adjustments;
use crate::config::CalcConfig;
use crate::model::{
    AgentCommission, BucketBreakdown, CalcInput, CalcMeta, CalcResult, CalcWarnings,
    ManagerCommission, ManagerMethod, PerfWithoutRevenue, UnmatchedBookedPerson,
};
use crate::rates::{agent_rate, manager_bucket, round2, MANAGER_BUCKETS};

struct RevenueAgg {
    revenue: f64,
    quote_count: usize,
}

pub fn calculate(config: &CalcConfig, input: &CalcInput) -> CalcResult {
    // Every key an employee answers to maps to the same (id, name).
    let mut employee_by_key: HashMap<String, (i64, String)> = HashMap::new();
    let mut employee_by_id = HashMap::new();
    for emp in &input.employees {
        for key in &emp.name_keys {
            if !key.is_empty() {
                employee_by_key
                    .entry(key.clone())
                    .or_insert((emp.id, emp.name.clone()));
            }
        }
        employee_by_id.insert(emp.id, emp);
    }

    let mut warnings = CalcWarnings::default();

    // Performance staging: booking_pct source. Rows without a positive
    // booking percentage carry no signal and are skipped.
    let mut matched_perf: Vec<(i64, f64)> = Vec::new();
    let mut unmatched_perf: Vec<f64> = Vec::new();
    for row in &input.performance {
        let Some(pct) = row.booking_pct.filter(|p| *p > 0.0) else {
            continue;
        };
        match employee_by_key.get(&row.name_key) {
            Some((id, _)) => matched_perf.push((*id, pct)),
            None => {
                unmatched_perf.push(pct);
                warnings.unmatched_performance_names.push(row.name_raw.clone());
            }
        }
    }
    warnings.unmatched_performance_names.sort();
    warnings.unmatched_performance_names.dedup();

    // Booked quotes: revenue source.
    let mut revenue_by_employee: HashMap<i64, RevenueAgg> = HashMap::new();
    let mut unmatched_booked: HashMap<String, RevenueAgg> = HashMap::new();
    let mut invoiced_by_quote: HashMap<i64, f64> = HashMap::new();
    for quote in &input.booked {
        let Some(invoiced) = quote.invoiced_amount else {
            continue;
        };
        invoiced_by_quote.insert(quote.quote_id, invoiced);

        let matched = quote
            .sales_person_key
            .as_ref()
            .and_then(|k| employee_by_key.get(k));
        match matched {
            Some((id, _)) => {
                let agg = revenue_by_employee
                    .entry(*id)
                    .or_insert(RevenueAgg { revenue: 0.0, quote_count: 0 });
                agg.revenue += invoiced;
                agg.quote_count += 1;
            }
            None => {
                let name = quote
                    .sales_person_raw
                    .clone()
                    .unwrap_or_else(|| "(blank)".to_string());
                let agg = unmatched_booked
                    .entry(name)
                    .or_insert(RevenueAgg { revenue: 0.0, quote_count: 0 });
                agg.revenue += invoiced;
                agg.quote_count += 1;
            }
        }
    }
    warnings.unmatched_booked_persons = {
        let mut v: Vec<UnmatchedBookedPerson> = unmatched_booked
            .into_iter()
            .map(|(name, agg)| UnmatchedBookedPerson {
                sales_person_raw: name,
                quote_count: agg.quote_count,
                total_revenue: round2(agg.revenue),
            })
            .collect();
        v.sort_by(|a, b| a.sales_person_raw.cmp(&b.sales_person_raw));
        v
    };

    // Agent commissions.
    let mut agent_commissions = Vec::new();
    let mut total_agent_commission = 0.0;
    let mut total_vacation_awards = 0.0;
    for (id, pct) in &matched_perf {
        let Some(emp) = employee_by_id.get(id) else {
            continue;
        };
        if !emp.role.is_agent_like() {
            continue;
        }
        let agg = revenue_by_employee.get(id);
        let revenue = agg.map(|a| a.revenue).unwrap_or(0.0);
        if revenue == 0.0 {
            warnings.performance_without_revenue.push(PerfWithoutRevenue {
                employee_id: emp.id,
                employee_name: emp.name.clone(),
                booking_pct: *pct,
            });
        }
        let rate = agent_rate(Some(*pct), Some(revenue));
        let amount = round2(revenue * rate.pct / 100.0);
        agent_commissions.push(AgentCommission {
            employee_id: emp.id,
            employee_name: emp.name.clone(),
            booking_pct: *pct,
            revenue: round2(revenue),
            quote_count: agg.map(|a| a.quote_count).unwrap_or(0),
            commission_pct: rate.pct,
            commission_amount: amount,
            vacation_award_value: rate.vacation_value,
        });
        total_agent_commission += amount;
        total_vacation_awards += rate.vacation_value;
    }
    agent_commissions.sort_by_key(|a| a.employee_id);

    // Pool for managers: every person with a booking percentage, matched or
    // not. Unmatched names cannot be tied to booked revenue, so they join
    // their bucket with zero revenue.
    let mut pool: Vec<(f64, f64)> = Vec::new();
    for (id, pct) in &matched_perf {
        let revenue = revenue_by_employee.get(id).map(|a| a.revenue).unwrap_or(0.0);
        pool.push((*pct, revenue));
    }
    for pct in &unmatched_perf {
        pool.push((*pct, 0.0));
    }
    let pooled_revenue: f64 = pool.iter().map(|(_, rev)| rev).sum();

    // Manager commissions. Terminated managers are not paid.
    let mut manager_commissions = Vec::new();
    let mut total_manager_commission = 0.0;
    for emp in &input.employees {
        if emp.role != crate::model::SalesRole::Manager || emp.terminated {
            continue;
        }

        let override_pct = emp
            .name_keys
            .iter()
            .find_map(|k| config.manager_overrides.get(k))
            .copied();

        let (method, amount, breakdown) = match override_pct {
            // checked before the bucket path
            Some(pct) => (
                ManagerMethod::FixedOverride,
                round2(pooled_revenue * pct / 100.0),
                Vec::new(),
            ),
            None => {
                let mut bucket_revenue = [0.0f64; MANAGER_BUCKETS.len()];
                let mut bucket_counts = [0usize; MANAGER_BUCKETS.len()];
                for (pct, revenue) in &pool {
                    let bucket = manager_bucket(Some(*pct));
                    let idx = MANAGER_BUCKETS
                        .iter()
                        .position(|b| b.label == bucket.label)
                        .unwrap_or(0);
                    bucket_revenue[idx] += revenue;
                    bucket_counts[idx] += 1;
                }
                let mut total = 0.0;
                let mut breakdown = Vec::with_capacity(MANAGER_BUCKETS.len());
                for (idx, bucket) in MANAGER_BUCKETS.iter().enumerate() {
                    let commission = bucket_revenue[idx] * bucket.rate / 100.0;
                    total += commission;
                    breakdown.push(BucketBreakdown {
                        bucket_label: bucket.label.to_string(),
                        bucket_rate_pct: bucket.rate,
                        agent_count: bucket_counts[idx],
                        bucket_revenue: round2(bucket_revenue[idx]),
                        bucket_commission: round2(commission),
                    });
                }
                (ManagerMethod::BucketSum, round2(total), breakdown)
            }
        };

        manager_commissions.push(ManagerCommission {
            employee_id: emp.id,
            employee_name: emp.name.clone(),
            method,
            override_pct,
            pooled_revenue: round2(pooled_revenue),
            commission_amount: amount,
            breakdown,
        });
        total_manager_commission += amount;
    }
    manager_commissions.sort_by_key(|m| m.employee_id);

    // Cross-employee adjustments.
    let adj = adjustments::aggregate(&input.lead_directives, &invoiced_by_quote, &employee_by_key);

    CalcResult {
        period_start: input.period_start,
        period_end: input.period_end,
        agent_commissions,
        manager_commissions,
        adjustments: adj.per_employee,
        unmatched_adjustment_names: adj.unmatched,
        warnings,
        pooled_revenue: round2(pooled_revenue),
        total_agent_commission: round2(total_agent_commission),
        total_manager_commission: round2(total_manager_commission),
        total_vacation_awards,
        meta: CalcMeta {
            engine_version: env!("CARGO_PKG_VERSION"),
            calculated_at: chrono::Utc::now(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookedQuote, Employee, PerformanceRow, SalesRole};
    use chrono::NaiveDate;

    fn employee(id: i64, name: &str, key: &str, role: SalesRole) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            name_keys: vec![key.to_string()],
            role,
            terminated: false,
        }
    }

    fn perf(name: &str, key: &str, pct: f64) -> PerformanceRow {
        PerformanceRow {
            name_raw: name.to_string(),
            name_key: key.to_string(),
            booking_pct: Some(pct),
            booked_total: None,
        }
    }

    fn booked(quote_id: i64, key: &str, invoiced: f64) -> BookedQuote {
        BookedQuote {
            quote_id,
            sales_person_raw: Some(key.to_string()),
            sales_person_key: Some(key.to_string()),
            invoiced_amount: Some(invoiced),
        }
    }

    fn input(
        employees: Vec<Employee>,
        performance: Vec<PerformanceRow>,
        booked: Vec<BookedQuote>,
    ) -> CalcInput {
        CalcInput {
            period_start: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            employees,
            performance,
            booked,
            lead_directives: Vec::new(),
        }
    }

    #[test]
    fn top_tier_agent_gets_vacation() {
        let inp = input(
            vec![employee(1, "Alice A", "alice", SalesRole::Agent)],
            vec![perf("Alice", "alice", 56.0)],
            vec![booked(100, "alice", 250_001.0)],
        );
        let result = calculate(&CalcConfig::default(), &inp);
        let a = &result.agent_commissions[0];
        assert_eq!(a.commission_pct, 6.0);
        assert_eq!(a.vacation_award_value, 5_000.0);
        assert_eq!(a.commission_amount, round2(250_001.0 * 0.06));
        assert_eq!(result.total_vacation_awards, 5_000.0);
    }

    #[test]
    fn boundary_agent_stays_below_top_tier() {
        let inp = input(
            vec![employee(1, "Alice A", "alice", SalesRole::Agent)],
            vec![perf("Alice", "alice", 55.0)],
            vec![booked(100, "alice", 250_000.0)],
        );
        let result = calculate(&CalcConfig::default(), &inp);
        assert_eq!(result.agent_commissions[0].commission_pct, 5.5);
        assert_eq!(result.agent_commissions[0].vacation_award_value, 0.0);
    }

    #[test]
    fn manager_bucket_sum_with_breakdown() {
        let inp = input(
            vec![
                employee(1, "Alice A", "alice", SalesRole::Agent),
                employee(2, "Bob B", "bob", SalesRole::Agent),
                employee(3, "Mia M", "mia", SalesRole::Manager),
            ],
            vec![perf("Alice", "alice", 22.0), perf("Bob", "bob", 41.0)],
            vec![booked(100, "alice", 100_000.0), booked(101, "bob", 200_000.0)],
        );
        let result = calculate(&CalcConfig::default(), &inp);
        let m = &result.manager_commissions[0];
        assert_eq!(m.method, ManagerMethod::BucketSum);
        // alice: 100k at 0.275%, bob: 200k at 0.45%
        assert_eq!(m.commission_amount, round2(100_000.0 * 0.00275 + 200_000.0 * 0.0045));
        assert_eq!(m.breakdown.len(), 6);
        let b20 = m.breakdown.iter().find(|b| b.bucket_label == "20-24%").unwrap();
        assert_eq!(b20.agent_count, 1);
        assert_eq!(b20.bucket_revenue, 100_000.0);
        assert_eq!(m.pooled_revenue, 300_000.0);
    }

    #[test]
    fn manager_override_bypasses_buckets() {
        let inp = input(
            vec![
                employee(1, "Alice A", "alice", SalesRole::Agent),
                employee(3, "Sam Lopka", "sam lopka", SalesRole::Manager),
            ],
            vec![perf("Alice", "alice", 45.0)],
            vec![booked(100, "alice", 500_000.0)],
        );
        let result = calculate(&CalcConfig::default(), &inp);
        let m = &result.manager_commissions[0];
        assert_eq!(m.method, ManagerMethod::FixedOverride);
        assert_eq!(m.override_pct, Some(0.7));
        assert_eq!(m.commission_amount, 3_500.0);
        assert!(m.breakdown.is_empty());
    }

    #[test]
    fn terminated_manager_excluded() {
        let mut mgr = employee(3, "Mia M", "mia", SalesRole::Manager);
        mgr.terminated = true;
        let inp = input(vec![mgr], Vec::new(), Vec::new());
        let result = calculate(&CalcConfig::default(), &inp);
        assert!(result.manager_commissions.is_empty());
    }

    #[test]
    fn unmatched_perf_contributes_bucket_without_revenue() {
        let inp = input(
            vec![employee(3, "Mia M", "mia", SalesRole::Manager)],
            vec![perf("Stranger", "stranger", 45.0)],
            Vec::new(),
        );
        let result = calculate(&CalcConfig::default(), &inp);
        assert_eq!(
            result.warnings.unmatched_performance_names,
            vec!["Stranger".to_string()]
        );
        let m = &result.manager_commissions[0];
        let top = m.breakdown.iter().find(|b| b.bucket_label == "40%+").unwrap();
        assert_eq!(top.agent_count, 1);
        assert_eq!(top.bucket_revenue, 0.0);
        assert_eq!(m.commission_amount, 0.0);
    }

    #[test]
    fn booking_without_revenue_warns() {
        let inp = input(
            vec![employee(1, "Alice A", "alice", SalesRole::Agent)],
            vec![perf("Alice", "alice", 40.0)],
            Vec::new(),
        );
        let result = calculate(&CalcConfig::default(), &inp);
        assert_eq!(result.warnings.performance_without_revenue.len(), 1);
        // no revenue defaults to the mixed/lowest tiers, never an error
        assert_eq!(result.agent_commissions[0].commission_pct, 4.0);
        assert_eq!(result.agent_commissions[0].commission_amount, 0.0);
    }

    #[test]
    fn unmatched_booked_person_reported() {
        let inp = input(
            vec![employee(1, "Alice A", "alice", SalesRole::Agent)],
            vec![perf("Alice", "alice", 40.0)],
            vec![booked(100, "ghost", 5_000.0), booked(101, "ghost", 2_500.0)],
        );
        let result = calculate(&CalcConfig::default(), &inp);
        let u = &result.warnings.unmatched_booked_persons[0];
        assert_eq!(u.sales_person_raw, "ghost");
        assert_eq!(u.quote_count, 2);
        assert_eq!(u.total_revenue, 7_500.0);
    }
}
