//! Cross-employee adjustment aggregation.
//!
//! Joins lead-status directives to booked invoiced amounts and totals, per
//! employee, what they receive and what they give up. Revenue moves
//! (`percent_split`, `fixed_rev_transfer`) land in the revenue buckets;
//! booking bonuses (`fixed_booking_transfer`) in the booking buckets.

use std::collections::HashMap;

use payline_extract::Directive;

use crate::model::{AdjustmentTotals, EmployeeAdjustments, LeadDirectiveRow, UnmatchedNames};
use crate::rates::round2;

pub struct AdjustmentOutcome {
    pub per_employee: Vec<EmployeeAdjustments>,
    pub unmatched: UnmatchedNames,
}

/// Aggregate adjustments for a period.
///
/// Eligible rows: lead status exactly `completed` or `closed` (normalized),
/// a booked invoiced amount for the same quote, and a non-none directive.
/// A directive whose target matches no employee contributes to neither
/// side's totals; every unmatched name is reported so the totals stay
/// auditable.
pub fn aggregate(
    rows: &[LeadDirectiveRow],
    invoiced_by_quote: &HashMap<i64, f64>,
    employee_by_key: &HashMap<String, (i64, String)>,
) -> AdjustmentOutcome {
    let mut totals: HashMap<i64, (String, AdjustmentTotals)> = HashMap::new();
    let mut unmatched_agents: Vec<String> = Vec::new();
    let mut unmatched_targets: Vec<String> = Vec::new();

    for row in rows {
        if row.status_norm != "completed" && row.status_norm != "closed" {
            continue;
        }
        let Some(&invoiced) = invoiced_by_quote.get(&row.quote_id) else {
            continue;
        };

        let (amount, target, booking) = match &row.directive {
            Directive::None => continue,
            Directive::PercentSplit { pct, target } => {
                (round2(invoiced * pct / 100.0), target, false)
            }
            Directive::FixedRevTransfer { amount, target } => (*amount, target, false),
            Directive::FixedBookingTransfer { amount, target } => (*amount, target, true),
        };

        let target_match = employee_by_key.get(&target.key);
        let agent_match = row
            .sales_person_key
            .as_ref()
            .and_then(|k| employee_by_key.get(k));

        if agent_match.is_none() {
            if let Some(raw) = &row.sales_person_raw {
                unmatched_agents.push(raw.clone());
            }
        }
        let Some((target_id, target_name)) = target_match else {
            // no resolvable target: neither side is adjusted
            unmatched_targets.push(target.raw.clone());
            continue;
        };

        let entry = totals
            .entry(*target_id)
            .or_insert_with(|| (target_name.clone(), AdjustmentTotals::default()));
        if booking {
            entry.1.booking_bonus_plus += amount;
        } else {
            entry.1.revenue_add_ons += amount;
        }

        if let Some((agent_id, agent_name)) = agent_match {
            let entry = totals
                .entry(*agent_id)
                .or_insert_with(|| (agent_name.clone(), AdjustmentTotals::default()));
            if booking {
                entry.1.booking_bonus_minus += amount;
            } else {
                entry.1.revenue_deductions += amount;
            }
        }
    }

    let mut per_employee: Vec<EmployeeAdjustments> = totals
        .into_iter()
        .map(|(employee_id, (employee_name, mut t))| {
            t.revenue_add_ons = round2(t.revenue_add_ons);
            t.revenue_deductions = round2(t.revenue_deductions);
            t.booking_bonus_plus = round2(t.booking_bonus_plus);
            t.booking_bonus_minus = round2(t.booking_bonus_minus);
            EmployeeAdjustments { employee_id, employee_name, totals: t }
        })
        .collect();
    per_employee.sort_by_key(|e| e.employee_id);

    unmatched_agents.sort();
    unmatched_agents.dedup();
    unmatched_targets.sort();
    unmatched_targets.dedup();

    AdjustmentOutcome {
        per_employee,
        unmatched: UnmatchedNames {
            original_agents: unmatched_agents,
            targets: unmatched_targets,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payline_extract::parse_directive;

    fn row(quote_id: i64, status: &str, agent: &str, directive: &str) -> LeadDirectiveRow {
        LeadDirectiveRow {
            quote_id,
            status_norm: status.to_string(),
            sales_person_raw: Some(agent.to_string()),
            sales_person_key: Some(payline_extract::value::normalize_name_key(agent)),
            directive: parse_directive(directive),
        }
    }

    fn employees(pairs: &[(&str, i64, &str)]) -> HashMap<String, (i64, String)> {
        pairs
            .iter()
            .map(|(key, id, name)| (key.to_string(), (*id, name.to_string())))
            .collect()
    }

    #[test]
    fn percent_split_moves_revenue_both_ways() {
        let rows = vec![row(100, "completed", "Alice", "40% of the move to Bob")];
        let invoiced = HashMap::from([(100, 1000.0)]);
        let emps = employees(&[("alice", 1, "Alice A"), ("bob", 2, "Bob B")]);

        let out = aggregate(&rows, &invoiced, &emps);
        assert_eq!(out.per_employee.len(), 2);
        let alice = &out.per_employee[0];
        let bob = &out.per_employee[1];
        assert_eq!(alice.totals.revenue_deductions, 400.0);
        assert_eq!(bob.totals.revenue_add_ons, 400.0);
        assert!(out.unmatched.targets.is_empty());
    }

    #[test]
    fn booking_bonus_uses_booking_buckets() {
        let rows = vec![row(100, "closed", "Alice", "$10 bonus to Bob")];
        let invoiced = HashMap::from([(100, 1000.0)]);
        let emps = employees(&[("alice", 1, "Alice A"), ("bob", 2, "Bob B")]);

        let out = aggregate(&rows, &invoiced, &emps);
        assert_eq!(out.per_employee[0].totals.booking_bonus_minus, 10.0);
        assert_eq!(out.per_employee[1].totals.booking_bonus_plus, 10.0);
        assert_eq!(out.per_employee[1].totals.revenue_add_ons, 0.0);
    }

    #[test]
    fn ineligible_rows_are_skipped() {
        let emps = employees(&[("alice", 1, "Alice A"), ("bob", 2, "Bob B")]);
        let invoiced = HashMap::from([(100, 1000.0)]);

        // wrong status
        let out = aggregate(
            &[row(100, "pending", "Alice", "Split with Bob")],
            &invoiced,
            &emps,
        );
        assert!(out.per_employee.is_empty());

        // no invoiced amount for the quote
        let out = aggregate(
            &[row(999, "completed", "Alice", "Split with Bob")],
            &invoiced,
            &emps,
        );
        assert!(out.per_employee.is_empty());

        // no directive
        let out = aggregate(
            &[row(100, "completed", "Alice", "call back friday")],
            &invoiced,
            &emps,
        );
        assert!(out.per_employee.is_empty());
    }

    #[test]
    fn unmatched_target_excludes_both_sides_but_is_reported() {
        let rows = vec![row(100, "completed", "Alice", "Split with Nobody Known")];
        let invoiced = HashMap::from([(100, 1000.0)]);
        let emps = employees(&[("alice", 1, "Alice A")]);

        let out = aggregate(&rows, &invoiced, &emps);
        assert!(out.per_employee.is_empty());
        assert_eq!(out.unmatched.targets, vec!["Nobody Known".to_string()]);
    }

    #[test]
    fn unmatched_agent_still_pays_target() {
        let rows = vec![row(100, "completed", "Ghost Agent", "$50 bonus for Bob")];
        let invoiced = HashMap::from([(100, 1000.0)]);
        let emps = employees(&[("bob", 2, "Bob B")]);

        let out = aggregate(&rows, &invoiced, &emps);
        assert_eq!(out.per_employee.len(), 1);
        assert_eq!(out.per_employee[0].totals.booking_bonus_plus, 50.0);
        assert_eq!(out.unmatched.original_agents, vec!["Ghost Agent".to_string()]);
    }

    #[test]
    fn split_amount_rounds_to_cents() {
        let rows = vec![row(100, "completed", "Alice", "33% of the move to Bob")];
        let invoiced = HashMap::from([(100, 1234.56)]);
        let emps = employees(&[("alice", 1, "Alice A"), ("bob", 2, "Bob B")]);

        let out = aggregate(&rows, &invoiced, &emps);
        // 1234.56 * 0.33 = 407.4048 -> 407.4
        assert_eq!(out.per_employee[1].totals.revenue_add_ons, 407.4);
    }
}
