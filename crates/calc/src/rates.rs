//! Pure rate functions: the agent tier table and the manager buckets.

/// Agent rate plus the vacation award the top tier unlocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentRate {
    pub pct: f64,
    pub vacation_value: f64,
}

/// Agent commission rate as a step function of booking percentage and
/// booked revenue. All thresholds are strict `>` on both axes; a value at
/// the boundary falls to the tier below.
pub fn agent_rate(booking_pct: Option<f64>, revenue: Option<f64>) -> AgentRate {
    let pct = booking_pct.unwrap_or(0.0);
    let rev = revenue.unwrap_or(0.0);

    if pct > 55.0 && rev > 250_000.0 {
        return AgentRate { pct: 6.0, vacation_value: 5_000.0 };
    }
    if pct > 50.0 && rev > 250_000.0 {
        return AgentRate { pct: 6.0, vacation_value: 0.0 };
    }
    if pct > 40.0 && rev > 200_000.0 {
        return AgentRate { pct: 5.5, vacation_value: 0.0 };
    }
    if pct > 35.0 && rev > 160_000.0 {
        return AgentRate { pct: 5.0, vacation_value: 0.0 };
    }
    if pct > 30.0 && rev > 115_000.0 {
        return AgentRate { pct: 4.5, vacation_value: 0.0 };
    }
    // Mixed: strong on one axis only
    if (pct > 30.0 && rev <= 115_000.0) || (pct <= 30.0 && rev > 115_000.0) {
        return AgentRate { pct: 4.0, vacation_value: 0.0 };
    }
    AgentRate { pct: 3.5, vacation_value: 0.0 }
}

/// One manager bucket: agents whose booking percentage lands in
/// `[min, max]` contribute their revenue at `rate` percent.
#[derive(Debug, Clone, Copy)]
pub struct ManagerBucket {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub rate: f64,
}

pub const MANAGER_BUCKETS: [ManagerBucket; 6] = [
    ManagerBucket { label: "0-19%", min: 0.0, max: 19.99, rate: 0.25 },
    ManagerBucket { label: "20-24%", min: 20.0, max: 24.99, rate: 0.275 },
    ManagerBucket { label: "25-29%", min: 25.0, max: 29.99, rate: 0.3 },
    ManagerBucket { label: "30-34%", min: 30.0, max: 34.99, rate: 0.35 },
    ManagerBucket { label: "35-39%", min: 35.0, max: 39.99, rate: 0.4 },
    ManagerBucket { label: "40%+", min: 40.0, max: f64::INFINITY, rate: 0.45 },
];

/// Bucket for an agent's booking percentage. Missing percentage lands in
/// the lowest bucket. Values in the gaps between bucket ranges (e.g. 19.995)
/// fall through to the lowest bucket, matching the table's closed intervals.
pub fn manager_bucket(booking_pct: Option<f64>) -> &'static ManagerBucket {
    let pct = booking_pct.unwrap_or(0.0);
    MANAGER_BUCKETS
        .iter()
        .find(|b| pct >= b.min && pct <= b.max)
        .unwrap_or(&MANAGER_BUCKETS[0])
}

/// Round to 2 decimals, the way every monetary result is reported.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_tier_requires_both_axes_strictly() {
        // exactly at both boundaries: below the top tier
        let r = agent_rate(Some(55.0), Some(250_000.0));
        assert_eq!(r.pct, 5.5);
        assert_eq!(r.vacation_value, 0.0);

        // just over both: top tier with vacation
        let r = agent_rate(Some(56.0), Some(250_001.0));
        assert_eq!(r.pct, 6.0);
        assert_eq!(r.vacation_value, 5_000.0);

        // high revenue but 50 < pct <= 55: 6% without vacation
        let r = agent_rate(Some(52.0), Some(300_000.0));
        assert_eq!(r.pct, 6.0);
        assert_eq!(r.vacation_value, 0.0);
    }

    #[test]
    fn middle_tiers() {
        assert_eq!(agent_rate(Some(41.0), Some(200_001.0)).pct, 5.5);
        assert_eq!(agent_rate(Some(36.0), Some(160_001.0)).pct, 5.0);
        assert_eq!(agent_rate(Some(31.0), Some(115_001.0)).pct, 4.5);
    }

    #[test]
    fn mixed_tier_either_axis() {
        assert_eq!(agent_rate(Some(31.0), Some(100_000.0)).pct, 4.0);
        assert_eq!(agent_rate(Some(10.0), Some(120_000.0)).pct, 4.0);
    }

    #[test]
    fn missing_inputs_default_to_lowest() {
        assert_eq!(agent_rate(None, None).pct, 3.5);
        assert_eq!(agent_rate(Some(10.0), None).pct, 3.5);
        assert_eq!(agent_rate(None, Some(50_000.0)).pct, 3.5);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(manager_bucket(Some(0.0)).rate, 0.25);
        assert_eq!(manager_bucket(Some(19.99)).rate, 0.25);
        assert_eq!(manager_bucket(Some(20.0)).rate, 0.275);
        assert_eq!(manager_bucket(Some(29.5)).rate, 0.3);
        assert_eq!(manager_bucket(Some(34.99)).rate, 0.35);
        assert_eq!(manager_bucket(Some(39.0)).rate, 0.4);
        assert_eq!(manager_bucket(Some(40.0)).rate, 0.45);
        assert_eq!(manager_bucket(Some(95.0)).rate, 0.45);
        assert_eq!(manager_bucket(None).rate, 0.25);
    }

    #[test]
    fn round2_behavior() {
        assert_eq!(round2(1234.567), 1234.57);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-500.004), -500.0);
    }
}
