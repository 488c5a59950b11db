//! Quote output structures
//!
//! Breakdowns keep unrounded amounts; rounding to 2 decimal places
//! happens at display so intermediate results never compound rounding
//! error.

use serde::Serialize;

use crate::rates::RateKey;
use crate::rules::GstScope;

/// Round a monetary amount to 2 decimal places for display
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One named adjustment applied to a member's premium; discounts are
/// negative, add-ons positive
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentLine {
    pub label: String,
    pub amount: f64,
}

/// Per-member premium breakdown, immutable once produced
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub age: u8,
    pub age_band: String,
    /// Unadjusted rate from the lookup table
    pub base_premium: f64,
    pub adjustments: Vec<AdjustmentLine>,
    /// Premium after all adjustments, before GST
    pub net_premium: f64,
    pub gst: f64,
    pub total: f64,
}

/// A member excluded from totals because no exact rate row matched
#[derive(Debug, Clone, Serialize)]
pub struct MissedMember {
    pub age: u8,
    pub key: RateKey,
}

/// Aggregate totals across the quoted family members
#[derive(Debug, Clone, Serialize)]
pub struct FamilyTotal {
    /// Sum of base premiums before any adjustment
    pub base_sum: f64,
    /// Sum of post-adjustment, pre-GST premiums
    pub net_sum: f64,
    pub gst_sum: f64,
    pub final_total: f64,
}

/// Result of quoting a whole family: quoted members, members skipped
/// on lookup misses, and the aggregate totals
#[derive(Debug, Clone, Serialize)]
pub struct FamilyQuote {
    pub members: Vec<Breakdown>,
    pub missing: Vec<MissedMember>,
    pub total: FamilyTotal,
}

/// Sum member breakdowns into a family total.
///
/// With `GstScope::PerMember` the members' GST amounts are summed;
/// with `GstScope::FamilyTotal` GST is recomputed once on the summed
/// net premium. Skipped members never reach this function, so missing
/// rates contribute nothing to totals.
pub fn aggregate(members: &[Breakdown], gst_rate: f64, gst_scope: GstScope) -> FamilyTotal {
    let base_sum: f64 = members.iter().map(|b| b.base_premium).sum();
    let net_sum: f64 = members.iter().map(|b| b.net_premium).sum();

    let gst_sum = match gst_scope {
        GstScope::PerMember => members.iter().map(|b| b.gst).sum(),
        GstScope::FamilyTotal => net_sum * gst_rate,
    };

    FamilyTotal {
        base_sum,
        net_sum,
        gst_sum,
        final_total: net_sum + gst_sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn member(base: f64, net: f64, gst: f64) -> Breakdown {
        Breakdown {
            age: 30,
            age_band: "19-35".to_string(),
            base_premium: base,
            adjustments: Vec::new(),
            net_premium: net,
            gst,
            total: net + gst,
        }
    }

    #[test]
    fn test_gst_is_18_pct_rounded_at_display() {
        for x in [0.0, 1.0, 5000.0, 2880.0, 123.45, 99999.99] {
            assert_relative_eq!(round2(x * 0.18), round2(x * 18.0 / 100.0));
        }
        assert_relative_eq!(round2(5000.0 * 0.18), 900.00);
        assert_relative_eq!(round2(2880.0 * 0.18), 518.40);
    }

    #[test]
    fn test_aggregate_per_member() {
        let members = [member(5000.0, 5000.0, 900.0), member(4000.0, 3600.0, 648.0)];
        let total = aggregate(&members, 0.18, GstScope::PerMember);

        assert_relative_eq!(total.base_sum, 9000.0);
        assert_relative_eq!(total.net_sum, 8600.0);
        assert_relative_eq!(total.gst_sum, 1548.0);
        assert_relative_eq!(total.final_total, 10148.0);
    }

    #[test]
    fn test_aggregate_family_total_scope() {
        let members = [member(5000.0, 5000.0, 900.0), member(4000.0, 3600.0, 648.0)];
        let total = aggregate(&members, 0.18, GstScope::FamilyTotal);

        // GST recomputed once on the summed net premium
        assert_relative_eq!(total.gst_sum, 8600.0 * 0.18);
        assert_relative_eq!(total.final_total, 8600.0 * 1.18);
    }

    #[test]
    fn test_aggregate_empty_family() {
        let total = aggregate(&[], 0.18, GstScope::FamilyTotal);
        assert_relative_eq!(total.final_total, 0.0);
    }

    #[test]
    fn test_round2() {
        assert_relative_eq!(round2(3398.399999), 3398.40);
        assert_relative_eq!(round2(0.005), 0.01);
        assert_relative_eq!(round2(900.0), 900.0);
    }
}
