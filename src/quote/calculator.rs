//! Per-member premium calculation
//!
//! The engine is a pure function over the member's age, the caller's
//! policy options, an insurer rule set, and the loaded rate table:
//! lookup, ordered adjustments, GST.

use log::warn;
use serde::{Deserialize, Serialize};

use super::breakdown::{aggregate, AdjustmentLine, Breakdown, FamilyQuote, MissedMember};
use crate::error::QuoteError;
use crate::rates::{RateKey, RateTable};
use crate::rules::InsurerRules;

/// Caller-supplied policy selections, validated before any lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOptions {
    /// Number of covered family members; drives the family discount tier
    pub family_size: u32,
    /// Policy term in years; drives the term discount tier
    pub term_years: u32,
    pub deductible: u64,
    pub sum_insured: u64,
    /// Insurer-specific plan code; absent for insurers without plans
    pub plan: Option<String>,
    /// Optional worldwide-cover add-on
    pub global_cover: bool,
}

impl PolicyOptions {
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.family_size < 1 {
            return Err(QuoteError::invalid_options("family_size must be at least 1"));
        }
        if self.term_years < 1 {
            return Err(QuoteError::invalid_options("term_years must be at least 1"));
        }
        Ok(())
    }
}

/// Quote one family member.
///
/// Applies the rule set's adjustments in order: multiplicative rules
/// compound on the running premium, additive rules apply once to the
/// looked-up base. GST is added last on the post-adjustment premium.
pub fn quote_member(
    age: u8,
    options: &PolicyOptions,
    rules: &InsurerRules,
    table: &RateTable,
) -> Result<Breakdown, QuoteError> {
    options.validate()?;

    let age_band = rules.age_bands.band_for(age)?;
    let key = RateKey::new(
        age_band,
        options.plan.as_deref(),
        options.deductible,
        options.sum_insured,
    );

    let base_premium = table
        .get(&key)
        .ok_or(QuoteError::LookupMiss { key })?;

    let mut running = base_premium;
    let mut adjustments = Vec::with_capacity(rules.adjustments.len());
    for rule in &rules.adjustments {
        let amount = rule.delta(base_premium, running, options);
        if amount != 0.0 {
            adjustments.push(AdjustmentLine {
                label: rule.label.clone(),
                amount,
            });
        }
        running += amount;
    }

    let gst = running * rules.gst_rate;

    Ok(Breakdown {
        age,
        age_band: age_band.to_string(),
        base_premium,
        adjustments,
        net_premium: running,
        gst,
        total: running + gst,
    })
}

/// Quote a whole family and aggregate totals.
///
/// Lookup misses are recovered locally: the member is excluded from
/// totals, recorded in `FamilyQuote::missing`, and processing continues.
/// Invalid ages and options are fatal for the request, since the caller
/// has to fix the input.
pub fn quote_family(
    ages: &[u8],
    options: &PolicyOptions,
    rules: &InsurerRules,
    table: &RateTable,
) -> Result<FamilyQuote, QuoteError> {
    options.validate()?;
    if options.family_size as usize != ages.len() {
        return Err(QuoteError::invalid_options(format!(
            "family_size is {} but {} ages were supplied",
            options.family_size,
            ages.len()
        )));
    }

    let mut members = Vec::with_capacity(ages.len());
    let mut missing = Vec::new();

    for &age in ages {
        match quote_member(age, options, rules, table) {
            Ok(breakdown) => members.push(breakdown),
            Err(QuoteError::LookupMiss { key }) => {
                warn!("no rate for member age {} ({}), excluded from totals", age, key);
                missing.push(MissedMember { age, key });
            }
            Err(err) => return Err(err),
        }
    }

    let total = aggregate(&members, rules.gst_rate, rules.gst_scope);

    Ok(FamilyQuote {
        members,
        missing,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::round2;
    use crate::rates::RateRecord;
    use approx::assert_relative_eq;

    fn fixture_table() -> RateTable {
        let record = |band: &str, premium: f64| RateRecord {
            age_band: band.to_string(),
            plan: Some("A".to_string()),
            deductible: 300_000,
            sum_insured: 1_000_000,
            base_premium: premium,
        };
        RateTable::from_records(vec![
            record("0-18", 2400.0),
            record("19-35", 5000.0),
            record("36-45", 6500.0),
            record("46-50", 9000.0),
        ])
    }

    fn options(family_size: u32) -> PolicyOptions {
        PolicyOptions {
            family_size,
            term_years: 1,
            deductible: 300_000,
            sum_insured: 1_000_000,
            plan: Some("A".to_string()),
            global_cover: false,
        }
    }

    #[test]
    fn test_single_member_no_discounts() {
        // Age 30, plan A, base 5000: GST 900, total 5900
        let breakdown =
            quote_member(30, &options(1), &InsurerRules::icici(), &fixture_table()).unwrap();

        assert_eq!(breakdown.age_band, "19-35");
        assert_relative_eq!(breakdown.base_premium, 5000.0);
        assert!(breakdown.adjustments.is_empty());
        assert_relative_eq!(round2(breakdown.gst), 900.00);
        assert_relative_eq!(round2(breakdown.total), 5900.00);
    }

    #[test]
    fn test_family_of_three_tier_discount() {
        // Base 4000 each, 28% family tier: net 2880, GST 518.40, total 3398.40
        let table = RateTable::from_records(vec![RateRecord {
            age_band: "19-35".to_string(),
            plan: Some("A".to_string()),
            deductible: 300_000,
            sum_insured: 1_000_000,
            base_premium: 4000.0,
        }]);

        let quote = quote_family(
            &[25, 28, 32],
            &options(3),
            &InsurerRules::icici(),
            &table,
        )
        .unwrap();

        assert_eq!(quote.members.len(), 3);
        for member in &quote.members {
            assert_relative_eq!(round2(member.net_premium), 2880.00);
            assert_relative_eq!(round2(member.gst), 518.40);
            assert_relative_eq!(round2(member.total), 3398.40);
        }
        assert_relative_eq!(round2(quote.total.net_sum), 8640.00);
        assert_relative_eq!(round2(quote.total.final_total), round2(8640.0 * 1.18));
    }

    #[test]
    fn test_term_discount_compounds_with_family_discount() {
        let mut opts = options(2);
        opts.term_years = 3;

        let breakdown =
            quote_member(30, &opts, &InsurerRules::icici(), &fixture_table()).unwrap();

        // 5000 * (1 - 0.20) * (1 - 0.15)
        assert_relative_eq!(breakdown.net_premium, 5000.0 * 0.80 * 0.85);
        assert_eq!(breakdown.adjustments.len(), 2);
        assert_relative_eq!(breakdown.adjustments[0].amount, -1000.0);
        assert_relative_eq!(breakdown.adjustments[1].amount, -(5000.0 * 0.80) * 0.15);
    }

    #[test]
    fn test_global_cover_add_on_applies_to_base() {
        let mut opts = options(2);
        opts.global_cover = true;

        let breakdown =
            quote_member(30, &opts, &InsurerRules::icici(), &fixture_table()).unwrap();

        // Family discount -1000 on running, global cover +10% of base
        assert_relative_eq!(breakdown.net_premium, 5000.0 * 0.80 + 500.0);
        let cover = breakdown
            .adjustments
            .iter()
            .find(|a| a.label == "Global Cover")
            .unwrap();
        assert_relative_eq!(cover.amount, 500.0);
    }

    #[test]
    fn test_tata_sum_insured_linear_adjustment() {
        let table = RateTable::from_records(vec![RateRecord {
            age_band: "18-35".to_string(),
            plan: None,
            deductible: 200_000,
            sum_insured: 700_000,
            base_premium: 3200.0,
        }]);
        let opts = PolicyOptions {
            family_size: 1,
            term_years: 1,
            deductible: 200_000,
            sum_insured: 700_000,
            plan: None,
            global_cover: false,
        };

        let breakdown = quote_member(30, &opts, &InsurerRules::tata_aig(), &table).unwrap();

        // (700000 - 500000) * 0.02 = 4000, additive on base
        assert_relative_eq!(breakdown.net_premium, 3200.0 + 4000.0);
        assert_relative_eq!(round2(breakdown.total), round2(7200.0 * 1.18));
    }

    #[test]
    fn test_lookup_miss_excludes_member_and_continues() {
        // 46-50 has a rate, 51-55 does not
        let quote = quote_family(
            &[30, 53, 48],
            &options(3),
            &InsurerRules::icici(),
            &fixture_table(),
        )
        .unwrap();

        assert_eq!(quote.members.len(), 2);
        assert_eq!(quote.missing.len(), 1);
        assert_eq!(quote.missing[0].age, 53);
        assert_eq!(quote.missing[0].key.age_band, "51-55");

        // Missing member contributes nothing to totals
        let expected_base = 5000.0 + 9000.0;
        assert_relative_eq!(quote.total.base_sum, expected_base);
    }

    #[test]
    fn test_invalid_age_is_fatal() {
        let err = quote_member(150, &options(1), &InsurerRules::icici(), &fixture_table())
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidAge { age: 150 }));

        let err = quote_family(
            &[30, 150],
            &options(2),
            &InsurerRules::icici(),
            &fixture_table(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidAge { age: 150 }));
    }

    #[test]
    fn test_family_size_must_match_ages() {
        let err = quote_family(
            &[30, 35],
            &options(3),
            &InsurerRules::icici(),
            &fixture_table(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidOptions { .. }));
    }

    #[test]
    fn test_zero_family_size_rejected() {
        let err = quote_member(30, &options(0), &InsurerRules::icici(), &fixture_table())
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidOptions { .. }));
    }
}
