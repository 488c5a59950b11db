//! Insurer rule sets
//!
//! Each insurer's pricing differences (age brackets, discount tiers,
//! add-ons, GST scope) are expressed as data so the calculation engine
//! stays insurer-agnostic. Rule sets come from the built-in constructors
//! or from a JSON config file.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::error::QuoteError;
use crate::quote::PolicyOptions;
use crate::rates::AgeBandTable;

/// Standard GST rate on health insurance premiums
pub const DEFAULT_GST_RATE: f64 = 0.18;

/// Where GST is applied when aggregating a family quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstScope {
    /// GST computed on each member's post-adjustment premium, then summed
    PerMember,
    /// GST computed once on the family's summed post-adjustment premium
    FamilyTotal,
}

/// How an adjustment's percentage is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentBasis {
    /// Applied to the running premium, compounding with earlier rules
    Multiplicative,
    /// Applied once to the original base premium
    AdditiveOnBase,
}

/// One tier of a count-keyed discount table: `pct` applies from
/// `min` members/years upward, until a higher tier takes over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub min: u32,
    pub pct: f64,
}

/// Pick the highest tier at or below `count`; below the lowest tier
/// there is no adjustment
fn tier_pct(tiers: &[Tier], count: u32) -> f64 {
    tiers
        .iter()
        .filter(|t| count >= t.min)
        .max_by_key(|t| t.min)
        .map(|t| t.pct)
        .unwrap_or(0.0)
}

/// The adjustment families observed across the insurer variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Discount tiered by number of covered family members
    FamilyDiscount { tiers: Vec<Tier> },
    /// Discount tiered by policy term in years
    TermDiscount { tiers: Vec<Tier> },
    /// Flat percentage add-on when the global cover option is selected
    GlobalCover { pct: f64 },
    /// Linear amount `(sum_insured - threshold) * rate`, always additive
    SumInsuredLinear { threshold: u64, rate: f64 },
}

/// A single named adjustment in an insurer's ordered rule list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub label: String,
    pub basis: AdjustmentBasis,
    pub kind: AdjustmentKind,
}

impl AdjustmentRule {
    /// Signed premium delta for this rule.
    ///
    /// `base` is the original looked-up premium, `running` the premium
    /// after all earlier rules; which one the percentage applies to is
    /// decided by the rule's basis. Discounts return negative deltas.
    pub fn delta(&self, base: f64, running: f64, options: &PolicyOptions) -> f64 {
        let reference = match self.basis {
            AdjustmentBasis::Multiplicative => running,
            AdjustmentBasis::AdditiveOnBase => base,
        };

        match &self.kind {
            AdjustmentKind::FamilyDiscount { tiers } => {
                -reference * tier_pct(tiers, options.family_size)
            }
            AdjustmentKind::TermDiscount { tiers } => {
                -reference * tier_pct(tiers, options.term_years)
            }
            AdjustmentKind::GlobalCover { pct } => {
                if options.global_cover {
                    reference * pct
                } else {
                    0.0
                }
            }
            AdjustmentKind::SumInsuredLinear { threshold, rate } => {
                (options.sum_insured as f64 - *threshold as f64) * rate
            }
        }
    }
}

/// Complete pricing rule set for one insurer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurerRules {
    pub name: String,
    pub age_bands: AgeBandTable,
    /// Applied in order; ordering matters for multiplicative rules
    pub adjustments: Vec<AdjustmentRule>,
    pub gst_rate: f64,
    pub gst_scope: GstScope,
}

impl InsurerRules {
    /// ICICI super top-up: tiered family and term discounts, optional
    /// global cover add-on, GST once on the family total
    pub fn icici() -> Self {
        Self {
            name: "ICICI".to_string(),
            age_bands: AgeBandTable::icici(),
            adjustments: vec![
                AdjustmentRule {
                    label: "Family Discount".to_string(),
                    basis: AdjustmentBasis::Multiplicative,
                    kind: AdjustmentKind::FamilyDiscount {
                        tiers: vec![
                            Tier { min: 2, pct: 0.20 },
                            Tier { min: 3, pct: 0.28 },
                            Tier { min: 4, pct: 0.32 },
                        ],
                    },
                },
                AdjustmentRule {
                    label: "Term Discount".to_string(),
                    basis: AdjustmentBasis::Multiplicative,
                    kind: AdjustmentKind::TermDiscount {
                        tiers: vec![
                            Tier { min: 2, pct: 0.10 },
                            Tier { min: 3, pct: 0.15 },
                        ],
                    },
                },
                AdjustmentRule {
                    label: "Global Cover".to_string(),
                    basis: AdjustmentBasis::AdditiveOnBase,
                    kind: AdjustmentKind::GlobalCover { pct: 0.10 },
                },
            ],
            gst_rate: DEFAULT_GST_RATE,
            gst_scope: GstScope::FamilyTotal,
        }
    }

    /// Tata AIG super top-up: flat family and term discounts, linear
    /// sum-insured adjustment on base, GST per member
    pub fn tata_aig() -> Self {
        Self {
            name: "Tata AIG".to_string(),
            age_bands: AgeBandTable::tata_aig(),
            adjustments: vec![
                AdjustmentRule {
                    label: "Family Discount".to_string(),
                    basis: AdjustmentBasis::Multiplicative,
                    kind: AdjustmentKind::FamilyDiscount {
                        tiers: vec![Tier { min: 2, pct: 0.05 }],
                    },
                },
                AdjustmentRule {
                    label: "Term Discount".to_string(),
                    basis: AdjustmentBasis::Multiplicative,
                    kind: AdjustmentKind::TermDiscount {
                        tiers: vec![Tier { min: 2, pct: 0.10 }],
                    },
                },
                AdjustmentRule {
                    label: "Sum Insured Adjustment".to_string(),
                    basis: AdjustmentBasis::AdditiveOnBase,
                    kind: AdjustmentKind::SumInsuredLinear {
                        threshold: 500_000,
                        rate: 0.02,
                    },
                },
            ],
            gst_rate: DEFAULT_GST_RATE,
            gst_scope: GstScope::PerMember,
        }
    }

    /// Look up a built-in rule set by insurer name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "icici" => Some(Self::icici()),
            "tataaig" | "tata" => Some(Self::tata_aig()),
            _ => None,
        }
    }

    /// Load a rule set from a JSON config file, so new insurers need
    /// no code change
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, QuoteError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QuoteError::data_load(format!("cannot open {}: {}", path.display(), e))
        })?;
        let rules: Self = serde_json::from_reader(file)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Sanity-check a rule set that came from config
    pub fn validate(&self) -> Result<(), QuoteError> {
        self.age_bands.validate()?;
        if !(0.0..1.0).contains(&self.gst_rate) {
            return Err(QuoteError::data_load(format!(
                "gst_rate {} is not a fraction in [0, 1)",
                self.gst_rate
            )));
        }
        for rule in &self.adjustments {
            let tiers = match &rule.kind {
                AdjustmentKind::FamilyDiscount { tiers } => tiers,
                AdjustmentKind::TermDiscount { tiers } => tiers,
                _ => continue,
            };
            if tiers.iter().any(|t| !(0.0..1.0).contains(&t.pct)) {
                return Err(QuoteError::data_load(format!(
                    "rule '{}' has a tier pct outside [0, 1)",
                    rule.label
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_selection() {
        let tiers = vec![
            Tier { min: 2, pct: 0.20 },
            Tier { min: 3, pct: 0.28 },
            Tier { min: 4, pct: 0.32 },
        ];

        assert_eq!(tier_pct(&tiers, 1), 0.0);
        assert_eq!(tier_pct(&tiers, 2), 0.20);
        assert_eq!(tier_pct(&tiers, 3), 0.28);
        assert_eq!(tier_pct(&tiers, 4), 0.32);
        assert_eq!(tier_pct(&tiers, 9), 0.32);
    }

    #[test]
    fn test_family_discount_monotonic_in_member_count() {
        let tiers = vec![
            Tier { min: 2, pct: 0.20 },
            Tier { min: 3, pct: 0.28 },
            Tier { min: 4, pct: 0.32 },
        ];

        let mut last = 0.0;
        for members in 1..=10 {
            let pct = tier_pct(&tiers, members);
            assert!(pct >= last, "discount regressed at {} members", members);
            last = pct;
        }
    }

    #[test]
    fn test_rule_set_json_round_trip() {
        let rules = InsurerRules::icici();
        let json = serde_json::to_string_pretty(&rules).unwrap();
        let back: InsurerRules = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name, "ICICI");
        assert_eq!(back.adjustments.len(), 3);
        assert_eq!(back.gst_scope, GstScope::FamilyTotal);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_by_name() {
        assert!(InsurerRules::by_name("icici").is_some());
        assert!(InsurerRules::by_name("Tata AIG").is_some());
        assert!(InsurerRules::by_name("tata_aig").is_some());
        assert!(InsurerRules::by_name("hdfc").is_none());
    }

    #[test]
    fn test_load_shipped_rule_sets() {
        let icici = InsurerRules::from_json_path("data/rules/icici.json").unwrap();
        assert_eq!(icici.name, "ICICI");
        assert_eq!(icici.gst_scope, GstScope::FamilyTotal);
        assert_eq!(icici.adjustments.len(), 3);

        let tata = InsurerRules::from_json_path("data/rules/tata_aig.json").unwrap();
        assert_eq!(tata.gst_scope, GstScope::PerMember);
        assert_eq!(tata.age_bands.first_supported_age(), 18);
    }

    #[test]
    fn test_validate_rejects_bad_gst() {
        let mut rules = InsurerRules::icici();
        rules.gst_rate = 1.8;
        assert!(rules.validate().is_err());
    }
}
