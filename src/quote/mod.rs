//! Premium quoting: per-member breakdowns and family aggregation

mod breakdown;
mod calculator;

pub use breakdown::{aggregate, round2, AdjustmentLine, Breakdown, FamilyQuote, FamilyTotal, MissedMember};
pub use calculator::{quote_family, quote_member, PolicyOptions};
