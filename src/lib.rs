//! Super Top-Up Quoter - Premium quoting engine for super top-up health insurance
//!
//! This library provides:
//! - Rate table loading from insurer premium sheets (CSV)
//! - Age band resolution per insurer bracket tables
//! - Data-driven insurer rule sets (discount tiers, add-ons, GST scope)
//! - Per-member premium breakdowns and family aggregation

pub mod error;
pub mod quote;
pub mod rates;
pub mod rules;

// Re-export commonly used types
pub use error::QuoteError;
pub use quote::{
    aggregate, quote_family, quote_member, Breakdown, FamilyQuote, FamilyTotal, PolicyOptions,
};
pub use rates::{AgeBandTable, RateKey, RateRecord, RateTable};
pub use rules::{GstScope, InsurerRules};
