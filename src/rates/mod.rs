//! Premium rate table keyed by age band, plan, deductible, and sum insured

mod age_band;
mod loader;

pub use age_band::{AgeBand, AgeBandTable, MAX_AGE};
pub use loader::{load_rate_table, load_rate_table_from_reader};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::QuoteError;

/// Unique key for one rate table row.
///
/// String fields are normalized to uppercase on construction; the source
/// sheets mix casing on plan codes ("a" vs "A").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateKey {
    pub age_band: String,
    pub plan: Option<String>,
    pub deductible: u64,
    pub sum_insured: u64,
}

impl RateKey {
    pub fn new(age_band: &str, plan: Option<&str>, deductible: u64, sum_insured: u64) -> Self {
        Self {
            age_band: age_band.trim().to_uppercase(),
            plan: plan.map(|p| p.trim().to_uppercase()),
            deductible,
            sum_insured,
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "age band {}, plan {}, deductible {}, sum insured {}",
            self.age_band,
            self.plan.as_deref().unwrap_or("-"),
            self.deductible,
            self.sum_insured
        )
    }
}

/// A single row from an insurer's premium sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRecord {
    pub age_band: String,
    pub plan: Option<String>,
    pub deductible: u64,
    pub sum_insured: u64,
    pub base_premium: f64,
}

impl RateRecord {
    pub fn key(&self) -> RateKey {
        RateKey::new(
            &self.age_band,
            self.plan.as_deref(),
            self.deductible,
            self.sum_insured,
        )
    }
}

/// Immutable premium lookup table, built once at startup.
///
/// Read-only after construction, so it can be shared across threads
/// without locking.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<RateKey, f64>,
}

impl RateTable {
    /// Build from parsed records. Exact key collisions deduplicate
    /// last-wins; each collision is logged.
    pub fn from_records(records: Vec<RateRecord>) -> Self {
        let mut rates = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.key();
            if let Some(previous) = rates.insert(key.clone(), record.base_premium) {
                warn!(
                    "duplicate rate row for {} (keeping {}, dropping {})",
                    key, record.base_premium, previous
                );
            }
        }
        Self { rates }
    }

    /// Load from a CSV file with columns Age Band, [Plan], Deductible,
    /// Sum Insured, Premium
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, QuoteError> {
        load_rate_table(path)
    }

    /// Load from any reader (e.g. string buffer, pre-fetched bytes)
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, QuoteError> {
        load_rate_table_from_reader(reader)
    }

    /// Exact-match premium lookup; no interpolation between bracket values
    pub fn lookup(
        &self,
        age_band: &str,
        plan: Option<&str>,
        deductible: u64,
        sum_insured: u64,
    ) -> Option<f64> {
        self.get(&RateKey::new(age_band, plan, deductible, sum_insured))
    }

    pub fn get(&self, key: &RateKey) -> Option<f64> {
        self.rates.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
