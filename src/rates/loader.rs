//! CSV rate sheet loader
//!
//! Loads premium rate tables exported from the insurer spreadsheets.
//! Expected columns: Age Band, Plan (optional), Deductible, Sum Insured,
//! Premium.

use log::info;
use std::fs::File;
use std::path::Path;

use super::{RateRecord, RateTable};
use crate::error::QuoteError;

/// Columns every rate sheet must carry; Plan is insurer-specific
const REQUIRED_COLUMNS: [&str; 4] = ["Age Band", "Deductible", "Sum Insured", "Premium"];

/// Raw CSV row matching the spreadsheet export headers
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Age Band")]
    age_band: String,
    #[serde(rename = "Plan", default)]
    plan: Option<String>,
    #[serde(rename = "Deductible")]
    deductible: u64,
    #[serde(rename = "Sum Insured")]
    sum_insured: u64,
    #[serde(rename = "Premium")]
    premium: f64,
}

impl CsvRow {
    fn to_record(self) -> RateRecord {
        // Treat an empty Plan cell the same as a missing Plan column
        let plan = self.plan.filter(|p| !p.trim().is_empty());
        RateRecord {
            age_band: self.age_band,
            plan,
            deductible: self.deductible,
            sum_insured: self.sum_insured,
            base_premium: self.premium,
        }
    }
}

/// Load a rate table from a CSV file
pub fn load_rate_table<P: AsRef<Path>>(path: P) -> Result<RateTable, QuoteError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        QuoteError::data_load(format!("cannot open {}: {}", path.display(), e))
    })?;
    let table = load_rate_table_from_reader(file)?;
    info!("loaded {} rate rows from {}", table.len(), path.display());
    Ok(table)
}

/// Load a rate table from any reader (e.g. string buffer, pre-fetched bytes)
pub fn load_rate_table_from_reader<R: std::io::Read>(reader: R) -> Result<RateTable, QuoteError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(QuoteError::data_load(format!(
            "rate sheet is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record());
    }

    if records.is_empty() {
        return Err(QuoteError::data_load("rate sheet contains no rows"));
    }

    Ok(RateTable::from_records(records))
}
