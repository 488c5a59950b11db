//! Age band brackets
//!
//! Each insurer prices by named age bands rather than individual ages.
//! Brackets are fixed, ordered, and non-overlapping; the two built-in
//! tables match the ICICI and Tata AIG rate sheets.

use crate::error::QuoteError;
use serde::{Deserialize, Serialize};

/// Upper bound of the supported age domain
pub const MAX_AGE: u8 = 120;

/// A single age bracket with the label used in the rate sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeBand {
    pub min: u8,
    pub max: u8,
    pub label: String,
}

impl AgeBand {
    fn new(min: u8, max: u8, label: &str) -> Self {
        Self {
            min,
            max,
            label: label.to_string(),
        }
    }

    pub fn contains(&self, age: u8) -> bool {
        age >= self.min && age <= self.max
    }
}

/// Ordered bracket table mapping an integer age to a band label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeBandTable {
    bands: Vec<AgeBand>,
    /// Ages above the last bracket map into the top band instead of
    /// being rejected (the ICICI sheet treats 71-99 as a catch-all)
    open_top: bool,
}

impl AgeBandTable {
    /// ICICI bracket table: contiguous from age 0, open top band
    pub fn icici() -> Self {
        Self {
            bands: vec![
                AgeBand::new(0, 18, "0-18"),
                AgeBand::new(19, 35, "19-35"),
                AgeBand::new(36, 45, "36-45"),
                AgeBand::new(46, 50, "46-50"),
                AgeBand::new(51, 55, "51-55"),
                AgeBand::new(56, 60, "56-60"),
                AgeBand::new(61, 65, "61-65"),
                AgeBand::new(66, 70, "66-70"),
                AgeBand::new(71, 99, "71-99"),
            ],
            open_top: true,
        }
    }

    /// Tata AIG bracket table: starts at 18, 71-75 as the top band.
    /// Ages below 18 are outside the product's supported range.
    pub fn tata_aig() -> Self {
        Self {
            bands: vec![
                AgeBand::new(18, 35, "18-35"),
                AgeBand::new(36, 45, "36-45"),
                AgeBand::new(46, 50, "46-50"),
                AgeBand::new(51, 55, "51-55"),
                AgeBand::new(56, 60, "56-60"),
                AgeBand::new(61, 65, "61-65"),
                AgeBand::new(66, 70, "66-70"),
                AgeBand::new(71, 75, "71-75"),
            ],
            open_top: true,
        }
    }

    /// Check bracket ordering and contiguity; used when a table comes
    /// from a config file rather than a built-in constructor
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.bands.is_empty() {
            return Err(QuoteError::data_load("age band table is empty"));
        }
        for band in &self.bands {
            if band.min > band.max {
                return Err(QuoteError::data_load(format!(
                    "age band '{}' has min {} > max {}",
                    band.label, band.min, band.max
                )));
            }
        }
        for pair in self.bands.windows(2) {
            if pair[1].min != pair[0].max + 1 {
                return Err(QuoteError::data_load(format!(
                    "age bands '{}' and '{}' are not contiguous",
                    pair[0].label, pair[1].label
                )));
            }
        }
        Ok(())
    }

    /// Resolve the band label for an age.
    ///
    /// Ages outside [0, 120] are rejected, as are ages below the first
    /// bracket of a table that does not start at 0 (e.g. Tata's 18+).
    pub fn band_for(&self, age: u8) -> Result<&str, QuoteError> {
        if age > MAX_AGE {
            return Err(QuoteError::InvalidAge { age });
        }

        if let Some(band) = self.bands.iter().find(|b| b.contains(age)) {
            return Ok(&band.label);
        }

        // Above the last bracket: catch-all top band when open_top
        if self.open_top {
            if let Some(top) = self.bands.last() {
                if age > top.max {
                    return Ok(&top.label);
                }
            }
        }

        Err(QuoteError::InvalidAge { age })
    }

    pub fn first_supported_age(&self) -> u8 {
        self.bands.first().map(|b| b.min).unwrap_or(0)
    }
}
