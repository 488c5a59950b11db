//! Quote an entire member census CSV
//!
//! Reads one row per member, quotes all rows in parallel against a
//! shared read-only rate table, and writes a breakdown CSV.

use anyhow::{bail, Context};
use clap::Parser;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use topup_quoter::quote::round2;
use topup_quoter::{quote_member, InsurerRules, PolicyOptions, QuoteError, RateTable};

#[derive(Parser, Debug)]
#[command(name = "quote_block", about = "Batch premium quoting for a member census")]
struct Args {
    /// Rate sheet CSV
    #[arg(long)]
    rates: PathBuf,

    /// Census CSV (Age, Deductible, Sum Insured, Plan, Term, FamilySize, GlobalCover)
    #[arg(long)]
    census: PathBuf,

    /// Built-in insurer rule set (icici, tata_aig)
    #[arg(long, default_value = "icici")]
    insurer: String,

    /// Output CSV path
    #[arg(long, default_value = "quote_output.csv")]
    output: PathBuf,
}

/// One census row: a member plus their policy selections
#[derive(Debug, serde::Deserialize)]
struct CensusRow {
    #[serde(rename = "Age")]
    age: u8,
    #[serde(rename = "Deductible")]
    deductible: u64,
    #[serde(rename = "Sum Insured")]
    sum_insured: u64,
    #[serde(rename = "Plan", default)]
    plan: Option<String>,
    #[serde(rename = "Term")]
    term: u32,
    #[serde(rename = "FamilySize")]
    family_size: u32,
    #[serde(rename = "GlobalCover", default)]
    global_cover: bool,
}

impl CensusRow {
    fn options(&self) -> PolicyOptions {
        PolicyOptions {
            family_size: self.family_size,
            term_years: self.term,
            deductible: self.deductible,
            sum_insured: self.sum_insured,
            plan: self.plan.clone().filter(|p| !p.trim().is_empty()),
            global_cover: self.global_cover,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let rules = match InsurerRules::by_name(&args.insurer) {
        Some(rules) => rules,
        None => bail!("unknown insurer '{}' (try icici or tata_aig)", args.insurer),
    };

    println!("Loading rate sheet from {}...", args.rates.display());
    let table = RateTable::from_csv_path(&args.rates)
        .with_context(|| format!("loading rate sheet from {}", args.rates.display()))?;
    println!("Loaded {} rate rows in {:?}", table.len(), start.elapsed());

    let mut census_reader = csv::Reader::from_path(&args.census)
        .with_context(|| format!("opening census {}", args.census.display()))?;
    let rows: Vec<CensusRow> = census_reader
        .deserialize()
        .collect::<Result<_, _>>()
        .context("parsing census rows")?;
    println!("Quoting {} members...", rows.len());

    let quote_start = Instant::now();

    // RateTable is read-only after load, so rows quote in parallel
    // without locking
    let results: Vec<(usize, Result<topup_quoter::Breakdown, QuoteError>)> = rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| (i, quote_member(row.age, &row.options(), &rules, &table)))
        .collect();

    println!("Quoted in {:?}", quote_start.elapsed());

    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writeln!(file, "Row,Age,AgeBand,Base,Net,GST,Total,Status")?;

    let mut base_sum = 0.0;
    let mut final_sum = 0.0;
    let mut misses = 0usize;
    let mut rejects = 0usize;

    for (i, result) in &results {
        let row = &rows[*i];
        match result {
            Ok(b) => {
                base_sum += b.base_premium;
                final_sum += b.total;
                writeln!(
                    file,
                    "{},{},{},{:.2},{:.2},{:.2},{:.2},ok",
                    i + 1,
                    b.age,
                    b.age_band,
                    round2(b.base_premium),
                    round2(b.net_premium),
                    round2(b.gst),
                    round2(b.total),
                )?;
            }
            Err(err) => {
                if err.is_lookup_miss() {
                    misses += 1;
                } else {
                    rejects += 1;
                }
                writeln!(
                    file,
                    "{},{},,,,,,{}",
                    i + 1,
                    row.age,
                    if err.is_lookup_miss() { "lookup_miss" } else { "rejected" },
                )?;
            }
        }
    }

    println!("\nResults written to {}", args.output.display());
    println!("Summary:");
    println!("  Members quoted:  {}", results.len() - misses - rejects);
    println!("  Lookup misses:   {}", misses);
    println!("  Rejected inputs: {}", rejects);
    println!("  Base Premium (excl. GST): {:.2}", round2(base_sum));
    println!("  Final Premium (incl. GST): {:.2}", round2(final_sum));
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
