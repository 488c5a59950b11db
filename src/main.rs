//! Super Top-Up Quoter CLI
//!
//! Loads an insurer rate sheet, quotes a family, and prints the
//! per-member breakdown with aggregate totals.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use topup_quoter::quote::round2;
use topup_quoter::{quote_family, InsurerRules, PolicyOptions, RateTable};

#[derive(Parser, Debug)]
#[command(name = "topup_quoter", about = "Super top-up premium quote calculator")]
struct Args {
    /// Rate sheet CSV (Age Band, [Plan], Deductible, Sum Insured, Premium)
    #[arg(long)]
    rates: PathBuf,

    /// Built-in insurer rule set (icici, tata_aig)
    #[arg(long, default_value = "icici")]
    insurer: String,

    /// JSON rule-set file; overrides --insurer
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Ages of the covered family members
    #[arg(long, value_delimiter = ',', required = true)]
    ages: Vec<u8>,

    #[arg(long)]
    deductible: u64,

    #[arg(long)]
    sum_insured: u64,

    /// Plan code for insurers that price by plan
    #[arg(long)]
    plan: Option<String>,

    /// Policy term in years
    #[arg(long, default_value_t = 1)]
    term: u32,

    /// Include the global cover add-on
    #[arg(long)]
    global_cover: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => InsurerRules::from_json_path(path)
            .with_context(|| format!("loading rule set from {}", path.display()))?,
        None => match InsurerRules::by_name(&args.insurer) {
            Some(rules) => rules,
            None => bail!("unknown insurer '{}' (try icici or tata_aig)", args.insurer),
        },
    };

    let table = RateTable::from_csv_path(&args.rates)
        .with_context(|| format!("loading rate sheet from {}", args.rates.display()))?;

    let options = PolicyOptions {
        family_size: args.ages.len() as u32,
        term_years: args.term,
        deductible: args.deductible,
        sum_insured: args.sum_insured,
        plan: args.plan.clone(),
        global_cover: args.global_cover,
    };

    let quote = quote_family(&args.ages, &options, &rules, &table)?;

    println!("{} Super Top-Up Premium Quote", rules.name);
    println!("==================================\n");
    println!(
        "Deductible: {}  Sum Insured: {}  Plan: {}  Term: {}yr  Members: {}\n",
        args.deductible,
        args.sum_insured,
        args.plan.as_deref().unwrap_or("-"),
        args.term,
        args.ages.len()
    );

    println!(
        "{:>4} {:>8} {:>12} {:>14} {:>12} {:>10} {:>12}",
        "Age", "Band", "Base", "Adjustments", "Net", "GST", "Total"
    );
    println!("{}", "-".repeat(78));

    for member in &quote.members {
        let adjustment_sum: f64 = member.adjustments.iter().map(|a| a.amount).sum();
        println!(
            "{:>4} {:>8} {:>12.2} {:>14.2} {:>12.2} {:>10.2} {:>12.2}",
            member.age,
            member.age_band,
            round2(member.base_premium),
            round2(adjustment_sum),
            round2(member.net_premium),
            round2(member.gst),
            round2(member.total),
        );
        for line in &member.adjustments {
            println!("       {:<24} {:>12.2}", line.label, round2(line.amount));
        }
    }

    for miss in &quote.missing {
        println!(
            "{:>4}  -- no rate found ({}), excluded from totals",
            miss.age, miss.key
        );
    }

    println!("\nTotals:");
    println!("  Base Premium (excl. GST): {:.2}", round2(quote.total.base_sum));
    println!("  Net Premium  (excl. GST): {:.2}", round2(quote.total.net_sum));
    println!("  GST:                      {:.2}", round2(quote.total.gst_sum));
    println!("  Final Premium (incl. GST): {:.2}", round2(quote.total.final_total));

    Ok(())
}
