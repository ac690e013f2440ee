//! Writes a synthetic record set to disk so the dashboard's file loader has
//! something to open.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_eda::data::generator::{Profile, RecordGenerator};
use rusty_eda::data::stats::null_counts;
use rusty_eda::data::writer;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(version)]
#[command(about = "Generate a synthetic tabular data set (csv, json or parquet)")]
struct Cli {
    /// Number of records to draw
    #[arg(short, long, default_value = "200")]
    rows: usize,

    /// Seed for a reproducible draw
    #[arg(short, long)]
    seed: Option<u64>,

    /// Record profile: demographics, sales or customer
    #[arg(short, long, default_value = "sales")]
    profile: Profile,

    /// Output file; the extension picks the format
    #[arg(short, long, default_value = "sample_data.parquet")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let records = RecordGenerator::new(cli.profile)
        .generate(cli.rows, cli.seed)
        .context("generating records")?;
    writer::write_file(&records, &cli.out)
        .with_context(|| format!("writing {}", cli.out.display()))?;

    let missing: usize = null_counts(&records).iter().map(|(_, n)| n).sum();
    println!(
        "Wrote {} {} records ({} fields, {missing} missing values) to {}",
        records.len(),
        cli.profile,
        records.schema().len(),
        cli.out.display()
    );
    Ok(())
}
