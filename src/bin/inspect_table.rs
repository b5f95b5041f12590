//! Load one dataset source with the server's parser and print a summary.

use anyhow::{Context, Result};
use clap::Parser;

use covidpt::config::DataConfig;
use covidpt::data_loader::TableLoader;
use covidpt::query::counties;
use covidpt::TableKind;

#[derive(Parser, Debug)]
#[command(name = "inspect_table", about = "Inspect a covidpt CSV source")]
struct Args {
    /// URL or file path of the CSV
    source: String,

    /// Which table the source holds (national or regional)
    #[arg(short, long, default_value = "national")]
    kind: TableKind,

    /// Column holding the dd-mm-yyyy date
    #[arg(long, default_value = "data")]
    date_column: String,

    /// Column holding the county name
    #[arg(long, default_value = "concelho")]
    county_column: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = DataConfig {
        national_source: args.source.clone(),
        regional_source: args.source.clone(),
        date_column: args.date_column,
        county_column: args.county_column,
        ..Default::default()
    };

    println!("Inspecting {} source: {}", args.kind, args.source);

    let loader = TableLoader::new(&config)?;
    let table = loader
        .load(args.kind)
        .await
        .with_context(|| format!("loading {}", args.source))?;

    println!("\n=== TABLE ===");
    println!("  rows:    {}", table.len());
    println!("  skipped: {}", table.skipped());

    println!("\nColumns:");
    for column in table.columns() {
        println!("  {}", column);
    }

    match table.date_span() {
        Some((first, last)) => println!("\nDates: {} .. {}", first, last),
        None => println!("\nDates: (no rows)"),
    }

    if args.kind == TableKind::Regional {
        let names = counties(&table);
        println!("\nCounties: {}", names.len());
        for name in names.iter().take(10) {
            println!("  {}", name);
        }
        if names.len() > 10 {
            println!("  ... and {} more", names.len() - 10);
        }
    }

    if let Some(row) = table.rows().last() {
        println!("\nLast row:");
        for (column, value) in row.fields() {
            println!("  {}: {:?}", column, value);
        }
    }

    Ok(())
}
