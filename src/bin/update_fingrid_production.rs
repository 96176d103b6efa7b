use std::{error::Error, path::PathBuf};

use clap::Parser;
use log::{info, warn};
use sahko::{
    config::Config,
    db::{
        fingrid::{datasets::Dataset, lib_fingrid::FingridClient},
        postgrest::PostgrestClient,
    },
    merge::{merge, MergeValue, PRODUCTION_BY_SOURCE},
    pacing::FixedDelay,
    pipeline::{fetch_all, FetchedSeries},
};
use tabled::{builder::Builder, settings::Style};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Write the merged result as json to this file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Don't query the notes table
    #[arg(long, default_value_t = false)]
    skip_notes: bool,
}

/// Make an ASCII table with the number of points of each dataset
fn ascii_table(fetched: &FetchedSeries) -> tabled::Table {
    let mut builder = Builder::new();
    builder.push_record(vec!["Dataset", "Id", "Points", "Min", "Max"]);
    for dataset in Dataset::ALL {
        let series = fetched.get(dataset);
        let fmt = |x: Option<&i64>| x.map(|v| v.to_string()).unwrap_or_default();
        builder.push_record(vec![
            dataset.to_string(),
            dataset.id().to_string(),
            series.len().to_string(),
            fmt(series.iter().min()),
            fmt(series.iter().max()),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::empty());
    table
}

/// Fetch the Fingrid production and consumption series, merge them and
/// query the notes table of the hosted database.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::load(&args.env)?;
    let client = FingridClient::from_config(&config)?;
    let pacer = FixedDelay::new(config.pacing_delay);

    let fetched = fetch_all(&client, &pacer).await?;
    println!("{}", ascii_table(&fetched));

    let merged = merge(&fetched);
    if let Some(MergeValue::NestedMap(data)) = merged.get(PRODUCTION_BY_SOURCE) {
        println!("Tuotanto data: {:?}", data);
    }
    if let Some(path) = &args.out {
        merged.write_json(path)?;
        info!("wrote merged result to {}", path.display());
    }

    if args.skip_notes {
        info!("skipping the notes query");
        return Ok(());
    }
    match &config.postgrest {
        Some(pg) => {
            let db = PostgrestClient::new(pg)?;
            let response = db.table(&pg.notes_table).select("*").await?;
            println!("Data: {}", response.data);
        }
        None => warn!("SUPABASE_URL and SUPABASE_KEY are not set, skipping the notes query"),
    }

    Ok(())
}
