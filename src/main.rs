use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{info, warn};

use sales_dashboard::config::load_config;
use sales_dashboard::data::export::{export_filtered, export_table, write_views_json};
use sales_dashboard::data::loader::load_file;
use sales_dashboard::data::options::FilterOptions;
use sales_dashboard::report::write_report;
use sales_dashboard::{FilterCriteria, Geography, Session};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Filter sales records by date and geography and print the dashboard views.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to `config.toml` next to the executable).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dataset to load; overrides `[dataset] default_path`.
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// First order date to include (YYYY-MM-DD). Defaults to the earliest.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD). Defaults to the latest.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Region to include (repeatable; none means all).
    #[arg(long = "region")]
    regions: Vec<String>,

    /// State to include (repeatable; none means all).
    #[arg(long = "state")]
    states: Vec<String>,

    /// City to include (repeatable; none means all).
    #[arg(long = "city")]
    cities: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the filtered records as CSV.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write the full, unfiltered dataset as CSV.
    #[arg(long, value_name = "PATH")]
    export_original: Option<PathBuf>,

    /// Print the region / state / city options and exit.
    #[arg(long)]
    list_options: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let Some(path) = args.data.clone().or_else(|| config.dataset_path()) else {
        bail!("no dataset given: pass --data or set [dataset] default_path in config.toml");
    };

    let options = config.load_options()?;
    let report = load_file(&path, &options)
        .with_context(|| format!("loading {}", path.display()))?;
    for skipped in &report.skipped {
        warn!("dropped row: {skipped}");
    }
    let table = report.table;
    info!("{} records loaded from {}", table.len(), path.display());

    if args.list_options {
        let filter_options = FilterOptions::from_catalog(config.filters.catalog, &table);
        for geo in Geography::ALL {
            println!("{geo}: {}", filter_options.values(geo).join(", "));
        }
        return Ok(());
    }

    let (first, last) = table.date_span().unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
    let criteria = FilterCriteria::new(args.start.unwrap_or(first), args.end.unwrap_or(last))
        .with(Geography::Region, args.regions)
        .with(Geography::State, args.states)
        .with(Geography::City, args.cities);
    let session = Session::with_criteria(table, criteria);
    let filtered = session.filtered();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => {
            let mut text = String::new();
            write_report(
                &mut text,
                session.views(),
                filtered.len(),
                session.table().len(),
                session.warning(),
            )?;
            out.write_all(text.as_bytes())?;
        }
        OutputFormat::Json => {
            write_views_json(&mut out, session.views())?;
            writeln!(out)?;
        }
    }

    if let Some(path) = &args.export {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let rows = export_filtered(BufWriter::new(file), &filtered)?;
        info!("wrote {rows} filtered records to {}", path.display());
    }
    if let Some(path) = &args.export_original {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let rows = export_table(BufWriter::new(file), session.table())?;
        info!("wrote {rows} records to {}", path.display());
    }

    Ok(())
}
