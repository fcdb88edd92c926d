//! gpx2trail - annotate a GPX track with trail statistics and write it as CSV.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use gpx2trail::ExportOptions;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gpx2trail")]
#[command(about = "Convert a GPX track into a per-point trail statistics CSV", long_about = None)]
struct Cli {
    /// GPX file to read
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "trail_output.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Omit the column header line
    #[arg(long, action = ArgAction::SetTrue)]
    no_header: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let opts = ExportOptions {
        delimiter: cli.delimiter,
        include_header: !cli.no_header,
    };

    let table = gpx2trail::convert_file(&cli.input, &cli.output, &opts).with_context(|| {
        format!(
            "failed to convert {} into {}",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    let summary = table.summary;
    println!("Number of raw points: {}", table.rows.len());
    println!("Total distance (m): {:.2}", summary.total_distance_m);
    println!("Total elevation gain (m): {:.2}", summary.total_gain_m);
    println!("Average grade (%): {:.2}", summary.average_grade_percent());
    println!("Wrote {}", cli.output.display());
    Ok(())
}
