//! Dataset preparation: convert a genre-label CSV into a JSONL manifest the
//! training pipeline consumes.

mod manifest;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "timbre-manifest",
    about = "Convert a filename,label CSV into a JSONL training manifest"
)]
struct Args {
    /// CSV with at least `filename` and `label` columns.
    #[arg(long)]
    csv: PathBuf,
    /// Directory the CSV's filenames are resolved against.
    #[arg(long)]
    audio_dir: PathBuf,
    /// Output JSONL manifest path.
    #[arg(long)]
    out: PathBuf,
    /// Comma-separated genre names defining the class-id order.
    #[arg(long, default_value = "classical,pop,rap,lofi,metal")]
    labels: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let names: Vec<String> = args
        .labels
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let stats = manifest::convert(&args.csv, &args.audio_dir, &args.out, &names)?;

    println!("Wrote: {}", args.out.display());
    println!("Kept: {}", stats.kept);
    println!("Skipped (unknown label): {}", stats.skipped_unknown_label);
    println!("Skipped (missing audio file): {}", stats.skipped_missing_audio);
    Ok(())
}
