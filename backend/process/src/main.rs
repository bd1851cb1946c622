use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use ledger::{JsonFileStore, Uploads};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate thumbnails for raffle images that lack one")]
struct Args {
    #[arg(long, default_value = "raffle_data.json")]
    raffles_file: PathBuf,

    #[arg(long, default_value = "buyers.json")]
    buyers_file: PathBuf,

    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if !args.raffles_file.exists() {
        bail!("{} not found", args.raffles_file.display());
    }

    let store = JsonFileStore::new(&args.raffles_file, &args.buyers_file);
    let uploads = Uploads::new(&args.upload_dir);

    let summary =
        process::generate_missing_thumbnails(&store, &uploads, &process::progress_bar()?)?;

    println!("\n{}", "=".repeat(50));
    println!("SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Total raffles: {}", summary.total);
    println!("Processed: {}", summary.processed);
    println!("Thumbnails created: {}", summary.created);
    println!("Skipped: {}", summary.skipped);
    println!("{}", "=".repeat(50));

    Ok(())
}
