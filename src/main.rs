use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use rust_s3_uploader::cli::{Args, Commands};
use rust_s3_uploader::uploader;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    match &args.command {
        Commands::Directory(opts) => {
            info!(
                "Uploading directory {} to s3://{}",
                opts.source.display(),
                opts.bucket
            );
            let options = opts.to_options()?;
            uploader::upload_directory(&opts.source, &opts.bucket, options)
        }
        Commands::File(opts) => {
            let options = opts.to_options()?;
            uploader::upload_file(&opts.source, &opts.bucket, options)
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}
