// src/lib.rs

pub mod cli;
pub mod config;
pub mod core;

pub mod doctor;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod score;
pub mod scrub;
pub mod signal;
pub mod store;
pub mod table;

use std::fs;
use std::fs::File;
use std::io::BufWriter;

pub use error::{Error, Result};

use config::{CityProfile, RunOptions};
use progress::Progress;
use table::{CleanTable, RankedTable};

/// The whole pipeline: obtain (or reuse) the raw tables, reconcile them,
/// score, and write both output artifacts. Returns the ranked table so the
/// caller can report from it.
pub fn run_pipeline(
    profile: &CityProfile,
    options: &RunOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<RankedTable> {
    let tables = fetch::obtain_all(profile, options, progress)?;
    let imputed = scrub::reconcile(&tables, profile, &options.cache_dir)?;
    let clean = score::normalize(&imputed);
    let ranked = score::rank(&clean);

    write_cleaned(&clean, options)?;
    ranked.write_csv(BufWriter::new(File::create(options.rankings_path())?))?;
    Ok(ranked)
}

/// Write the cleaned table on its own; the scrub stage stops here.
pub fn write_cleaned(clean: &CleanTable, options: &RunOptions) -> Result<()> {
    fs::create_dir_all(&options.out_dir)?;
    clean.write_csv(BufWriter::new(File::create(options.cleaned_path())?))?;
    Ok(())
}
