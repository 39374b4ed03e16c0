// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{consts, CityProfile, FetchPolicy, RunOptions};
use crate::error::Result;
use crate::progress::Progress;
use crate::table::RankedTable;
use crate::{doctor, fetch, score, scrub};

#[derive(Parser)]
#[command(version, about = "Rank city districts by transport, rent, jobs and culture")]
pub struct Cli {
    /// Directory holding the raw signal tables.
    #[arg(long, global = true, default_value = consts::DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Directory the cleaned and ranked tables are written to.
    #[arg(long, global = true, default_value = consts::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// City profile TOML. Without it the built-in Tashkent profile applies.
    #[arg(long, global = true, env = "TASH_RANK_PROFILE")]
    profile: Option<PathBuf>,

    /// Never touch the network; cached tables are all there is.
    #[arg(long, global = true)]
    offline: bool,

    /// Ignore cached raw tables and re-acquire them.
    #[arg(long, global = true)]
    refresh: bool,

    /// Per-request timeout, milliseconds.
    #[arg(long, global = true, default_value_t = consts::REQUEST_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Transient-failure retries per request.
    #[arg(long, global = true, default_value_t = consts::RETRIES)]
    retry: u32,

    /// Override both inter-request pauses, milliseconds.
    #[arg(long, global = true)]
    pause_ms: Option<u64>,

    /// Fix the RNG seed for synthesized transport scores.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Full pipeline: obtain, scrub, rank, report the top districts.
    Run,
    /// Acquire the four raw signal tables into the cache and stop.
    Obtain,
    /// Reconcile cached raw tables into the cleaned table and stop.
    Scrub,
    /// Score and rank from cached raw tables.
    Rank,
    /// Check local artifacts, the listings site and the geocoder.
    Doctor,
    /// List the profile's districts with their listings site ids.
    Districts,
}

impl Cli {
    fn to_options(&self) -> RunOptions {
        let mut policy = FetchPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retry,
            ..FetchPolicy::default()
        };
        if let Some(ms) = self.pause_ms {
            policy.listings_pause = Duration::from_millis(ms);
            policy.geo_pause = Duration::from_millis(ms);
        }
        RunOptions {
            cache_dir: self.cache_dir.clone(),
            out_dir: self.out_dir.clone(),
            offline: self.offline,
            refresh: self.refresh,
            seed: self.seed,
            policy,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let profile = match &cli.profile {
        Some(path) => CityProfile::load(path)?,
        None => CityProfile::default(),
    };
    let options = cli.to_options();
    let mut progress = ConsoleProgress;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let ranked = crate::run_pipeline(&profile, &options, Some(&mut progress))?;
            println!("Wrote {}", options.cleaned_path().display());
            println!("Wrote {}", options.rankings_path().display());
            print_top(&ranked);
        }
        Command::Obtain => {
            fetch::obtain_all(&profile, &options, Some(&mut progress))?;
            println!("Raw tables are under {}", options.cache_dir.display());
        }
        Command::Scrub => {
            let cache_only = options.cache_only();
            let tables = fetch::obtain_all(&profile, &cache_only, None)?;
            let imputed = scrub::reconcile(&tables, &profile, &cache_only.cache_dir)?;
            let clean = score::normalize(&imputed);
            crate::write_cleaned(&clean, &options)?;
            println!("Wrote {}", options.cleaned_path().display());
        }
        Command::Rank => {
            let ranked = crate::run_pipeline(&profile, &options.cache_only(), None)?;
            println!("Wrote {}", options.rankings_path().display());
            print_top(&ranked);
        }
        Command::Doctor => doctor::report(&profile, &options)?,
        Command::Districts => {
            for district in &profile.districts {
                match profile.listings_site_ids.get(district) {
                    Some(id) => println!("{id},{district}"),
                    None => println!("-,{district}"),
                }
            }
        }
    }
    Ok(())
}

fn print_top(ranked: &RankedTable) {
    println!("Top 3 recommended districts:");
    for (i, (district, composite, rent)) in ranked.top(3).iter().enumerate() {
        println!("  {}. {district:15} score {composite:.2}  rent ${rent:.0}", i + 1);
    }
}

/// Progress lines on stderr, keeping stdout for the report itself.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn begin(&mut self, signal: &str, total: usize) {
        eprintln!("{signal}: {total} districts");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn district_done(&mut self, district: &str) {
        eprintln!("  {district}: ok");
    }

    fn district_failed(&mut self, district: &str, why: &str) {
        eprintln!("  {district}: {why}");
    }
}
