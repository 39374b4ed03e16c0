// src/main.rs
// District livability pipeline over four noisy signals.
// Usage:
//   cargo run --release -- run
//   cargo run --release -- obtain --refresh
//   cargo run --release -- rank --offline --seed 7
//   cargo run --release -- doctor

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tash_rank::cli::run()?;
    Ok(())
}
