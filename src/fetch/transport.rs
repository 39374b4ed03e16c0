// src/fetch/transport.rs
// Transport scores come from a pre-supplied transit-count table when one
// exists. The table is read leniently: any two-plus-column CSV counts, the
// header names are ignored, rows without a finite count are skipped. Without
// a usable table the fetcher synthesizes scores from a seedable RNG instead.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::config::consts::{MOCK_TRANSPORT_MAX, MOCK_TRANSPORT_MIN};
use crate::config::CityProfile;
use crate::error::Result;
use crate::fetch::SignalFetcher;
use crate::signal::SignalKind;
use crate::table::SignalTable;

pub struct TransportFetcher {
    /// Rows read from the transit table, surrendered once via `preloaded`.
    rows: Option<Vec<(String, f64)>>,
    rng: StdRng,
}

impl TransportFetcher {
    pub fn new(profile: &CityProfile, seed: Option<u64>) -> Self {
        let rows = read_transit_table(&profile.transit_counts);
        if rows.is_none() {
            warn!(
                path = %profile.transit_counts.display(),
                "no usable transit table, synthesizing transport scores"
            );
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rows, rng }
    }

    fn synth(&mut self) -> f64 {
        f64::from(self.rng.gen_range(MOCK_TRANSPORT_MIN..=MOCK_TRANSPORT_MAX))
    }
}

impl SignalFetcher for TransportFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::Transport
    }

    /// The transit table is taken verbatim, including districts the profile
    /// does not know about; the join stage sorts those out.
    fn preloaded(&mut self) -> Option<SignalTable> {
        self.rows.take().map(|rows| SignalTable { kind: SignalKind::Transport, rows })
    }

    fn fetch(&mut self, _district: &str) -> Result<Option<f64>> {
        Ok(Some(self.synth()))
    }

    fn fallback(&mut self, _district: &str) -> f64 {
        self.synth()
    }
}

fn read_transit_table(path: &Path) -> Option<Vec<(String, f64)>> {
    if !path.exists() {
        return None;
    }
    let mut rdr = match csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
    {
        Ok(rdr) => rdr,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "transit table unreadable");
            return None;
        }
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping bad transit row");
                continue;
            }
        };
        if record.len() < 2 {
            warn!(path = %path.display(), "skipping short transit row");
            continue;
        }
        let Ok(value) = record[1].parse::<f64>() else {
            warn!(path = %path.display(), value = &record[1], "skipping non-numeric transit row");
            continue;
        };
        if !value.is_finite() {
            warn!(path = %path.display(), value = &record[1], "skipping non-finite transit row");
            continue;
        }
        rows.push((record[0].to_string(), value));
    }

    if rows.is_empty() {
        warn!(path = %path.display(), "transit table has no usable rows");
        return None;
    }
    Some(rows)
}
