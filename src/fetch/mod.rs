// src/fetch/mod.rs
//! # Signal fetchers
//!
//! One fetcher per raw signal, each encoding *where that signal lives* and
//! *how to read it*: a local transit table (or an RNG), a listings site, and
//! two Overpass counts. Everything else is shared plumbing that lives here:
//!
//! - [`SignalFetcher`] is the per-district seam. A fetcher answers with
//!   `Ok(Some(v))` for a live value, `Ok(None)` when the source has nothing
//!   for that district, and `Err` when the source misbehaved. It never
//!   decides what a gap turns into; that is `fallback`'s job, and the loop
//!   in [`acquire`] is the only caller of either.
//! - [`fetch_cached`] is the cache discipline: a readable cached table
//!   short-circuits the network entirely (the fetcher is never even built),
//!   and a fresh table is written back before it is returned.
//! - [`obtain_all`] runs the four signals in their fixed order and gives
//!   back whatever tables exist afterwards.
//!
//! Fetchers do not touch the cache, do not sleep, and do not talk to the
//! progress sink. Reductions that belong to one signal (median of listing
//! prices, say) stay in that signal's module.

mod geo;
mod jobs;
mod poi;
mod rent;
mod transport;

pub use geo::GeoCounter;
pub use jobs::JobsFetcher;
pub use poi::PoiFetcher;
pub use rent::RentFetcher;
pub use transport::TransportFetcher;

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{CityProfile, RunOptions};
use crate::error::Result;
use crate::progress::Progress;
use crate::signal::SignalKind;
use crate::store::Store;
use crate::table::SignalTable;

/// A source of one raw signal, asked one district at a time.
pub trait SignalFetcher {
    fn kind(&self) -> SignalKind;

    /// A table obtained wholesale, bypassing the per-district loop.
    /// Fetchers backed by a local file override this.
    fn preloaded(&mut self) -> Option<SignalTable> {
        None
    }

    /// Raw value for one district. `Ok(None)` means the source answered but
    /// had nothing usable; `Err` means the source misbehaved. Neither is
    /// fatal to the run.
    fn fetch(&mut self, district: &str) -> Result<Option<f64>>;

    /// Stand-in value when `fetch` produced no live value.
    fn fallback(&mut self, district: &str) -> f64;
}

/// Run one fetcher over every district, funneling gaps and errors into the
/// fetcher's fallback. Always produces a full table.
pub fn acquire(
    fetcher: &mut dyn SignalFetcher,
    districts: &[String],
    pause: Duration,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> SignalTable {
    let kind = fetcher.kind();

    if let Some(table) = fetcher.preloaded() {
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("{}: using local table, {} rows", kind.label(), table.len()));
        }
        return table;
    }

    info!(signal = kind.label(), districts = districts.len(), "acquiring");
    if let Some(p) = progress.as_deref_mut() {
        p.begin(kind.label(), districts.len());
    }

    let mut table = SignalTable::new(kind);
    for (i, district) in districts.iter().enumerate() {
        let value = match fetcher.fetch(district) {
            Ok(Some(v)) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.district_done(district);
                }
                v
            }
            Ok(None) => {
                let v = fetcher.fallback(district);
                warn!(signal = kind.label(), district, fallback = v, "no live signal");
                if let Some(p) = progress.as_deref_mut() {
                    p.district_failed(district, "no live signal, using fallback");
                }
                v
            }
            Err(e) => {
                let v = fetcher.fallback(district);
                warn!(signal = kind.label(), district, error = %e, fallback = v, "fetch failed");
                if let Some(p) = progress.as_deref_mut() {
                    p.district_failed(district, &e.to_string());
                }
                v
            }
        };
        table.push(district.clone(), value);

        if i + 1 < districts.len() {
            thread::sleep(pause); // be polite
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    table
}

/// Cache-or-acquire for one signal. A readable cached table wins outright
/// unless `refresh` drops it; only a miss calls `make`, so a hit costs no
/// clients, file reads or RNG setup. A fresh table is saved before being
/// returned.
pub fn fetch_cached<'a, F>(
    store: &Store,
    kind: SignalKind,
    make: F,
    districts: &[String],
    pause: Duration,
    refresh: bool,
    progress: Option<&mut (dyn Progress + '_)>,
) -> Result<SignalTable>
where
    F: FnOnce() -> Result<Box<dyn SignalFetcher + 'a>>,
{
    if !refresh {
        if let Some(table) = store.load(kind)? {
            debug!(signal = kind.label(), rows = table.len(), "using cached table");
            return Ok(table);
        }
    }
    let mut fetcher = make()?;
    let table = acquire(fetcher.as_mut(), districts, pause, progress);
    store.save(&table)?;
    Ok(table)
}

/// Acquire all four signals in their fixed order. Signals that cannot be
/// produced (offline with a cold cache) are simply absent from the result;
/// the scrub stage decides whether what remains is enough.
pub fn obtain_all(
    profile: &CityProfile,
    options: &RunOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Vec<SignalTable>> {
    let store = Store::new(&options.cache_dir);
    let mut tables = Vec::new();

    for kind in SignalKind::ALL {
        if let Some(table) = obtain_one(kind, &store, profile, options, progress.as_deref_mut())? {
            tables.push(table);
        }
    }
    Ok(tables)
}

fn obtain_one(
    kind: SignalKind,
    store: &Store,
    profile: &CityProfile,
    options: &RunOptions,
    progress: Option<&mut (dyn Progress + '_)>,
) -> Result<Option<SignalTable>> {
    // Offline, the cache is all there is; --refresh is ignored rather than
    // letting it throw away the only copy of the data.
    if options.offline {
        let cached = store.load(kind)?;
        if cached.is_none() {
            warn!(signal = kind.label(), "offline with a cold cache, signal will be absent");
        }
        return Ok(cached);
    }

    let table = fetch_cached(
        store,
        kind,
        || build_fetcher(kind, profile, options),
        &profile.districts,
        options.policy.pause_for(kind),
        options.refresh,
        progress,
    )?;
    Ok(Some(table))
}

fn build_fetcher<'a>(
    kind: SignalKind,
    profile: &'a CityProfile,
    options: &RunOptions,
) -> Result<Box<dyn SignalFetcher + 'a>> {
    Ok(match kind {
        SignalKind::Transport => Box::new(TransportFetcher::new(profile, options.seed)),
        SignalKind::Rent => Box::new(RentFetcher::new(profile, &options.policy)?),
        SignalKind::Jobs => Box::new(JobsFetcher::new(profile, &options.policy)?),
        SignalKind::Poi => Box::new(PoiFetcher::new(profile, &options.policy)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Answers from a script, one entry per district in order.
    struct Scripted {
        kind: SignalKind,
        script: Vec<Result<Option<f64>>>,
        next: usize,
        fallback: f64,
    }

    impl Scripted {
        fn new(kind: SignalKind, script: Vec<Result<Option<f64>>>, fallback: f64) -> Self {
            Self { kind, script, next: 0, fallback }
        }
    }

    impl SignalFetcher for Scripted {
        fn kind(&self) -> SignalKind {
            self.kind
        }

        fn fetch(&mut self, _district: &str) -> Result<Option<f64>> {
            let i = self.next;
            self.next += 1;
            match &self.script[i] {
                Ok(v) => Ok(*v),
                Err(_) => Err(Error::HttpStatus { status: 503, url: "test".into() }),
            }
        }

        fn fallback(&mut self, _district: &str) -> f64 {
            self.fallback
        }
    }

    fn districts() -> Vec<String> {
        vec!["A".into(), "B".into(), "C".into()]
    }

    #[test]
    fn gaps_and_errors_funnel_into_fallback() {
        let script = vec![
            Ok(Some(650.0)),
            Ok(None),
            Err(Error::HttpStatus { status: 503, url: "test".into() }),
        ];
        let mut fetcher = Scripted::new(SignalKind::Rent, script, 400.0);
        let table = acquire(&mut fetcher, &districts(), Duration::ZERO, None);

        assert_eq!(
            table.rows,
            vec![
                ("A".to_string(), 650.0),
                ("B".to_string(), 400.0),
                ("C".to_string(), 400.0),
            ]
        );
    }

    #[test]
    fn fetch_cached_prefers_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let mut cached = SignalTable::new(SignalKind::Jobs);
        cached.push("A", 42.0);
        store.save(&cached).unwrap();

        // A hit must answer before the fetcher even exists.
        let table = fetch_cached(
            &store,
            SignalKind::Jobs,
            || panic!("cache hit built a fetcher"),
            &districts(),
            Duration::ZERO,
            false,
            None,
        )
        .unwrap();
        assert_eq!(table, cached);
    }

    #[test]
    fn fetch_cached_saves_what_it_acquired() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let script = vec![Ok(Some(3.0)), Ok(Some(5.0)), Ok(None)];
        let fetcher = Scripted::new(SignalKind::Poi, script, 0.0);
        let table = fetch_cached(
            &store,
            SignalKind::Poi,
            || Ok(Box::new(fetcher)),
            &districts(),
            Duration::ZERO,
            false,
            None,
        )
        .unwrap();

        let reloaded = store.load(SignalKind::Poi).unwrap().unwrap();
        assert_eq!(reloaded, table);
        assert_eq!(reloaded.rows[2], ("C".to_string(), 0.0));
    }

    #[test]
    fn refresh_overwrites_a_live_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let mut stale = SignalTable::new(SignalKind::Jobs);
        stale.push("A", 1.0);
        store.save(&stale).unwrap();

        let script = vec![Ok(Some(9.0)), Ok(Some(9.0)), Ok(Some(9.0))];
        let fetcher = Scripted::new(SignalKind::Jobs, script, 0.0);
        let table = fetch_cached(
            &store,
            SignalKind::Jobs,
            || Ok(Box::new(fetcher)),
            &districts(),
            Duration::ZERO,
            true,
            None,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(store.load(SignalKind::Jobs).unwrap().unwrap(), table);
    }

    /// Counts driver callbacks.
    #[derive(Default)]
    struct Tally {
        begins: usize,
        failures: usize,
    }

    impl Progress for Tally {
        fn begin(&mut self, _signal: &str, _total: usize) {
            self.begins += 1;
        }

        fn district_failed(&mut self, _district: &str, _why: &str) {
            self.failures += 1;
        }
    }

    #[test]
    fn obtain_all_reuses_a_warm_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        for kind in SignalKind::ALL {
            let mut table = SignalTable::new(kind);
            table.push("Chilanzar", 1.0);
            store.save(&table).unwrap();
        }

        let profile = CityProfile::default();
        let options = RunOptions {
            cache_dir: dir.path().to_path_buf(),
            ..RunOptions::default()
        };

        // One sink, reborrowed for every signal in the loop; warm tables
        // answer without starting a pass on it.
        let mut sink = Tally::default();
        let tables = obtain_all(&profile, &options, Some(&mut sink)).unwrap();

        assert_eq!(tables.len(), 4);
        assert!(tables.iter().all(|t| t.rows == [("Chilanzar".to_string(), 1.0)]));
        assert_eq!(sink.begins, 0);
        assert_eq!(sink.failures, 0);
    }
}
