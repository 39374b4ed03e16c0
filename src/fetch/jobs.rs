// src/fetch/jobs.rs
// Job-market proxy: the count of tagged offices inside a district's OSM
// area. Districts Nominatim cannot place, and failed queries, flatten to
// zero; downstream the zero is read as "no signal" rather than "no jobs".

use tracing::debug;

use crate::config::{CityProfile, FetchPolicy};
use crate::error::Result;
use crate::fetch::{GeoCounter, SignalFetcher};
use crate::signal::SignalKind;

pub struct JobsFetcher<'a> {
    geo: GeoCounter,
    filter: &'a str,
}

impl<'a> JobsFetcher<'a> {
    pub fn new(profile: &'a CityProfile, policy: &FetchPolicy) -> Result<Self> {
        Ok(Self {
            geo: GeoCounter::new(profile, policy)?,
            filter: &profile.jobs_filter,
        })
    }
}

impl SignalFetcher for JobsFetcher<'_> {
    fn kind(&self) -> SignalKind {
        SignalKind::Jobs
    }

    fn fetch(&mut self, district: &str) -> Result<Option<f64>> {
        let Some(area) = self.geo.area_id(district)? else {
            debug!(district, "no OSM relation, counting zero offices");
            return Ok(None);
        };
        let count = self.geo.count_in_area(area, self.filter)?;
        debug!(district, count, "offices counted");
        Ok(Some(count))
    }

    fn fallback(&mut self, _district: &str) -> f64 {
        0.0
    }
}
