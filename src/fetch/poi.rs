// src/fetch/poi.rs
// Cultural amenity count inside a district's OSM area, same mechanics as
// the jobs proxy with a different tag filter. Unplaceable districts and
// failed queries flatten to zero.

use tracing::debug;

use crate::config::{CityProfile, FetchPolicy};
use crate::error::Result;
use crate::fetch::{GeoCounter, SignalFetcher};
use crate::signal::SignalKind;

pub struct PoiFetcher<'a> {
    geo: GeoCounter,
    filter: &'a str,
}

impl<'a> PoiFetcher<'a> {
    pub fn new(profile: &'a CityProfile, policy: &FetchPolicy) -> Result<Self> {
        Ok(Self {
            geo: GeoCounter::new(profile, policy)?,
            filter: &profile.poi_filter,
        })
    }
}

impl SignalFetcher for PoiFetcher<'_> {
    fn kind(&self) -> SignalKind {
        SignalKind::Poi
    }

    fn fetch(&mut self, district: &str) -> Result<Option<f64>> {
        let Some(area) = self.geo.area_id(district)? else {
            debug!(district, "no OSM relation, counting zero amenities");
            return Ok(None);
        };
        let count = self.geo.count_in_area(area, self.filter)?;
        debug!(district, count, "amenities counted");
        Ok(Some(count))
    }

    fn fallback(&mut self, _district: &str) -> f64 {
        0.0
    }
}
