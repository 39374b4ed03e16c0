// src/fetch/rent.rs
// Live rents from the listings site, one page per district. Price nodes are
// found by the site's `ad-price` test id, falling back to anything whose
// class mentions "price". Validated candidates reduce to their upper
// median, truncated to whole dollars; districts with no usable listings
// fall back to the profile's hand-kept prices.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::{CityProfile, FetchPolicy};
use crate::core::net::Http;
use crate::core::text::collapse_ws;
use crate::error::Result;
use crate::extract::{price_from_text, PriceRules};
use crate::fetch::SignalFetcher;
use crate::signal::SignalKind;

static PRICE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[data-testid="ad-price"]"#).expect("static selector")
});

static LOOSE_PRICE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[class*="price" i], span[class*="price" i], div[class*="price" i]"#)
        .expect("static selector")
});

pub struct RentFetcher<'a> {
    http: Http,
    profile: &'a CityProfile,
    rules: PriceRules,
}

impl<'a> RentFetcher<'a> {
    pub fn new(profile: &'a CityProfile, policy: &FetchPolicy) -> Result<Self> {
        let rules = PriceRules::new(
            profile.uzs_per_usd,
            profile.price_band_min,
            profile.price_band_max,
        );
        Ok(Self { http: Http::new(policy)?, profile, rules })
    }
}

impl SignalFetcher for RentFetcher<'_> {
    fn kind(&self) -> SignalKind {
        SignalKind::Rent
    }

    fn fetch(&mut self, district: &str) -> Result<Option<f64>> {
        let Some(url) = self.profile.listings_url(district) else {
            debug!(district, "district has no listings page");
            return Ok(None);
        };
        let body = self.http.get_text(&url)?;
        let candidates = candidate_prices(&body, &self.rules);
        let rent = reduce_candidates(&candidates);
        if let Some(rent) = rent {
            debug!(district, validated = candidates.len(), rent, "reduced listings page");
        }
        Ok(rent)
    }

    fn fallback(&mut self, district: &str) -> f64 {
        self.profile.fallback_rent(district)
    }
}

/// Every price on the page that survives extraction and the band.
fn candidate_prices(html: &str, rules: &PriceRules) -> Vec<f64> {
    let doc = Html::parse_document(html);
    let mut texts: Vec<String> = doc.select(&PRICE_SEL).map(element_text).collect();
    if texts.is_empty() {
        texts = doc.select(&LOOSE_PRICE_SEL).map(element_text).collect();
    }
    texts.iter().filter_map(|t| price_from_text(t, rules)).collect()
}

fn element_text(el: ElementRef) -> String {
    collapse_ws(&el.text().collect::<String>())
}

/// Upper median of the candidates, truncated to whole dollars. The trimmed
/// mean is computed for the log line only; the median is what survives.
fn reduce_candidates(candidates: &[f64]) -> Option<f64> {
    if candidates.is_empty() {
        return None;
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    debug!(mean = trimmed_mean(&sorted).trunc(), "trimmed mean of candidates");
    Some(sorted[sorted.len() / 2].trunc())
}

/// Mean with `max(1, n/7)` shaved off each end once there are at least five
/// candidates, as an outlier check on the median.
fn trimmed_mean(sorted: &[f64]) -> f64 {
    let slice = if sorted.len() >= 5 {
        let trim = (sorted.len() / 7).max(1);
        &sorted[trim..sorted.len() - trim]
    } else {
        sorted
    };
    slice.iter().sum::<f64>() / slice.len() as f64
}
