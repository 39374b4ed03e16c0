// src/doctor.rs
// Coverage diagnostic. Answers "why did my run use fallbacks?" without
// running the pipeline: which local artifacts exist, whether the listings
// site is showing districts at all, and whether the geocoder can place a
// sample of them.

use std::sync::LazyLock;
use std::thread;

use scraper::{Html, Selector};
use tracing::debug;

use crate::config::{CityProfile, RunOptions};
use crate::core::net::Http;
use crate::error::Result;
use crate::fetch::GeoCounter;
use crate::signal::SignalKind;
use crate::store::Store;

/// Districts sampled for the geocoder check, to keep the report quick.
const OSM_SAMPLE: usize = 3;

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[data-cy="l-card"]"#).expect("static selector"));

static LOOSE_CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class*="card" i]"#).expect("static selector"));

pub fn report(profile: &CityProfile, options: &RunOptions) -> Result<()> {
    println!("--- diagnostic report ---");

    println!("\n[local artifacts]");
    let store = Store::new(&options.cache_dir);
    for kind in SignalKind::ALL {
        let path = store.path(kind);
        let status = match store.load(kind)? {
            Some(table) => format!("present, {} rows", table.len()),
            None if path.exists() => "DAMAGED (will be re-acquired)".to_string(),
            None => "MISSING".to_string(),
        };
        println!("  {:32} {status}", path.display().to_string());
    }
    let transit = &profile.transit_counts;
    let status = if transit.exists() {
        "present"
    } else {
        "MISSING (transport will be synthesized)"
    };
    println!("  {:32} {status}", transit.display().to_string());

    if options.offline {
        println!("\noffline: skipping live checks");
        return Ok(());
    }

    println!("\n[listings site, live sample]");
    let http = Http::new(&options.policy)?;
    match listings_coverage(&http, profile) {
        Ok(counts) => {
            for (district, n) in counts {
                if n > 0 {
                    println!("  {district:15} {n} listings seen");
                } else {
                    println!("  {district:15} MISSING (fallback rent would apply)");
                }
            }
        }
        Err(e) => println!("  listings site unreachable: {e}"),
    }

    println!("\n[geocoder, first {OSM_SAMPLE} districts]");
    let geo = GeoCounter::new(profile, &options.policy)?;
    for district in profile.districts.iter().take(OSM_SAMPLE) {
        match geo.area_id(district) {
            Ok(Some(id)) => println!("  {district:15} area {id}"),
            Ok(None) => println!("  {district:15} MISSING (no relation)"),
            Err(e) => println!("  {district:15} error: {e}"),
        }
        thread::sleep(options.policy.geo_pause);
    }

    Ok(())
}

/// How many cards on the city-wide listings page mention each district.
fn listings_coverage(http: &Http, profile: &CityProfile) -> Result<Vec<(String, usize)>> {
    let url = city_listings_url(profile);
    let body = http.get_text(&url)?;
    Ok(count_mentions(&body, &profile.districts))
}

/// The listings template minus its district query: the city-wide page.
fn city_listings_url(profile: &CityProfile) -> String {
    match profile.listings_url_template.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => profile.listings_url_template.clone(),
    }
}

fn count_mentions(html: &str, districts: &[String]) -> Vec<(String, usize)> {
    let doc = Html::parse_document(html);
    let mut cards: Vec<String> = doc
        .select(&CARD_SEL)
        .map(|el| el.text().collect::<String>().to_lowercase())
        .collect();
    if cards.is_empty() {
        cards = doc
            .select(&LOOSE_CARD_SEL)
            .map(|el| el.text().collect::<String>().to_lowercase())
            .collect();
    }
    debug!(cards = cards.len(), "listings page sampled");

    districts
        .iter()
        .map(|district| {
            let n = cards.iter().filter(|text| mentions_district(text, district)).count();
            (district.clone(), n)
        })
        .collect()
}

/// District names on the site drift between -abad and -obod spellings.
fn mentions_district(text: &str, district: &str) -> bool {
    let variants = [
        district.to_lowercase(),
        district.replace("abad", "obod").to_lowercase(),
        district.replace("bad", "bod").to_lowercase(),
    ];
    variants.iter().any(|v| text.contains(v.as_str()))
}
