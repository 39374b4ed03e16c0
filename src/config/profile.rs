// src/config/profile.rs
//
// Everything the pipeline knows about a particular city is data, not code:
// district set, alias spellings, listings-site ids, fallback prices, rate
// and band. The built-in default is Tashkent; `--profile city.toml` swaps
// in another variant without touching the fetchers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use super::consts;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CityProfile {
    #[serde(default = "default_city")]
    pub city: String,

    /// Canonical Latin district names, in presentation order. This order
    /// seeds the merged table and therefore the ranking tiebreak.
    #[serde(default = "default_districts")]
    pub districts: Vec<String>,

    /// Secondary-script spellings → canonical names. Applied before any
    /// merge. May map names the district list does not enumerate; such
    /// rows pass through as their own district rather than being dropped.
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, String>,

    /// Static per-district rent fallbacks (USD/month) for districts where
    /// scraping yields zero plausible listings.
    #[serde(default = "default_fallback_rents")]
    pub fallback_rents: HashMap<String, f64>,

    /// Fallback for districts missing from `fallback_rents`.
    #[serde(default = "default_fallback_rent")]
    pub default_fallback_rent: f64,

    /// Listings search URL with a `{district_id}` placeholder.
    #[serde(default = "default_listings_url")]
    pub listings_url_template: String,

    /// The listings site's numeric district ids.
    #[serde(default = "default_listings_ids")]
    pub listings_site_ids: HashMap<String, u32>,

    /// Geocoding query with a `{district}` placeholder.
    #[serde(default = "default_geocode_query")]
    pub geocode_query_template: String,

    /// Overpass tag filter for the jobs proxy (office density).
    #[serde(default = "default_jobs_filter")]
    pub jobs_filter: String,

    /// Overpass tag filter for cultural points of interest.
    #[serde(default = "default_poi_filter")]
    pub poi_filter: String,

    /// Fixed exchange rate used when listings quote the local currency.
    #[serde(default = "default_uzs_per_usd")]
    pub uzs_per_usd: f64,

    /// Plausibility band for extracted monthly rents, USD.
    #[serde(default = "default_band_min")]
    pub price_band_min: f64,
    #[serde(default = "default_band_max")]
    pub price_band_max: f64,

    /// Pre-supplied transit-count table. When the file exists, transport
    /// scores come from it; otherwise they are synthesized.
    #[serde(default = "default_transit_counts")]
    pub transit_counts: PathBuf,
}

impl Default for CityProfile {
    fn default() -> Self {
        Self {
            city: default_city(),
            districts: default_districts(),
            aliases: default_aliases(),
            fallback_rents: default_fallback_rents(),
            default_fallback_rent: default_fallback_rent(),
            listings_url_template: default_listings_url(),
            listings_site_ids: default_listings_ids(),
            geocode_query_template: default_geocode_query(),
            jobs_filter: default_jobs_filter(),
            poi_filter: default_poi_filter(),
            uzs_per_usd: default_uzs_per_usd(),
            price_band_min: default_band_min(),
            price_band_max: default_band_max(),
            transit_counts: default_transit_counts(),
        }
    }
}

impl CityProfile {
    /// Load a profile from TOML. Absent fields keep the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let profile: CityProfile = toml::from_str(&text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.districts.is_empty() {
            return Err(Error::Profile("district list is empty".into()));
        }
        if !(self.price_band_min < self.price_band_max) {
            return Err(Error::Profile(format!(
                "price band [{}, {}] is empty",
                self.price_band_min, self.price_band_max
            )));
        }
        if self.uzs_per_usd <= 0.0 {
            return Err(Error::Profile("exchange rate must be positive".into()));
        }
        Ok(())
    }

    /// Rewrite a raw identifier to its canonical Latin form.
    /// Unmapped names pass through trimmed but otherwise unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self.aliases.get(trimmed) {
            Some(canon) => canon.clone(),
            None => trimmed.to_string(),
        }
    }

    pub fn fallback_rent(&self, district: &str) -> f64 {
        self.fallback_rents
            .get(district)
            .copied()
            .unwrap_or(self.default_fallback_rent)
    }

    /// Listings URL for a district, if the site knows it.
    pub fn listings_url(&self, district: &str) -> Option<String> {
        let id = self.listings_site_ids.get(district)?;
        Some(
            self.listings_url_template
                .replace("{district_id}", &id.to_string()),
        )
    }
}

/* ---------------- built-in Tashkent defaults ---------------- */

fn default_city() -> String {
    "Tashkent".to_string()
}

fn default_districts() -> Vec<String> {
    [
        "Yunusabad",
        "Chilanzar",
        "Yakkasaray",
        "Mirabad",
        "Mirzo Ulugbek",
        "Shaykhantakhur",
        "Almazar",
        "Uchtepa",
        "Sergeli",
        "Yashnobod",
        "Bektemir",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_aliases() -> HashMap<String, String> {
    // Cyrillic spellings as they appear in municipal transit exports.
    // Yangihayot is mapped although the default district list stops at
    // eleven; a table that mentions it keeps its own row.
    [
        ("Бектемир", "Bektemir"),
        ("Чилонзор", "Chilanzar"),
        ("Яшнобод", "Yashnobod"),
        ("Яккасарой", "Yakkasaray"),
        ("Мирзо Улуғбек", "Mirzo Ulugbek"),
        ("Миробод", "Mirabad"),
        ("Шайҳонтохур", "Shaykhantakhur"),
        ("Олмазор", "Almazar"),
        ("Учтепа", "Uchtepa"),
        ("Сергели", "Sergeli"),
        ("Юнусобод", "Yunusabad"),
        ("Янгиҳаёт", "Yangihayot"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect()
}

fn default_fallback_rents() -> HashMap<String, f64> {
    [
        ("Yakkasaray", 600.0),
        ("Mirabad", 700.0),
        ("Mirzo Ulugbek", 550.0),
        ("Shaykhantakhur", 500.0),
        ("Yunusabad", 650.0),
        ("Chilanzar", 450.0),
        ("Almazar", 400.0),
        ("Bektemir", 380.0),
        ("Sergeli", 350.0),
        ("Uchtepa", 420.0),
        ("Yashnobod", 480.0),
    ]
    .into_iter()
    .map(|(d, p)| (d.to_string(), p))
    .collect()
}

fn default_fallback_rent() -> f64 {
    400.0
}

fn default_listings_url() -> String {
    "https://www.olx.uz/oz/nedvizhimost/kvartiry/arenda-dolgosrochnaya/tashkent/\
     ?search%5Bdistrict_id%5D={district_id}&currency=UZS"
        .to_string()
}

fn default_listings_ids() -> HashMap<String, u32> {
    [
        ("Almazar", 20),
        ("Bektemir", 18),
        ("Mirabad", 13),
        ("Mirzo Ulugbek", 12),
        ("Sergeli", 19),
        ("Uchtepa", 21),
        ("Chilanzar", 23),
        ("Shaykhantakhur", 24),
        ("Yunusabad", 25),
        ("Yakkasaray", 26),
        ("Yashnobod", 22),
    ]
    .into_iter()
    .map(|(d, id)| (d.to_string(), id))
    .collect()
}

fn default_geocode_query() -> String {
    "{district} District, Tashkent".to_string()
}

fn default_jobs_filter() -> String {
    r#"["office"]"#.to_string()
}

fn default_poi_filter() -> String {
    r#"["amenity"~"cafe|theatre|arts_centre|cinema|library"]"#.to_string()
}

fn default_uzs_per_usd() -> f64 {
    consts::UZS_PER_USD
}

fn default_band_min() -> f64 {
    consts::PRICE_BAND_MIN
}

fn default_band_max() -> f64 {
    consts::PRICE_BAND_MAX
}

fn default_transit_counts() -> PathBuf {
    PathBuf::from("data/processed/metro_counts.csv")
}
