// src/extract.rs
// Price extraction from free-form listing text. Listings quote monthly
// rent in USD under several spellings ("USD", "$", "y.e.", "у.е.") or in
// som ("so'm", "sum", "UZS", "сум"), with space/NBSP digit grouping, and
// occasionally tag a som amount as dollars. The extractor resolves all of
// that to a single implied-USD value, or to nothing at all.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::text::sweep_digit_groups;

static USD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d\s\x{A0}]+)\s*(?:usd|\$|y\.e\.?|у\.е\.?)").expect("static pattern")
});

static UZS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d\s\x{A0}]+)\s*(?:so'm|sum|uzs|сум)").expect("static pattern")
});

/// Knobs for [`price_from_text`]. Built from the city profile; tests build
/// their own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceRules {
    /// Fixed conversion rate for som-denominated amounts.
    pub uzs_per_usd: f64,
    /// Inclusive plausibility band for a monthly rent in USD.
    pub band_min: f64,
    pub band_max: f64,
}

impl PriceRules {
    pub fn new(uzs_per_usd: f64, band_min: f64, band_max: f64) -> Self {
        Self { uzs_per_usd, band_min, band_max }
    }

    pub fn in_band(&self, value: f64) -> bool {
        value >= self.band_min && value <= self.band_max
    }
}

/// Extract one monthly USD price from `text`.
///
/// USD patterns are tried first; failing that, som patterns with a fixed
/// conversion. A value over the band is reinterpreted as a mis-tagged som
/// amount, converted once more and re-checked. Returns `None` (never zero,
/// never an error) when no pattern matches, a matched number will not
/// parse, or the value stays outside the band after reinterpretation.
pub fn price_from_text(text: &str, rules: &PriceRules) -> Option<f64> {
    let implied_usd = match USD_RE.captures(text) {
        Some(caps) => parse_group(&caps[1])?,
        None => {
            let caps = UZS_RE.captures(text)?;
            parse_group(&caps[1])? / rules.uzs_per_usd
        }
    };

    if rules.in_band(implied_usd) {
        return Some(implied_usd);
    }
    if implied_usd > rules.band_max {
        // Som amount wearing a dollar tag; convert and give it one more try.
        let converted = implied_usd / rules.uzs_per_usd;
        if rules.in_band(converted) {
            return Some(converted);
        }
    }
    None
}

fn parse_group(group: &str) -> Option<f64> {
    sweep_digit_groups(group).trim().parse::<f64>().ok()
}
