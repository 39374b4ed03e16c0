// src/fetch/geo.rs
// Shared OSM plumbing for the two area-count signals: Nominatim resolves a
// district to an area id, Overpass counts tagged features inside it. An
// Overpass `out count;` answer carries its totals as *strings* in the tags
// of a single synthetic element.

use serde::Deserialize;

use crate::config::{CityProfile, FetchPolicy};
use crate::core::net::Http;
use crate::error::Result;

/// Offset turning an OSM relation id into an Overpass area id.
const AREA_OFFSET: u64 = 3_600_000_000;

pub struct GeoCounter {
    http: Http,
    nominatim_url: String,
    overpass_url: String,
    query_template: String,
}

impl GeoCounter {
    pub fn new(profile: &CityProfile, policy: &FetchPolicy) -> Result<Self> {
        Ok(Self {
            http: Http::new(policy)?,
            nominatim_url: policy.nominatim_url.clone(),
            overpass_url: policy.overpass_url.clone(),
            query_template: profile.geocode_query_template.clone(),
        })
    }

    /// Overpass area id for a district, or `None` when Nominatim offers no
    /// relation for it.
    pub fn area_id(&self, district: &str) -> Result<Option<u64>> {
        let query = self.query_template.replace("{district}", district);
        let places: Vec<Place> = self.http.get_json(
            &self.nominatim_url,
            &[("q", query.as_str()), ("format", "json"), ("polygon_geojson", "0")],
        )?;
        Ok(relation_area_id(&places))
    }

    /// Count of nodes and ways matching `filter` inside an area.
    pub fn count_in_area(&self, area_id: u64, filter: &str) -> Result<f64> {
        let query = overpass_count_query(area_id, filter);
        let resp: CountResponse =
            self.http.get_json(&self.overpass_url, &[("data", query.as_str())])?;
        let total = resp.elements.first().map(|el| el.tags.total()).unwrap_or(0);
        Ok(total as f64)
    }
}

fn relation_area_id(places: &[Place]) -> Option<u64> {
    places
        .iter()
        .find(|p| p.osm_type == "relation")
        .map(|p| p.osm_id + AREA_OFFSET)
}

fn overpass_count_query(area_id: u64, filter: &str) -> String {
    format!(
        "[out:json];\n\
         area({area_id})->.searchArea;\n\
         (\n\
           node{filter}(area.searchArea);\n\
           way{filter}(area.searchArea);\n\
         );\n\
         out count;"
    )
}

/* ---------------- wire shapes ---------------- */

#[derive(Debug, Deserialize)]
struct Place {
    osm_type: String,
    osm_id: u64,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    elements: Vec<CountElement>,
}

#[derive(Debug, Deserialize)]
struct CountElement {
    #[serde(default)]
    tags: CountTags,
}

#[derive(Debug, Default, Deserialize)]
struct CountTags {
    nodes: Option<String>,
    ways: Option<String>,
    relations: Option<String>,
}

impl CountTags {
    fn total(&self) -> u64 {
        [&self.nodes, &self.ways, &self.relations]
            .into_iter()
            .flatten()
            .filter_map(|s| s.parse::<u64>().ok())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_relation_wins_and_gets_the_offset() {
        let places: Vec<Place> = serde_json::from_str(
            r#"[
                {"osm_type": "node", "osm_id": 11},
                {"osm_type": "relation", "osm_id": 2223838},
                {"osm_type": "relation", "osm_id": 999}
            ]"#,
        )
        .unwrap();
        assert_eq!(relation_area_id(&places), Some(2223838 + 3_600_000_000));
    }

    #[test]
    fn no_relation_means_no_area() {
        let places: Vec<Place> =
            serde_json::from_str(r#"[{"osm_type": "way", "osm_id": 5}]"#).unwrap();
        assert_eq!(relation_area_id(&places), None);
        assert_eq!(relation_area_id(&[]), None);
    }

    #[test]
    fn count_tags_arrive_as_strings() {
        let resp: CountResponse = serde_json::from_str(
            r#"{"version": 0.6, "elements": [
                {"type": "count", "id": 0,
                 "tags": {"nodes": "120", "ways": "37", "relations": "0", "total": "157"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.elements[0].tags.total(), 157);
    }

    #[test]
    fn missing_or_bad_tags_count_as_zero() {
        let resp: CountResponse =
            serde_json::from_str(r#"{"elements": [{"type": "count", "id": 0}]}"#).unwrap();
        assert_eq!(resp.elements[0].tags.total(), 0);

        let resp: CountResponse = serde_json::from_str(
            r#"{"elements": [{"tags": {"nodes": "7", "ways": "n/a"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.elements[0].tags.total(), 7);

        let empty: CountResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.elements.is_empty());
    }

    #[test]
    fn count_query_shape() {
        let q = overpass_count_query(3_602_223_838, r#"["office"]"#);
        assert!(q.starts_with("[out:json];"));
        assert!(q.contains(r#"area(3602223838)->.searchArea;"#));
        assert!(q.contains(r#"node["office"](area.searchArea);"#));
        assert!(q.contains(r#"way["office"](area.searchArea);"#));
        assert!(q.ends_with("out count;"));
    }
}
