use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::diagnosis::ensemble::http_error;
use crate::service::DermaError;

const USER_AGENT: &str = concat!("dermadetect/", env!("CARGO_PKG_VERSION"), " (clinic locator)");

/// A search hit, reduced to the fields the locator uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
struct RawPlace {
    place_id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: String,
    lat: Value,
    lon: Value,
}

impl RawPlace {
    fn into_place(self) -> Option<Place> {
        let id = match self.place_id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Place {
            id,
            name: self.name.filter(|n| !n.trim().is_empty()),
            display_name: self.display_name,
            lat: coord(&self.lat)?,
            lon: coord(&self.lon)?,
        })
    }
}

// Nominatim sends coordinates as strings.
fn coord(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Client for a Nominatim geocoding server.
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Free-text search. Hits without usable coordinates are dropped.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, DermaError> {
        let limit = limit.to_string();
        let body = self
            .get(
                "search",
                &[
                    ("q", query),
                    ("format", "json"),
                    ("addressdetails", "1"),
                    ("limit", &limit),
                ],
            )
            .await?;
        let raw: Vec<RawPlace> = serde_json::from_value(body)
            .map_err(|e| DermaError::Application(format!("geocoder search response: {}", e)))?;
        let places: Vec<Place> = raw.into_iter().filter_map(RawPlace::into_place).collect();
        debug!(query, hits = places.len(), "geocoder search");
        Ok(places)
    }

    /// Reverse lookup. Returns the most specific of city, town, county or
    /// state, or `None` when the response names none of them.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, DermaError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let body = self
            .get("reverse", &[("lat", &lat), ("lon", &lon), ("format", "json")])
            .await?;
        let address = &body["address"];
        let label = ["city", "town", "county", "state"]
            .iter()
            .find_map(|k| address[*k].as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(label)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, DermaError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(query)
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DermaError::Application(format!(
                "geocoder {} returned {}: {}",
                path, status, text
            )));
        }
        resp.json()
            .await
            .map_err(|e| DermaError::Application(format!("geocoder {} response: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn search_parses_string_coordinates() {
        let base = serve(Router::new().route(
            "/search",
            get(|| async {
                Json(json!([
                    {"place_id": 101, "name": "Skin Care Centre", "display_name": "Skin Care Centre, Pune, India", "lat": "18.52", "lon": "73.85"},
                    {"place_id": 102, "display_name": "Nowhere", "lat": "not a number", "lon": "0"},
                ]))
            }),
        ))
        .await;
        let client = NominatimClient::new(reqwest::Client::new(), format!("{}/", base));
        let places = client.search("skin clinic in Pune", 15).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "101");
        assert_eq!(places[0].lat, 18.52);
    }

    #[tokio::test]
    async fn reverse_picks_most_specific_label() {
        let base = serve(Router::new().route(
            "/reverse",
            get(|| async { Json(json!({"address": {"county": "Haveli", "state": "Maharashtra"}})) }),
        ))
        .await;
        let client = NominatimClient::new(reqwest::Client::new(), base);
        assert_eq!(client.reverse(18.5, 73.8).await.unwrap().as_deref(), Some("Haveli"));
    }
}
