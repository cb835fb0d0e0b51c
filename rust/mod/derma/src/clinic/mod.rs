//! Clinic locator: geocode a place, search for dermatology-relevant clinics
//! around it and rank them by specialty and distance.

pub mod nominatim;
pub mod ranking;

use tracing::{info, warn};

pub use nominatim::{NominatimClient, Place};
pub use ranking::{haversine_km, rank_places};

use crate::model::ClinicSearch;
use crate::service::DermaError;

const FALLBACK_AREA: &str = "your area";

/// Category searches run for every lookup, with their result limits.
const CATEGORIES: [(&str, usize); 3] = [
    ("dermatologist in", 15),
    ("skin clinic in", 15),
    ("hospital in", 20),
];

pub struct ClinicLocator {
    geocoder: NominatimClient,
}

impl ClinicLocator {
    pub fn new(geocoder: NominatimClient) -> Self {
        Self { geocoder }
    }

    /// Search around a named place.
    pub async fn find_by_query(&self, query: &str) -> Result<ClinicSearch, DermaError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DermaError::Validation("location is required".into()));
        }
        let origin = self
            .geocoder
            .search(query, 1)
            .await?
            .into_iter()
            .next()
            .map(|p| (p.lat, p.lon))
            .ok_or_else(|| {
                DermaError::Location(format!(
                    "Could not locate \"{}\". Please try a nearby major city.",
                    query
                ))
            })?;
        self.collect(query.to_string(), origin).await
    }

    /// Search around a coordinate. The area name comes from a reverse lookup
    /// and falls back to "your area".
    pub async fn find_near(&self, lat: f64, lon: f64) -> Result<ClinicSearch, DermaError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(DermaError::Validation(format!("invalid coordinates {}, {}", lat, lon)));
        }
        let city = match self.geocoder.reverse(lat, lon).await {
            Ok(Some(label)) => label,
            Ok(None) => FALLBACK_AREA.to_string(),
            Err(e) => {
                warn!("reverse geocode failed: {}", e);
                FALLBACK_AREA.to_string()
            }
        };
        self.collect(city, (lat, lon)).await
    }

    async fn collect(&self, city: String, origin: (f64, f64)) -> Result<ClinicSearch, DermaError> {
        let [derma, skin, hospital] = CATEGORIES.map(|(prefix, limit)| (format!("{} {}", prefix, city), limit));
        let (derma, skin, hospital) = tokio::join!(
            self.category(&derma.0, derma.1),
            self.category(&skin.0, skin.1),
            self.category(&hospital.0, hospital.1),
        );

        let places: Vec<Place> = derma.into_iter().chain(skin).chain(hospital).collect();
        let clinics = rank_places(origin, &city, &places, &mut rand::thread_rng());
        if clinics.is_empty() {
            return Err(DermaError::Location(format!(
                "No medical clinics mapped publicly in {}.",
                city
            )));
        }
        info!(city = %city, found = clinics.len(), "clinic search");
        Ok(ClinicSearch { city, origin, clinics })
    }

    async fn category(&self, query: &str, limit: usize) -> Vec<Place> {
        match self.geocoder.search(query, limit).await {
            Ok(places) => places,
            Err(e) => {
                warn!(query, "clinic category search failed: {}", e);
                Vec::new()
            }
        }
    }
}
