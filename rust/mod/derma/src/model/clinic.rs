use serde::{Deserialize, Serialize};

/// A clinic or hospital returned by the locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    /// `Dermatology Specialist` or `General Hospital (Verify Derma Dept.)`.
    pub doctor: String,
    pub address: String,
    /// Demo rating between 4.2 and 5.0.
    pub rating: f64,
    /// Great-circle distance from the search origin, rounded to 0.1 km.
    pub distance_km: f64,
    pub lat: f64,
    pub lon: f64,
    pub specialized: bool,
}

/// Result of a clinic search: the resolved place label, the origin used for
/// distances, and the ranked clinics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicSearch {
    pub city: String,
    pub origin: (f64, f64),
    pub clinics: Vec<Clinic>,
}
