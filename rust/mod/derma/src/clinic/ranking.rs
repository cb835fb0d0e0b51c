use std::collections::HashSet;

use rand::Rng;

use crate::clinic::nominatim::Place;
use crate::model::Clinic;

pub const MAX_RESULTS: usize = 15;

const EARTH_RADIUS_KM: f64 = 6371.0;

const SPECIALIST_WORDS: &[&str] = &["skin", "derma", "laser", "hair", "cosmetic", "dermatolog"];

const EXCLUDED_WORDS: &[&str] = &[
    "dental", "dentist", "tooth", "teeth", "smile", "eye", "vision", "optic", "blind",
    "maternity", "women", "pregnancy", "fertility", "ortho", "bone", "cardio", "heart",
    "neuro", "brain", "pediatric", "child", "kid", "vet", "animal", "pet", "mental",
    "psych", "physio", "rehab", "ayurved", "homeopath", "scan", "diagnostics", "imaging",
    "pathology", "laboratory", "blood",
];

const SPECIALIST: &str = "Dermatology Specialist";
const GENERAL: &str = "General Hospital (Verify Derma Dept.)";

/// Great-circle distance in kilometres.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

fn mentions(name: &str, words: &[&str]) -> bool {
    let name = name.to_lowercase();
    words.iter().any(|w| name.contains(w))
}

/// Turn raw search hits into a ranked clinic list.
///
/// Places are deduplicated by id in input order. A place whose name hits the
/// exclusion list is dropped unless it also names a skin specialty.
/// Specialists come first, each group sorted by distance from `origin`, and
/// the result is capped at [`MAX_RESULTS`].
pub fn rank_places<R: Rng>(origin: (f64, f64), city: &str, places: &[Place], rng: &mut R) -> Vec<Clinic> {
    let mut seen = HashSet::new();
    let mut specialists = Vec::new();
    let mut general = Vec::new();

    for place in places {
        if seen.contains(&place.id) {
            continue;
        }
        let name = match &place.name {
            Some(n) => n.clone(),
            None => place
                .display_name
                .split(", ")
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        let specialized = mentions(&name, SPECIALIST_WORDS);
        if !specialized && mentions(&name, EXCLUDED_WORDS) {
            continue;
        }
        seen.insert(place.id.clone());

        let mut address = place.display_name.replacen(&format!("{}, ", name), "", 1);
        if address == name || address.is_empty() {
            address = format!("{} Region", city);
        }

        let distance = haversine_km(origin, (place.lat, place.lon));
        let clinic = Clinic {
            id: place.id.clone(),
            name,
            doctor: if specialized { SPECIALIST } else { GENERAL }.to_string(),
            address,
            rating: (rng.gen_range(4.2..=5.0_f64) * 10.0).round() / 10.0,
            distance_km: (distance * 10.0).round() / 10.0,
            lat: place.lat,
            lon: place.lon,
            specialized,
        };
        if specialized {
            specialists.push(clinic);
        } else {
            general.push(clinic);
        }
    }

    specialists.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    general.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    specialists.extend(general);
    specialists.truncate(MAX_RESULTS);
    specialists
}
