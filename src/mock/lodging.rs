//! Synthetic hotel inventory

use super::SharedRng;
use crate::models::{Hotel, HotelQuery};

/// Rate multiplier for lodging inside the park boundary
const IN_PARK_FACTOR: f64 = 1.25;

const PARK_NAME: &str = "Yellowstone National Park";

/// Base nightly rate and rating by the kind of property the name suggests
fn keyword_profile(name: &str) -> (f64, f32, &'static [&'static str]) {
    let lower = name.to_lowercase();
    if lower.contains("resort") {
        (280.0, 4.7, &["Spa", "Pool", "Restaurant", "Free WiFi"])
    } else if lower.contains("hotel") {
        (208.0, 4.5, &["Restaurant", "Free WiFi", "Parking"])
    } else if lower.contains("lodge") {
        (200.0, 4.3, &["Restaurant", "Fireplace", "Parking"])
    } else if lower.contains("inn") {
        (176.0, 4.2, &["Breakfast", "Free WiFi", "Parking"])
    } else if lower.contains("cabin") {
        (190.0, 4.4, &["Kitchenette", "Free WiFi", "Parking"])
    } else {
        (150.0, 4.0, &["Free WiFi", "Parking"])
    }
}

/// Nightly rate derived from the property name and whether it is in the park
#[must_use]
pub fn nightly_rate(name: &str, in_park: bool) -> f64 {
    let (base, _, _) = keyword_profile(name);
    let factor = if in_park { IN_PARK_FACTOR } else { 1.0 };
    (base * factor).round() - 0.01
}

fn property(name: &str, location: &str, in_park: bool, extra: &[&str]) -> Hotel {
    let (_, rating, amenities) = keyword_profile(name);
    let mut amenities: Vec<String> = amenities.iter().map(|a| (*a).to_string()).collect();
    amenities.extend(extra.iter().map(|a| (*a).to_string()));
    if in_park {
        amenities.push("Located in park".to_string());
    }
    Hotel {
        name: name.to_string(),
        location: location.to_string(),
        price: nightly_rate(name, in_park),
        rating,
        amenities,
        availability: true,
    }
}

/// Every property known for a location
#[must_use]
pub fn catalog(location: &str) -> Vec<Hotel> {
    if location.to_lowercase().contains("yellowstone") {
        return vec![
            property("Old Faithful Inn", PARK_NAME, true, &["Historic property"]),
            property("Lake Yellowstone Hotel", PARK_NAME, true, &["Lake view"]),
            property("Explorer Cabins", "West Yellowstone", false, &[]),
        ];
    }

    let town = location.split(',').next().unwrap_or(location).trim();
    vec![
        property(&format!("{town} Inn"), location, false, &[]),
        property(&format!("{town} Lodge"), location, false, &[]),
        property(&format!("Grand {town} Hotel"), location, false, &[]),
    ]
}

/// Search the catalog, applying the optional price cap and amenity filter.
/// Availability varies per call.
pub fn search(rng: &SharedRng, query: &HotelQuery) -> Vec<Hotel> {
    catalog(&query.location)
        .into_iter()
        .filter(|hotel| query.max_price.is_none_or(|max| hotel.price <= max))
        .filter(|hotel| hotel.has_amenities(&query.amenities))
        .map(|mut hotel| {
            hotel.availability = rng.chance(0.9);
            hotel
        })
        .collect()
}
