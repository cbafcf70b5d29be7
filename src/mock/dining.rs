//! Synthetic restaurant directory

use super::SharedRng;
use crate::models::{PriceLevel, Restaurant};

const SEATINGS: [&str; 3] = ["5:00 PM", "6:30 PM", "8:00 PM"];

struct Listing {
    name: &'static str,
    cuisine: &'static str,
    price_level: PriceLevel,
    rating: f32,
    signature_items: &'static [&'static str],
}

const fn listing(
    name: &'static str,
    cuisine: &'static str,
    price_level: PriceLevel,
    rating: f32,
    signature_items: &'static [&'static str],
) -> Listing {
    Listing {
        name,
        cuisine,
        price_level,
        rating,
        signature_items,
    }
}

/// Known towns and park villages, matched by substring of the stop name
const DIRECTORY: &[(&str, &[Listing])] = &[
    (
        "West Yellowstone",
        &[
            listing("Madison Crossing Lounge", "American", PriceLevel::Moderate, 4.3, &["Bison burger", "Huckleberry cheesecake"]),
            listing("Cafe Madriz", "Spanish", PriceLevel::Moderate, 4.7, &["Paella", "Tapas"]),
            listing("Wild West Pizzeria", "Italian", PriceLevel::Budget, 4.1, &["Grizzly pizza"]),
        ],
    ),
    (
        "Gardiner",
        &[
            listing("Wonderland Cafe", "American", PriceLevel::Moderate, 4.4, &["Elk chili", "Trout tacos"]),
            listing("Yellowstone Pizza Company", "Italian", PriceLevel::Budget, 4.0, &["Wood-fired pizza"]),
        ],
    ),
    (
        "Cody",
        &[
            listing("Proud Cut Saloon", "American", PriceLevel::Moderate, 4.2, &["Prime rib"]),
            listing("Millstone Pizza Company", "Italian", PriceLevel::Budget, 4.5, &["Stone-baked pizza"]),
        ],
    ),
    (
        "Jackson",
        &[
            listing("Gun Barrel Steak House", "American", PriceLevel::Expensive, 4.6, &["Elk chop", "Bison ribeye"]),
            listing("Snake River Grill", "American", PriceLevel::Expensive, 4.8, &["Steak tartare"]),
            listing("Hand Fire Pizza", "Italian", PriceLevel::Moderate, 4.5, &["Margherita"]),
        ],
    ),
    (
        "Old Faithful",
        &[
            listing("Old Faithful Inn Dining Room", "American", PriceLevel::Moderate, 4.3, &["Bison meatloaf", "Rocky Mountain trout"]),
            listing("Geyser Grill", "American", PriceLevel::Budget, 3.9, &["Burgers"]),
        ],
    ),
    (
        "Lake Village",
        &[
            listing("Lake Hotel Dining Room", "American", PriceLevel::Expensive, 4.5, &["Lake trout"]),
            listing("Lake Hotel Diner", "American", PriceLevel::Budget, 4.0, &["Breakfast skillet"]),
        ],
    ),
    (
        "Canyon",
        &[listing("Canyon Lodge M66 Bar & Grill", "American", PriceLevel::Moderate, 4.1, &["Smoked brisket"])],
    ),
    (
        "Mammoth",
        &[listing("Mammoth Hotel Dining Room", "American", PriceLevel::Moderate, 4.2, &["Bison chili"])],
    ),
    (
        "Yellowstone National Park",
        &[
            listing("Old Faithful Inn Dining Room", "American", PriceLevel::Moderate, 4.3, &["Bison meatloaf"]),
            listing("Lake Hotel Dining Room", "American", PriceLevel::Expensive, 4.5, &["Lake trout"]),
        ],
    ),
];

fn restaurant(
    location: &str,
    name: &str,
    cuisine: &str,
    price_level: PriceLevel,
    rating: f32,
    signature_items: &[&str],
) -> Restaurant {
    Restaurant {
        name: name.to_string(),
        location: location.to_string(),
        cuisine: cuisine.to_string(),
        price_level,
        rating,
        signature_items: signature_items.iter().map(|s| (*s).to_string()).collect(),
        availability: true,
        available_times: Vec::new(),
    }
}

/// All restaurants at a location. Unknown places get a generic set.
pub fn directory(rng: &SharedRng, location: &str) -> Vec<Restaurant> {
    let lower = location.to_lowercase();
    if let Some((_, listings)) = DIRECTORY
        .iter()
        .find(|(town, _)| lower.contains(&town.to_lowercase()))
    {
        return listings
            .iter()
            .map(|l| {
                restaurant(location, l.name, l.cuisine, l.price_level, l.rating, l.signature_items)
            })
            .collect();
    }

    let town = location.split(',').next().unwrap_or(location).trim();
    let rating = |low: f64, high: f64| ((rng.uniform(low, high) * 10.0).round() / 10.0) as f32;
    vec![
        restaurant(
            location,
            &format!("{town} Diner"),
            "American",
            PriceLevel::Budget,
            rating(3.5, 4.5),
            &["Breakfast all day"],
        ),
        restaurant(
            location,
            &format!("{town} Grill"),
            "American",
            PriceLevel::Moderate,
            rating(3.8, 4.7),
            &["Ribeye"],
        ),
        restaurant(
            location,
            "Pasta Palace",
            "Italian",
            PriceLevel::Moderate,
            rating(3.7, 4.6),
            &["Lasagna"],
        ),
    ]
}

/// Search a location. Cuisine and price filters are dropped when applying
/// them would leave nothing to recommend. Reservation availability varies.
pub fn search(
    rng: &SharedRng,
    location: &str,
    cuisines: &[String],
    price_level: Option<PriceLevel>,
) -> Vec<Restaurant> {
    let all = directory(rng, location);

    let by_cuisine: Vec<Restaurant> = if cuisines.is_empty() {
        all.clone()
    } else {
        all.iter()
            .filter(|r| cuisines.iter().any(|c| c.eq_ignore_ascii_case(&r.cuisine)))
            .cloned()
            .collect()
    };
    let pool = if by_cuisine.is_empty() { all } else { by_cuisine };

    let by_price: Vec<Restaurant> = match price_level {
        Some(level) => pool.iter().filter(|r| r.price_level == level).cloned().collect(),
        None => pool.clone(),
    };
    let mut results = if by_price.is_empty() { pool } else { by_price };

    for restaurant in &mut results {
        restaurant.availability = rng.chance(0.75);
        if restaurant.availability {
            restaurant.available_times = SEATINGS.iter().map(|s| (*s).to_string()).collect();
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_town() {
        let rng = SharedRng::seeded(1);
        let restaurants = directory(&rng, "Gardiner, MT");
        assert_eq!(restaurants.len(), 2);
        assert!(restaurants.iter().all(|r| r.location == "Gardiner, MT"));
    }

    #[test]
    fn test_unknown_town_gets_generic_listings() {
        let rng = SharedRng::seeded(1);
        let restaurants = directory(&rng, "Denver, CO");
        let names: Vec<&str> = restaurants.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Denver Diner", "Denver Grill", "Pasta Palace"]);
        assert!(restaurants.iter().all(|r| (3.5..=4.7).contains(&r.rating)));
    }

    #[test]
    fn test_filters_apply() {
        let rng = SharedRng::seeded(4);
        let results = search(&rng, "Jackson", &["Italian".to_string()], Some(PriceLevel::Moderate));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Hand Fire Pizza");
    }

    #[test]
    fn test_filters_relax_when_nothing_matches() {
        let rng = SharedRng::seeded(4);
        let results = search(&rng, "Cody", &["Thai".to_string()], Some(PriceLevel::Expensive));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_available_restaurants_offer_seatings() {
        let rng = SharedRng::seeded(6);
        for restaurant in search(&rng, "West Yellowstone", &[], None) {
            assert_eq!(restaurant.availability, !restaurant.available_times.is_empty());
        }
    }
}
