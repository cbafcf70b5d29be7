//! Synthetic driving routes and the predefined corridors to the park

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::models::{RoutePlan, RouteSegment};

/// Sights visited when the trip goes to Yellowstone and no waypoints were asked for
pub const YELLOWSTONE_WAYPOINTS: [&str; 5] = [
    "Old Faithful",
    "Grand Prismatic Spring",
    "Grand Canyon of the Yellowstone",
    "Mammoth Hot Springs",
    "Lamar Valley",
];

/// Leg of a corridor ending at a gateway city
#[derive(Debug, Clone, Serialize)]
pub struct CorridorLeg {
    pub location: &'static str,
    /// Miles from the previous point
    pub distance: u32,
    /// Hours from the previous point
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelArea {
    pub location: &'static str,
    /// "stopover" or "destination"
    pub area: &'static str,
}

/// A well-known long-distance route into the park
#[derive(Debug, Clone, Serialize)]
pub struct Corridor {
    #[serde(skip)]
    pub id: &'static str,
    pub name: &'static str,
    pub origin: &'static str,
    pub destination: &'static str,
    pub waypoints: Vec<CorridorLeg>,
    pub total_distance: u32,
    pub total_duration: f64,
    pub recommended_hotels: Vec<HotelArea>,
}

/// Entry of `GET /routes/available`
#[derive(Debug, Clone, Serialize)]
pub struct CorridorSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub origin: &'static str,
    pub total_distance: u32,
    pub total_duration: f64,
}

impl From<&Corridor> for CorridorSummary {
    fn from(corridor: &Corridor) -> Self {
        Self {
            id: corridor.id,
            name: corridor.name,
            origin: corridor.origin,
            total_distance: corridor.total_distance,
            total_duration: corridor.total_duration,
        }
    }
}

fn leg(location: &'static str, distance: u32, duration: f64) -> CorridorLeg {
    CorridorLeg {
        location,
        distance,
        duration,
    }
}

fn area(location: &'static str, area: &'static str) -> HotelArea {
    HotelArea { location, area }
}

#[must_use]
pub fn corridors() -> Vec<Corridor> {
    vec![
        Corridor {
            id: "san_jose",
            name: "San Jose to Yellowstone",
            origin: "San Jose, CA",
            destination: "Yellowstone National Park",
            waypoints: vec![
                leg("Reno, NV", 260, 4.5),
                leg("Salt Lake City, UT", 520, 7.5),
                leg("Idaho Falls, ID", 210, 3.5),
            ],
            total_distance: 990,
            total_duration: 15.5,
            recommended_hotels: vec![
                area("Reno", "stopover"),
                area("Salt Lake City", "stopover"),
                area("West Yellowstone", "destination"),
            ],
        },
        Corridor {
            id: "redmond",
            name: "Redmond to Yellowstone",
            origin: "Redmond, WA",
            destination: "Yellowstone National Park",
            waypoints: vec![
                leg("Spokane, WA", 280, 4.0),
                leg("Missoula, MT", 200, 3.0),
                leg("Bozeman, MT", 203, 3.0),
            ],
            total_distance: 683,
            total_duration: 10.0,
            recommended_hotels: vec![
                area("Spokane", "stopover"),
                area("Bozeman", "stopover"),
                area("Gardiner", "destination"),
            ],
        },
        Corridor {
            id: "new_york",
            name: "New York to Yellowstone",
            origin: "New York, NY",
            destination: "Yellowstone National Park",
            waypoints: vec![
                leg("Chicago, IL", 790, 12.0),
                leg("Sioux Falls, SD", 580, 8.5),
                leg("Billings, MT", 450, 6.5),
            ],
            total_distance: 1820,
            total_duration: 27.0,
            recommended_hotels: vec![
                area("Chicago", "stopover"),
                area("Sioux Falls", "stopover"),
                area("Billings", "stopover"),
                area("Cody", "destination"),
            ],
        },
    ]
}

#[must_use]
pub fn corridor(id: &str) -> Option<Corridor> {
    corridors().into_iter().find(|c| c.id == id)
}

/// Corridor whose origin city matches the start of a trip to the park
#[must_use]
pub fn corridor_for(origin: &str, destination: &str) -> Option<Corridor> {
    if !destination.to_lowercase().contains("yellowstone") {
        return None;
    }
    let origin = origin.to_lowercase();
    corridors().into_iter().find(|c| {
        let city = c.origin.split(',').next().unwrap_or(c.origin).to_lowercase();
        origin.starts_with(&city)
    })
}

/// Stable pseudo distance between two named places, 20 to 200 miles
#[must_use]
pub fn mock_distance(a: &str, b: &str) -> f64 {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = DefaultHasher::new();
    first.hash(&mut hasher);
    second.hash(&mut hasher);
    20.0 + (hasher.finish() % 18_000) as f64 / 100.0
}

fn road_names(to: &str) -> Vec<String> {
    let in_park = to.contains("Yellowstone") || YELLOWSTONE_WAYPOINTS.contains(&to);
    let roads: [&str; 2] = if in_park {
        ["US-191", "Grand Loop Road"]
    } else {
        ["I-90", "US-191"]
    };
    roads.iter().map(|r| (*r).to_string()).collect()
}

/// Plan a drive through every waypoint in order. A trip starting at a
/// corridor city first follows the corridor's gateway cities.
#[must_use]
pub fn plan(origin: &str, destination: &str, waypoints: &[String]) -> RoutePlan {
    let mut segments = Vec::new();
    let mut previous = origin.to_string();

    if let Some(corridor) = corridor_for(origin, destination) {
        for leg in &corridor.waypoints {
            segments.push(RouteSegment::driving(
                &previous,
                leg.location,
                f64::from(leg.distance),
                road_names(leg.location),
            ));
            previous = leg.location.to_string();
        }
    }

    for point in waypoints.iter().map(String::as_str).chain([destination]) {
        if point == previous {
            continue;
        }
        segments.push(RouteSegment::driving(
            &previous,
            point,
            mock_distance(&previous, point),
            road_names(point),
        ));
        previous = point.to_string();
    }

    RoutePlan::from_segments(origin, destination, segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_distance_is_stable_and_symmetric() {
        let d = mock_distance("Denver", "Cody");
        assert_eq!(d, mock_distance("cody", "DENVER"));
        assert!((20.0..200.0).contains(&d));
    }

    #[test]
    fn test_plan_visits_waypoints_in_order() {
        let plan = plan("Denver", "Yellowstone National Park", &strings(&["Cody", "Old Faithful"]));
        assert!(plan.is_connected());
        assert_eq!(plan.segments.len(), 3);
        assert_eq!(plan.segments[0].from_location, "Denver");
        assert_eq!(plan.segments[2].to_location, "Yellowstone National Park");
        assert_eq!(plan.segments[1].road_names, vec!["US-191", "Grand Loop Road"]);
        assert_eq!(plan.segments[0].road_names, vec!["I-90", "US-191"]);

        let sum: f64 = plan.segments.iter().map(|s| s.distance_miles).sum();
        assert!((plan.total_distance_miles - sum).abs() <= 0.1);
    }

    #[test]
    fn test_corridor_origin_uses_gateways() {
        let plan = plan("Redmond, WA", "Yellowstone National Park", &[]);
        let stops = plan.stops();
        assert_eq!(
            stops,
            vec!["Spokane, WA", "Missoula, MT", "Bozeman, MT", "Yellowstone National Park"]
        );
        assert_eq!(plan.segments[0].distance_miles, 280.0);
    }

    #[test]
    fn test_corridor_lookup() {
        assert!(corridor("new_york").is_some());
        assert!(corridor("atlantis").is_none());
        assert!(corridor_for("San Jose", "Yellowstone National Park").is_some());
        assert!(corridor_for("San Jose", "Grand Canyon").is_none());
    }

    #[test]
    fn test_duplicate_consecutive_points_collapse() {
        let plan = plan("Gardiner", "Gardiner", &[]);
        assert!(plan.segments.is_empty());
        assert_eq!(plan.stops(), vec!["Gardiner"]);
    }
}
