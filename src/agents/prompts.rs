//! Instructions and prompts for the LLM strategy
//!
//! Every prompt asks for a JSON section with a fixed name so the reply can
//! be mined with [`crate::aggregator::extract`].

use crate::models::{CalendarQuery, DateRange, DiningQuery, HotelQuery, RouteQuery};

pub const CALENDAR_SECTION: &str = "recommended_date_ranges";
pub const WEATHER_SECTION: &str = "forecasts";
pub const ROUTE_SECTION: &str = "route_plan";
pub const DINING_SECTION: &str = "dining_recommendations";
pub const HOTEL_SECTION: &str = "hotels";

pub const CALENDAR_SYSTEM: &str = "You are a travel planning expert for Yellowstone National Park. \
Recommend the best travel dates inside the traveller's window, weighing typical weather, \
crowd levels (weekends and US holidays are busier) and wildlife viewing. \
Score weather_score, crowd_score (higher means less crowded) and wildlife_score between 0 and 1.";

pub const WEATHER_SYSTEM: &str = "You are an expert weather forecaster for Yellowstone National Park. \
For the given dates and location, describe the weather to expect based on historical patterns: \
daily high and low temperatures in Fahrenheit, precipitation chances, general conditions \
and any advisories that affect park activities.";

pub const ROUTE_SYSTEM: &str = "You are a road trip planner specialising in drives to and through \
Yellowstone National Park. Plan a driving route through the requested stops in order, \
with realistic distances, driving times and the main roads for every leg.";

pub const DINING_SYSTEM: &str = "You are a dining expert for the region around Yellowstone National Park. \
Recommend restaurants at each stop of a road trip that match the traveller's cuisine \
preferences and budget, including signature dishes.";

pub const HOTEL_SYSTEM: &str = "You are a lodging expert for Yellowstone National Park and its gateway towns. \
Suggest hotels, lodges and cabins for the stay with nightly prices in USD, ratings and amenities.";

fn json_instruction(section: &str, shape: &str) -> String {
    format!(
        "After your explanation, include a JSON object of the form {{\"{section}\": {shape}}}. \
Use ISO dates (YYYY-MM-DD)."
    )
}

#[must_use]
pub fn calendar_prompt(query: &CalendarQuery) -> String {
    let weekday = query
        .preferred_start_day
        .map(|day| format!(" Trips should start on a {day}."))
        .unwrap_or_default();
    format!(
        "Find the three best {days}-day trip windows between {start} and {end}.{weekday}\n{json}",
        days = query.duration_days,
        start = query.window_start,
        end = query.window_end,
        json = json_instruction(
            CALENDAR_SECTION,
            r#"[{"start_date": "...", "end_date": "...", "weather_score": 0.0, "crowd_score": 0.0, "wildlife_score": 0.0}]"#
        ),
    )
}

#[must_use]
pub fn weather_prompt(location: &str, dates: &DateRange) -> String {
    format!(
        "Provide a weather forecast for {location} from {start} to {end}. \
Consider typical weather patterns for Yellowstone during this time period.\n{json}",
        start = dates.start_date,
        end = dates.end_date,
        json = json_instruction(
            WEATHER_SECTION,
            r#"[{"date": "...", "condition": "...", "description": "...", "high_temp_f": 0, "low_temp_f": 0, "precipitation_chance": 0}]"#
        ),
    )
}

#[must_use]
pub fn route_prompt(query: &RouteQuery) -> String {
    let stops = if query.waypoints.is_empty() {
        "no intermediate stops".to_string()
    } else {
        query.waypoints.join(", ")
    };
    format!(
        "Plan a drive from {origin} to {destination} on {date} via {stops}.\n{json}",
        origin = query.origin,
        destination = query.destination,
        date = query.travel_date,
        json = json_instruction(
            ROUTE_SECTION,
            r#"{"segments": [{"from": "...", "to": "...", "distance_miles": 0.0, "duration_minutes": 0, "road_names": ["..."]}]}"#
        ),
    )
}

#[must_use]
pub fn dining_prompt(query: &DiningQuery) -> String {
    let cuisines = if query.cuisine_preferences.is_empty() {
        "any cuisine".to_string()
    } else {
        query.cuisine_preferences.join(", ")
    };
    format!(
        "Recommend restaurants at each of these stops: {stops}. \
Preferred cuisines: {cuisines}. Price level: {price}.\n{json}",
        stops = query.locations.join("; "),
        price = query.price_level,
        json = json_instruction(
            DINING_SECTION,
            r#"[{"location": "...", "restaurants": [{"name": "...", "cuisine": "...", "price_level": "budget|moderate|expensive", "rating": 0.0, "signature_items": ["..."], "availability": true}]}]"#
        ),
    )
}

#[must_use]
pub fn hotel_prompt(query: &HotelQuery) -> String {
    let budget = query
        .max_price
        .map(|max| format!(" Maximum ${max:.0} per night."))
        .unwrap_or_default();
    let amenities = if query.amenities.is_empty() {
        String::new()
    } else {
        format!(" Required amenities: {}.", query.amenities.join(", "))
    };
    format!(
        "Suggest lodging in {location} from {check_in} to {check_out}.{budget}{amenities}\n{json}",
        location = query.location,
        check_in = query.check_in,
        check_out = query.check_out,
        json = json_instruction(
            HOTEL_SECTION,
            r#"[{"name": "...", "location": "...", "price": 0.0, "rating": 0.0, "amenities": ["..."], "availability": true}]"#
        ),
    )
}
