//! Response aggregation
//!
//! Merges the per-stage outputs into one [`TripPlan`]. Nothing here fails:
//! missing or malformed sections become explicit empty values.

pub mod extract;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::models::{
    DailyForecast, DateRange, DateRecommendations, DiningRecommendations, EstimatedCosts,
    Hotel, HotelClass, LocationDining, RoutePlan, StageReport, TripPlan, TripPreferences,
    WeatherForecast,
};

/// Fuel economy assumed for cost estimates
pub const MILES_PER_GALLON: f64 = 25.0;
/// Fuel price assumed for cost estimates, USD per gallon
pub const FUEL_PRICE_PER_GALLON: f64 = 3.50;

/// Everything the pipeline produced for one request
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub starting_location: String,
    pub duration_days: u32,
    pub budget: Option<f64>,
    pub preferences: TripPreferences,
    pub recommendations: DateRecommendations,
    pub selected_dates: DateRange,
    pub weather: Option<WeatherForecast>,
    pub route: RoutePlan,
    /// Locations the dining stage was asked about
    pub dining_stops: Vec<String>,
    pub dining: DiningRecommendations,
    pub hotels: Vec<Hotel>,
    pub reports: Vec<StageReport>,
    /// Free text kept for the raw plan, such as unparsed model replies
    pub notes: Vec<String>,
}

/// One forecast entry per day of the range, ascending. Days the forecast
/// does not cover get typical values; duplicates and days outside the range
/// are dropped.
#[must_use]
pub fn normalize_forecast(
    forecast: Option<&WeatherForecast>,
    dates: &DateRange,
) -> Vec<DailyForecast> {
    let mut by_date: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();
    if let Some(forecast) = forecast {
        for day in &forecast.forecasts {
            if dates.contains(day.date) {
                by_date.entry(day.date).or_insert_with(|| DailyForecast {
                    precipitation_chance: day.precipitation_chance.min(100),
                    ..day.clone()
                });
            }
        }
    }

    dates
        .dates()
        .into_iter()
        .map(|date| {
            by_date
                .remove(&date)
                .unwrap_or_else(|| DailyForecast::typical(date))
        })
        .collect()
}

/// Route with totals that match its segments. Negative or non-finite
/// distances count as zero; segments are never removed so the chain and its
/// stops stay intact.
#[must_use]
pub fn normalize_route(mut route: RoutePlan) -> RoutePlan {
    for segment in &mut route.segments {
        if !segment.distance_miles.is_finite() || segment.distance_miles < 0.0 {
            segment.distance_miles = 0.0;
        }
    }
    route.recompute_totals();
    route
}

/// Exactly one entry per stop, in stop order
#[must_use]
pub fn normalize_dining(dining: &DiningRecommendations, stops: &[String]) -> Vec<LocationDining> {
    stops
        .iter()
        .map(|stop| LocationDining {
            location: stop.clone(),
            restaurants: dining
                .for_location(stop)
                .map(|entry| entry.restaurants.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Lodging class implied by the budget per day
#[must_use]
pub fn hotel_class(budget: Option<f64>, duration_days: u32) -> HotelClass {
    match budget {
        Some(total) => match total / f64::from(duration_days.max(1)) {
            daily if daily < 250.0 => HotelClass::Budget,
            daily if daily > 600.0 => HotelClass::Luxury,
            _ => HotelClass::MidRange,
        },
        None => HotelClass::MidRange,
    }
}

/// Representative nightly rate: lower third for budget, upper third for
/// luxury, the mean otherwise
#[must_use]
pub fn nightly_rate(hotels: &[Hotel], class: HotelClass) -> f64 {
    let mut prices: Vec<f64> = hotels
        .iter()
        .map(|h| h.price)
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if prices.is_empty() {
        return match class {
            HotelClass::Budget => 120.0,
            HotelClass::MidRange => 200.0,
            HotelClass::Luxury => 320.0,
        };
    }
    prices.sort_by(f64::total_cmp);

    let n = prices.len();
    match class {
        HotelClass::Budget => prices[n * 33 / 100],
        HotelClass::Luxury => prices[n * 67 / 100],
        HotelClass::MidRange => prices.iter().sum::<f64>() / n as f64,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[must_use]
pub fn estimate_costs(
    duration_days: u32,
    budget: Option<f64>,
    preferences: &TripPreferences,
    hotels: &[Hotel],
    route: &RoutePlan,
) -> EstimatedCosts {
    let days = f64::from(duration_days.max(1));
    let nights = f64::from(duration_days.saturating_sub(1).max(1));

    let class = hotel_class(budget, duration_days);
    let lodging_usd = round_cents(nightly_rate(hotels, class) * nights);
    let dining_usd = round_cents(
        preferences.dining_budget.daily_cost_per_person() * f64::from(preferences.party_size) * days,
    );
    let fuel_usd =
        round_cents(route.total_distance_miles / MILES_PER_GALLON * FUEL_PRICE_PER_GALLON);
    let total_usd = round_cents(lodging_usd + dining_usd + fuel_usd);

    EstimatedCosts {
        lodging_usd,
        dining_usd,
        fuel_usd,
        total_usd,
        budget_usd: budget,
        within_budget: budget.map(|limit| total_usd <= limit),
    }
}

/// Human readable itinerary
#[must_use]
pub fn render_raw_plan(plan: &TripPlan, notes: &[String]) -> String {
    let mut out = String::new();
    let dates = &plan.selected_dates;
    let _ = writeln!(
        out,
        "{}-day trip from {} to {}",
        plan.duration_days, plan.starting_location, plan.route_plan.destination
    );
    let _ = writeln!(
        out,
        "Dates: {} to {}",
        dates.start_date.format("%A, %B %-d, %Y"),
        dates.end_date.format("%A, %B %-d, %Y")
    );
    if !plan.recommended_dates.reasoning.is_empty() {
        let _ = writeln!(out, "{}", plan.recommended_dates.reasoning);
    }

    let _ = writeln!(out, "\nWeather:");
    for day in &plan.weather_forecast {
        let _ = writeln!(
            out,
            "  {}: {}, {}, {}% precipitation",
            day.date.format("%a %b %-d"),
            day.condition,
            day.format_temperature(),
            day.precipitation_chance
        );
    }

    let route = &plan.route_plan;
    let _ = writeln!(out, "\nRoute:");
    if route.segments.is_empty() {
        let _ = writeln!(out, "  No route available");
    } else {
        for segment in &route.segments {
            let _ = writeln!(
                out,
                "  {} -> {}: {:.1} mi, {} min via {}",
                segment.from_location,
                segment.to_location,
                segment.distance_miles,
                segment.duration_minutes,
                segment.road_names.join(", ")
            );
        }
        let _ = writeln!(
            out,
            "  Total: {:.1} mi, {:.1} h",
            route.total_distance_miles, route.total_duration_hours
        );
    }

    let _ = writeln!(out, "\nDining:");
    for stop in &plan.dining_recommendations {
        let names: Vec<&str> = stop.restaurants.iter().map(|r| r.name.as_str()).collect();
        let listed = if names.is_empty() {
            "no recommendations".to_string()
        } else {
            names.join(", ")
        };
        let _ = writeln!(out, "  {}: {listed}", stop.location);
    }

    if !plan.hotel_recommendations.is_empty() {
        let _ = writeln!(out, "\nLodging:");
        for hotel in &plan.hotel_recommendations {
            let _ = writeln!(
                out,
                "  {} ({}) ${:.2}/night, rated {:.1}",
                hotel.name, hotel.location, hotel.price, hotel.rating
            );
        }
    }

    let costs = &plan.estimated_costs;
    let _ = writeln!(
        out,
        "\nEstimated cost: ${:.2} (lodging ${:.2}, dining ${:.2}, fuel ${:.2})",
        costs.total_usd, costs.lodging_usd, costs.dining_usd, costs.fuel_usd
    );
    if let (Some(budget), Some(within)) = (costs.budget_usd, costs.within_budget) {
        let verdict = if within { "within" } else { "over" };
        let _ = writeln!(out, "  {verdict} the ${budget:.2} budget");
    }

    for note in notes.iter().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(out, "\n{}", note.trim());
    }

    out.trim_end().to_string()
}

/// Build the final plan
#[must_use]
pub fn aggregate(outputs: StageOutputs) -> TripPlan {
    let StageOutputs {
        starting_location,
        duration_days,
        budget,
        preferences,
        recommendations,
        selected_dates,
        weather,
        route,
        dining_stops,
        dining,
        hotels,
        reports,
        mut notes,
    } = outputs;

    let weather_forecast = normalize_forecast(weather.as_ref(), &selected_dates);
    let route_plan = normalize_route(route);
    let dining_recommendations = normalize_dining(&dining, &dining_stops);
    let hotel_recommendations: Vec<Hotel> =
        hotels.into_iter().filter(|h| h.price >= 0.0).collect();
    let estimated_costs = estimate_costs(
        duration_days,
        budget,
        &preferences,
        &hotel_recommendations,
        &route_plan,
    );

    let model_replies = [
        weather.as_ref().and_then(|w| w.raw_reply.as_deref()),
        route_plan.raw_reply.as_deref(),
        dining.raw_reply.as_deref(),
    ];
    notes.extend(model_replies.into_iter().flatten().map(str::to_string));

    let mut plan = TripPlan {
        starting_location,
        duration_days,
        recommended_dates: recommendations,
        selected_dates,
        weather_forecast,
        route_plan,
        dining_recommendations,
        hotel_recommendations,
        estimated_costs,
        raw_plan: String::new(),
        stage_reports: reports,
    };
    plan.raw_plan = render_raw_plan(&plan, &notes);
    plan
}
