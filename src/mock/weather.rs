//! Synthetic daily forecasts

use chrono::{Datelike, NaiveDate};

use super::SharedRng;
use crate::models::{DailyForecast, DateRange, WeatherForecast};

struct Condition {
    label: &'static str,
    description: &'static str,
    high_temp_f: i32,
    low_temp_f: i32,
    precipitation_chance: u8,
}

const CONDITIONS: [Condition; 4] = [
    Condition {
        label: "Sunny",
        description: "Clear sky",
        high_temp_f: 75,
        low_temp_f: 45,
        precipitation_chance: 0,
    },
    Condition {
        label: "Partly Cloudy",
        description: "Some clouds",
        high_temp_f: 70,
        low_temp_f: 42,
        precipitation_chance: 10,
    },
    Condition {
        label: "Thunderstorm",
        description: "Scattered storms",
        high_temp_f: 65,
        low_temp_f: 40,
        precipitation_chance: 70,
    },
    Condition {
        label: "Rain",
        description: "Light rain",
        high_temp_f: 60,
        low_temp_f: 38,
        precipitation_chance: 80,
    },
];

/// Relative likelihood of each condition in a given month
fn condition_weights(month: u32) -> [u32; 4] {
    match month {
        7 | 8 => [5, 3, 2, 1],
        6 | 9 => [4, 3, 1, 2],
        5 | 10 => [2, 3, 1, 3],
        _ => [2, 4, 0, 3],
    }
}

/// Temperature shift relative to a June day at the park
fn seasonal_offset(month: u32) -> i32 {
    match month {
        6 => 0,
        7 | 8 => 5,
        5 | 9 => -8,
        4 | 10 => -15,
        _ => -30,
    }
}

/// Forecast for one day
pub fn daily(rng: &SharedRng, date: NaiveDate) -> DailyForecast {
    let month = date.month();
    let condition = &CONDITIONS[rng.weighted_index(&condition_weights(month))];
    let offset = seasonal_offset(month);
    let high = condition.high_temp_f + offset + rng.int_between(-5, 5);
    let low = condition.low_temp_f + offset + rng.int_between(-3, 3);

    DailyForecast {
        date,
        condition: condition.label.to_string(),
        description: condition.description.to_string(),
        high_temp_f: high,
        low_temp_f: low.min(high),
        precipitation_chance: condition.precipitation_chance,
    }
}

/// Forecast covering every day of `dates`, ascending
pub fn forecast(rng: &SharedRng, location: &str, dates: &DateRange) -> WeatherForecast {
    let days = dates.dates().into_iter().map(|date| daily(rng, date)).collect();
    WeatherForecast::new(location, days).with_source("synthetic")
}
