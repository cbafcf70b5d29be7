//! Travel date recommendations

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, instrument};

use super::{CalendarProvider, prompts};
use crate::aggregator::extract::extract_as;
use crate::llm::TextGenerator;
use crate::mock::SharedRng;
use crate::models::{CalendarQuery, DateRange, DateRecommendations};

/// Number of date ranges returned
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Random variation applied on top of the seasonal base scores
const JITTER: f64 = 0.1;

/// Candidate start dates: every day whose trip still ends inside the window,
/// restricted to the preferred weekday when one is given
#[must_use]
pub fn candidate_starts(query: &CalendarQuery) -> Vec<NaiveDate> {
    let duration = i64::from(query.duration_days.max(1));
    let last_start = query.window_end - Duration::days(duration - 1);
    query
        .window_start
        .iter_days()
        .take_while(|day| *day <= last_start)
        .filter(|day| {
            query
                .preferred_start_day
                .is_none_or(|weekday| day.weekday() == weekday)
        })
        .collect()
}

/// Best first: composite score descending, earliest start on ties, at most three
#[must_use]
pub fn rank(mut candidates: Vec<DateRange>) -> Vec<DateRange> {
    candidates.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then_with(|| a.start_date.cmp(&b.start_date))
    });
    candidates.truncate(MAX_RECOMMENDATIONS);
    candidates
}

fn is_holiday_period(date: NaiveDate) -> bool {
    let (month, day) = (date.month(), date.day());
    (month == 5 && day >= 25) || (month == 7 && day <= 7) || (month == 9 && day <= 7)
}

fn weather_score(rng: &SharedRng, start: NaiveDate) -> f64 {
    let base = match start.month() {
        7 | 8 => rng.uniform(0.8, 1.0),
        6 | 9 => rng.uniform(0.6, 0.9),
        5 | 10 => rng.uniform(0.3, 0.7),
        _ => rng.uniform(0.1, 0.5),
    };
    (base + rng.uniform(-JITTER, JITTER)).clamp(0.0, 1.0)
}

/// Higher means less crowded
fn crowd_score(rng: &SharedRng, start: NaiveDate) -> f64 {
    let mut base = match start.month() {
        7 | 8 => rng.uniform(0.2, 0.5),
        6 | 9 => rng.uniform(0.5, 0.8),
        _ => rng.uniform(0.7, 1.0),
    };
    if matches!(start.weekday(), Weekday::Sat | Weekday::Sun) {
        base -= 0.1;
    }
    if is_holiday_period(start) {
        base -= 0.2;
    }
    (base + rng.uniform(-JITTER, JITTER)).clamp(0.1, 1.0)
}

fn wildlife_score(rng: &SharedRng, start: NaiveDate) -> f64 {
    let base = match start.month() {
        5 | 9 | 10 => rng.uniform(0.7, 1.0),
        6..=8 => rng.uniform(0.5, 0.8),
        _ => rng.uniform(0.3, 0.7),
    };
    (base + rng.uniform(-JITTER, JITTER)).clamp(0.0, 1.0)
}

/// Plain language summary of the top recommendation
#[must_use]
pub fn reasoning(ranges: &[DateRange]) -> String {
    let Some(top) = ranges.first() else {
        return "No suitable dates found within your travel window.".to_string();
    };

    let mut reasons = vec![
        match top.weather_score {
            s if s > 0.7 => "excellent weather conditions",
            s if s > 0.5 => "good weather conditions",
            _ => "acceptable weather conditions",
        },
        match top.crowd_score {
            s if s > 0.7 => "low crowd levels",
            s if s > 0.5 => "moderate crowd levels",
            _ => "higher crowd levels",
        },
    ];
    if top.wildlife_score > 0.7 {
        reasons.push("excellent wildlife viewing opportunities");
    } else if top.wildlife_score > 0.5 {
        reasons.push("good wildlife viewing opportunities");
    }

    let last = reasons.pop().unwrap_or_default();
    format!(
        "The recommended dates in {month} offer {head} and {last}. \
This combination provides the best overall experience based on your trip parameters.",
        month = top.start_date.format("%B"),
        head = reasons.join(", "),
    )
}

/// Seasonal scoring of every candidate window
#[derive(Debug, Clone)]
pub struct LocalCalendarAgent {
    rng: SharedRng,
}

impl LocalCalendarAgent {
    #[must_use]
    pub fn new(rng: SharedRng) -> Self {
        Self { rng }
    }

    #[must_use]
    pub fn optimize(&self, query: &CalendarQuery) -> DateRecommendations {
        let candidates = candidate_starts(query)
            .into_iter()
            .map(|start| {
                DateRange::scored(
                    start,
                    query.duration_days,
                    weather_score(&self.rng, start),
                    crowd_score(&self.rng, start),
                    wildlife_score(&self.rng, start),
                )
            })
            .collect();
        let date_ranges = rank(candidates);
        DateRecommendations {
            reasoning: reasoning(&date_ranges),
            date_ranges,
            degraded: false,
        }
    }
}

#[async_trait]
impl CalendarProvider for LocalCalendarAgent {
    #[instrument(level = "debug", skip(self))]
    async fn recommend_dates(&self, query: &CalendarQuery) -> crate::Result<DateRecommendations> {
        let recommendations = self.optimize(query);
        debug!(count = recommendations.date_ranges.len(), "Scored travel windows");
        Ok(recommendations)
    }
}

/// Dates suggested by the language model
pub struct LlmCalendarAgent {
    generator: Arc<dyn TextGenerator>,
}

impl LlmCalendarAgent {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Keep suggestions that fit the request, rebuilt so their length and
    /// composite score are consistent
    fn sanitize(query: &CalendarQuery, suggested: Vec<DateRange>) -> Vec<DateRange> {
        let allowed = candidate_starts(query);
        let candidates = suggested
            .into_iter()
            .filter(|range| allowed.contains(&range.start_date))
            .map(|range| {
                DateRange::scored(
                    range.start_date,
                    query.duration_days,
                    range.weather_score.clamp(0.0, 1.0),
                    range.crowd_score.clamp(0.0, 1.0),
                    range.wildlife_score.clamp(0.0, 1.0),
                )
            })
            .collect();
        rank(candidates)
    }
}

#[async_trait]
impl CalendarProvider for LlmCalendarAgent {
    #[instrument(level = "debug", skip(self))]
    async fn recommend_dates(&self, query: &CalendarQuery) -> crate::Result<DateRecommendations> {
        let reply = self
            .generator
            .generate(prompts::CALENDAR_SYSTEM, &prompts::calendar_prompt(query))
            .await?;

        let suggested: Vec<DateRange> =
            extract_as(&reply, prompts::CALENDAR_SECTION).unwrap_or_default();
        let date_ranges = Self::sanitize(query, suggested);
        debug!(count = date_ranges.len(), "Extracted suggested travel windows");

        Ok(DateRecommendations {
            degraded: date_ranges.is_empty(),
            date_ranges,
            reasoning: reply.trim().to_string(),
        })
    }
}
