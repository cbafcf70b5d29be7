//! Weather forecasts for the resolved travel dates

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{WeatherProvider, prompts};
use crate::aggregator::extract::extract_as;
use crate::llm::TextGenerator;
use crate::mock::{self, SharedRng};
use crate::models::{DailyForecast, DateRange, WeatherForecast};
use crate::services::ServiceClient;

const LLM_ADVISORY: &str = "Based on typical weather patterns for this time of year.";
const LLM_SOURCE: &str = "Azure OpenAI weather pattern analysis";

#[derive(Debug, Clone)]
pub struct LocalWeatherAgent {
    rng: SharedRng,
    failure_rate: f64,
}

impl LocalWeatherAgent {
    #[must_use]
    pub fn new(rng: SharedRng, failure_rate: f64) -> Self {
        Self { rng, failure_rate }
    }
}

#[async_trait]
impl WeatherProvider for LocalWeatherAgent {
    #[instrument(level = "debug", skip(self))]
    async fn forecast(&self, location: &str, dates: &DateRange) -> crate::Result<WeatherForecast> {
        self.rng
            .maybe_fail("weather", self.failure_rate, "Synthetic weather outage")?;
        Ok(mock::weather::forecast(&self.rng, location, dates))
    }
}

pub struct LlmWeatherAgent {
    generator: Arc<dyn TextGenerator>,
}

impl LlmWeatherAgent {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Turn a model reply into a forecast. Without a usable `forecasts`
    /// section every day gets typical values and the start of the reply as
    /// its description.
    fn parse_reply(location: &str, dates: &DateRange, reply: &str) -> WeatherForecast {
        let days: Vec<DailyForecast> = extract_as::<Vec<DailyForecast>>(reply, prompts::WEATHER_SECTION)
            .unwrap_or_default()
            .into_iter()
            .filter(|day| dates.contains(day.date))
            .collect();

        let forecasts = if days.is_empty() {
            let summary: String = reply.trim().chars().take(100).collect();
            dates
                .dates()
                .into_iter()
                .map(|date| DailyForecast {
                    description: summary.clone(),
                    ..DailyForecast::typical(date)
                })
                .collect()
        } else {
            days
        };

        WeatherForecast {
            advisory: Some(LLM_ADVISORY.to_string()),
            raw_reply: Some(reply.to_string()),
            ..WeatherForecast::new(location, forecasts).with_source(LLM_SOURCE)
        }
    }
}

#[async_trait]
impl WeatherProvider for LlmWeatherAgent {
    #[instrument(level = "debug", skip(self))]
    async fn forecast(&self, location: &str, dates: &DateRange) -> crate::Result<WeatherForecast> {
        let reply = self
            .generator
            .generate(prompts::WEATHER_SYSTEM, &prompts::weather_prompt(location, dates))
            .await?;
        let forecast = Self::parse_reply(location, dates, &reply);
        debug!(days = forecast.forecasts.len(), "Parsed model forecast");
        Ok(forecast)
    }
}

#[derive(Debug, Clone)]
pub struct LiveWeatherAgent {
    client: ServiceClient,
}

impl LiveWeatherAgent {
    #[must_use]
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WeatherProvider for LiveWeatherAgent {
    async fn forecast(&self, location: &str, dates: &DateRange) -> crate::Result<WeatherForecast> {
        let forecast = self.client.weather(location, dates).await?;
        Ok(forecast.with_source(format!("{}/weather", self.client.base_url())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::unscored(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(), 3)
    }

    #[test]
    fn test_structured_reply() {
        let reply = r#"Expect mild days.
{"forecasts": [
  {"date": "2025-06-10", "condition": "Sunny", "high_temp_f": 72, "low_temp_f": 41, "precipitation_chance": 5},
  {"date": "2025-06-11", "condition": "Rain", "high_temp_f": 60, "low_temp_f": 39, "precipitation_chance": 80},
  {"date": "2025-07-01", "condition": "Sunny", "high_temp_f": 80, "low_temp_f": 50, "precipitation_chance": 0}
]}"#;
        let forecast = LlmWeatherAgent::parse_reply("Yellowstone", &range(), reply);
        assert_eq!(forecast.forecasts.len(), 2);
        assert_eq!(forecast.forecasts[1].condition, "Rain");
        assert_eq!(forecast.raw_reply.as_deref(), Some(reply));
    }

    #[test]
    fn test_free_text_reply_defaults_each_day() {
        let reply = "Early June is cool with afternoon storms likely. Pack layers.";
        let forecast = LlmWeatherAgent::parse_reply("Yellowstone", &range(), reply);
        assert_eq!(forecast.forecasts.len(), 3);
        assert!(forecast.forecasts.iter().all(|d| d.description == reply));
        assert!(forecast.forecasts.iter().all(|d| d.high_temp_f == 75));
        assert_eq!(forecast.data_source.as_deref(), Some(LLM_SOURCE));
    }

    #[tokio::test]
    async fn test_local_agent_covers_range() {
        let agent = LocalWeatherAgent::new(SharedRng::seeded(2), 0.0);
        let forecast = agent.forecast("Yellowstone", &range()).await.unwrap();
        assert_eq!(forecast.forecasts.len(), 3);
    }

    #[tokio::test]
    async fn test_local_agent_failure_rate() {
        let agent = LocalWeatherAgent::new(SharedRng::seeded(2), 1.0);
        assert!(agent.forecast("Yellowstone", &range()).await.is_err());
    }
}
