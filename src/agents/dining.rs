//! Restaurant recommendations for the route's stops and table bookings

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use super::{DiningProvider, prompts};
use crate::aggregator::extract::extract_as;
use crate::llm::TextGenerator;
use crate::mock::{self, SharedRng};
use crate::models::{
    DiningQuery, DiningRecommendations, LocationDining, TableReservation,
    TableReservationRequest,
};
use crate::services::ServiceClient;

/// Synthetic table booking shared by the local and LLM strategies
fn book_table(
    rng: &SharedRng,
    failure_rate: f64,
    request: &TableReservationRequest,
) -> crate::Result<TableReservation> {
    rng.maybe_fail("restaurant", failure_rate, "No availability for selected time")?;
    Ok(TableReservation::confirmed(request, rng.confirmation_code(6)))
}

#[derive(Debug, Clone)]
pub struct LocalDiningAgent {
    rng: SharedRng,
    search_failure_rate: f64,
    reservation_failure_rate: f64,
}

impl LocalDiningAgent {
    #[must_use]
    pub fn new(rng: SharedRng, search_failure_rate: f64, reservation_failure_rate: f64) -> Self {
        Self {
            rng,
            search_failure_rate,
            reservation_failure_rate,
        }
    }
}

#[async_trait]
impl DiningProvider for LocalDiningAgent {
    #[instrument(level = "debug", skip(self))]
    async fn recommend(&self, query: &DiningQuery) -> crate::Result<DiningRecommendations> {
        self.rng.maybe_fail(
            "restaurant",
            self.search_failure_rate,
            "Synthetic restaurant search outage",
        )?;
        let locations = query
            .locations
            .iter()
            .map(|location| LocationDining {
                location: location.clone(),
                restaurants: mock::dining::search(
                    &self.rng,
                    location,
                    &query.cuisine_preferences,
                    Some(query.price_level),
                ),
            })
            .collect();
        Ok(DiningRecommendations::new(locations))
    }

    async fn reserve(&self, request: &TableReservationRequest) -> crate::Result<TableReservation> {
        book_table(&self.rng, self.reservation_failure_rate, request)
    }
}

pub struct LlmDiningAgent {
    generator: Arc<dyn TextGenerator>,
    rng: SharedRng,
    reservation_failure_rate: f64,
}

impl LlmDiningAgent {
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        rng: SharedRng,
        reservation_failure_rate: f64,
    ) -> Self {
        Self {
            generator,
            rng,
            reservation_failure_rate,
        }
    }

    /// One entry per requested stop, in request order. Suggestions for places
    /// that were not asked about are dropped.
    fn parse_reply(query: &DiningQuery, reply: &str) -> DiningRecommendations {
        let suggested: Vec<LocationDining> =
            extract_as(reply, prompts::DINING_SECTION).unwrap_or_default();

        let locations = query
            .locations
            .iter()
            .map(|location| {
                let restaurants = suggested
                    .iter()
                    .find(|entry| entry.location.eq_ignore_ascii_case(location))
                    .map(|entry| entry.restaurants.clone())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|mut restaurant| {
                        if restaurant.location.is_empty() {
                            restaurant.location.clone_from(location);
                        }
                        restaurant
                    })
                    .collect();
                LocationDining {
                    location: location.clone(),
                    restaurants,
                }
            })
            .collect();

        DiningRecommendations {
            locations,
            raw_reply: Some(reply.to_string()),
        }
    }
}

#[async_trait]
impl DiningProvider for LlmDiningAgent {
    #[instrument(level = "debug", skip(self))]
    async fn recommend(&self, query: &DiningQuery) -> crate::Result<DiningRecommendations> {
        let reply = self
            .generator
            .generate(prompts::DINING_SYSTEM, &prompts::dining_prompt(query))
            .await?;
        let recommendations = Self::parse_reply(query, &reply);
        debug!(empty = recommendations.is_empty(), "Parsed model dining suggestions");
        Ok(recommendations)
    }

    async fn reserve(&self, request: &TableReservationRequest) -> crate::Result<TableReservation> {
        book_table(&self.rng, self.reservation_failure_rate, request)
    }
}

#[derive(Debug, Clone)]
pub struct LiveDiningAgent {
    client: ServiceClient,
}

impl LiveDiningAgent {
    #[must_use]
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DiningProvider for LiveDiningAgent {
    /// Searches every stop concurrently. A stop whose search fails gets an
    /// empty list; the call fails only when every search failed.
    #[instrument(level = "debug", skip(self))]
    async fn recommend(&self, query: &DiningQuery) -> crate::Result<DiningRecommendations> {
        let searches = query.locations.iter().map(|location| {
            self.client
                .search_restaurants(location, &query.cuisine_preferences, query.price_level)
        });
        let results = join_all(searches).await;

        let mut first_error = None;
        let mut failures = 0;
        let mut locations = Vec::with_capacity(results.len());
        for (location, result) in query.locations.iter().zip(results) {
            let restaurants = match result {
                Ok(restaurants) => restaurants,
                Err(err) => {
                    warn!(%location, error = %err, "Restaurant search failed");
                    failures += 1;
                    first_error.get_or_insert(err);
                    Vec::new()
                }
            };
            locations.push(LocationDining {
                location: location.clone(),
                restaurants,
            });
        }

        match first_error {
            Some(err) if failures == query.locations.len() => Err(err),
            _ => Ok(DiningRecommendations::new(locations)),
        }
    }

    async fn reserve(&self, request: &TableReservationRequest) -> crate::Result<TableReservation> {
        self.client.reserve_restaurant(request).await
    }
}
