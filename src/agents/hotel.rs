//! Lodging search and room bookings

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{HotelProvider, prompts};
use crate::aggregator::extract::extract_as;
use crate::llm::TextGenerator;
use crate::mock::{self, SharedRng};
use crate::models::{
    Hotel, HotelQuery, HotelSearchResponse, RoomReservation, RoomReservationRequest,
};
use crate::services::ServiceClient;

fn book_room(
    rng: &SharedRng,
    failure_rate: f64,
    request: &RoomReservationRequest,
) -> crate::Result<RoomReservation> {
    rng.maybe_fail("hotel", failure_rate, "Unable to complete reservation")?;
    Ok(RoomReservation::confirmed(request, rng.confirmation_code(8)))
}

#[derive(Debug, Clone)]
pub struct LocalHotelAgent {
    rng: SharedRng,
    search_failure_rate: f64,
    reservation_failure_rate: f64,
}

impl LocalHotelAgent {
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
impl HotelProvider for LocalHotelAgent {
    #[instrument(level = "debug", skip(self))]
    async fn search(&self, query: &HotelQuery) -> crate::Result<HotelSearchResponse> {
        self.rng
            .maybe_fail("hotel", self.search_failure_rate, "Synthetic hotel search outage")?;
        Ok(HotelSearchResponse::new(mock::lodging::search(&self.rng, query)))
    }

    async fn reserve(&self, request: &RoomReservationRequest) -> crate::Result<RoomReservation> {
        book_room(&self.rng, self.reservation_failure_rate, request)
    }
}

pub struct LlmHotelAgent {
    generator: Arc<dyn TextGenerator>,
    rng: SharedRng,
    reservation_failure_rate: f64,
}

impl LlmHotelAgent {
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

    fn parse_reply(query: &HotelQuery, reply: &str) -> HotelSearchResponse {
        let results = extract_as::<Vec<Hotel>>(reply, prompts::HOTEL_SECTION)
            .unwrap_or_default()
            .into_iter()
            .filter(|hotel| hotel.price >= 0.0)
            .filter(|hotel| query.max_price.is_none_or(|max| hotel.price <= max))
            .map(|mut hotel| {
                if hotel.location.is_empty() {
                    hotel.location.clone_from(&query.location);
                }
                hotel
            })
            .collect();
        HotelSearchResponse {
            results,
            raw_reply: Some(reply.to_string()),
        }
    }
}

#[async_trait]
impl HotelProvider for LlmHotelAgent {
    #[instrument(level = "debug", skip(self))]
    async fn search(&self, query: &HotelQuery) -> crate::Result<HotelSearchResponse> {
        let reply = self
            .generator
            .generate(prompts::HOTEL_SYSTEM, &prompts::hotel_prompt(query))
            .await?;
        let response = Self::parse_reply(query, &reply);
        debug!(count = response.results.len(), "Parsed model lodging suggestions");
        Ok(response)
    }

    async fn reserve(&self, request: &RoomReservationRequest) -> crate::Result<RoomReservation> {
        book_room(&self.rng, self.reservation_failure_rate, request)
    }
}

#[derive(Debug, Clone)]
pub struct LiveHotelAgent {
    client: ServiceClient,
}

impl LiveHotelAgent {
    #[must_use]
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HotelProvider for LiveHotelAgent {
    async fn search(&self, query: &HotelQuery) -> crate::Result<HotelSearchResponse> {
        Ok(HotelSearchResponse::new(self.client.search_hotels(query).await?))
    }

    async fn reserve(&self, request: &RoomReservationRequest) -> crate::Result<RoomReservation> {
        self.client.reserve_hotel(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query(max_price: Option<f64>) -> HotelQuery {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        HotelQuery {
            location: "Yellowstone National Park".to_string(),
            check_in: day,
            check_out: day + chrono::Duration::days(3),
            max_price,
            amenities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_local_search() {
        let agent = LocalHotelAgent::new(SharedRng::seeded(3), 0.0, 0.0);
        let response = agent.search(&query(None)).await.unwrap();
        assert_eq!(response.results.len(), 3);
        assert!(response.raw_reply.is_none());
    }

    #[tokio::test]
    async fn test_local_booking_code() {
        let agent = LocalHotelAgent::new(SharedRng::seeded(3), 0.0, 0.0);
        let request = RoomReservationRequest {
            hotel_name: "Old Faithful Inn".to_string(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 13).unwrap(),
            guests: 2,
        };
        let booking = agent.reserve(&request).await.unwrap();
        assert_eq!(booking.confirmation_code.unwrap().len(), 8);
        assert_eq!(booking.hotel, "Old Faithful Inn");
    }

    #[test]
    fn test_llm_reply_respects_price_cap() {
        let reply = r#"{"hotels": [
            {"name": "Old Faithful Inn", "location": "Old Faithful", "price": 220.0, "rating": 4.6},
            {"name": "Canyon Lodge", "location": "", "price": 180.0, "rating": 4.2, "amenities": ["Restaurant"]}
        ]}"#;
        let response = LlmHotelAgent::parse_reply(&query(Some(200.0)), reply);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "Canyon Lodge");
        assert_eq!(response.results[0].location, "Yellowstone National Park");
    }
}
