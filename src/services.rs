//! HTTP client for the weather, hotel, restaurant and route backends

use std::time::Duration;

use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::PlannerError;
use crate::config::ServicesConfig;
use crate::models::{
    DateRange, Hotel, HotelQuery, HotelSearchResponse, PriceLevel, Restaurant,
    RestaurantSearchResponse, RoomReservation, RoomReservationRequest, RoutePlan, RouteQuery,
    TableReservation, TableReservationRequest, WeatherForecast,
};

/// Build an HTTP client that retries transient failures (connection errors,
/// timeouts, 5xx) with exponential backoff
pub fn http_client(timeout_seconds: u32, max_retries: u32) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(u64::from(timeout_seconds)))
        .build()
        .map_err(|e| PlannerError::configuration(format!("Failed to build HTTP client: {e}")))?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Client for the service backends used by the live strategy
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
    http: ClientWithMiddleware,
}

impl ServiceClient {
    pub fn from_config(config: &ServicesConfig) -> crate::Result<Self> {
        Self::new(&config.base_url, config.timeout_seconds, config.max_retries)
    }

    pub fn new(base_url: &str, timeout_seconds: u32, max_retries: u32) -> crate::Result<Self> {
        Url::parse(base_url).map_err(|e| {
            PlannerError::configuration(format!("Invalid service base URL '{base_url}': {e}"))
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout_seconds, max_retries)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> crate::Result<Url> {
        Url::parse_with_params(&format!("{}{path}", self.base_url), params)
            .map_err(|e| PlannerError::general(format!("Invalid request URL for {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        service: &str,
        request: reqwest_middleware::RequestBuilder,
    ) -> crate::Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(service, status, response).await);
        }
        response.json::<T>().await.map_err(|e| {
            PlannerError::downstream(service, format!("Unexpected response body: {e}"))
        })
    }

    async fn status_error(service: &str, status: StatusCode, response: reqwest::Response) -> PlannerError {
        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        PlannerError::downstream(service, format!("{status}: {detail}"))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn weather(&self, location: &str, dates: &DateRange) -> crate::Result<WeatherForecast> {
        let url = self.url(
            &format!("/weather/{}", urlencoding::encode(location)),
            &[
                ("start_date", dates.start_date.to_string()),
                ("end_date", dates.end_date.to_string()),
            ],
        )?;
        debug!(%url, "Requesting forecast");
        self.send("weather", self.http.get(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn search_hotels(&self, query: &HotelQuery) -> crate::Result<Vec<Hotel>> {
        let mut params = vec![
            ("location", query.location.clone()),
            ("check_in", query.check_in.to_string()),
            ("check_out", query.check_out.to_string()),
        ];
        if let Some(max_price) = query.max_price {
            params.push(("max_price", max_price.to_string()));
        }
        params.extend(query.amenities.iter().map(|a| ("amenities", a.clone())));

        let url = self.url("/hotels/search", &params)?;
        let response: HotelSearchResponse = self.send("hotel", self.http.get(url)).await?;
        Ok(response.results)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn reserve_hotel(
        &self,
        request: &RoomReservationRequest,
    ) -> crate::Result<RoomReservation> {
        let url = self.url(
            "/hotels/reserve",
            &[
                ("hotel_name", request.hotel_name.clone()),
                ("check_in", request.check_in.to_string()),
                ("check_out", request.check_out.to_string()),
                ("guests", request.guests.to_string()),
            ],
        )?;
        self.send("hotel", self.http.post(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn search_restaurants(
        &self,
        location: &str,
        cuisines: &[String],
        price_level: PriceLevel,
    ) -> crate::Result<Vec<Restaurant>> {
        let mut params = vec![
            ("location", location.to_string()),
            ("price_level", price_level.to_string()),
        ];
        params.extend(cuisines.iter().map(|c| ("cuisine", c.clone())));

        let url = self.url("/restaurants/search", &params)?;
        let response: RestaurantSearchResponse = self.send("restaurant", self.http.get(url)).await?;
        Ok(response.results)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn reserve_restaurant(
        &self,
        request: &TableReservationRequest,
    ) -> crate::Result<TableReservation> {
        let url = self.url(
            "/restaurants/reserve",
            &[
                ("restaurant_name", request.restaurant_name.clone()),
                ("date", request.date.to_string()),
                ("time", request.time.clone()),
                ("party_size", request.party_size.to_string()),
            ],
        )?;
        self.send("restaurant", self.http.post(url)).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn plan_route(&self, query: &RouteQuery) -> crate::Result<RoutePlan> {
        let mut params = vec![
            ("origin", query.origin.clone()),
            ("destination", query.destination.clone()),
        ];
        params.extend(query.waypoints.iter().map(|w| ("waypoints", w.clone())));

        let url = self.url("/routes/plan", &params)?;
        let mut plan: RoutePlan = self.send("route", self.http.get(url)).await?;
        if plan.origin.is_empty() {
            plan.origin.clone_from(&query.origin);
        }
        if plan.destination.is_empty() {
            plan.destination.clone_from(&query.destination);
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = ServiceClient::new("not a url", 5, 0).unwrap_err();
        assert!(matches!(err, PlannerError::Configuration { .. }));
    }

    #[test]
    fn test_url_encodes_path_and_params() {
        let client = ServiceClient::new("http://localhost:8000/", 5, 0).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");

        let url = client
            .url(
                &format!("/weather/{}", urlencoding::encode("West Yellowstone")),
                &[("start_date", "2025-06-01".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/weather/West%20Yellowstone?start_date=2025-06-01"
        );
    }

    #[test]
    fn test_repeated_params() {
        let client = ServiceClient::new("http://localhost:8000", 5, 0).unwrap();
        let url = client
            .url(
                "/routes/plan",
                &[
                    ("waypoints", "Cody".to_string()),
                    ("waypoints", "Old Faithful".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(url.query(), Some("waypoints=Cody&waypoints=Old+Faithful"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_downstream_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let client = ServiceClient::new("http://127.0.0.1:9", 1, 0).unwrap();
        let range = DateRange::unscored(chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 2);
        let err = client.weather("Yellowstone", &range).await.unwrap_err();
        assert!(matches!(err, PlannerError::DownstreamUnavailable { .. }));
    }
}
