//! Hotel and restaurant booking requests and confirmations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomReservationRequest {
    pub hotel_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_party_size")]
    pub guests: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReservationRequest {
    pub restaurant_name: String,
    pub date: NaiveDate,
    /// Local time, e.g. "19:00"
    pub time: String,
    #[serde(default = "default_party_size")]
    pub party_size: u32,
}

fn default_party_size() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomReservation {
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    pub hotel: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RoomReservation {
    #[must_use]
    pub fn confirmed(request: &RoomReservationRequest, code: String) -> Self {
        Self {
            status: ReservationStatus::Confirmed,
            confirmation_code: Some(code),
            hotel: request.hotel_name.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(request: &RoomReservationRequest, message: impl Into<String>) -> Self {
        Self {
            status: ReservationStatus::Failed,
            confirmation_code: None,
            hotel: request.hotel_name.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReservation {
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    pub restaurant: String,
    pub date: NaiveDate,
    pub time: String,
    pub party_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TableReservation {
    #[must_use]
    pub fn confirmed(request: &TableReservationRequest, code: String) -> Self {
        Self {
            status: ReservationStatus::Confirmed,
            confirmation_code: Some(code),
            restaurant: request.restaurant_name.clone(),
            date: request.date,
            time: request.time.clone(),
            party_size: request.party_size,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(request: &TableReservationRequest, message: impl Into<String>) -> Self {
        Self {
            status: ReservationStatus::Failed,
            confirmation_code: None,
            restaurant: request.restaurant_name.clone(),
            date: request.date,
            time: request.time.clone(),
            party_size: request.party_size,
            message: Some(message.into()),
        }
    }
}
