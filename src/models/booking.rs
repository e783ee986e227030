use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::TimeWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub service_category: String,
    pub address: String,
    pub time_window: TimeWindow,
    pub contact_info: String,
    pub notes: String,
    pub customer_name: Option<String>,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Everything the backend needs to create a booking from a finished draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub service_category: String,
    pub address: String,
    pub time_window: TimeWindow,
    pub contact_info: String,
    pub notes: String,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            BookingStatus::Cancelled => "❌",
            BookingStatus::Pending => "⏳",
            BookingStatus::Confirmed => "✅",
        }
    }
}
