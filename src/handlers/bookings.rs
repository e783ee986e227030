use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::conversation::format_booking_id;
use crate::services::validators::validate_booking_id;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    service_category: String,
    address: String,
    window_start: String,
    window_end: String,
    contact_info: String,
    notes: String,
    customer_name: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: format_booking_id(b.id),
            service_category: b.service_category,
            address: b.address,
            window_start: Local.timestamp_nanos(b.time_window.start).to_rfc3339(),
            window_end: Local.timestamp_nanos(b.time_window.end).to_rfc3339(),
            contact_info: b.contact_info,
            notes: b.notes,
            customer_name: b.customer_name,
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(s @ ("pending" | "confirmed" | "cancelled")) => Some(BookingStatus::parse(s)),
        Some(other) => {
            return Err(AppError::BadRequest(format!("unknown status: {other}")));
        }
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let bookings = state.backend.list_bookings(status, limit).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let id = validate_booking_id(&raw_id).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let booking = {
        let conn = state.conn()?;
        queries::get_booking_by_id(&conn, id)?
    };

    booking
        .map(|b| Json(BookingResponse::from(b)))
        .ok_or_else(|| AppError::NotFound(format!("booking {}", format_booking_id(id))))
}
