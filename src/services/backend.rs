use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Booking, BookingStatus, NewBooking, TimeWindow};

pub const BOOKING_NOT_FOUND: &str = "Booking not found";

/// Where bookings live. The conversation never talks to this directly; the action runner
/// and HTTP handlers do.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn create_booking(&self, booking: &NewBooking) -> anyhow::Result<Booking>;
    async fn cancel_booking(&self, id: u64) -> anyhow::Result<Booking>;
    async fn reschedule_booking(&self, id: u64, window: &TimeWindow) -> anyhow::Result<Booking>;
    async fn get_booking_details(&self, id: u64) -> anyhow::Result<Booking>;
    async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
    ) -> anyhow::Result<Vec<Booking>>;
}

pub struct SqliteBookingBackend {
    db: Arc<Mutex<Connection>>,
}

impl SqliteBookingBackend {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    fn existing(conn: &Connection, id: u64) -> anyhow::Result<Booking> {
        queries::get_booking_by_id(conn, id)?.ok_or_else(|| anyhow!(BOOKING_NOT_FOUND))
    }
}

#[async_trait]
impl BookingBackend for SqliteBookingBackend {
    async fn create_booking(&self, booking: &NewBooking) -> anyhow::Result<Booking> {
        let conn = self.conn()?;
        let created = queries::create_booking(&conn, booking)?;
        tracing::info!(
            booking_id = created.id,
            service = %created.service_category,
            "booking created"
        );
        Ok(created)
    }

    async fn cancel_booking(&self, id: u64) -> anyhow::Result<Booking> {
        let conn = self.conn()?;
        let booking = Self::existing(&conn, id)?;
        if booking.status == BookingStatus::Cancelled {
            bail!("Booking is already cancelled");
        }

        queries::update_booking_status(&conn, id, BookingStatus::Cancelled)?;
        tracing::info!(booking_id = id, "booking cancelled");
        Self::existing(&conn, id)
    }

    async fn reschedule_booking(&self, id: u64, window: &TimeWindow) -> anyhow::Result<Booking> {
        let conn = self.conn()?;
        let booking = Self::existing(&conn, id)?;
        if booking.status == BookingStatus::Cancelled {
            bail!("Cannot reschedule a cancelled booking");
        }

        queries::update_booking_window(&conn, id, window)?;
        tracing::info!(booking_id = id, start = window.start, "booking rescheduled");
        Self::existing(&conn, id)
    }

    async fn get_booking_details(&self, id: u64) -> anyhow::Result<Booking> {
        let conn = self.conn()?;
        Self::existing(&conn, id)
    }

    async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
    ) -> anyhow::Result<Vec<Booking>> {
        let conn = self.conn()?;
        queries::get_all_bookings(&conn, status.map(|s| s.as_str()), limit)
    }
}
