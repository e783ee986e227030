use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, ConversationState, NewBooking, TimeWindow};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The single session the chat surface serves.
pub const SESSION_KEY: &str = "servicebot_conversation";
pub const SESSION_VERSION: &str = "2.0";

/// Predates intent tracking: no active intent, language, target id or reschedule time.
const LEGACY_SESSION_VERSION: &str = "1.0";

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Sessions ──

pub fn save_session(conn: &Connection, key: &str, state: &ConversationState) -> anyhow::Result<()> {
    let state_json = serde_json::to_string(state)?;

    conn.execute(
        "INSERT INTO sessions (key, version, state, saved_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(key) DO UPDATE SET
           version = excluded.version,
           state = excluded.state,
           saved_at = excluded.saved_at",
        params![key, SESSION_VERSION, state_json, now_str()],
    )?;
    Ok(())
}

/// Restores a saved session. Stale, unreadable or unknown-version records are deleted and
/// reported as absent so the caller starts fresh.
pub fn load_session(
    conn: &Connection,
    key: &str,
    max_age: Duration,
) -> anyhow::Result<Option<ConversationState>> {
    let result = conn.query_row(
        "SELECT version, state, saved_at FROM sessions WHERE key = ?1",
        params![key],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    );

    let (version, state_json, saved_at) = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let fresh = NaiveDateTime::parse_from_str(&saved_at, TS_FORMAT)
        .is_ok_and(|saved| Utc::now().naive_utc() - saved <= max_age);
    if !fresh {
        tracing::warn!(key, saved_at = %saved_at, "discarding stale session");
        clear_session(conn, key)?;
        return Ok(None);
    }

    let state = match serde_json::from_str::<ConversationState>(&state_json) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable session");
            clear_session(conn, key)?;
            return Ok(None);
        }
    };

    match version.as_str() {
        SESSION_VERSION => Ok(Some(state)),
        LEGACY_SESSION_VERSION => {
            tracing::info!(key, from = %version, to = SESSION_VERSION, "migrating session");
            Ok(Some(ConversationState {
                active_intent: None,
                detected_language: None,
                target_booking_id: None,
                reschedule_time: None,
                ..state
            }))
        }
        other => {
            tracing::warn!(key, version = other, "discarding session with unknown version");
            clear_session(conn, key)?;
            Ok(None)
        }
    }
}

pub fn clear_session(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM sessions WHERE key = ?1", params![key])?;
    Ok(())
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<Booking> {
    let now = now_str();

    conn.execute(
        "INSERT INTO bookings (service_category, address, window_start, window_end, contact_info, notes, customer_name, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            booking.service_category,
            booking.address,
            booking.time_window.start,
            booking.time_window.end,
            booking.contact_info,
            booking.notes,
            booking.customer_name,
            BookingStatus::Confirmed.as_str(),
            now,
        ],
    )?;

    let id = u64::try_from(conn.last_insert_rowid())?;
    get_booking_by_id(conn, id)?
        .ok_or_else(|| anyhow::anyhow!("booking {id} vanished after insert"))
}

pub fn get_booking_by_id(conn: &Connection, id: u64) -> anyhow::Result<Option<Booking>> {
    let Ok(id) = i64::try_from(id) else {
        return Ok(None);
    };

    let result = conn.query_row(
        "SELECT id, service_category, address, window_start, window_end, contact_info, notes, customer_name, status, created_at, updated_at \
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_category, address, window_start, window_end, contact_info, notes, customer_name, status, created_at, updated_at \
         FROM bookings WHERE (?1 IS NULL OR status = ?1) ORDER BY window_start DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![status_filter, limit], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: u64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), i64::try_from(id)?],
    )?;
    Ok(count > 0)
}

pub fn update_booking_window(
    conn: &Connection,
    id: u64,
    window: &TimeWindow,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET window_start = ?1, window_end = ?2, updated_at = ?3 WHERE id = ?4",
        params![window.start, window.end, now_str(), i64::try_from(id)?],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: i64 = row.get(0)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Booking {
        id: u64::try_from(id)?,
        service_category: row.get(1)?,
        address: row.get(2)?,
        time_window: TimeWindow {
            start: row.get(3)?,
            end: row.get(4)?,
        },
        contact_info: row.get(5)?,
        notes: row.get(6)?,
        customer_name: row.get(7)?,
        status: BookingStatus::parse(&status_str),
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}
