use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};

use crate::models::{TimePreference, TimeWindow};

/// A rejected chat input. The display text is shown to the user as the re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Address cannot be empty")]
    EmptyAddress,

    #[error("Please provide a complete address")]
    IncompleteAddress,

    #[error("Contact information cannot be empty")]
    EmptyContact,

    #[error("Please provide a valid email or phone number")]
    InvalidContact,

    #[error("Please select a valid time window (morning, afternoon, evening, or asap)")]
    InvalidTimeWindow,

    #[error("Please provide a valid booking ID (e.g., BK10245 or 10245)")]
    MissingBookingId,

    #[error("Booking ID must be a positive number")]
    NonPositiveBookingId,

    #[error("Invalid booking ID format")]
    InvalidBookingId,
}

const MIN_ADDRESS_LEN: usize = 5;
const MIN_PHONE_RUN: usize = 7;

pub fn validate_address(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    if trimmed.chars().count() < MIN_ADDRESS_LEN {
        return Err(ValidationError::IncompleteAddress);
    }
    Ok(trimmed.to_string())
}

pub fn validate_contact_info(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContact);
    }
    if !looks_like_email(trimmed) && !looks_like_phone(trimmed) {
        return Err(ValidationError::InvalidContact);
    }
    Ok(trimmed.to_string())
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot in the domain must have text on both sides.
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// A run of at least seven digits, spaces, dashes, parentheses or plus signs.
fn looks_like_phone(s: &str) -> bool {
    let mut run = 0;
    for c in s.chars() {
        if c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')' | '+') {
            run += 1;
            if run >= MIN_PHONE_RUN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

pub fn validate_time_window(input: &str) -> Result<TimeWindow, ValidationError> {
    validate_time_window_at(input, &Local::now())
}

/// Resolves a time-window token against tomorrow's date in `now`'s time zone.
pub fn validate_time_window_at<Tz: TimeZone>(
    input: &str,
    now: &DateTime<Tz>,
) -> Result<TimeWindow, ValidationError> {
    let pref = TimePreference::parse(input).ok_or(ValidationError::InvalidTimeWindow)?;
    let (start_hour, end_hour) = pref.hours();

    let tomorrow = now.date_naive() + Duration::days(1);
    let tz = now.timezone();

    let at_hour = |hour: u32| -> Option<i64> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&tomorrow.and_time(time))
            .earliest()?
            .timestamp_nanos_opt()
    };

    match (at_hour(start_hour), at_hour(end_hour)) {
        (Some(start), Some(end)) => Ok(TimeWindow { start, end }),
        _ => Err(ValidationError::InvalidTimeWindow),
    }
}

pub fn validate_booking_id(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    let rest = trimmed
        .strip_prefix("BK")
        .or_else(|| trimmed.strip_prefix("bk"))
        .unwrap_or(trimmed);

    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ValidationError::MissingBookingId);
    }

    match digits.parse::<u64>() {
        Ok(0) => Err(ValidationError::NonPositiveBookingId),
        Ok(id) => Ok(id),
        Err(_) => Err(ValidationError::InvalidBookingId),
    }
}
