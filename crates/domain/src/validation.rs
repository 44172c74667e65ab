// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Returns the calendar date at `now` as seen from the given UTC offset.
///
/// Past-date and urgency checks are always made against the local date of
/// the retail sites, never against the UTC date.
#[must_use]
pub fn local_date(now: OffsetDateTime, offset: UtcOffset) -> Date {
    now.to_offset(offset).date()
}

/// Validates that a shift date is not in the past.
///
/// # Arguments
///
/// * `shift_date` - The date of the shift to be covered
/// * `today` - The current local date
///
/// # Errors
///
/// Returns `DomainError::ShiftDateInPast` if `shift_date` is before `today`.
pub fn validate_shift_date(shift_date: Date, today: Date) -> Result<(), DomainError> {
    if shift_date < today {
        return Err(DomainError::ShiftDateInPast { shift_date, today });
    }
    Ok(())
}

/// Returns true if a request for `shift_date` raised on `today` is urgent.
#[must_use]
pub fn is_urgent(shift_date: Date, today: Date) -> bool {
    shift_date == today
}

/// Validates a worker display name.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn validate_display_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidDisplayName(String::from(
            "Display name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a location name.
///
/// # Errors
///
/// Returns an error if the name is blank.
pub fn validate_location_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidLocationName(String::from(
            "Location name cannot be empty",
        )));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` shift date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_shift_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}
