// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::WorkerId;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Request status string is not recognised.
    InvalidRequestStatus(String),
    /// Targeting scope string is not recognised.
    InvalidScope(String),
    /// Offer state string is not recognised.
    InvalidOfferState(String),
    /// Role string is not recognised.
    InvalidRole(String),
    /// Display name is empty or invalid.
    InvalidDisplayName(String),
    /// Location name is empty or invalid.
    InvalidLocationName(String),
    /// The shift date lies before the current local date.
    ShiftDateInPast {
        /// The requested shift date.
        shift_date: time::Date,
        /// The local date the request was evaluated on.
        today: time::Date,
    },
    /// The worker has no shift on the requested date.
    NotScheduled {
        /// The worker who raised the request.
        worker: WorkerId,
        /// The date without a shift.
        shift_date: time::Date,
    },
    /// A worker tried to act on their own request in a role that excludes it.
    SelfSubstitution {
        /// The worker in question.
        worker: WorkerId,
    },
    /// Notification was attempted before a targeting scope was chosen.
    ScopeNotSet,
    /// A request was refused without stating why.
    MissingRejectReason,
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a timestamp from string.
    TimestampParseError {
        /// The invalid timestamp string.
        value: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestStatus(value) => write!(f, "Invalid request status: {value}"),
            Self::InvalidScope(value) => write!(f, "Invalid targeting scope: {value}"),
            Self::InvalidOfferState(value) => write!(f, "Invalid offer state: {value}"),
            Self::InvalidRole(value) => write!(f, "Invalid role: {value}"),
            Self::InvalidDisplayName(msg) => write!(f, "Invalid display name: {msg}"),
            Self::InvalidLocationName(msg) => write!(f, "Invalid location name: {msg}"),
            Self::ShiftDateInPast { shift_date, today } => {
                write!(
                    f,
                    "Shift date {shift_date} is in the past (today is {today})"
                )
            }
            Self::NotScheduled { worker, shift_date } => {
                write!(f, "Worker {worker} is not scheduled to work on {shift_date}")
            }
            Self::SelfSubstitution { worker } => {
                write!(f, "Worker {worker} cannot substitute for their own shift")
            }
            Self::ScopeNotSet => write!(f, "A targeting scope must be set first"),
            Self::MissingRejectReason => write!(f, "A reason is required to reject a request"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimestampParseError { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
