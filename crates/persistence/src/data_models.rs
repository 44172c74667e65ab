// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes and their mapping onto domain types.
//!
//! Dates are stored as `YYYY-MM-DD` text so that they sort correctly,
//! timestamps as RFC 3339 text, and booleans as `0`/`1` integers.

use diesel::prelude::*;
use shift_swap_domain::{
    CandidateOffer, ChannelRef, DomainError, Location, LocationId, OfferId, OfferState,
    RequestId, RequestStatus, Role, Scope, SubstitutionRequest, Worker, WorkerId,
    parse_shift_date,
};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{candidate_offers, locations, substitution_requests, workers};
use crate::error::PersistenceError;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented in RFC 3339.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::CorruptRow(format!("unformattable timestamp: {e}")))
}

/// Formats a shift date for storage.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn format_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::CorruptRow(format!("unformattable date: {e}")))
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        PersistenceError::CorruptRow(
            DomainError::TimestampParseError {
                value: value.to_string(),
                error: e.to_string(),
            }
            .to_string(),
        )
    })
}

fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    parse_shift_date(value).map_err(|e| PersistenceError::CorruptRow(e.to_string()))
}

fn parse_column<T>(value: &str) -> Result<T, PersistenceError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    value
        .parse::<T>()
        .map_err(|e| PersistenceError::CorruptRow(e.to_string()))
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = substitution_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RequestRow {
    pub request_id: i64,
    pub requester_id: i64,
    pub location_id: i64,
    pub shift_date: String,
    pub status: String,
    pub urgent: i32,
    pub scope: Option<String>,
    pub proposed_replacement_id: Option<i64>,
    pub confirmed_replacement_id: Option<i64>,
    pub resolved_by_id: Option<i64>,
    pub resolved_at: Option<String>,
    pub reject_reason: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<RequestRow> for SubstitutionRequest {
    type Error = PersistenceError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RequestId::new(row.request_id),
            requester: WorkerId::new(row.requester_id),
            location: LocationId::new(row.location_id),
            shift_date: parse_date(&row.shift_date)?,
            status: parse_column::<RequestStatus>(&row.status)?,
            urgent: row.urgent != 0,
            scope: row.scope.as_deref().map(parse_column::<Scope>).transpose()?,
            proposed_replacement: row.proposed_replacement_id.map(WorkerId::new),
            confirmed_replacement: row.confirmed_replacement_id.map(WorkerId::new),
            resolved_by: row.resolved_by_id.map(WorkerId::new),
            resolved_at: row.resolved_at.as_deref().map(parse_timestamp).transpose()?,
            reject_reason: row.reject_reason,
            version: row.version,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// The mutable columns of a request, written by a versioned commit.
///
/// `None` clears the column: a rejected proposal must null the
/// proposed replacement.
#[derive(AsChangeset)]
#[diesel(table_name = substitution_requests, treat_none_as_null = true)]
pub struct RequestChangeset {
    pub status: String,
    pub scope: Option<String>,
    pub proposed_replacement_id: Option<i64>,
    pub confirmed_replacement_id: Option<i64>,
    pub resolved_by_id: Option<i64>,
    pub resolved_at: Option<String>,
    pub reject_reason: Option<String>,
    pub version: i64,
    pub updated_at: String,
}

impl RequestChangeset {
    /// Builds the changeset that brings a row to `request`'s state.
    ///
    /// # Errors
    ///
    /// Returns an error if a timestamp cannot be formatted.
    pub fn from_request(request: &SubstitutionRequest) -> Result<Self, PersistenceError> {
        Ok(Self {
            status: request.status.as_str().to_string(),
            scope: request.scope.map(|s| s.as_str().to_string()),
            proposed_replacement_id: request.proposed_replacement.map(WorkerId::value),
            confirmed_replacement_id: request.confirmed_replacement.map(WorkerId::value),
            resolved_by_id: request.resolved_by.map(WorkerId::value),
            resolved_at: request.resolved_at.map(format_timestamp).transpose()?,
            reject_reason: request.reject_reason.clone(),
            version: request.version,
            updated_at: format_timestamp(request.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = candidate_offers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfferRow {
    pub offer_id: i64,
    pub request_id: i64,
    pub candidate_id: i64,
    pub state: String,
    pub channel_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<OfferRow> for CandidateOffer {
    type Error = PersistenceError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferId::new(row.offer_id),
            request: RequestId::new(row.request_id),
            candidate: WorkerId::new(row.candidate_id),
            state: parse_column::<OfferState>(&row.state)?,
            channel: row.channel_ref.map(ChannelRef::new),
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = workers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkerRow {
    pub worker_id: i64,
    pub display_name: String,
    pub role: String,
    pub location_id: i64,
    pub approved: i32,
}

impl TryFrom<WorkerRow> for Worker {
    type Error = PersistenceError;

    fn try_from(row: WorkerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkerId::new(row.worker_id),
            display_name: row.display_name,
            role: parse_column::<Role>(&row.role)?,
            location: LocationId::new(row.location_id),
            approved: row.approved != 0,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = locations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LocationRow {
    pub location_id: i64,
    pub name: String,
    pub approver_id: Option<i64>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: LocationId::new(row.location_id),
            name: row.name,
            approver: row.approver_id.map(WorkerId::new),
        }
    }
}

/// Collects rows into domain values, failing on the first corrupt row.
///
/// # Errors
///
/// Returns the first conversion error.
pub fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
