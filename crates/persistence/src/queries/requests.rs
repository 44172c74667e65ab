// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap_domain::{LocationId, RequestId, RequestStatus, SubstitutionRequest, WorkerId};
use time::Date;
use tracing::debug;

use crate::data_models::{RequestRow, convert_rows, format_date};
use crate::diesel_schema::substitution_requests;
use crate::error::PersistenceError;

/// Status strings that count towards the one-active-request rule.
pub const ACTIVE_STATUSES: [&str; 3] = [
    RequestStatus::New.as_str(),
    RequestStatus::InProgress.as_str(),
    RequestStatus::WaitingApproval.as_str(),
];

/// Loads a request by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_request(
    conn: &mut SqliteConnection,
    request_id: RequestId,
) -> Result<Option<SubstitutionRequest>, PersistenceError> {
    debug!(request_id = %request_id, "Loading substitution request");

    let row: Option<RequestRow> = substitution_requests::table
        .filter(substitution_requests::request_id.eq(request_id.value()))
        .select(RequestRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_request: {e}")))?;

    row.map(SubstitutionRequest::try_from).transpose()
}

/// Returns the requester's active request for a shift date.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_active_request(
    conn: &mut SqliteConnection,
    requester: WorkerId,
    shift_date: Date,
) -> Result<Option<SubstitutionRequest>, PersistenceError> {
    let date_text: String = format_date(shift_date)?;

    let row: Option<RequestRow> = substitution_requests::table
        .filter(substitution_requests::requester_id.eq(requester.value()))
        .filter(substitution_requests::shift_date.eq(&date_text))
        .filter(substitution_requests::status.eq_any(ACTIVE_STATUSES))
        .select(RequestRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_active_request: {e}")))?;

    row.map(SubstitutionRequest::try_from).transpose()
}

/// Lists active requests ordered by shift date, then id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_active_requests(
    conn: &mut SqliteConnection,
    location: Option<LocationId>,
) -> Result<Vec<SubstitutionRequest>, PersistenceError> {
    let mut query = substitution_requests::table
        .select(RequestRow::as_select())
        .filter(substitution_requests::status.eq_any(ACTIVE_STATUSES))
        .into_boxed();

    if let Some(location) = location {
        query = query.filter(substitution_requests::location_id.eq(location.value()));
    }

    let rows: Vec<RequestRow> = query
        .order((
            substitution_requests::shift_date.asc(),
            substitution_requests::request_id.asc(),
        ))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_active_requests: {e}")))?;

    debug!(count = rows.len(), "Loaded active substitution requests");
    convert_rows(rows)
}

/// Returns the stored version of a request.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn request_version(
    conn: &mut SqliteConnection,
    request_id: RequestId,
) -> Result<Option<i64>, PersistenceError> {
    substitution_requests::table
        .filter(substitution_requests::request_id.eq(request_id.value()))
        .select(substitution_requests::version)
        .first::<i64>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("request_version: {e}")))
}
