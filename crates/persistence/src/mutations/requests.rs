// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap::{CommitOutcome, RequestCommit};
use shift_swap_domain::{
    CandidateOffer, NewSubstitutionRequest, RequestId, RequestStatus, SubstitutionRequest,
};
use tracing::{debug, info};

use crate::backend::get_last_insert_rowid;
use crate::data_models::{RequestChangeset, format_date, format_timestamp};
use crate::diesel_schema::substitution_requests;
use crate::error::PersistenceError;
use crate::mutations::offers::apply_offer_change;
use crate::queries::{find_active_request, find_request, request_version};

/// Inserts a new request in status `new` with version 1.
///
/// # Errors
///
/// Returns `DuplicateActive` if the requester already holds an active
/// request for the shift date, or an error if the insert fails.
pub fn insert_request(
    conn: &mut SqliteConnection,
    request: &NewSubstitutionRequest,
) -> Result<SubstitutionRequest, PersistenceError> {
    conn.immediate_transaction(|conn| {
        if let Some(existing) = find_active_request(conn, request.requester, request.shift_date)? {
            return Err(PersistenceError::DuplicateActive {
                existing: existing.id,
            });
        }

        let created_at: String = format_timestamp(request.created_at)?;
        diesel::insert_into(substitution_requests::table)
            .values((
                substitution_requests::requester_id.eq(request.requester.value()),
                substitution_requests::location_id.eq(request.location.value()),
                substitution_requests::shift_date.eq(format_date(request.shift_date)?),
                substitution_requests::status.eq(RequestStatus::New.as_str()),
                substitution_requests::urgent.eq(i32::from(request.urgent)),
                substitution_requests::version.eq(1_i64),
                substitution_requests::created_at.eq(&created_at),
                substitution_requests::updated_at.eq(&created_at),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("insert_request: {e}")))?;

        let request_id = RequestId::new(get_last_insert_rowid(conn)?);
        info!(
            request_id = %request_id,
            requester = %request.requester,
            shift_date = %request.shift_date,
            "Inserted substitution request"
        );

        find_request(conn, request_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("request {request_id}")))
    })
}

/// Writes a new request state if the stored version still matches.
///
/// The version check, the request update and the offer bookkeeping run in
/// one immediate transaction; on conflict nothing is written.
///
/// # Errors
///
/// Returns `VersionConflict` if the stored version differs from the
/// expected one, `NotFound` if the request does not exist, or an error if
/// a statement fails.
pub fn commit_request(
    conn: &mut SqliteConnection,
    commit: &RequestCommit,
) -> Result<CommitOutcome, PersistenceError> {
    let request_id: RequestId = commit.request.id;
    let changeset: RequestChangeset = RequestChangeset::from_request(&commit.request)?;
    let now: String = changeset.updated_at.clone();

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(
            substitution_requests::table
                .filter(substitution_requests::request_id.eq(request_id.value()))
                .filter(substitution_requests::version.eq(commit.expected_version)),
        )
        .set(&changeset)
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("commit_request: {e}")))?;

        if updated == 0 {
            return Err(match request_version(conn, request_id)? {
                Some(actual) => PersistenceError::VersionConflict {
                    request_id,
                    expected: commit.expected_version,
                    actual,
                },
                None => PersistenceError::NotFound(format!("request {request_id}")),
            });
        }

        let changed_offers: Vec<CandidateOffer> =
            apply_offer_change(conn, request_id, commit.offer_change, &now)?;

        let request: SubstitutionRequest = find_request(conn, request_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("request {request_id}")))?;

        debug!(
            request_id = %request_id,
            version = request.version,
            status = %request.status,
            changed_offers = changed_offers.len(),
            "Committed substitution request"
        );

        Ok(CommitOutcome {
            request,
            changed_offers,
        })
    })
}
