// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap_domain::{CandidateOffer, OfferId, OfferState, RequestId, WorkerId};

use crate::data_models::{OfferRow, convert_rows};
use crate::diesel_schema::candidate_offers;
use crate::error::PersistenceError;

/// Loads the offer made to `candidate` for `request_id`.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_offer(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    candidate: WorkerId,
) -> Result<Option<CandidateOffer>, PersistenceError> {
    let row: Option<OfferRow> = candidate_offers::table
        .filter(candidate_offers::request_id.eq(request_id.value()))
        .filter(candidate_offers::candidate_id.eq(candidate.value()))
        .select(OfferRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_offer: {e}")))?;

    row.map(CandidateOffer::try_from).transpose()
}

/// Loads an offer by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_offer_by_id(
    conn: &mut SqliteConnection,
    offer: OfferId,
) -> Result<Option<CandidateOffer>, PersistenceError> {
    let row: Option<OfferRow> = candidate_offers::table
        .filter(candidate_offers::offer_id.eq(offer.value()))
        .select(OfferRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_offer_by_id: {e}")))?;

    row.map(CandidateOffer::try_from).transpose()
}

/// Lists the offers of a request in creation order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_offers(
    conn: &mut SqliteConnection,
    request_id: RequestId,
) -> Result<Vec<CandidateOffer>, PersistenceError> {
    let rows: Vec<OfferRow> = candidate_offers::table
        .filter(candidate_offers::request_id.eq(request_id.value()))
        .order(candidate_offers::offer_id.asc())
        .select(OfferRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_offers: {e}")))?;

    convert_rows(rows)
}

/// Returns the ids of a request's offers that are in `state`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn offer_ids_in_state(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    state: OfferState,
) -> Result<Vec<i64>, PersistenceError> {
    candidate_offers::table
        .filter(candidate_offers::request_id.eq(request_id.value()))
        .filter(candidate_offers::state.eq(state.as_str()))
        .order(candidate_offers::offer_id.asc())
        .select(candidate_offers::offer_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("offer_ids_in_state: {e}")))
}
