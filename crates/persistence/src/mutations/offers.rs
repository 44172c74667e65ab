// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidate offer mutations.
//!
//! Offer rows are never deleted. The partial unique index on accepted offers
//! means a stale acceptance must be expired before a new one is written.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap::OfferChange;
use shift_swap_domain::{CandidateOffer, ChannelRef, OfferId, OfferState, RequestId, WorkerId};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::candidate_offers;
use crate::error::PersistenceError;
use crate::queries::{find_offer, find_offer_by_id, find_request, offer_ids_in_state};

fn load_offer(
    conn: &mut SqliteConnection,
    offer: OfferId,
) -> Result<CandidateOffer, PersistenceError> {
    find_offer_by_id(conn, offer)?
        .ok_or_else(|| PersistenceError::NotFound(format!("offer {offer}")))
}

fn insert_offer(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    candidate: WorkerId,
    state: OfferState,
    channel: Option<&ChannelRef>,
    now: &str,
) -> Result<CandidateOffer, PersistenceError> {
    diesel::insert_into(candidate_offers::table)
        .values((
            candidate_offers::request_id.eq(request_id.value()),
            candidate_offers::candidate_id.eq(candidate.value()),
            candidate_offers::state.eq(state.as_str()),
            candidate_offers::channel_ref.eq(channel.map(ChannelRef::as_str)),
            candidate_offers::created_at.eq(now),
            candidate_offers::updated_at.eq(now),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("insert_offer: {e}")))?;

    let offer_id = OfferId::new(get_last_insert_rowid(conn)?);
    load_offer(conn, offer_id)
}

fn set_offer_states(
    conn: &mut SqliteConnection,
    offer_ids: &[i64],
    state: OfferState,
    now: &str,
) -> Result<Vec<CandidateOffer>, PersistenceError> {
    if offer_ids.is_empty() {
        return Ok(Vec::new());
    }

    diesel::update(candidate_offers::table.filter(candidate_offers::offer_id.eq_any(offer_ids)))
        .set((
            candidate_offers::state.eq(state.as_str()),
            candidate_offers::updated_at.eq(now),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("set_offer_states: {e}")))?;

    offer_ids
        .iter()
        .map(|id| load_offer(conn, OfferId::new(*id)))
        .collect()
}

/// Applies the offer bookkeeping of a request commit.
///
/// Must run inside the commit's transaction. An acceptance is only written
/// for a candidate whose offer is open or who has no offer yet.
///
/// # Errors
///
/// Returns `OfferStateConflict` if the accepting candidate's offer was
/// declined or expired, or an error if a statement fails.
pub fn apply_offer_change(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    change: OfferChange,
    now: &str,
) -> Result<Vec<CandidateOffer>, PersistenceError> {
    match change {
        OfferChange::None => Ok(Vec::new()),
        OfferChange::ExpireNotified => {
            let notified: Vec<i64> = offer_ids_in_state(conn, request_id, OfferState::Notified)?;
            set_offer_states(conn, &notified, OfferState::Expired, now)
        }
        OfferChange::Accept { candidate } => {
            let existing: Option<CandidateOffer> = find_offer(conn, request_id, candidate)?;
            if let Some(offer) = &existing
                && !offer.state.is_open()
            {
                return Err(PersistenceError::OfferStateConflict {
                    offer: offer.id,
                    expected: OfferState::Notified,
                    actual: offer.state,
                });
            }
            let stale: Vec<i64> = offer_ids_in_state(conn, request_id, OfferState::Accepted)?
                .into_iter()
                .filter(|id| existing.as_ref().is_none_or(|o| o.id.value() != *id))
                .collect();
            let mut changed: Vec<CandidateOffer> =
                set_offer_states(conn, &stale, OfferState::Expired, now)?;

            match existing {
                Some(offer) if offer.state == OfferState::Accepted => {}
                Some(offer) => {
                    changed.extend(set_offer_states(
                        conn,
                        &[offer.id.value()],
                        OfferState::Accepted,
                        now,
                    )?);
                }
                None => changed.push(insert_offer(
                    conn,
                    request_id,
                    candidate,
                    OfferState::Accepted,
                    None,
                    now,
                )?),
            }
            Ok(changed)
        }
    }
}

/// Records that a candidate was notified of a request.
///
/// Creates the offer, or reopens a declined or expired one with the new
/// channel. An open offer is returned unchanged.
///
/// # Errors
///
/// Returns `RequestNotSearching` if the request has left the search phase,
/// `NotFound` if it does not exist, or an error if a statement fails.
pub fn record_notified(
    conn: &mut SqliteConnection,
    request_id: RequestId,
    candidate: WorkerId,
    channel: Option<&ChannelRef>,
    now: OffsetDateTime,
) -> Result<CandidateOffer, PersistenceError> {
    let now: String = format_timestamp(now)?;

    conn.immediate_transaction(|conn| {
        let status = find_request(conn, request_id)?
            .map(|r| r.status)
            .ok_or_else(|| PersistenceError::NotFound(format!("request {request_id}")))?;
        if !status.is_searching() {
            return Err(PersistenceError::RequestNotSearching { request_id, status });
        }

        match find_offer(conn, request_id, candidate)? {
            Some(existing) if existing.state.is_open() => {
                debug!(offer = %existing.id, state = %existing.state, "Offer already open");
                Ok(existing)
            }
            Some(existing) => {
                diesel::update(
                    candidate_offers::table
                        .filter(candidate_offers::offer_id.eq(existing.id.value())),
                )
                .set((
                    candidate_offers::state.eq(OfferState::Notified.as_str()),
                    candidate_offers::channel_ref.eq(channel.map(ChannelRef::as_str)),
                    candidate_offers::updated_at.eq(&now),
                ))
                .execute(conn)
                .map_err(|e| PersistenceError::QueryFailed(format!("record_notified: {e}")))?;

                info!(offer = %existing.id, candidate = %candidate, "Reopened candidate offer");
                load_offer(conn, existing.id)
            }
            None => {
                let offer: CandidateOffer = insert_offer(
                    conn,
                    request_id,
                    candidate,
                    OfferState::Notified,
                    channel,
                    &now,
                )?;
                info!(offer = %offer.id, candidate = %candidate, "Recorded candidate offer");
                Ok(offer)
            }
        }
    })
}

/// Moves one offer from `from` to `to`.
///
/// # Errors
///
/// Returns `OfferStateConflict` if the offer is not in state `from`,
/// `NotFound` if it does not exist, or an error if a statement fails.
pub fn transition_offer(
    conn: &mut SqliteConnection,
    offer: OfferId,
    from: OfferState,
    to: OfferState,
    now: OffsetDateTime,
) -> Result<CandidateOffer, PersistenceError> {
    let now: String = format_timestamp(now)?;

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(
            candidate_offers::table
                .filter(candidate_offers::offer_id.eq(offer.value()))
                .filter(candidate_offers::state.eq(from.as_str())),
        )
        .set((
            candidate_offers::state.eq(to.as_str()),
            candidate_offers::updated_at.eq(&now),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("transition_offer: {e}")))?;

        let current: CandidateOffer = load_offer(conn, offer)?;
        if updated == 0 {
            return Err(PersistenceError::OfferStateConflict {
                offer,
                expected: from,
                actual: current.state,
            });
        }

        debug!(offer = %offer, from = %from, to = %to, "Transitioned candidate offer");
        Ok(current)
    })
}
