// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{A, B, C, L, R, SHIFT_DAY, channel_for, now};
use crate::{
    CandidateRepository, InMemoryStore, LockHint, OfferChange, RepositoryError, RequestCommit,
    RequestRepository,
};
use shift_swap_domain::{NewSubstitutionRequest, OfferState, RequestStatus, SubstitutionRequest};

fn insert(store: &InMemoryStore) -> SubstitutionRequest {
    store
        .insert(&NewSubstitutionRequest {
            requester: R,
            location: L,
            shift_date: SHIFT_DAY,
            urgent: false,
            created_at: now(),
        })
        .unwrap()
}

fn commit(
    store: &InMemoryStore,
    request: &SubstitutionRequest,
    status: RequestStatus,
    offer_change: OfferChange,
) -> Result<SubstitutionRequest, RepositoryError> {
    let mut next = request.clone();
    next.status = status;
    next.version = request.version + 1;
    store
        .commit(&RequestCommit {
            request: next,
            expected_version: request.version,
            offer_change,
        })
        .map(|outcome| outcome.request)
}

#[test]
fn test_insert_assigns_ids_and_first_version() {
    let store = InMemoryStore::new();

    let request = insert(&store);

    assert_eq!(request.id.value(), 1);
    assert_eq!(request.version, 1);
    assert_eq!(
        store.find(request.id, LockHint::Shared).unwrap(),
        Some(request)
    );
}

#[test]
fn test_insert_refuses_second_active_request() {
    let store = InMemoryStore::new();
    let first = insert(&store);

    let again = store.insert(&NewSubstitutionRequest {
        requester: R,
        location: L,
        shift_date: SHIFT_DAY,
        urgent: true,
        created_at: now(),
    });
    assert_eq!(
        again,
        Err(RepositoryError::DuplicateActive { existing: first.id })
    );

    let in_progress = commit(&store, &first, RequestStatus::InProgress, OfferChange::None).unwrap();
    commit(&store, &in_progress, RequestStatus::Cancelled, OfferChange::None).unwrap();
    assert_eq!(store.find_active_for(R, SHIFT_DAY).unwrap(), None);
    assert_eq!(insert(&store).id.value(), 2);
}

#[test]
fn test_stale_commit_is_refused_without_writing() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    let newer = commit(&store, &request, RequestStatus::InProgress, OfferChange::None).unwrap();

    let stale = commit(&store, &request, RequestStatus::Rejected, OfferChange::None);

    assert_eq!(
        stale,
        Err(RepositoryError::VersionConflict {
            request_id: request.id,
            expected: 1,
            actual: 2,
        })
    );
    assert_eq!(store.find(request.id, LockHint::ForUpdate).unwrap(), Some(newer));
}

#[test]
fn test_expire_notified_leaves_answered_offers() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    store.record_notified(request.id, A, None, now()).unwrap();
    let b = store
        .record_notified(request.id, B, Some(channel_for(request.id, B)), now())
        .unwrap();
    store
        .transition_offer(b.id, OfferState::Notified, OfferState::Declined, now())
        .unwrap();

    let in_progress = commit(&store, &request, RequestStatus::InProgress, OfferChange::None).unwrap();
    let mut cancelled = in_progress.clone();
    cancelled.status = RequestStatus::Cancelled;
    cancelled.version += 1;
    let outcome = store
        .commit(&RequestCommit {
            request: cancelled,
            expected_version: in_progress.version,
            offer_change: OfferChange::ExpireNotified,
        })
        .unwrap();

    assert_eq!(outcome.changed_offers.len(), 1);
    assert_eq!(outcome.changed_offers[0].candidate, A);
    assert_eq!(outcome.changed_offers[0].state, OfferState::Expired);
    let states: Vec<OfferState> = store
        .list_offers(request.id)
        .unwrap()
        .into_iter()
        .map(|o| o.state)
        .collect();
    assert_eq!(states, vec![OfferState::Expired, OfferState::Declined]);
}

#[test]
fn test_accept_keeps_a_single_accepted_offer() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    store.record_notified(request.id, A, None, now()).unwrap();
    store.record_notified(request.id, B, None, now()).unwrap();

    let waiting = commit(
        &store,
        &request,
        RequestStatus::WaitingApproval,
        OfferChange::Accept { candidate: A },
    )
    .unwrap();
    let resumed = commit(&store, &waiting, RequestStatus::InProgress, OfferChange::None).unwrap();
    let mut next = resumed.clone();
    next.status = RequestStatus::WaitingApproval;
    next.version += 1;
    let outcome = store
        .commit(&RequestCommit {
            request: next,
            expected_version: resumed.version,
            offer_change: OfferChange::Accept { candidate: C },
        })
        .unwrap();

    // A's leftover acceptance is expired and C, who had no offer, gets one.
    let changed: Vec<_> = outcome
        .changed_offers
        .iter()
        .map(|o| (o.candidate, o.state))
        .collect();
    assert_eq!(
        changed,
        vec![(A, OfferState::Expired), (C, OfferState::Accepted)]
    );
    let accepted: Vec<_> = store
        .list_offers(request.id)
        .unwrap()
        .into_iter()
        .filter(|o| o.state == OfferState::Accepted)
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].candidate, C);
    assert_eq!(
        store.find_offer(request.id, B).unwrap().map(|o| o.state),
        Some(OfferState::Notified)
    );
}

#[test]
fn test_accept_refuses_a_declined_offer() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    let a = store.record_notified(request.id, A, None, now()).unwrap();
    store
        .transition_offer(a.id, OfferState::Notified, OfferState::Declined, now())
        .unwrap();

    let result = commit(
        &store,
        &request,
        RequestStatus::WaitingApproval,
        OfferChange::Accept { candidate: A },
    );

    assert_eq!(
        result,
        Err(RepositoryError::OfferStateConflict {
            offer: a.id,
            expected: OfferState::Notified,
            actual: OfferState::Declined,
        })
    );
    assert_eq!(store.find(request.id, LockHint::Shared).unwrap(), Some(request.clone()));
    assert_eq!(
        store.find_offer(request.id, A).unwrap().map(|o| o.state),
        Some(OfferState::Declined)
    );
}

#[test]
fn test_record_notified_upserts() {
    let store = InMemoryStore::new();
    let request = insert(&store);

    let first = store.record_notified(request.id, A, None, now()).unwrap();
    let again = store
        .record_notified(request.id, A, Some(channel_for(request.id, A)), now())
        .unwrap();
    assert_eq!(again, first);

    store
        .transition_offer(first.id, OfferState::Notified, OfferState::Declined, now())
        .unwrap();
    let reopened = store
        .record_notified(request.id, A, Some(channel_for(request.id, A)), now())
        .unwrap();
    assert_eq!(reopened.id, first.id);
    assert_eq!(reopened.state, OfferState::Notified);
    assert_eq!(reopened.channel, Some(channel_for(request.id, A)));
    assert_eq!(store.list_offers(request.id).unwrap().len(), 1);
}

#[test]
fn test_record_notified_refuses_settled_request() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    commit(
        &store,
        &request,
        RequestStatus::WaitingApproval,
        OfferChange::Accept { candidate: A },
    )
    .unwrap();

    let result = store.record_notified(request.id, B, None, now());

    assert_eq!(
        result,
        Err(RepositoryError::RequestNotSearching {
            request_id: request.id,
            status: RequestStatus::WaitingApproval,
        })
    );
}

#[test]
fn test_transition_offer_compares_state() {
    let store = InMemoryStore::new();
    let request = insert(&store);
    let offer = store.record_notified(request.id, A, None, now()).unwrap();

    let result = store.transition_offer(offer.id, OfferState::Accepted, OfferState::Expired, now());

    assert_eq!(
        result,
        Err(RepositoryError::OfferStateConflict {
            offer: offer.id,
            expected: OfferState::Accepted,
            actual: OfferState::Notified,
        })
    );
}

#[test]
fn test_list_active_orders_by_shift_date() {
    let store = InMemoryStore::new();
    let later = insert(&store);
    let earlier = store
        .insert(&NewSubstitutionRequest {
            requester: A,
            location: L,
            shift_date: SHIFT_DAY.previous_day().unwrap(),
            urgent: false,
            created_at: now(),
        })
        .unwrap();

    let active = store.list_active(Some(L)).unwrap();

    assert_eq!(active, vec![earlier, later]);
}
