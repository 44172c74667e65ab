// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{SHIFT_DAY, new_request, now, seed};
use shift_swap::{
    LockHint, OfferChange, RepositoryError, RequestCommit, RequestRepository, Transition, apply,
};
use shift_swap_domain::{RequestId, RequestStatus, Scope, SubstitutionRequest};
use time::Duration;
use time::macros::date;

fn commit_transition(
    store: &dyn RequestRepository,
    request: &SubstitutionRequest,
    transition: Transition,
) -> SubstitutionRequest {
    let result = apply(request, transition, now()).unwrap();
    store
        .commit(&RequestCommit::from_result(&result, request.version))
        .unwrap()
        .request
}

#[test]
fn test_insert_starts_new_at_version_one() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();

    assert_eq!(stored.status, RequestStatus::New);
    assert_eq!(stored.version, 1);
    assert_eq!(stored.shift_date, SHIFT_DAY);
    assert_eq!(stored.created_at, now());
    assert_eq!(stored.updated_at, now());
    assert_eq!(
        seed.store.find(stored.id, LockHint::Shared).unwrap(),
        Some(stored)
    );
}

#[test]
fn test_second_active_request_is_refused() {
    let seed = seed();
    let first = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();

    let err = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap_err();
    assert_eq!(err, RepositoryError::DuplicateActive { existing: first.id });
}

#[test]
fn test_closed_request_frees_the_shift_date() {
    let seed = seed();
    let first = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    let set = commit_transition(
        seed.store.as_ref(),
        &first,
        Transition::SetScope {
            supervisor: seed.sam.id,
            scope: Scope::Location,
        },
    );
    commit_transition(
        seed.store.as_ref(),
        &set,
        Transition::Cancel {
            supervisor: seed.sam.id,
        },
    );

    assert_eq!(
        seed.store
            .find_active_for(seed.rita.id, SHIFT_DAY)
            .unwrap(),
        None
    );
    let second = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    assert_ne!(second.id, first.id);
}

#[test]
fn test_find_active_for_matches_requester_and_date() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();

    let found = seed
        .store
        .find_active_for(seed.rita.id, SHIFT_DAY)
        .unwrap();
    assert_eq!(found.map(|r| r.id), Some(stored.id));
    assert_eq!(
        seed.store
            .find_active_for(seed.rita.id, date!(2024 - 06 - 11))
            .unwrap(),
        None
    );
    assert_eq!(
        seed.store
            .find_active_for(seed.alice.id, SHIFT_DAY)
            .unwrap(),
        None
    );
}

#[test]
fn test_list_active_orders_by_shift_date_and_filters_location() {
    let seed = seed();
    let later = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    let mut earlier_request = new_request(seed.alice.id, seed.home.id);
    earlier_request.shift_date = date!(2024 - 06 - 09);
    let earlier = seed.store.insert(&earlier_request).unwrap();
    let elsewhere = seed
        .store
        .insert(&new_request(seed.carol.id, seed.branch.id))
        .unwrap();
    commit_transition(
        seed.store.as_ref(),
        &elsewhere,
        Transition::RejectRequest {
            supervisor: seed.sam.id,
            reason: String::from("store closed"),
        },
    );

    let all: Vec<RequestId> = seed
        .store
        .list_active(None)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(all, vec![earlier.id, later.id]);

    assert!(
        seed.store
            .list_active(Some(seed.branch.id))
            .unwrap()
            .is_empty()
    );
    assert_eq!(seed.store.list_active(Some(seed.home.id)).unwrap().len(), 2);
}

#[test]
fn test_commit_writes_every_mutable_column() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();

    let taken = commit_transition(
        seed.store.as_ref(),
        &stored,
        Transition::TakeBySupervisor {
            supervisor: seed.sam.id,
        },
    );
    assert_eq!(taken.status, RequestStatus::WaitingApproval);
    assert_eq!(taken.proposed_replacement, Some(seed.sam.id));
    assert_eq!(taken.version, 2);

    let approved = commit_transition(
        seed.store.as_ref(),
        &taken,
        Transition::Approve {
            approver: seed.pat.id,
        },
    );
    let reloaded = seed
        .store
        .find(stored.id, LockHint::Shared)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded, approved);
    assert_eq!(reloaded.status, RequestStatus::Approved);
    assert_eq!(reloaded.confirmed_replacement, Some(seed.sam.id));
    assert_eq!(reloaded.resolved_by, Some(seed.pat.id));
    assert_eq!(reloaded.resolved_at, Some(now()));
    assert_eq!(reloaded.version, 3);
}

#[test]
fn test_commit_clears_rejected_proposal() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    let taken = commit_transition(
        seed.store.as_ref(),
        &stored,
        Transition::TakeBySupervisor {
            supervisor: seed.sam.id,
        },
    );

    let rejected = commit_transition(
        seed.store.as_ref(),
        &taken,
        Transition::RejectProposal {
            approver: seed.pat.id,
            reason: None,
        },
    );

    let reloaded = seed
        .store
        .find(stored.id, LockHint::ForUpdate)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded, rejected);
    assert_eq!(reloaded.status, RequestStatus::InProgress);
    assert_eq!(reloaded.proposed_replacement, None);
}

#[test]
fn test_stale_commit_is_refused_and_writes_nothing() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    let stale = apply(
        &stored,
        Transition::RejectRequest {
            supervisor: seed.sam.id,
            reason: String::from("no cover needed"),
        },
        now() + Duration::minutes(5),
    )
    .unwrap();
    let in_progress = commit_transition(
        seed.store.as_ref(),
        &stored,
        Transition::SetScope {
            supervisor: seed.sam.id,
            scope: Scope::All,
        },
    );

    let err = seed
        .store
        .commit(&RequestCommit::from_result(&stale, stored.version))
        .unwrap_err();
    assert_eq!(
        err,
        RepositoryError::VersionConflict {
            request_id: stored.id,
            expected: 1,
            actual: 2,
        }
    );
    assert_eq!(
        seed.store
            .find(stored.id, LockHint::Shared)
            .unwrap()
            .unwrap(),
        in_progress
    );
}

#[test]
fn test_commit_of_unknown_request_is_not_found() {
    let seed = seed();
    let stored = seed
        .store
        .insert(&new_request(seed.rita.id, seed.home.id))
        .unwrap();
    let mut ghost = stored.clone();
    ghost.id = RequestId::new(999);
    ghost.version = 2;

    let err = seed
        .store
        .commit(&RequestCommit {
            request: ghost,
            expected_version: 1,
            offer_change: OfferChange::None,
        })
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[test]
fn test_subsecond_timestamps_survive_storage() {
    let seed = seed();
    let mut request = new_request(seed.rita.id, seed.home.id);
    request.created_at = now() + Duration::nanoseconds(123_456_789);

    let stored = seed.store.insert(&request).unwrap();
    let reloaded = seed
        .store
        .find(stored.id, LockHint::Shared)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.created_at, request.created_at);
}
