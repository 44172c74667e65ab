// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    A, B, C, D, FakeDirectory, K, L4, R, SHIFT_DAY, request_fixture, scenario_directory,
};
use crate::CandidateSelector;
use shift_swap_domain::{Role, Scope, SubstitutionRequest, WorkerId};

fn select(directory: &FakeDirectory, request: &SubstitutionRequest, scope: Scope) -> Vec<WorkerId> {
    CandidateSelector::new(directory, directory, directory)
        .select(request, scope)
        .unwrap()
        .into_iter()
        .map(|worker| worker.id)
        .collect()
}

#[test]
fn test_busy_colleague_is_not_a_candidate() {
    let directory = scenario_directory();
    directory.schedule(B, SHIFT_DAY);

    let candidates = select(&directory, &request_fixture(), Scope::Location);

    assert_eq!(candidates, vec![A]);
}

#[test]
fn test_location_pool_excludes_requester_busy_unapproved_and_managers() {
    let directory = scenario_directory();

    let candidates = select(&directory, &request_fixture(), Scope::Location);

    // "alice" sorts before "Bob" only when compared case-insensitively.
    assert_eq!(candidates, vec![A, B]);
    assert!(!candidates.contains(&R));
    assert!(!candidates.contains(&K));
}

#[test]
fn test_manager_group_spans_locations_with_same_approver() {
    let directory = scenario_directory();

    let candidates = select(&directory, &request_fixture(), Scope::ManagerGroup);

    assert_eq!(candidates, vec![A, B, C]);
    assert!(!candidates.contains(&D));
}

#[test]
fn test_manager_group_without_approver_falls_back_to_location() {
    let directory = scenario_directory();
    let zed = WorkerId::new(40);
    directory.add_worker(zed, "Zed", Role::Seller, L4);
    let mut request = request_fixture();
    request.location = L4;

    assert_eq!(select(&directory, &request, Scope::ManagerGroup), vec![zed]);
    assert_eq!(select(&directory, &request, Scope::Location), vec![zed]);
}

#[test]
fn test_all_scope_covers_every_location() {
    let directory = scenario_directory();

    let candidates = select(&directory, &request_fixture(), Scope::All);

    assert_eq!(candidates, vec![A, B, C, D]);
}

#[test]
fn test_selection_reflects_current_schedule() {
    let directory = scenario_directory();
    let request = request_fixture();

    assert!(select(&directory, &request, Scope::Location).contains(&A));

    directory.schedule(A, SHIFT_DAY);
    assert!(!select(&directory, &request, Scope::Location).contains(&A));

    directory.unschedule(A, SHIFT_DAY);
    assert!(select(&directory, &request, Scope::Location).contains(&A));
}

#[test]
fn test_shift_on_another_day_does_not_exclude() {
    let directory = scenario_directory();
    directory.schedule(A, SHIFT_DAY.next_day().unwrap());

    let candidates = select(&directory, &request_fixture(), Scope::Location);

    assert!(candidates.contains(&A));
}

#[test]
fn test_is_eligible_checks_membership() {
    let directory = scenario_directory();
    let selector = CandidateSelector::new(&directory, &directory, &directory);
    let request = request_fixture();

    assert!(selector.is_eligible(&request, Scope::Location, A).unwrap());
    assert!(!selector.is_eligible(&request, Scope::Location, C).unwrap());
    assert!(selector.is_eligible(&request, Scope::ManagerGroup, C).unwrap());
    assert!(!selector.is_eligible(&request, Scope::All, K).unwrap());
}
