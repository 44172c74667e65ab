// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod request_tests;

use crate::SqliteStore;
use shift_swap::{
    Clock, CollaboratorError, NotificationDispatcher, OfferOutcome, RequestWorkflow,
    WorkflowConfig, WorkflowDeps,
};
use shift_swap_audit::TracingAuditSink;
use shift_swap_domain::{
    ChannelRef, Location, LocationId, NewSubstitutionRequest, Role, SubstitutionRequest, Worker,
    WorkerId,
};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const SHIFT_DAY: Date = date!(2024 - 06 - 10);

pub fn now() -> OffsetDateTime {
    datetime!(2024-06-08 09:00 UTC)
}

/// A small retail chain.
///
/// `home` and `branch` share the approver `pat`; `remote` has none.
/// `rita` works at `home` on `SHIFT_DAY`.
pub struct Seed {
    pub store: Arc<SqliteStore>,
    pub home: Location,
    pub branch: Location,
    pub remote: Location,
    pub pat: Worker,
    pub sam: Worker,
    pub rita: Worker,
    pub alice: Worker,
    pub bob: Worker,
    pub carol: Worker,
}

pub fn seed() -> Seed {
    let store = SqliteStore::new_in_memory().expect("in-memory store");
    let home = store.create_location("Downtown", None).unwrap();
    let pat = store
        .create_worker("Pat", Role::Approver, home.id, true)
        .unwrap();
    store.set_location_approver(home.id, Some(pat.id)).unwrap();
    let branch = store.create_location("Harbour", Some(pat.id)).unwrap();
    let remote = store.create_location("Airport", None).unwrap();

    let sam = store
        .create_worker("Sam", Role::Supervisor, home.id, true)
        .unwrap();
    let rita = store
        .create_worker("Rita", Role::Seller, home.id, true)
        .unwrap();
    let alice = store
        .create_worker("alice", Role::Seller, home.id, true)
        .unwrap();
    let bob = store
        .create_worker("Bob", Role::SeniorSeller, home.id, true)
        .unwrap();
    let carol = store
        .create_worker("carol", Role::Seller, branch.id, true)
        .unwrap();
    store.add_schedule_entry(rita.id, home.id, SHIFT_DAY).unwrap();

    Seed {
        store: Arc::new(store),
        home,
        branch,
        remote,
        pat,
        sam,
        rita,
        alice,
        bob,
        carol,
    }
}

pub fn new_request(requester: WorkerId, location: LocationId) -> NewSubstitutionRequest {
    NewSubstitutionRequest {
        requester,
        location,
        shift_date: SHIFT_DAY,
        urgent: false,
        created_at: now(),
    }
}

pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Hands out predictable channel references and remembers expirations.
#[derive(Default)]
pub struct CountingNotifier {
    pub sent: Mutex<Vec<WorkerId>>,
    pub expired: Mutex<Vec<ChannelRef>>,
}

impl NotificationDispatcher for CountingNotifier {
    fn notify(
        &self,
        candidate: WorkerId,
        request: &SubstitutionRequest,
    ) -> Result<ChannelRef, CollaboratorError> {
        self.sent.lock().unwrap().push(candidate);
        Ok(ChannelRef::new(format!("sms-{}-{candidate}", request.id)))
    }

    fn expire(&self, channel: &ChannelRef) -> Result<(), CollaboratorError> {
        self.expired.lock().unwrap().push(channel.clone());
        Ok(())
    }

    fn resolve(
        &self,
        _channel: &ChannelRef,
        _outcome: OfferOutcome,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Wires a workflow whose store and directories are all `seed.store`.
pub fn workflow(seed: &Seed, notifier: Arc<CountingNotifier>) -> RequestWorkflow {
    let deps = WorkflowDeps {
        store: seed.store.clone(),
        staff: seed.store.clone(),
        approvers: seed.store.clone(),
        schedule: seed.store.clone(),
        mutator: seed.store.clone(),
        notifier,
        audit: Arc::new(TracingAuditSink),
        clock: Arc::new(FixedClock(now())),
    };
    RequestWorkflow::new(deps, WorkflowConfig::default())
}
