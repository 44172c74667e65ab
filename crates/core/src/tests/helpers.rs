// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ApproverDirectory, CandidateRepository, Clock, CollaboratorError, CommitOutcome,
    InMemoryStore, LockHint, NotificationDispatcher, OfferChange, OfferOutcome, RepositoryError,
    RequestCommit, RequestRepository, RequestWorkflow, ScheduleMutator, StaffDirectory,
    WorkScheduleQuery, WorkflowConfig, WorkflowDeps, WorkflowStore,
};
use shift_swap_audit::{AuditError, AuditEvent, AuditEventType, AuditSink};
use shift_swap_domain::{
    CandidateOffer, ChannelRef, LocationId, NewSubstitutionRequest, OfferId, OfferState,
    RequestId, Role, Scope, SubstitutionRequest, Worker, WorkerId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const SHIFT_DAY: Date = date!(2024 - 06 - 10);

pub const L: LocationId = LocationId::new(1);
/// Shares its approver with `L`.
pub const L2: LocationId = LocationId::new(2);
/// Has a different approver.
pub const L3: LocationId = LocationId::new(3);
/// Has no approver.
pub const L4: LocationId = LocationId::new(4);

/// Requester, scheduled on `SHIFT_DAY`.
pub const R: WorkerId = WorkerId::new(1);
pub const A: WorkerId = WorkerId::new(2);
pub const B: WorkerId = WorkerId::new(3);
/// Scheduled on `SHIFT_DAY`.
pub const K: WorkerId = WorkerId::new(4);
/// Registration not approved.
pub const U: WorkerId = WorkerId::new(5);
pub const C: WorkerId = WorkerId::new(6);
pub const D: WorkerId = WorkerId::new(7);
pub const S: WorkerId = WorkerId::new(10);
pub const P: WorkerId = WorkerId::new(100);
pub const Q: WorkerId = WorkerId::new(200);

pub fn now() -> OffsetDateTime {
    datetime!(2024-06-08 09:00 UTC)
}

/// Staff, approvers and calendar in one fake.
#[derive(Default)]
pub struct FakeDirectory {
    workers: Mutex<Vec<Worker>>,
    approvers: Mutex<BTreeMap<LocationId, WorkerId>>,
    schedule: Mutex<BTreeSet<(WorkerId, Date)>>,
    replacements: Mutex<Vec<(WorkerId, WorkerId, LocationId, Date)>>,
    fail_mutations: AtomicBool,
}

impl FakeDirectory {
    pub fn add_worker(&self, id: WorkerId, name: &str, role: Role, location: LocationId) {
        self.add(id, name, role, location, true);
    }

    pub fn add(&self, id: WorkerId, name: &str, role: Role, location: LocationId, approved: bool) {
        self.workers.lock().unwrap().push(Worker {
            id,
            display_name: name.to_string(),
            role,
            location,
            approved,
        });
    }

    pub fn set_approver(&self, location: LocationId, approver: WorkerId) {
        self.approvers.lock().unwrap().insert(location, approver);
    }

    pub fn schedule(&self, worker: WorkerId, date: Date) {
        self.schedule.lock().unwrap().insert((worker, date));
    }

    pub fn unschedule(&self, worker: WorkerId, date: Date) {
        self.schedule.lock().unwrap().remove(&(worker, date));
    }

    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    pub fn replacements(&self) -> Vec<(WorkerId, WorkerId, LocationId, Date)> {
        self.replacements.lock().unwrap().clone()
    }
}

/// The staff used by most tests.
pub fn scenario_directory() -> FakeDirectory {
    let directory = FakeDirectory::default();
    directory.add_worker(R, "Rita", Role::Seller, L);
    directory.add_worker(A, "alice", Role::Seller, L);
    directory.add_worker(B, "Bob", Role::SeniorSeller, L);
    directory.add_worker(K, "Kim", Role::Seller, L);
    directory.add(U, "Uma", Role::Seller, L, false);
    directory.add_worker(C, "carol", Role::Seller, L2);
    directory.add_worker(D, "Dan", Role::Seller, L3);
    directory.add_worker(S, "Sam", Role::Supervisor, L);
    directory.add_worker(P, "Pat", Role::Approver, L);
    directory.set_approver(L, P);
    directory.set_approver(L2, P);
    directory.set_approver(L3, Q);
    directory.schedule(R, SHIFT_DAY);
    directory.schedule(K, SHIFT_DAY);
    directory
}

impl StaffDirectory for FakeDirectory {
    fn list_workers(&self) -> Result<Vec<Worker>, CollaboratorError> {
        Ok(self.workers.lock().unwrap().clone())
    }
}

impl ApproverDirectory for FakeDirectory {
    fn resolve_approver(
        &self,
        location: LocationId,
    ) -> Result<Option<WorkerId>, CollaboratorError> {
        Ok(self.approvers.lock().unwrap().get(&location).copied())
    }
}

impl WorkScheduleQuery for FakeDirectory {
    fn is_scheduled_to_work(&self, worker: WorkerId, date: Date) -> Result<bool, CollaboratorError> {
        Ok(self.schedule.lock().unwrap().contains(&(worker, date)))
    }
}

impl ScheduleMutator for FakeDirectory {
    fn apply_replacement(
        &self,
        original: WorkerId,
        replacement: WorkerId,
        location: LocationId,
        date: Date,
    ) -> Result<(), CollaboratorError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable(String::from("calendar")));
        }
        self.replacements
            .lock()
            .unwrap()
            .push((original, replacement, location, date));
        self.unschedule(original, date);
        self.schedule(replacement, date);
        Ok(())
    }
}

type OnNotify = (WorkerId, Box<dyn FnOnce() + Send>);

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<WorkerId>>,
    pub expired: Mutex<Vec<ChannelRef>>,
    pub resolved: Mutex<Vec<(ChannelRef, OfferOutcome)>>,
    fail: AtomicBool,
    on_notify: Mutex<Option<OnNotify>>,
}

impl RecordingNotifier {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Runs `hook` once, while the offer to `candidate` is being delivered.
    pub fn when_notifying(&self, candidate: WorkerId, hook: impl FnOnce() + Send + 'static) {
        *self.on_notify.lock().unwrap() = Some((candidate, Box::new(hook)));
    }
}

pub fn channel_for(request: RequestId, candidate: WorkerId) -> ChannelRef {
    ChannelRef::new(format!("chat-{request}-{candidate}"))
}

impl NotificationDispatcher for RecordingNotifier {
    fn notify(
        &self,
        candidate: WorkerId,
        request: &SubstitutionRequest,
    ) -> Result<ChannelRef, CollaboratorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable(String::from("chat")));
        }
        self.sent.lock().unwrap().push(candidate);
        let hook = {
            let mut pending = self.on_notify.lock().unwrap();
            if pending.as_ref().is_some_and(|(target, _)| *target == candidate) {
                pending.take()
            } else {
                None
            }
        };
        if let Some((_, hook)) = hook {
            hook();
        }
        Ok(channel_for(request.id, candidate))
    }

    fn expire(&self, channel: &ChannelRef) -> Result<(), CollaboratorError> {
        self.expired.lock().unwrap().push(channel.clone());
        Ok(())
    }

    fn resolve(
        &self,
        channel: &ChannelRef,
        outcome: OfferOutcome,
    ) -> Result<(), CollaboratorError> {
        self.resolved.lock().unwrap().push((channel.clone(), outcome));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    fail: AtomicBool,
}

impl RecordingAuditSink {
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn event_types(&self) -> Vec<AuditEventType> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable(String::from("disk full")));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

type Interloper =
    Box<dyn Fn(&SubstitutionRequest) -> (SubstitutionRequest, OfferChange) + Send + Sync>;

type BeforeCommit = Box<dyn FnOnce(&InMemoryStore) + Send>;

/// Wraps an `InMemoryStore` and lets another writer commit first.
///
/// While armed, each `commit` call first writes the interloper's version of
/// the request, so the caller's commit fails its version check.
#[derive(Default)]
pub struct ConflictingStore {
    inner: InMemoryStore,
    pending_conflicts: AtomicUsize,
    commit_calls: AtomicUsize,
    interloper: Mutex<Option<Interloper>>,
    before_commit: Mutex<Option<BeforeCommit>>,
}

impl ConflictingStore {
    /// The next `conflicts` commits lose against a writer that only bumps
    /// the version.
    pub fn arm(&self, conflicts: usize) {
        *self.interloper.lock().unwrap() = None;
        self.pending_conflicts.store(conflicts, Ordering::SeqCst);
        self.commit_calls.store(0, Ordering::SeqCst);
    }

    /// The next `conflicts` commits lose against `interloper`'s write.
    pub fn arm_with(
        &self,
        conflicts: usize,
        interloper: impl Fn(&SubstitutionRequest) -> (SubstitutionRequest, OfferChange)
        + Send
        + Sync
        + 'static,
    ) {
        self.arm(conflicts);
        *self.interloper.lock().unwrap() = Some(Box::new(interloper));
    }

    /// Runs `hook` against the inner store just before the next commit,
    /// without touching the request's version.
    pub fn before_next_commit(&self, hook: impl FnOnce(&InMemoryStore) + Send + 'static) {
        *self.before_commit.lock().unwrap() = Some(Box::new(hook));
    }

    /// Commit calls made by the code under test since the last `arm`.
    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }

    fn interfere(&self, id: RequestId) -> Result<(), RepositoryError> {
        let current = self
            .inner
            .find(id, LockHint::Shared)?
            .ok_or_else(|| RepositoryError::NotFound(format!("request {id}")))?;
        let (mut next, offer_change) = match self.interloper.lock().unwrap().as_ref() {
            Some(interloper) => interloper(&current),
            None => (current.clone(), OfferChange::None),
        };
        next.version = current.version + 1;
        self.inner
            .commit(&RequestCommit {
                request: next,
                expected_version: current.version,
                offer_change,
            })
            .map(|_| ())
    }
}

impl RequestRepository for ConflictingStore {
    fn insert(
        &self,
        request: &NewSubstitutionRequest,
    ) -> Result<SubstitutionRequest, RepositoryError> {
        self.inner.insert(request)
    }

    fn find(
        &self,
        id: RequestId,
        lock: LockHint,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        self.inner.find(id, lock)
    }

    fn find_active_for(
        &self,
        requester: WorkerId,
        shift_date: Date,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        self.inner.find_active_for(requester, shift_date)
    }

    fn list_active(
        &self,
        location: Option<LocationId>,
    ) -> Result<Vec<SubstitutionRequest>, RepositoryError> {
        self.inner.list_active(location)
    }

    fn commit(&self, commit: &RequestCommit) -> Result<CommitOutcome, RepositoryError> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let armed = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            self.interfere(commit.request.id)?;
        }
        let hook: Option<BeforeCommit> = self.before_commit.lock().unwrap().take();
        if let Some(hook) = hook {
            hook(&self.inner);
        }
        self.inner.commit(commit)
    }
}

impl CandidateRepository for ConflictingStore {
    fn record_notified(
        &self,
        request: RequestId,
        candidate: WorkerId,
        channel: Option<ChannelRef>,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        self.inner.record_notified(request, candidate, channel, now)
    }

    fn find_offer(
        &self,
        request: RequestId,
        candidate: WorkerId,
    ) -> Result<Option<CandidateOffer>, RepositoryError> {
        self.inner.find_offer(request, candidate)
    }

    fn list_offers(&self, request: RequestId) -> Result<Vec<CandidateOffer>, RepositoryError> {
        self.inner.list_offers(request)
    }

    fn transition_offer(
        &self,
        offer: OfferId,
        from: OfferState,
        to: OfferState,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        self.inner.transition_offer(offer, from, to, now)
    }
}

/// A workflow wired to fakes, with handles to inspect them.
pub struct Harness<S: WorkflowStore + 'static = InMemoryStore> {
    pub store: Arc<S>,
    pub directory: Arc<FakeDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub audit: Arc<RecordingAuditSink>,
    pub workflow: RequestWorkflow,
}

impl Harness<InMemoryStore> {
    pub fn new() -> Self {
        Self::build(InMemoryStore::new(), now(), WorkflowConfig::default())
    }
}

impl<S: WorkflowStore + 'static> Harness<S> {
    pub fn build(store: S, at: OffsetDateTime, config: WorkflowConfig) -> Self {
        let store: Arc<S> = Arc::new(store);
        let directory: Arc<FakeDirectory> = Arc::new(scenario_directory());
        let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
        let audit: Arc<RecordingAuditSink> = Arc::new(RecordingAuditSink::default());
        let deps = WorkflowDeps {
            store: store.clone(),
            staff: directory.clone(),
            approvers: directory.clone(),
            schedule: directory.clone(),
            mutator: directory.clone(),
            notifier: notifier.clone(),
            audit: audit.clone(),
            clock: Arc::new(FixedClock(at)),
        };
        Self {
            store,
            directory,
            notifier,
            audit,
            workflow: RequestWorkflow::new(deps, config),
        }
    }

    /// R's request for `SHIFT_DAY`, still `New`.
    pub fn new_request(&self) -> SubstitutionRequest {
        self.workflow.create_request(R, L, SHIFT_DAY).unwrap()
    }

    /// R's request with the scope set, `InProgress`.
    pub fn searching_request(&self, scope: Scope) -> SubstitutionRequest {
        let request = self.new_request();
        self.workflow.set_scope(request.id, S, scope).unwrap()
    }

    /// R's request at location scope with A and B notified.
    pub fn notified_request(&self) -> SubstitutionRequest {
        let request = self.searching_request(Scope::Location);
        let offers = self
            .workflow
            .notify_candidates(request.id, S, &crate::NotifyTarget::All)
            .unwrap();
        assert_eq!(
            offers.iter().map(|o| o.candidate).collect::<Vec<_>>(),
            vec![A, B]
        );
        request
    }

    pub fn offer_state(&self, request: RequestId, candidate: WorkerId) -> Option<OfferState> {
        self.store
            .find_offer(request, candidate)
            .unwrap()
            .map(|o| o.state)
    }

    pub fn accepted_offers(&self, request: RequestId) -> Vec<CandidateOffer> {
        self.store
            .list_offers(request)
            .unwrap()
            .into_iter()
            .filter(|o| o.state == OfferState::Accepted)
            .collect()
    }
}

/// A request in the given state, built without a store.
pub fn request_fixture() -> SubstitutionRequest {
    NewSubstitutionRequest {
        requester: R,
        location: L,
        shift_date: SHIFT_DAY,
        urgent: false,
        created_at: now(),
    }
    .into_request(RequestId::new(1))
}
