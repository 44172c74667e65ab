// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The substitution request workflow.
//!
//! Every public operation runs synchronously on the caller's thread. State
//! changes go through [`apply`] and a versioned commit; notification and
//! audit delivery happen after the commit and never undo it.

use crate::apply::apply;
use crate::arbiter::{AcceptOutcome, AcceptanceArbiter, Arbitration};
use crate::collaborators::{
    ApproverDirectory, Clock, NotificationDispatcher, OfferOutcome, ScheduleMutator,
    StaffDirectory, WorkScheduleQuery,
};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::repository::{CommitOutcome, LockHint, RepositoryError, RequestCommit, WorkflowStore};
use crate::selector::CandidateSelector;
use crate::state::TransitionResult;
use crate::transition::Transition;
use serde::Serialize;
use shift_swap_audit::{Actor, AuditEvent, AuditEventType, AuditSink, StateSnapshot};
use shift_swap_domain::{
    CandidateOffer, ChannelRef, DomainError, LocationId, NewSubstitutionRequest, OfferState,
    RequestId, RequestStatus, Scope, SubstitutionRequest, Worker, WorkerId, is_urgent,
    validate_shift_date,
};
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

/// Commit attempts made for a non-acceptance transition before giving up.
pub const MAX_TRANSITION_ATTEMPTS: usize = 2;

/// Everything the workflow talks to.
#[derive(Clone)]
pub struct WorkflowDeps {
    pub store: Arc<dyn WorkflowStore>,
    pub staff: Arc<dyn StaffDirectory>,
    pub approvers: Arc<dyn ApproverDirectory>,
    pub schedule: Arc<dyn WorkScheduleQuery>,
    pub mutator: Arc<dyn ScheduleMutator>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub audit: Arc<dyn AuditSink>,
    pub clock: Arc<dyn Clock>,
}

/// Which candidates a notification round addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    /// Every candidate currently in the pool.
    All,
    /// Only these workers; each must be in the pool.
    Selected(Vec<WorkerId>),
}

/// Result of a final approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    /// The approved request.
    pub request: SubstitutionRequest,
    /// False if the work calendar could not be amended.
    pub schedule_synced: bool,
}

/// Drives substitution requests through their lifecycle.
pub struct RequestWorkflow {
    deps: WorkflowDeps,
    config: WorkflowConfig,
}

impl RequestWorkflow {
    #[must_use]
    pub const fn new(deps: WorkflowDeps, config: WorkflowConfig) -> Self {
        Self { deps, config }
    }

    #[must_use]
    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Raises a new request for a shift the requester cannot work.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The shift date is before the local date (`Validation`)
    /// - The requester has no shift that day (`Validation`)
    /// - The requester already has an active request for that date
    pub fn create_request(
        &self,
        requester: WorkerId,
        location: LocationId,
        shift_date: Date,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        let now: OffsetDateTime = self.deps.clock.now();
        let today: Date = self.config.today(now);
        validate_shift_date(shift_date, today)?;

        if !self
            .deps
            .schedule
            .is_scheduled_to_work(requester, shift_date)?
        {
            return Err(DomainError::NotScheduled {
                worker: requester,
                shift_date,
            }
            .into());
        }

        let duplicate = |existing: RequestId| WorkflowError::DuplicateActiveRequest {
            requester,
            shift_date,
            existing,
        };
        if let Some(existing) = self.deps.store.find_active_for(requester, shift_date)? {
            return Err(duplicate(existing.id));
        }

        let new_request = NewSubstitutionRequest {
            requester,
            location,
            shift_date,
            urgent: is_urgent(shift_date, today),
            created_at: now,
        };
        let request: SubstitutionRequest = match self.deps.store.insert(&new_request) {
            Ok(request) => request,
            Err(RepositoryError::DuplicateActive { existing }) => return Err(duplicate(existing)),
            Err(err) => return Err(err.into()),
        };

        info!(
            request = %request.id,
            requester = %requester,
            location = %location,
            shift_date = %shift_date,
            urgent = request.urgent,
            "Substitution request created"
        );
        self.record_audit(&AuditEvent::new(
            AuditEventType::RequestCreated,
            Actor::requester(requester),
            request.id,
            request.location,
            Some(format!("shift_date={shift_date}")),
            StateSnapshot::new(RequestStatus::New, 0),
            StateSnapshot::new(request.status, request.version),
        ));
        Ok(request)
    }

    /// Computes the candidate pool without changing anything.
    ///
    /// Uses `scope` if given, otherwise the request's stored scope, otherwise
    /// `Scope::Location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request does not exist or a directory fails.
    pub fn select_candidates(
        &self,
        request_id: RequestId,
        scope: Option<Scope>,
    ) -> Result<Vec<Worker>, WorkflowError> {
        let request: SubstitutionRequest = self.load(request_id, LockHint::Shared)?;
        let scope: Scope = scope.unwrap_or_else(|| request.effective_scope());
        Ok(self.selector().select(&request, scope)?)
    }

    /// Stores the targeting scope and starts the search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not `New` or `InProgress`.
    pub fn set_scope(
        &self,
        request_id: RequestId,
        supervisor: WorkerId,
        scope: Scope,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.run_transition(request_id, &Transition::SetScope { supervisor, scope })
    }

    /// Sends offers to candidates of the current pool.
    ///
    /// Candidates that already hold an open offer are skipped. A failed
    /// delivery still records the offer, without a channel reference. If
    /// the request leaves the search phase mid-round, the message just sent
    /// is expired and the round stops; offers recorded before that stay.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request is not searching or has no scope
    /// - A selected worker is not in the pool (`CandidateIneligible`)
    /// - The store or a directory fails
    pub fn notify_candidates(
        &self,
        request_id: RequestId,
        supervisor: WorkerId,
        target: &NotifyTarget,
    ) -> Result<Vec<CandidateOffer>, WorkflowError> {
        let request: SubstitutionRequest = self.load(request_id, LockHint::Shared)?;
        ensure_searching(&request, "notify")?;
        let scope: Scope = request.scope.ok_or(DomainError::ScopeNotSet)?;
        let pool: Vec<Worker> = self.selector().select(&request, scope)?;

        let targets: Vec<WorkerId> = match target {
            NotifyTarget::All => pool.iter().map(|worker| worker.id).collect(),
            NotifyTarget::Selected(ids) => {
                let mut chosen: Vec<WorkerId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !pool.iter().any(|worker| worker.id == *id) {
                        return Err(WorkflowError::CandidateIneligible {
                            request_id,
                            candidate: *id,
                        });
                    }
                    if !chosen.contains(id) {
                        chosen.push(*id);
                    }
                }
                chosen
            }
        };

        let now: OffsetDateTime = self.deps.clock.now();
        let mut offers: Vec<CandidateOffer> = Vec::with_capacity(targets.len());
        for candidate in targets {
            if let Some(existing) = self.deps.store.find_offer(request_id, candidate)?
                && existing.state.is_open()
            {
                debug!(
                    request = %request_id,
                    candidate = %candidate,
                    state = existing.state.as_str(),
                    "Candidate already holds an open offer"
                );
                continue;
            }

            let channel: Option<ChannelRef> = match self.deps.notifier.notify(candidate, &request) {
                Ok(channel) => Some(channel),
                Err(err) => {
                    warn!(
                        request = %request_id,
                        candidate = %candidate,
                        error = %err,
                        "Offer delivery failed; recording offer without channel"
                    );
                    None
                }
            };

            let offer: CandidateOffer = match self.deps.store.record_notified(
                request_id,
                candidate,
                channel.clone(),
                now,
            ) {
                Ok(offer) => offer,
                Err(err) => {
                    // The message is out but nothing tracks it; withdraw it.
                    if let Some(channel) = &channel {
                        self.withdraw_untracked(candidate, channel);
                    }
                    warn!(
                        request = %request_id,
                        candidate = %candidate,
                        recorded = offers.len(),
                        error = %err,
                        "Notification round stopped"
                    );
                    return Err(match err {
                        RepositoryError::RequestNotSearching { status, .. } => {
                            status_error(request_id, status, "notify")
                        }
                        other => WorkflowError::Repository(other),
                    });
                }
            };
            offers.push(offer);
        }

        info!(
            request = %request_id,
            scope = scope.as_str(),
            notified = offers.len(),
            "Candidates notified"
        );
        let snapshot = StateSnapshot::new(request.status, request.version);
        let notified: Vec<String> = offers.iter().map(|o| o.candidate.to_string()).collect();
        self.record_audit(&AuditEvent::new(
            AuditEventType::CandidatesNotified,
            Actor::supervisor(supervisor),
            request.id,
            request.location,
            Some(format!("candidates={}", notified.join(","))),
            snapshot,
            snapshot,
        ));
        Ok(offers)
    }

    /// The supervisor covers the shift personally.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not searching or the supervisor is
    /// the requester.
    pub fn take_by_supervisor(
        &self,
        request_id: RequestId,
        supervisor: WorkerId,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.run_transition(request_id, &Transition::TakeBySupervisor { supervisor })
    }

    /// A candidate takes the shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the request does not exist, the candidate is not
    /// eligible, or the store fails. Losing the race is an outcome, not an
    /// error.
    pub fn accept_offer(
        &self,
        request_id: RequestId,
        candidate: WorkerId,
    ) -> Result<AcceptOutcome, WorkflowError> {
        let arbiter = AcceptanceArbiter::new(
            self.deps.store.as_ref(),
            self.selector(),
            self.deps.clock.as_ref(),
        );
        let Arbitration { outcome, committed } = arbiter.arbitrate(request_id, candidate)?;
        if let Some((result, commit)) = committed {
            self.after_commit(&result, &commit);
        }
        Ok(outcome)
    }

    /// A candidate turns the offer down.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is closed or the candidate's offer is
    /// not `Notified`.
    pub fn decline_offer(
        &self,
        request_id: RequestId,
        candidate: WorkerId,
    ) -> Result<CandidateOffer, WorkflowError> {
        let request: SubstitutionRequest = self.load(request_id, LockHint::Shared)?;
        if request.status.is_terminal() {
            return Err(WorkflowError::RequestClosed {
                request_id,
                status: request.status,
            });
        }

        let not_pending = |state: Option<OfferState>| WorkflowError::OfferNotPending {
            request_id,
            candidate,
            state,
        };
        let offer: CandidateOffer = self
            .deps
            .store
            .find_offer(request_id, candidate)?
            .ok_or_else(|| not_pending(None))?;
        if offer.state != OfferState::Notified {
            return Err(not_pending(Some(offer.state)));
        }

        let declined: CandidateOffer = match self.deps.store.transition_offer(
            offer.id,
            OfferState::Notified,
            OfferState::Declined,
            self.deps.clock.now(),
        ) {
            Ok(declined) => declined,
            Err(RepositoryError::OfferStateConflict { actual, .. }) => {
                return Err(not_pending(Some(actual)));
            }
            Err(err) => return Err(err.into()),
        };

        info!(request = %request_id, candidate = %candidate, "Offer declined");
        self.settle_offer(&declined);
        let snapshot = StateSnapshot::new(request.status, request.version);
        self.record_audit(&AuditEvent::new(
            AuditEventType::OfferDeclined,
            Actor::candidate(candidate),
            request_id,
            request.location,
            None,
            snapshot,
            snapshot,
        ));
        Ok(declined)
    }

    /// Final sign-off; amends the work calendar once the approval is stored.
    ///
    /// A calendar failure is logged and audited but does not undo the
    /// approval; `schedule_synced` reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not `WaitingApproval`.
    pub fn approve(
        &self,
        request_id: RequestId,
        approver: WorkerId,
    ) -> Result<ApprovalOutcome, WorkflowError> {
        let request: SubstitutionRequest =
            self.run_transition(request_id, &Transition::Approve { approver })?;
        let schedule_synced: bool = self.sync_schedule(&request, approver);
        Ok(ApprovalOutcome {
            request,
            schedule_synced,
        })
    }

    /// The approver refuses the proposed replacement; the search resumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not `WaitingApproval`.
    pub fn reject_proposal(
        &self,
        request_id: RequestId,
        approver: WorkerId,
        reason: Option<String>,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.run_transition(request_id, &Transition::RejectProposal { approver, reason })
    }

    /// The supervisor refuses the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not searching or `reason` is blank.
    pub fn reject_request(
        &self,
        request_id: RequestId,
        supervisor: WorkerId,
        reason: String,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.run_transition(request_id, &Transition::RejectRequest { supervisor, reason })
    }

    /// The requester keeps working the shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not `InProgress`.
    pub fn cancel(
        &self,
        request_id: RequestId,
        supervisor: WorkerId,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.run_transition(request_id, &Transition::Cancel { supervisor })
    }

    /// Loads one request.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` if no such request exists.
    pub fn get_request(&self, request_id: RequestId) -> Result<SubstitutionRequest, WorkflowError> {
        self.load(request_id, LockHint::Shared)
    }

    /// Lists every offer of a request.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` if no such request exists.
    pub fn list_offers(&self, request_id: RequestId) -> Result<Vec<CandidateOffer>, WorkflowError> {
        self.load(request_id, LockHint::Shared)?;
        Ok(self.deps.store.list_offers(request_id)?)
    }

    /// Lists active requests, optionally for one location.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list_active_requests(
        &self,
        location: Option<LocationId>,
    ) -> Result<Vec<SubstitutionRequest>, WorkflowError> {
        Ok(self.deps.store.list_active(location)?)
    }

    fn selector(&self) -> CandidateSelector<'_> {
        CandidateSelector::new(
            self.deps.staff.as_ref(),
            self.deps.approvers.as_ref(),
            self.deps.schedule.as_ref(),
        )
    }

    fn load(
        &self,
        request_id: RequestId,
        lock: LockHint,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.deps
            .store
            .find(request_id, lock)?
            .ok_or(WorkflowError::RequestNotFound(request_id))
    }

    /// Bounded read-modify-write of one transition.
    ///
    /// Guards are re-evaluated against the fresh state on every attempt; a
    /// transition is never written over a version it was not computed from.
    fn run_transition(
        &self,
        request_id: RequestId,
        transition: &Transition,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let request: SubstitutionRequest = self.load(request_id, LockHint::ForUpdate)?;
            let result: TransitionResult =
                apply(&request, transition.clone(), self.deps.clock.now())?;

            match self
                .deps
                .store
                .commit(&RequestCommit::from_result(&result, request.version))
            {
                Ok(commit) => {
                    info!(
                        request = %request_id,
                        transition = transition.name(),
                        from = request.status.as_str(),
                        to = commit.request.status.as_str(),
                        version = commit.request.version,
                        "Request transitioned"
                    );
                    self.after_commit(&result, &commit);
                    return Ok(commit.request);
                }
                Err(RepositoryError::VersionConflict {
                    expected, actual, ..
                }) => {
                    warn!(
                        request = %request_id,
                        transition = transition.name(),
                        attempt,
                        expected,
                        actual,
                        "Version conflict, re-reading request"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Report what the winning writer left behind when it rules the
        // transition out; only a still-legal transition is a bare conflict.
        let request: SubstitutionRequest = self.load(request_id, LockHint::Shared)?;
        apply(&request, transition.clone(), self.deps.clock.now())?;
        Err(WorkflowError::ConcurrentModification {
            request_id,
            attempts: MAX_TRANSITION_ATTEMPTS,
        })
    }

    fn after_commit(&self, result: &TransitionResult, commit: &CommitOutcome) {
        for offer in &commit.changed_offers {
            self.settle_offer(offer);
        }
        self.record_audit(&result.audit_event);
    }

    /// Updates the delivered message of an offer that changed state.
    fn settle_offer(&self, offer: &CandidateOffer) {
        let Some(channel) = &offer.channel else {
            return;
        };
        let delivered = match offer.state {
            OfferState::Expired => self.deps.notifier.expire(channel),
            OfferState::Accepted => self.deps.notifier.resolve(channel, OfferOutcome::Accepted),
            OfferState::Declined => self.deps.notifier.resolve(channel, OfferOutcome::Declined),
            OfferState::Notified => return,
        };
        if let Err(err) = delivered {
            warn!(
                offer = %offer.id,
                candidate = %offer.candidate,
                state = offer.state.as_str(),
                error = %err,
                "Failed to update delivered offer"
            );
        }
    }

    /// Expires a delivered message whose offer could not be recorded.
    fn withdraw_untracked(&self, candidate: WorkerId, channel: &ChannelRef) {
        if let Err(err) = self.deps.notifier.expire(channel) {
            warn!(
                candidate = %candidate,
                channel = %channel,
                error = %err,
                "Failed to withdraw untracked offer"
            );
        }
    }

    fn record_audit(&self, event: &AuditEvent) {
        if let Err(err) = self.deps.audit.record(event) {
            warn!(
                event = event.event_type.as_str(),
                request = %event.subject,
                error = %err,
                "Audit sink failed; event dropped"
            );
        }
    }

    /// Writes the approved replacement into the work calendar.
    fn sync_schedule(&self, request: &SubstitutionRequest, approver: WorkerId) -> bool {
        let Some(replacement) = request.confirmed_replacement else {
            error!(request = %request.id, "Approved request has no confirmed replacement");
            return false;
        };

        match self.deps.mutator.apply_replacement(
            request.requester,
            replacement,
            request.location,
            request.shift_date,
        ) {
            Ok(()) => {
                info!(
                    request = %request.id,
                    original = %request.requester,
                    replacement = %replacement,
                    shift_date = %request.shift_date,
                    "Work schedule updated"
                );
                true
            }
            Err(err) => {
                error!(
                    request = %request.id,
                    original = %request.requester,
                    replacement = %replacement,
                    shift_date = %request.shift_date,
                    error = %err,
                    "Schedule sync failed; approval stands"
                );
                let snapshot = StateSnapshot::new(request.status, request.version);
                self.record_audit(&AuditEvent::new(
                    AuditEventType::ScheduleSyncFailed,
                    Actor::approver(approver),
                    request.id,
                    request.location,
                    Some(err.to_string()),
                    snapshot,
                    snapshot,
                ));
                false
            }
        }
    }
}

fn ensure_searching(
    request: &SubstitutionRequest,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if request.status.is_searching() {
        Ok(())
    } else {
        Err(status_error(request.id, request.status, action))
    }
}

const fn status_error(
    request_id: RequestId,
    status: RequestStatus,
    action: &'static str,
) -> WorkflowError {
    if status.is_terminal() {
        WorkflowError::RequestClosed { request_id, status }
    } else {
        WorkflowError::InvalidTransition {
            request_id,
            status,
            transition: action,
        }
    }
}
