// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resolution of concurrent acceptances.
//!
//! Any number of candidates may answer the same request at the same time.
//! Each attempt reads the request, applies the `Accept` transition and
//! commits it against the version it read. Exactly one commit can succeed
//! from a searching status; every other caller observes the winner on its
//! next read and is told the shift is taken.

use crate::apply::apply;
use crate::collaborators::Clock;
use crate::error::WorkflowError;
use crate::repository::{CommitOutcome, LockHint, RepositoryError, RequestCommit, WorkflowStore};
use crate::selector::CandidateSelector;
use crate::state::TransitionResult;
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use shift_swap_domain::{RequestId, RequestStatus, SubstitutionRequest, WorkerId};
use tracing::{debug, info, warn};

/// Commit attempts made for one acceptance before settling on an outcome.
pub const MAX_ACCEPT_ATTEMPTS: usize = 2;

/// What a candidate is told after accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptOutcome {
    /// The candidate is the proposed replacement.
    Won,
    /// Someone else got the shift first.
    AlreadyTaken,
    /// The request was rejected or cancelled.
    Closed,
}

impl AcceptOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::AlreadyTaken => "already_taken",
            Self::Closed => "closed",
        }
    }
}

/// The settled acceptance and, if this call won, what it committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arbitration {
    pub outcome: AcceptOutcome,
    pub committed: Option<(TransitionResult, CommitOutcome)>,
}

/// Serialises acceptances of one request through versioned commits.
pub struct AcceptanceArbiter<'a> {
    store: &'a dyn WorkflowStore,
    selector: CandidateSelector<'a>,
    clock: &'a dyn Clock,
}

impl<'a> AcceptanceArbiter<'a> {
    #[must_use]
    pub const fn new(
        store: &'a dyn WorkflowStore,
        selector: CandidateSelector<'a>,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            selector,
            clock,
        }
    }

    /// Settles an acceptance by `candidate`.
    ///
    /// Accepting again after winning is idempotent and yields `Won` without
    /// a second commit. When every attempt loses a version race the request
    /// is re-read and classified; a request that is still searching at that
    /// point yields `AlreadyTaken`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request does not exist
    /// - The candidate declined, expired, or is outside the pool
    /// - The store or a directory fails
    pub fn arbitrate(
        &self,
        request_id: RequestId,
        candidate: WorkerId,
    ) -> Result<Arbitration, WorkflowError> {
        for attempt in 1..=MAX_ACCEPT_ATTEMPTS {
            let request: SubstitutionRequest = self.load(request_id, LockHint::ForUpdate)?;
            if let Some(outcome) = classify(&request, candidate) {
                debug!(
                    request = %request_id,
                    candidate = %candidate,
                    status = request.status.as_str(),
                    outcome = outcome.as_str(),
                    "Acceptance settled without commit"
                );
                return Ok(Arbitration {
                    outcome,
                    committed: None,
                });
            }

            self.check_eligible(&request, candidate)?;

            let result: TransitionResult =
                apply(&request, Transition::Accept { candidate }, self.clock.now())?;
            match self
                .store
                .commit(&RequestCommit::from_result(&result, request.version))
            {
                Ok(outcome) => {
                    info!(
                        request = %request_id,
                        candidate = %candidate,
                        version = outcome.request.version,
                        "Candidate won the shift"
                    );
                    return Ok(Arbitration {
                        outcome: AcceptOutcome::Won,
                        committed: Some((result, outcome)),
                    });
                }
                Err(RepositoryError::VersionConflict {
                    expected, actual, ..
                }) => {
                    debug!(
                        request = %request_id,
                        candidate = %candidate,
                        attempt,
                        expected,
                        actual,
                        "Acceptance lost a version race"
                    );
                }
                Err(RepositoryError::OfferStateConflict { actual, .. }) => {
                    debug!(
                        request = %request_id,
                        candidate = %candidate,
                        state = actual.as_str(),
                        "Offer closed before the acceptance was committed"
                    );
                    return Err(WorkflowError::CandidateIneligible {
                        request_id,
                        candidate,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        let request: SubstitutionRequest = self.load(request_id, LockHint::Shared)?;
        let outcome: AcceptOutcome =
            classify(&request, candidate).unwrap_or(AcceptOutcome::AlreadyTaken);
        warn!(
            request = %request_id,
            candidate = %candidate,
            attempts = MAX_ACCEPT_ATTEMPTS,
            outcome = outcome.as_str(),
            "Acceptance attempts exhausted"
        );
        Ok(Arbitration {
            outcome,
            committed: None,
        })
    }

    fn load(
        &self,
        request_id: RequestId,
        lock: LockHint,
    ) -> Result<SubstitutionRequest, WorkflowError> {
        self.store
            .find(request_id, lock)?
            .ok_or(WorkflowError::RequestNotFound(request_id))
    }

    fn check_eligible(
        &self,
        request: &SubstitutionRequest,
        candidate: WorkerId,
    ) -> Result<(), WorkflowError> {
        let ineligible = WorkflowError::CandidateIneligible {
            request_id: request.id,
            candidate,
        };
        if let Some(offer) = self.store.find_offer(request.id, candidate)?
            && !offer.state.is_open()
        {
            return Err(ineligible);
        }
        if !self
            .selector
            .is_eligible(request, request.effective_scope(), candidate)?
        {
            return Err(ineligible);
        }
        Ok(())
    }
}

/// Outcome for a request that can no longer be accepted, or `None` while
/// it is still searching.
#[must_use]
pub fn classify(request: &SubstitutionRequest, candidate: WorkerId) -> Option<AcceptOutcome> {
    match request.status {
        RequestStatus::New | RequestStatus::InProgress => None,
        RequestStatus::WaitingApproval if request.proposed_replacement == Some(candidate) => {
            Some(AcceptOutcome::Won)
        }
        RequestStatus::WaitingApproval | RequestStatus::Approved => {
            Some(AcceptOutcome::AlreadyTaken)
        }
        RequestStatus::Rejected | RequestStatus::Cancelled => Some(AcceptOutcome::Closed),
    }
}
