// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::collaborators::CollaboratorError;
use crate::repository::RepositoryError;
use shift_swap_domain::{DomainError, OfferState, RequestId, RequestStatus, WorkerId};
use time::Date;

/// Errors returned by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Input failed a domain rule.
    Validation(DomainError),
    /// The requester already has an active request for that shift.
    DuplicateActiveRequest {
        /// The worker who raised the request.
        requester: WorkerId,
        /// The shift in question.
        shift_date: Date,
        /// The request that is still active.
        existing: RequestId,
    },
    /// The request is in a terminal status and can no longer change.
    RequestClosed {
        /// The request that was addressed.
        request_id: RequestId,
        /// Its terminal status.
        status: RequestStatus,
    },
    /// The transition is not allowed from the request's current status.
    InvalidTransition {
        /// The request that was addressed.
        request_id: RequestId,
        /// The status the request is in.
        status: RequestStatus,
        /// Name of the refused transition.
        transition: &'static str,
    },
    /// The worker is not part of the candidate pool for the request.
    CandidateIneligible {
        /// The request that was addressed.
        request_id: RequestId,
        /// The worker who is not eligible.
        candidate: WorkerId,
    },
    /// The candidate has no offer waiting for an answer.
    OfferNotPending {
        /// The request that was addressed.
        request_id: RequestId,
        /// The candidate who answered.
        candidate: WorkerId,
        /// Current offer state, if an offer exists at all.
        state: Option<OfferState>,
    },
    /// No request with this id exists.
    RequestNotFound(RequestId),
    /// Concurrent writers kept invalidating the read state.
    ConcurrentModification {
        /// The contended request.
        request_id: RequestId,
        /// How many commits were attempted.
        attempts: usize,
    },
    /// The backing store failed.
    Repository(RepositoryError),
    /// A collaborator needed to complete the operation failed.
    Collaborator(CollaboratorError),
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "Validation failed: {err}"),
            Self::DuplicateActiveRequest {
                requester,
                shift_date,
                existing,
            } => write!(
                f,
                "Worker {requester} already has active request {existing} for {shift_date}"
            ),
            Self::RequestClosed { request_id, status } => {
                write!(f, "Request {request_id} is closed ({status})")
            }
            Self::InvalidTransition {
                request_id,
                status,
                transition,
            } => write!(
                f,
                "Cannot {transition} request {request_id} while it is {status}"
            ),
            Self::CandidateIneligible {
                request_id,
                candidate,
            } => write!(
                f,
                "Worker {candidate} is not an eligible candidate for request {request_id}"
            ),
            Self::OfferNotPending {
                request_id,
                candidate,
                state,
            } => match state {
                Some(state) => write!(
                    f,
                    "Offer of request {request_id} to worker {candidate} is {state}, not pending"
                ),
                None => write!(
                    f,
                    "Worker {candidate} has no offer for request {request_id}"
                ),
            },
            Self::RequestNotFound(id) => write!(f, "Request {id} not found"),
            Self::ConcurrentModification {
                request_id,
                attempts,
            } => write!(
                f,
                "Request {request_id} was modified concurrently ({attempts} attempts)"
            ),
            Self::Repository(err) => write!(f, "Repository error: {err}"),
            Self::Collaborator(err) => write!(f, "Collaborator error: {err}"),
        }
    }
}

impl std::error::Error for WorkflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repository(err) => Some(err),
            Self::Collaborator(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err)
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<CollaboratorError> for WorkflowError {
    fn from(err: CollaboratorError) -> Self {
        Self::Collaborator(err)
    }
}
