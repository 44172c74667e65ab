// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::WorkflowError;
use crate::state::{OfferChange, TransitionResult};
use crate::transition::Transition;
use shift_swap_audit::{AuditEvent, StateSnapshot};
use shift_swap_domain::{DomainError, RequestStatus, SubstitutionRequest};
use time::OffsetDateTime;

/// Applies a transition to a request, producing the next state and audit event.
///
/// This function is pure: it performs no I/O and never mutates its input.
/// Every successful transition increments the version by exactly one.
///
/// # Arguments
///
/// * `request` - The request as last read from the store
/// * `transition` - The transition to apply
/// * `now` - Timestamp recorded on the new state
///
/// # Errors
///
/// Returns an error if:
/// - The request is in a terminal status (`RequestClosed`)
/// - The transition is not allowed from the current status (`InvalidTransition`)
/// - The actor may not perform the transition on this request (`Validation`)
pub fn apply(
    request: &SubstitutionRequest,
    transition: Transition,
    now: OffsetDateTime,
) -> Result<TransitionResult, WorkflowError> {
    if request.status.is_terminal() {
        return Err(WorkflowError::RequestClosed {
            request_id: request.id,
            status: request.status,
        });
    }

    let mut next: SubstitutionRequest = request.clone();
    let mut details: Option<String> = None;
    let offer_change: OfferChange = match &transition {
        Transition::SetScope { scope, .. } => {
            require(request, &transition, RequestStatus::is_searching)?;
            next.scope = Some(*scope);
            next.status = RequestStatus::InProgress;
            details = Some(format!("scope={scope}"));
            OfferChange::None
        }
        Transition::TakeBySupervisor { supervisor } => {
            require(request, &transition, RequestStatus::is_searching)?;
            if *supervisor == request.requester {
                return Err(DomainError::SelfSubstitution {
                    worker: *supervisor,
                }
                .into());
            }
            next.proposed_replacement = Some(*supervisor);
            next.status = RequestStatus::WaitingApproval;
            OfferChange::None
        }
        Transition::Accept { candidate } => {
            require(request, &transition, RequestStatus::is_searching)?;
            if *candidate == request.requester {
                return Err(DomainError::SelfSubstitution { worker: *candidate }.into());
            }
            next.proposed_replacement = Some(*candidate);
            next.status = RequestStatus::WaitingApproval;
            OfferChange::Accept {
                candidate: *candidate,
            }
        }
        Transition::Approve { approver } => {
            require(request, &transition, |s| *s == RequestStatus::WaitingApproval)?;
            let Some(replacement) = request.proposed_replacement else {
                return Err(invalid(request, &transition));
            };
            next.confirmed_replacement = Some(replacement);
            next.status = RequestStatus::Approved;
            next.resolved_by = Some(*approver);
            next.resolved_at = Some(now);
            details = Some(format!("replacement={replacement}"));
            OfferChange::ExpireNotified
        }
        Transition::RejectProposal { reason, .. } => {
            require(request, &transition, |s| *s == RequestStatus::WaitingApproval)?;
            next.proposed_replacement = None;
            next.status = RequestStatus::InProgress;
            details.clone_from(reason);
            OfferChange::None
        }
        Transition::RejectRequest { supervisor, reason } => {
            require(request, &transition, RequestStatus::is_searching)?;
            if reason.trim().is_empty() {
                return Err(DomainError::MissingRejectReason.into());
            }
            next.status = RequestStatus::Rejected;
            next.proposed_replacement = None;
            next.reject_reason = Some(reason.trim().to_string());
            next.resolved_by = Some(*supervisor);
            next.resolved_at = Some(now);
            details = Some(reason.trim().to_string());
            OfferChange::ExpireNotified
        }
        Transition::Cancel { supervisor } => {
            require(request, &transition, |s| *s == RequestStatus::InProgress)?;
            next.status = RequestStatus::Cancelled;
            next.proposed_replacement = None;
            next.resolved_by = Some(*supervisor);
            next.resolved_at = Some(now);
            OfferChange::ExpireNotified
        }
    };

    next.version = request.version + 1;
    next.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        transition.event_type(),
        transition.actor(),
        request.id,
        request.location,
        details,
        StateSnapshot::new(request.status, request.version),
        StateSnapshot::new(next.status, next.version),
    );

    Ok(TransitionResult {
        new_request: next,
        offer_change,
        audit_event,
    })
}

fn require(
    request: &SubstitutionRequest,
    transition: &Transition,
    allowed: impl Fn(&RequestStatus) -> bool,
) -> Result<(), WorkflowError> {
    if allowed(&request.status) {
        Ok(())
    } else {
        Err(invalid(request, transition))
    }
}

const fn invalid(request: &SubstitutionRequest, transition: &Transition) -> WorkflowError {
    WorkflowError::InvalidTransition {
        request_id: request.id,
        status: request.status,
        transition: transition.name(),
    }
}
