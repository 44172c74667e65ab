// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap_audit::{Actor, AuditEventType};
use shift_swap_domain::{Scope, WorkerId};

/// A state-changing action on a single substitution request.
///
/// Transitions carry the acting worker but no request identity; the
/// workflow loads the request and hands both to [`crate::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Choose the candidate pool and start the search.
    SetScope {
        /// The supervisor routing the request.
        supervisor: WorkerId,
        /// The chosen targeting scope.
        scope: Scope,
    },
    /// The supervisor covers the shift personally.
    TakeBySupervisor {
        /// The supervisor taking the shift.
        supervisor: WorkerId,
    },
    /// A candidate takes the shift.
    Accept {
        /// The accepting candidate.
        candidate: WorkerId,
    },
    /// Final sign-off of the proposed replacement.
    Approve {
        /// The approver signing off.
        approver: WorkerId,
    },
    /// The approver refuses the proposed replacement; the search resumes.
    RejectProposal {
        /// The approver refusing.
        approver: WorkerId,
        /// Optional explanation.
        reason: Option<String>,
    },
    /// The supervisor refuses the whole request.
    RejectRequest {
        /// The supervisor refusing.
        supervisor: WorkerId,
        /// Mandatory explanation.
        reason: String,
    },
    /// The supervisor withdraws the request.
    Cancel {
        /// The supervisor cancelling.
        supervisor: WorkerId,
    },
}

impl Transition {
    /// Stable name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetScope { .. } => "set_scope",
            Self::TakeBySupervisor { .. } => "take_by_supervisor",
            Self::Accept { .. } => "accept",
            Self::Approve { .. } => "approve",
            Self::RejectProposal { .. } => "reject_proposal",
            Self::RejectRequest { .. } => "reject_request",
            Self::Cancel { .. } => "cancel",
        }
    }

    /// The worker performing the transition, in the capacity they act in.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        match self {
            Self::SetScope { supervisor, .. }
            | Self::TakeBySupervisor { supervisor }
            | Self::RejectRequest { supervisor, .. }
            | Self::Cancel { supervisor } => Actor::supervisor(*supervisor),
            Self::Accept { candidate } => Actor::candidate(*candidate),
            Self::Approve { approver } | Self::RejectProposal { approver, .. } => {
                Actor::approver(*approver)
            }
        }
    }

    pub(crate) const fn event_type(&self) -> AuditEventType {
        match self {
            Self::SetScope { .. } => AuditEventType::ScopeSet,
            Self::TakeBySupervisor { .. } => AuditEventType::TakenBySupervisor,
            Self::Accept { .. } => AuditEventType::OfferAccepted,
            Self::Approve { .. } => AuditEventType::Approved,
            Self::RejectProposal { .. } => AuditEventType::ApprovalRejected,
            Self::RejectRequest { .. } => AuditEventType::RequestRejected,
            Self::Cancel { .. } => AuditEventType::Cancelled,
        }
    }
}
