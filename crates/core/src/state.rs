// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap_audit::AuditEvent;
use shift_swap_domain::{SubstitutionRequest, WorkerId};

/// Offer bookkeeping that must be committed atomically with a request change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferChange {
    /// Offers are untouched.
    None,
    /// Every offer still in `Notified` becomes `Expired`.
    ExpireNotified,
    /// The candidate's offer becomes `Accepted`.
    ///
    /// Any other `Accepted` offer on the same request becomes `Expired`, so
    /// at most one accepted offer exists per request.
    Accept {
        /// The winning candidate.
        candidate: WorkerId,
    },
}

/// The result of applying a transition.
///
/// Nothing is persisted yet; the caller commits `new_request` together with
/// `offer_change` and records `audit_event` once the commit succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The request after the transition, with its version bumped.
    pub new_request: SubstitutionRequest,
    /// Offer bookkeeping belonging to the transition.
    pub offer_change: OfferChange,
    /// The audit event describing the transition.
    pub audit_event: AuditEvent,
}
