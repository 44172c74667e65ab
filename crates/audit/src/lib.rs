// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Audit trail contract for substitution workflow transitions.
//!
//! The workflow emits one [`AuditEvent`] per successful transition and hands
//! it to an [`AuditSink`]. Delivery is fire-and-forget: a failing sink never
//! changes the outcome of the transition that produced the event.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use shift_swap_domain::{LocationId, RequestId, RequestStatus, WorkerId};
use tracing::info;

/// The capacity in which a worker acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// The worker who raised the request.
    Requester,
    /// The supervisor routing the request.
    Supervisor,
    /// The approver giving final sign-off.
    Approver,
    /// A candidate answering an offer.
    Candidate,
    /// Automated processing.
    System,
}

impl ActorRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Supervisor => "supervisor",
            Self::Approver => "approver",
            Self::Candidate => "candidate",
            Self::System => "system",
        }
    }
}

/// Represents the entity performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The worker who initiated the change.
    pub worker: WorkerId,
    /// The capacity they acted in.
    pub role: ActorRole,
}

impl Actor {
    #[must_use]
    pub const fn new(worker: WorkerId, role: ActorRole) -> Self {
        Self { worker, role }
    }

    #[must_use]
    pub const fn requester(worker: WorkerId) -> Self {
        Self::new(worker, ActorRole::Requester)
    }

    #[must_use]
    pub const fn supervisor(worker: WorkerId) -> Self {
        Self::new(worker, ActorRole::Supervisor)
    }

    #[must_use]
    pub const fn approver(worker: WorkerId) -> Self {
        Self::new(worker, ActorRole::Approver)
    }

    #[must_use]
    pub const fn candidate(worker: WorkerId) -> Self {
        Self::new(worker, ActorRole::Candidate)
    }
}

/// Kinds of audited workflow events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    RequestCreated,
    ScopeSet,
    CandidatesNotified,
    TakenBySupervisor,
    OfferAccepted,
    OfferDeclined,
    Approved,
    ApprovalRejected,
    RequestRejected,
    Cancelled,
    /// The request was approved but the work calendar could not be amended.
    ScheduleSyncFailed,
}

impl AuditEventType {
    /// Returns the stable event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestCreated => "request_created",
            Self::ScopeSet => "scope_set",
            Self::CandidatesNotified => "candidates_notified",
            Self::TakenBySupervisor => "taken_by_supervisor",
            Self::OfferAccepted => "offer_accepted",
            Self::OfferDeclined => "offer_declined",
            Self::Approved => "approved",
            Self::ApprovalRejected => "approval_rejected",
            Self::RequestRejected => "request_rejected",
            Self::Cancelled => "cancelled",
            Self::ScheduleSyncFailed => "schedule_sync_failed",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The request status observed on one side of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub status: RequestStatus,
    pub version: i64,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(status: RequestStatus, version: i64) -> Self {
        Self { status, version }
    }
}

/// An immutable audit event representing a workflow transition.
///
/// Captures who acted, on which request and site, what happened, and the
/// status before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub actor: Actor,
    /// The request the event is about.
    pub subject: RequestId,
    pub location: LocationId,
    pub details: Option<String>,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    #[must_use]
    pub const fn new(
        event_type: AuditEventType,
        actor: Actor,
        subject: RequestId,
        location: LocationId,
        details: Option<String>,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_type,
            actor,
            subject,
            location,
            details,
            before,
            after,
        }
    }

    /// Returns true if the event changed the request status.
    #[must_use]
    pub fn changed_status(&self) -> bool {
        self.before.status != self.after.status
    }
}

/// Failure to deliver an audit event.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
    #[error("audit event rejected: {0}")]
    Rejected(String),
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes audit events to the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        info!(
            target: "audit",
            event = event.event_type.as_str(),
            actor = %event.actor.worker,
            actor_role = event.actor.role.as_str(),
            request = %event.subject,
            location = %event.location,
            before = event.before.status.as_str(),
            after = event.after.status.as_str(),
            version = event.after.version,
            details = event.details.as_deref().unwrap_or(""),
            "workflow event"
        );
        Ok(())
    }
}
