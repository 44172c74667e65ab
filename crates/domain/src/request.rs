// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Substitution request aggregate and its lifecycle states.
//!
//! A request is raised by a worker who cannot cover a scheduled shift.
//! It moves through the statuses below exclusively via workflow transitions
//! and becomes immutable once it reaches a terminal status.

use crate::error::DomainError;
use crate::types::{LocationId, RequestId, WorkerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Lifecycle status of a substitution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Raised, no scope chosen yet.
    New,
    /// A supervisor is searching for a replacement.
    InProgress,
    /// A replacement is proposed and waits for final sign-off.
    WaitingApproval,
    /// Final sign-off given; the schedule has been amended.
    Approved,
    /// Refused by the supervisor.
    Rejected,
    /// Withdrawn: the requester keeps working the shift.
    Cancelled,
}

impl RequestStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::WaitingApproval => "waiting_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no transition may leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }

    /// Returns true for the statuses that count towards the
    /// one-active-request-per-shift rule.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Statuses in which a supervisor may still look for a replacement.
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "waiting_approval" => Ok(Self::WaitingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidRequestStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Breadth of workers considered for a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Workers at the request's location.
    Location,
    /// Workers at every location sharing the request location's approver.
    ManagerGroup,
    /// Every eligible worker.
    All,
}

impl Scope {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::ManagerGroup => "manager_group",
            Self::All => "all",
        }
    }
}

impl FromStr for Scope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Self::Location),
            "manager_group" => Ok(Self::ManagerGroup),
            "all" => Ok(Self::All),
            _ => Err(DomainError::InvalidScope(s.to_string())),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The substitution request aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRequest {
    pub id: RequestId,
    /// The worker who cannot work the shift.
    pub requester: WorkerId,
    pub location: LocationId,
    #[serde(with = "iso_date")]
    pub shift_date: Date,
    pub status: RequestStatus,
    /// Raised for the same day.
    pub urgent: bool,
    pub scope: Option<Scope>,
    /// Candidate currently pending final approval.
    pub proposed_replacement: Option<WorkerId>,
    /// Set once by the approval transition, never reset.
    pub confirmed_replacement: Option<WorkerId>,
    pub resolved_by: Option<WorkerId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    pub reject_reason: Option<String>,
    /// Incremented on every persisted mutation.
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl SubstitutionRequest {
    /// Returns true if the request still counts as active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns true if the request is waiting for approval of `candidate`.
    #[must_use]
    pub fn is_proposed_for(&self, candidate: WorkerId) -> bool {
        self.status == RequestStatus::WaitingApproval
            && self.proposed_replacement == Some(candidate)
    }

    /// The scope used to resolve candidates when none has been chosen yet.
    #[must_use]
    pub fn effective_scope(&self) -> Scope {
        self.scope.unwrap_or(Scope::Location)
    }
}

/// Insert shape of a substitution request.
///
/// The store assigns the id and initial version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubstitutionRequest {
    pub requester: WorkerId,
    pub location: LocationId,
    pub shift_date: Date,
    pub urgent: bool,
    pub created_at: OffsetDateTime,
}

impl NewSubstitutionRequest {
    /// Builds the first persisted state of the request.
    #[must_use]
    pub fn into_request(self, id: RequestId) -> SubstitutionRequest {
        SubstitutionRequest {
            id,
            requester: self.requester,
            location: self.location,
            shift_date: self.shift_date,
            status: RequestStatus::New,
            urgent: self.urgent,
            scope: None,
            proposed_replacement: None,
            confirmed_replacement: None,
            resolved_by: None,
            resolved_at: None,
            reject_reason: None,
            version: 1,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
