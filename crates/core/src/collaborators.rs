// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ports to the systems the workflow depends on but does not own.

use shift_swap_domain::{ChannelRef, LocationId, SubstitutionRequest, Worker, WorkerId};
use time::{Date, OffsetDateTime};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} is unavailable")]
    Unavailable(String),
    #[error("call rejected: {0}")]
    Rejected(String),
}

/// Amends the work calendar.
pub trait ScheduleMutator: Send + Sync {
    /// Moves the shift of `original` on `date` at `location` to `replacement`.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar could not be amended.
    fn apply_replacement(
        &self,
        original: WorkerId,
        replacement: WorkerId,
        location: LocationId,
        date: Date,
    ) -> Result<(), CollaboratorError>;
}

/// Read access to the work calendar.
pub trait WorkScheduleQuery: Send + Sync {
    /// Returns true if the worker has a shift on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot be read.
    fn is_scheduled_to_work(&self, worker: WorkerId, date: Date) -> Result<bool, CollaboratorError>;
}

/// Resolves who gives final sign-off for a location.
pub trait ApproverDirectory: Send + Sync {
    /// Returns the approver of `location`, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn resolve_approver(
        &self,
        location: LocationId,
    ) -> Result<Option<WorkerId>, CollaboratorError>;
}

/// Lists registered staff.
pub trait StaffDirectory: Send + Sync {
    /// Returns every registered worker, approved or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn list_workers(&self) -> Result<Vec<Worker>, CollaboratorError>;
}

/// How an offer was settled, as shown to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The candidate took the shift.
    Accepted,
    /// The candidate said no.
    Declined,
}

impl OfferOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

/// Delivers offers to candidates and updates them once settled.
pub trait NotificationDispatcher: Send + Sync {
    /// Sends an offer for `request` to `candidate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    fn notify(
        &self,
        candidate: WorkerId,
        request: &SubstitutionRequest,
    ) -> Result<ChannelRef, CollaboratorError>;

    /// Marks a delivered offer as no longer available.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be updated.
    fn expire(&self, channel: &ChannelRef) -> Result<(), CollaboratorError>;

    /// Marks a delivered offer as answered.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be updated.
    fn resolve(
        &self,
        channel: &ChannelRef,
        outcome: OfferOutcome,
    ) -> Result<(), CollaboratorError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
