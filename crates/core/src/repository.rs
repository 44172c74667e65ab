// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage contracts for requests and offers.
//!
//! Writes to a request are guarded by its `version`: a commit only succeeds
//! when the stored version still equals the version the transition was
//! computed from. Offer bookkeeping travels inside the same commit so that
//! request status and offer states can never disagree.

use crate::state::{OfferChange, TransitionResult};
use shift_swap_domain::{
    CandidateOffer, ChannelRef, LocationId, NewSubstitutionRequest, OfferId, OfferState,
    RequestId, RequestStatus, SubstitutionRequest, WorkerId,
};
use time::{Date, OffsetDateTime};

/// Errors reported by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requester already has an active request for the shift.
    DuplicateActive {
        /// The request that is still active.
        existing: RequestId,
    },
    /// The stored version no longer matches the expected one.
    VersionConflict {
        /// The contended request.
        request_id: RequestId,
        /// Version the commit was computed from.
        expected: i64,
        /// Version found in the store.
        actual: i64,
    },
    /// An offer was not in the state the caller expected.
    OfferStateConflict {
        /// The offer being transitioned.
        offer: OfferId,
        /// State the caller expected.
        expected: OfferState,
        /// State found in the store.
        actual: OfferState,
    },
    /// Offers can only be recorded while the request is searching.
    RequestNotSearching {
        /// The request that was addressed.
        request_id: RequestId,
        /// Its current status.
        status: RequestStatus,
    },
    /// A referenced row does not exist.
    NotFound(String),
    /// The store could not be reached or failed internally.
    Unavailable(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateActive { existing } => {
                write!(f, "An active request already exists: {existing}")
            }
            Self::VersionConflict {
                request_id,
                expected,
                actual,
            } => write!(
                f,
                "Version conflict on request {request_id}: expected {expected}, found {actual}"
            ),
            Self::OfferStateConflict {
                offer,
                expected,
                actual,
            } => write!(f, "Offer {offer} is {actual}, expected {expected}"),
            Self::RequestNotSearching { request_id, status } => write!(
                f,
                "Request {request_id} is {status} and no longer accepts offers"
            ),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Advisory locking hint for reads.
///
/// `ForUpdate` signals that the caller intends to commit a transition based
/// on the read. Stores may use it to serialise writers; correctness never
/// depends on it because commits are version checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockHint {
    Shared,
    ForUpdate,
}

/// A versioned write of one request plus its offer bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCommit {
    /// The full new state. Its version is `expected_version + 1`.
    pub request: SubstitutionRequest,
    /// The version the new state was derived from.
    pub expected_version: i64,
    /// Offer changes committed in the same unit.
    pub offer_change: OfferChange,
}

impl RequestCommit {
    /// Builds the commit for a transition computed from `expected_version`.
    #[must_use]
    pub fn from_result(result: &TransitionResult, expected_version: i64) -> Self {
        Self {
            request: result.new_request.clone(),
            expected_version,
            offer_change: result.offer_change,
        }
    }
}

/// What a successful commit changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The request as stored.
    pub request: SubstitutionRequest,
    /// Offers whose state changed, in their new state.
    pub changed_offers: Vec<CandidateOffer>,
}

/// Durable storage of substitution requests.
pub trait RequestRepository: Send + Sync {
    /// Stores a new request in status `New` with version 1.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateActive` if the requester already has an active
    /// request for the same shift date.
    fn insert(
        &self,
        request: &NewSubstitutionRequest,
    ) -> Result<SubstitutionRequest, RepositoryError>;

    /// Loads one request.
    ///
    /// `lock` is advisory. A store may serialise `ForUpdate` readers, but
    /// neither bundled store does: the version check in [`Self::commit`]
    /// is what keeps a transition from overwriting a newer state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find(
        &self,
        id: RequestId,
        lock: LockHint,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError>;

    /// Returns the requester's active request for a shift date, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_active_for(
        &self,
        requester: WorkerId,
        shift_date: Date,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError>;

    /// Lists active requests, optionally restricted to one location.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_active(
        &self,
        location: Option<LocationId>,
    ) -> Result<Vec<SubstitutionRequest>, RepositoryError>;

    /// Atomically writes a new request state and its offer bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the stored version differs from
    /// `expected_version`, or `OfferStateConflict` if an acceptance names a
    /// candidate whose offer was declined or expired. Nothing is written in
    /// either case.
    fn commit(&self, commit: &RequestCommit) -> Result<CommitOutcome, RepositoryError>;
}

/// Durable storage of candidate offers.
pub trait CandidateRepository: Send + Sync {
    /// Records that a candidate was notified.
    ///
    /// Creates the offer, or reopens a declined or expired one. An offer that
    /// is already `Notified` or `Accepted` is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotSearching` if the request has left the search phase.
    fn record_notified(
        &self,
        request: RequestId,
        candidate: WorkerId,
        channel: Option<ChannelRef>,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError>;

    /// Loads the offer made to a candidate for a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn find_offer(
        &self,
        request: RequestId,
        candidate: WorkerId,
    ) -> Result<Option<CandidateOffer>, RepositoryError>;

    /// Lists all offers of a request in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_offers(&self, request: RequestId) -> Result<Vec<CandidateOffer>, RepositoryError>;

    /// Moves one offer from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `OfferStateConflict` if the offer is not in state `from`.
    fn transition_offer(
        &self,
        offer: OfferId,
        from: OfferState,
        to: OfferState,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError>;
}

/// A store that holds both requests and offers.
pub trait WorkflowStore: RequestRepository + CandidateRepository {}

impl<T: RequestRepository + CandidateRepository> WorkflowStore for T {}
