// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidate offers.
//!
//! An offer records that one candidate was invited to cover one request.
//! Offer rows are never deleted; once the request leaves the search phase
//! every offer still waiting for an answer is marked expired.

use crate::error::DomainError;
use crate::types::{OfferId, RequestId, WorkerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// State of a single offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferState {
    /// Delivered, no answer yet.
    Notified,
    /// The candidate took the shift.
    Accepted,
    /// The candidate said no.
    Declined,
    /// The request was resolved before the candidate answered.
    Expired,
}

impl OfferState {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notified => "notified",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    /// Returns true if the candidate may still accept through this offer.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Notified | Self::Accepted)
    }
}

impl FromStr for OfferState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notified" => Ok(Self::Notified),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "expired" => Ok(Self::Expired),
            _ => Err(DomainError::InvalidOfferState(s.to_string())),
        }
    }
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque handle to a delivered notification.
///
/// Only the notification dispatcher interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelRef(String);

impl ChannelRef {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An invitation for one candidate to cover one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateOffer {
    pub id: OfferId,
    pub request: RequestId,
    pub candidate: WorkerId,
    pub state: OfferState,
    /// Handle of the delivered message, if delivery succeeded.
    pub channel: Option<ChannelRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
