// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Generates an `i64` row-id newtype with the conversions every identifier needs.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a canonical row id.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw row id.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

row_id! {
    /// Identity of a staff member (requester, candidate, supervisor or approver).
    WorkerId
}

row_id! {
    /// Identity of a retail site.
    LocationId
}

row_id! {
    /// Identity of a substitution request.
    RequestId
}

row_id! {
    /// Identity of a candidate offer.
    OfferId
}

/// Staff role tiers.
///
/// Only seller-tier roles may cover another worker's shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular sales floor worker.
    Seller,
    /// Experienced sales floor worker.
    SeniorSeller,
    /// Location supervisor who routes substitution requests.
    Supervisor,
    /// Gives final sign-off on substitutions for a group of locations.
    Approver,
    /// System administrator.
    Admin,
}

impl Role {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::SeniorSeller => "senior_seller",
            Self::Supervisor => "supervisor",
            Self::Approver => "approver",
            Self::Admin => "admin",
        }
    }

    /// Returns true for roles that can be offered someone else's shift.
    #[must_use]
    pub const fn is_seller_tier(&self) -> bool {
        matches!(self, Self::Seller | Self::SeniorSeller)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seller" => Ok(Self::Seller),
            "senior_seller" => Ok(Self::SeniorSeller),
            "supervisor" => Ok(Self::Supervisor),
            "approver" => Ok(Self::Approver),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// The canonical worker id.
    pub id: WorkerId,
    /// Name shown to supervisors when choosing candidates.
    pub display_name: String,
    /// The worker's role tier.
    pub role: Role,
    /// The worker's home location.
    pub location: LocationId,
    /// Whether registration has been approved.
    pub approved: bool,
}

impl Worker {
    /// Returns true if this worker may be offered a substitution at all.
    ///
    /// Scheduling conflicts are checked separately because they depend on the date.
    #[must_use]
    pub const fn is_candidate_material(&self) -> bool {
        self.approved && self.role.is_seller_tier()
    }
}

/// A retail site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The canonical location id.
    pub id: LocationId,
    /// Human readable name.
    pub name: String,
    /// The approver responsible for this site, if any.
    pub approver: Option<WorkerId>,
}
