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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod offer;
mod request;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use offer::{CandidateOffer, ChannelRef, OfferState};
pub use request::{NewSubstitutionRequest, RequestStatus, Scope, SubstitutionRequest};
pub use types::{Location, LocationId, OfferId, RequestId, Role, Worker, WorkerId};
pub use validation::{
    is_urgent, local_date, parse_shift_date, validate_display_name, validate_location_name,
    validate_shift_date,
};
