// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `requests`: Substitution request lookups
//! - `offers`: Candidate offer lookups
//! - `staff`: Workers, locations and the work schedule

pub mod offers;
pub mod requests;
pub mod staff;

pub use offers::{find_offer, find_offer_by_id, list_offers, offer_ids_in_state};
pub use requests::{find_active_request, find_request, list_active_requests, request_version};
pub use staff::{find_worker, is_scheduled, list_locations, list_workers, location_approver};
