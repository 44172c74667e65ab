// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every mutation that reads before it writes runs inside an immediate
//! transaction so that concurrent writers, including other processes
//! sharing the database file, are serialised by `SQLite`.
//!
//! - `requests`: Request insertion and versioned commits
//! - `offers`: Offer bookkeeping
//! - `staff`: Workers, locations and the work schedule

pub mod offers;
pub mod requests;
pub mod staff;

pub use offers::{record_notified, transition_offer};
pub use requests::{commit_request, insert_request};
pub use staff::{
    add_schedule_entry, create_location, create_worker, move_schedule_entry,
    set_location_approver, set_worker_approved,
};
