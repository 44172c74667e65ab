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

//! Workflow engine for shift substitution requests.
//!
//! A worker who cannot cover a shift raises a request, a supervisor picks a
//! targeting scope and notifies candidates, the first candidate to accept
//! becomes the proposed replacement, and an approver gives final sign-off,
//! at which point the work calendar is amended.

mod apply;
mod arbiter;
mod collaborators;
mod config;
mod error;
mod memory;
mod repository;
mod selector;
mod state;
mod transition;
mod workflow;

#[cfg(test)]
mod tests;

pub use apply::apply;
pub use arbiter::{AcceptOutcome, AcceptanceArbiter, Arbitration, MAX_ACCEPT_ATTEMPTS, classify};
pub use collaborators::{
    ApproverDirectory, Clock, CollaboratorError, NotificationDispatcher, OfferOutcome,
    ScheduleMutator, StaffDirectory, SystemClock, WorkScheduleQuery,
};
pub use config::WorkflowConfig;
pub use error::WorkflowError;
pub use memory::InMemoryStore;
pub use repository::{
    CandidateRepository, CommitOutcome, LockHint, RepositoryError, RequestCommit,
    RequestRepository, WorkflowStore,
};
pub use selector::CandidateSelector;
pub use state::{OfferChange, TransitionResult};
pub use transition::Transition;
pub use workflow::{
    ApprovalOutcome, MAX_TRANSITION_ATTEMPTS, NotifyTarget, RequestWorkflow, WorkflowDeps,
};
