// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap::{RepositoryError, WorkflowError};
use shift_swap_persistence::PersistenceError;

/// Errors surfaced by a command.
#[derive(Debug)]
pub enum CliError {
    /// The workflow refused the operation.
    Workflow(WorkflowError),
    /// A staff or calendar administration call failed.
    Store(PersistenceError),
    /// The result could not be rendered.
    Output(serde_json::Error),
}

impl CliError {
    /// Short machine-readable category for the error report.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Workflow(WorkflowError::Validation(_))
            | Self::Store(PersistenceError::Invalid(_)) => "validation",
            Self::Workflow(
                WorkflowError::RequestNotFound(_)
                | WorkflowError::Repository(RepositoryError::NotFound(_)),
            )
            | Self::Store(PersistenceError::NotFound(_)) => "not_found",
            Self::Workflow(
                WorkflowError::DuplicateActiveRequest { .. }
                | WorkflowError::RequestClosed { .. }
                | WorkflowError::InvalidTransition { .. }
                | WorkflowError::OfferNotPending { .. }
                | WorkflowError::ConcurrentModification { .. },
            ) => "conflict",
            Self::Workflow(WorkflowError::CandidateIneligible { .. }) => "ineligible",
            Self::Workflow(_) | Self::Store(_) => "unavailable",
            Self::Output(_) => "output",
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workflow(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "Failed to render output: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Workflow(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        Self::Workflow(err)
    }
}

impl From<PersistenceError> for CliError {
    fn from(err: PersistenceError) -> Self {
        Self::Store(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err)
    }
}
