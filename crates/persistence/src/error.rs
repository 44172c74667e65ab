// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap::{CollaboratorError, RepositoryError};
use shift_swap_domain::{DomainError, OfferId, OfferState, RequestId, RequestStatus};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// Another thread panicked while holding the connection.
    ConnectionPoisoned,
    /// A stored value could not be mapped back onto a domain type.
    CorruptRow(String),
    /// Input rejected by domain validation before reaching the database.
    Invalid(DomainError),
    /// The requester already holds an active request for the date.
    DuplicateActive { existing: RequestId },
    /// The stored request version differs from the expected one.
    VersionConflict {
        request_id: RequestId,
        expected: i64,
        actual: i64,
    },
    /// The offer was not in the state the caller expected.
    OfferStateConflict {
        offer: OfferId,
        expected: OfferState,
        actual: OfferState,
    },
    /// Offers may only be recorded while the request is being searched.
    RequestNotSearching {
        request_id: RequestId,
        status: RequestStatus,
    },
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::ConnectionPoisoned => write!(f, "Database connection lock is poisoned"),
            Self::CorruptRow(msg) => write!(f, "Corrupt row: {msg}"),
            Self::Invalid(err) => write!(f, "Invalid input: {err}"),
            Self::DuplicateActive { existing } => {
                write!(f, "An active request already exists: {existing}")
            }
            Self::VersionConflict {
                request_id,
                expected,
                actual,
            } => write!(
                f,
                "Request {request_id} is at version {actual}, expected {expected}"
            ),
            Self::OfferStateConflict {
                offer,
                expected,
                actual,
            } => write!(f, "Offer {offer} is {actual}, expected {expected}"),
            Self::RequestNotSearching { request_id, status } => {
                write!(f, "Request {request_id} is {status} and takes no new offers")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::Invalid(err)
    }
}

impl From<PersistenceError> for RepositoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::DuplicateActive { existing } => Self::DuplicateActive { existing },
            PersistenceError::VersionConflict {
                request_id,
                expected,
                actual,
            } => Self::VersionConflict {
                request_id,
                expected,
                actual,
            },
            PersistenceError::OfferStateConflict {
                offer,
                expected,
                actual,
            } => Self::OfferStateConflict {
                offer,
                expected,
                actual,
            },
            PersistenceError::RequestNotSearching { request_id, status } => {
                Self::RequestNotSearching { request_id, status }
            }
            PersistenceError::NotFound(msg) => Self::NotFound(msg),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl From<PersistenceError> for CollaboratorError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(msg) => Self::Rejected(msg),
            other => Self::Unavailable(format!("staff database ({other})")),
        }
    }
}
