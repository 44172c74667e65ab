// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the substitution workflow.
//!
//! [`SqliteStore`] is the durable implementation of the workflow's storage
//! contracts and of the staff directory, approver directory and work
//! calendar it consults. It is built on Diesel with embedded migrations.
//!
//! ## Concurrency
//!
//! The connection is guarded by a mutex, so a single store serialises its
//! callers. Writes that read before they write run in immediate
//! transactions, which also serialises separate processes sharing one
//! database file. Request commits are additionally guarded by the
//! request's version column.
//!
//! ## Testing
//!
//! Tests run against isolated shared-cache in-memory databases created by
//! [`SqliteStore::new_in_memory`].

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use shift_swap::{
    ApproverDirectory, CandidateRepository, CollaboratorError, CommitOutcome, LockHint,
    RepositoryError, RequestCommit, RequestRepository, ScheduleMutator, StaffDirectory,
    WorkScheduleQuery,
};
use shift_swap_domain::{
    CandidateOffer, ChannelRef, Location, LocationId, NewSubstitutionRequest, OfferId,
    OfferState, RequestId, Role, SubstitutionRequest, Worker, WorkerId,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use time::{Date, OffsetDateTime};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Durable store for requests, offers, staff and the work schedule.
pub struct SqliteStore {
    conn: Mutex<SqliteConnection>,
}

impl SqliteStore {
    /// Creates a store backed by a fresh in-memory database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:memdb_shift_swap_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a store backed by a database file, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::ConnectionPoisoned)
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut *self.conn()?)
    }

    // ========================================================================
    // Staff administration
    // ========================================================================

    /// Creates a location, optionally with its approver.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or taken, or the approver does
    /// not exist.
    pub fn create_location(
        &self,
        name: &str,
        approver: Option<WorkerId>,
    ) -> Result<Location, PersistenceError> {
        mutations::create_location(&mut *self.conn()?, name, approver)
    }

    /// Sets or clears the approver of a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location or approver does not exist.
    pub fn set_location_approver(
        &self,
        location: LocationId,
        approver: Option<WorkerId>,
    ) -> Result<(), PersistenceError> {
        mutations::set_location_approver(&mut *self.conn()?, location, approver)
    }

    /// Lists all locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_locations(&self) -> Result<Vec<Location>, PersistenceError> {
        queries::list_locations(&mut *self.conn()?)
    }

    /// Registers a worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the location does not exist.
    pub fn create_worker(
        &self,
        display_name: &str,
        role: Role,
        location: LocationId,
        approved: bool,
    ) -> Result<Worker, PersistenceError> {
        mutations::create_worker(&mut *self.conn()?, display_name, role, location, approved)
    }

    /// Approves or suspends a worker's registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker does not exist.
    pub fn set_worker_approved(
        &self,
        worker: WorkerId,
        approved: bool,
    ) -> Result<Worker, PersistenceError> {
        mutations::set_worker_approved(&mut *self.conn()?, worker, approved)
    }

    /// Loads one worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_worker(&self, worker: WorkerId) -> Result<Option<Worker>, PersistenceError> {
        queries::find_worker(&mut *self.conn()?, worker)
    }

    /// Lists all workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn workers(&self) -> Result<Vec<Worker>, PersistenceError> {
        queries::list_workers(&mut *self.conn()?)
    }

    /// Puts a worker on the schedule for a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker already works that day.
    pub fn add_schedule_entry(
        &self,
        worker: WorkerId,
        location: LocationId,
        shift_date: Date,
    ) -> Result<(), PersistenceError> {
        mutations::add_schedule_entry(&mut *self.conn()?, worker, location, shift_date)
    }
}

impl RequestRepository for SqliteStore {
    fn insert(
        &self,
        request: &NewSubstitutionRequest,
    ) -> Result<SubstitutionRequest, RepositoryError> {
        Ok(mutations::insert_request(&mut *self.conn()?, request)?)
    }

    fn find(
        &self,
        id: RequestId,
        _lock: LockHint,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        Ok(queries::find_request(&mut *self.conn()?, id)?)
    }

    fn find_active_for(
        &self,
        requester: WorkerId,
        shift_date: Date,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        Ok(queries::find_active_request(
            &mut *self.conn()?,
            requester,
            shift_date,
        )?)
    }

    fn list_active(
        &self,
        location: Option<LocationId>,
    ) -> Result<Vec<SubstitutionRequest>, RepositoryError> {
        Ok(queries::list_active_requests(&mut *self.conn()?, location)?)
    }

    fn commit(&self, commit: &RequestCommit) -> Result<CommitOutcome, RepositoryError> {
        Ok(mutations::commit_request(&mut *self.conn()?, commit)?)
    }
}

impl CandidateRepository for SqliteStore {
    fn record_notified(
        &self,
        request: RequestId,
        candidate: WorkerId,
        channel: Option<ChannelRef>,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        Ok(mutations::record_notified(
            &mut *self.conn()?,
            request,
            candidate,
            channel.as_ref(),
            now,
        )?)
    }

    fn find_offer(
        &self,
        request: RequestId,
        candidate: WorkerId,
    ) -> Result<Option<CandidateOffer>, RepositoryError> {
        Ok(queries::find_offer(&mut *self.conn()?, request, candidate)?)
    }

    fn list_offers(&self, request: RequestId) -> Result<Vec<CandidateOffer>, RepositoryError> {
        Ok(queries::list_offers(&mut *self.conn()?, request)?)
    }

    fn transition_offer(
        &self,
        offer: OfferId,
        from: OfferState,
        to: OfferState,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        Ok(mutations::transition_offer(
            &mut *self.conn()?,
            offer,
            from,
            to,
            now,
        )?)
    }
}

impl StaffDirectory for SqliteStore {
    fn list_workers(&self) -> Result<Vec<Worker>, CollaboratorError> {
        Ok(queries::list_workers(&mut *self.conn()?)?)
    }
}

impl ApproverDirectory for SqliteStore {
    fn resolve_approver(
        &self,
        location: LocationId,
    ) -> Result<Option<WorkerId>, CollaboratorError> {
        Ok(queries::location_approver(&mut *self.conn()?, location)?)
    }
}

impl WorkScheduleQuery for SqliteStore {
    fn is_scheduled_to_work(&self, worker: WorkerId, date: Date) -> Result<bool, CollaboratorError> {
        Ok(queries::is_scheduled(&mut *self.conn()?, worker, date)?)
    }
}

impl ScheduleMutator for SqliteStore {
    fn apply_replacement(
        &self,
        original: WorkerId,
        replacement: WorkerId,
        location: LocationId,
        date: Date,
    ) -> Result<(), CollaboratorError> {
        Ok(mutations::move_schedule_entry(
            &mut *self.conn()?,
            original,
            replacement,
            location,
            date,
        )?)
    }
}
