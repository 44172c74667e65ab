// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff directory and schedule queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap_domain::{Location, LocationId, Worker, WorkerId};
use time::Date;
use tracing::debug;

use crate::data_models::{LocationRow, WorkerRow, convert_rows, format_date};
use crate::diesel_schema::{locations, schedule_entries, workers};
use crate::error::PersistenceError;

/// Lists all registered workers ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_workers(conn: &mut SqliteConnection) -> Result<Vec<Worker>, PersistenceError> {
    let rows: Vec<WorkerRow> = workers::table
        .order(workers::worker_id.asc())
        .select(WorkerRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_workers: {e}")))?;

    debug!(count = rows.len(), "Loaded workers");
    convert_rows(rows)
}

/// Loads one worker.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_worker(
    conn: &mut SqliteConnection,
    worker: WorkerId,
) -> Result<Option<Worker>, PersistenceError> {
    let row: Option<WorkerRow> = workers::table
        .filter(workers::worker_id.eq(worker.value()))
        .select(WorkerRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_worker: {e}")))?;

    row.map(Worker::try_from).transpose()
}

/// Lists all locations ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_locations(conn: &mut SqliteConnection) -> Result<Vec<Location>, PersistenceError> {
    let rows: Vec<LocationRow> = locations::table
        .order(locations::location_id.asc())
        .select(LocationRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_locations: {e}")))?;

    Ok(rows.into_iter().map(Location::from).collect())
}

/// Returns the approver responsible for a location.
///
/// Unknown locations and locations without an approver both yield `None`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn location_approver(
    conn: &mut SqliteConnection,
    location: LocationId,
) -> Result<Option<WorkerId>, PersistenceError> {
    let approver: Option<Option<i64>> = locations::table
        .filter(locations::location_id.eq(location.value()))
        .select(locations::approver_id)
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("location_approver: {e}")))?;

    Ok(approver.flatten().map(WorkerId::new))
}

/// Returns true if the worker has a schedule entry on `shift_date`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_scheduled(
    conn: &mut SqliteConnection,
    worker: WorkerId,
    shift_date: Date,
) -> Result<bool, PersistenceError> {
    let date_text: String = format_date(shift_date)?;

    let count: i64 = schedule_entries::table
        .filter(schedule_entries::worker_id.eq(worker.value()))
        .filter(schedule_entries::shift_date.eq(&date_text))
        .count()
        .get_result(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("is_scheduled: {e}")))?;

    Ok(count > 0)
}
