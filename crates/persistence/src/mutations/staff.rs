// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff directory and schedule mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use shift_swap_domain::{
    Location, LocationId, Role, Worker, WorkerId, validate_display_name, validate_location_name,
};
use time::Date;
use tracing::info;

use crate::backend::get_last_insert_rowid;
use crate::data_models::format_date;
use crate::diesel_schema::{locations, schedule_entries, workers};
use crate::error::PersistenceError;
use crate::queries::find_worker;

/// Creates a location.
///
/// # Errors
///
/// Returns an error if the name is blank or already taken, or if the
/// approver does not exist.
pub fn create_location(
    conn: &mut SqliteConnection,
    name: &str,
    approver: Option<WorkerId>,
) -> Result<Location, PersistenceError> {
    validate_location_name(name)?;
    let name: &str = name.trim();

    diesel::insert_into(locations::table)
        .values((
            locations::name.eq(name),
            locations::approver_id.eq(approver.map(WorkerId::value)),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_location: {e}")))?;

    let location_id = LocationId::new(get_last_insert_rowid(conn)?);
    info!(location_id = %location_id, name, "Created location");

    Ok(Location {
        id: location_id,
        name: name.to_string(),
        approver,
    })
}

/// Sets or clears the approver of a location.
///
/// # Errors
///
/// Returns `NotFound` if the location does not exist, or an error if the
/// approver does not exist.
pub fn set_location_approver(
    conn: &mut SqliteConnection,
    location: LocationId,
    approver: Option<WorkerId>,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(locations::table.filter(locations::location_id.eq(location.value())))
            .set(locations::approver_id.eq(approver.map(WorkerId::value)))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("set_location_approver: {e}")))?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("location {location}")));
    }

    info!(location_id = %location, approver = ?approver, "Updated location approver");
    Ok(())
}

/// Registers a worker.
///
/// # Errors
///
/// Returns an error if the display name is blank or the location does not
/// exist.
pub fn create_worker(
    conn: &mut SqliteConnection,
    display_name: &str,
    role: Role,
    location: LocationId,
    approved: bool,
) -> Result<Worker, PersistenceError> {
    validate_display_name(display_name)?;
    let display_name: &str = display_name.trim();

    diesel::insert_into(workers::table)
        .values((
            workers::display_name.eq(display_name),
            workers::role.eq(role.as_str()),
            workers::location_id.eq(location.value()),
            workers::approved.eq(i32::from(approved)),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_worker: {e}")))?;

    let worker_id = WorkerId::new(get_last_insert_rowid(conn)?);
    info!(worker_id = %worker_id, role = %role, location_id = %location, "Registered worker");

    Ok(Worker {
        id: worker_id,
        display_name: display_name.to_string(),
        role,
        location,
        approved,
    })
}

/// Approves or suspends a worker's registration.
///
/// # Errors
///
/// Returns `NotFound` if the worker does not exist.
pub fn set_worker_approved(
    conn: &mut SqliteConnection,
    worker: WorkerId,
    approved: bool,
) -> Result<Worker, PersistenceError> {
    let updated: usize =
        diesel::update(workers::table.filter(workers::worker_id.eq(worker.value())))
            .set(workers::approved.eq(i32::from(approved)))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("set_worker_approved: {e}")))?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("worker {worker}")));
    }

    info!(worker_id = %worker, approved, "Updated worker approval");
    find_worker(conn, worker)?
        .ok_or_else(|| PersistenceError::NotFound(format!("worker {worker}")))
}

/// Puts a worker on the schedule for a date.
///
/// # Errors
///
/// Returns an error if the worker already has a shift that day or a
/// referenced row does not exist.
pub fn add_schedule_entry(
    conn: &mut SqliteConnection,
    worker: WorkerId,
    location: LocationId,
    shift_date: Date,
) -> Result<(), PersistenceError> {
    diesel::insert_into(schedule_entries::table)
        .values((
            schedule_entries::worker_id.eq(worker.value()),
            schedule_entries::location_id.eq(location.value()),
            schedule_entries::shift_date.eq(format_date(shift_date)?),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("add_schedule_entry: {e}")))?;

    info!(
        worker_id = %worker,
        location_id = %location,
        shift_date = %shift_date,
        "Scheduled worker"
    );
    Ok(())
}

/// Hands the original worker's shift over to the replacement.
///
/// # Errors
///
/// Returns `NotFound` if the original worker has no shift at the location
/// on that date, or an error if the replacement is already scheduled.
pub fn move_schedule_entry(
    conn: &mut SqliteConnection,
    original: WorkerId,
    replacement: WorkerId,
    location: LocationId,
    shift_date: Date,
) -> Result<(), PersistenceError> {
    let date_text: String = format_date(shift_date)?;

    let updated: usize = diesel::update(
        schedule_entries::table
            .filter(schedule_entries::worker_id.eq(original.value()))
            .filter(schedule_entries::location_id.eq(location.value()))
            .filter(schedule_entries::shift_date.eq(&date_text)),
    )
    .set(schedule_entries::worker_id.eq(replacement.value()))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("move_schedule_entry: {e}")))?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "schedule entry for worker {original} at location {location} on {shift_date}"
        )));
    }

    info!(
        original = %original,
        replacement = %replacement,
        location_id = %location,
        shift_date = %shift_date,
        "Moved shift to replacement"
    );
    Ok(())
}
