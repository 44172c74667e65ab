// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command line definition.

use clap::{Args, Parser, Subcommand};
use shift_swap_domain::{Role, Scope, parse_shift_date};
use time::macros::format_description;
use time::{Date, UtcOffset};

/// Shift Swap - substitution requests for retail shift coverage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "SHIFT_SWAP_DATABASE", global = true)]
    pub database: Option<String>,

    /// Local time offset of the retail sites, as `+HH:MM`.
    #[arg(
        long,
        env = "SHIFT_SWAP_UTC_OFFSET",
        default_value = "+00:00",
        value_parser = parse_utc_offset,
        global = true
    )]
    pub utc_offset: UtcOffset,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "SHIFT_SWAP_LOG", default_value = "info", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Manage retail sites.
    #[command(subcommand)]
    Location(LocationCommand),
    /// Manage staff.
    #[command(subcommand)]
    Worker(WorkerCommand),
    /// Manage the work calendar.
    #[command(subcommand)]
    Shift(ShiftCommand),
    /// Raise and inspect substitution requests.
    #[command(subcommand)]
    Request(RequestCommand),
    /// Show who could cover a request.
    Candidates {
        request: i64,
        /// Overrides the request's stored scope.
        #[arg(long)]
        scope: Option<Scope>,
    },
    /// Choose how widely to search and start the search.
    Scope {
        request: i64,
        #[arg(long)]
        supervisor: i64,
        #[arg(long)]
        scope: Scope,
    },
    /// Send offers to candidates.
    Notify {
        request: i64,
        #[arg(long)]
        supervisor: i64,
        /// Only notify these workers; every candidate if omitted.
        #[arg(long = "candidate")]
        candidates: Vec<i64>,
    },
    /// The supervisor covers the shift personally.
    Take {
        request: i64,
        #[arg(long)]
        supervisor: i64,
    },
    /// A candidate takes the shift.
    Accept(CandidateArgs),
    /// A candidate turns the offer down.
    Decline(CandidateArgs),
    /// Final sign-off; moves the shift to the replacement.
    Approve {
        request: i64,
        #[arg(long)]
        approver: i64,
    },
    /// Send the proposed replacement back; the search continues.
    RejectProposal {
        request: i64,
        #[arg(long)]
        approver: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Refuse the request.
    Reject {
        request: i64,
        #[arg(long)]
        supervisor: i64,
        #[arg(long)]
        reason: String,
    },
    /// Withdraw the request; the requester keeps the shift.
    Cancel {
        request: i64,
        #[arg(long)]
        supervisor: i64,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CandidateArgs {
    pub request: i64,
    #[arg(long)]
    pub candidate: i64,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LocationCommand {
    /// Register a location.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        approver: Option<i64>,
    },
    /// Set or clear a location's approver.
    SetApprover {
        location: i64,
        #[arg(long)]
        approver: Option<i64>,
    },
    /// List locations.
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Register a worker.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Role,
        #[arg(long)]
        location: i64,
        /// Register without approving; the worker is never a candidate.
        #[arg(long)]
        pending: bool,
    },
    /// Approve a worker's registration.
    Approve {
        worker: i64,
        /// Withdraw the approval instead.
        #[arg(long)]
        revoke: bool,
    },
    /// List workers.
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShiftCommand {
    /// Put a worker on the calendar.
    Add {
        #[arg(long)]
        worker: i64,
        #[arg(long)]
        location: i64,
        #[arg(long, value_parser = parse_date)]
        date: Date,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RequestCommand {
    /// Raise a request for a shift the requester cannot work.
    Create {
        #[arg(long)]
        requester: i64,
        #[arg(long)]
        location: i64,
        #[arg(long, value_parser = parse_date)]
        date: Date,
    },
    /// Show one request.
    Show { request: i64 },
    /// List active requests.
    List {
        #[arg(long)]
        location: Option<i64>,
    },
    /// List the offers made for a request.
    Offers { request: i64 },
}

fn parse_date(value: &str) -> Result<Date, String> {
    parse_shift_date(value).map_err(|e| e.to_string())
}

fn parse_utc_offset(value: &str) -> Result<UtcOffset, String> {
    UtcOffset::parse(
        value.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|e| format!("expected +HH:MM: {e}"))
}
