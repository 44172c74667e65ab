// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command execution.
//!
//! Every command returns a JSON value; printing is left to `main`.

use serde::Serialize;
use serde_json::Value;
use shift_swap::{
    AcceptOutcome, Clock, NotifyTarget, RequestWorkflow, SystemClock, WorkflowConfig,
    WorkflowDeps,
};
use shift_swap_audit::TracingAuditSink;
use shift_swap_domain::{LocationId, RequestId, WorkerId};
use shift_swap_persistence::SqliteStore;
use std::sync::Arc;
use tracing::debug;

use crate::cli::{Command, LocationCommand, RequestCommand, ShiftCommand, WorkerCommand};
use crate::error::CliError;
use crate::notifier::LogNotifier;

#[derive(Debug, Serialize)]
struct AcceptResponse {
    request: RequestId,
    candidate: WorkerId,
    outcome: AcceptOutcome,
}

#[derive(Debug, Serialize)]
struct ShiftResponse {
    worker: WorkerId,
    location: LocationId,
    shift_date: String,
}

#[derive(Debug, Serialize)]
struct ApproverResponse {
    location: LocationId,
    approver: Option<WorkerId>,
}

/// The store and the workflow wired on top of it.
pub struct App {
    store: Arc<SqliteStore>,
    workflow: RequestWorkflow,
}

impl App {
    /// Wires the workflow with the wall clock.
    #[must_use]
    pub fn new(store: SqliteStore, config: WorkflowConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Wires the workflow with the given clock.
    #[must_use]
    pub fn with_clock(store: SqliteStore, config: WorkflowConfig, clock: Arc<dyn Clock>) -> Self {
        let store: Arc<SqliteStore> = Arc::new(store);
        let deps = WorkflowDeps {
            store: store.clone(),
            staff: store.clone(),
            approvers: store.clone(),
            schedule: store.clone(),
            mutator: store.clone(),
            notifier: Arc::new(LogNotifier),
            audit: Arc::new(TracingAuditSink),
            clock,
        };
        Self {
            store,
            workflow: RequestWorkflow::new(deps, config),
        }
    }

    /// Runs one command.
    ///
    /// # Errors
    ///
    /// Returns an error if the workflow or the store refuses the command.
    pub fn execute(&self, command: Command) -> Result<Value, CliError> {
        debug!(?command, "Executing command");

        let value: Value = match command {
            Command::Location(command) => self.location(command)?,
            Command::Worker(command) => self.worker(command)?,
            Command::Shift(command) => self.shift(command)?,
            Command::Request(command) => self.request(command)?,
            Command::Candidates { request, scope } => serde_json::to_value(
                self.workflow
                    .select_candidates(RequestId::new(request), scope)?,
            )?,
            Command::Scope {
                request,
                supervisor,
                scope,
            } => serde_json::to_value(self.workflow.set_scope(
                RequestId::new(request),
                WorkerId::new(supervisor),
                scope,
            )?)?,
            Command::Notify {
                request,
                supervisor,
                candidates,
            } => {
                let target: NotifyTarget = if candidates.is_empty() {
                    NotifyTarget::All
                } else {
                    NotifyTarget::Selected(candidates.into_iter().map(WorkerId::new).collect())
                };
                serde_json::to_value(self.workflow.notify_candidates(
                    RequestId::new(request),
                    WorkerId::new(supervisor),
                    &target,
                )?)?
            }
            Command::Take {
                request,
                supervisor,
            } => serde_json::to_value(
                self.workflow
                    .take_by_supervisor(RequestId::new(request), WorkerId::new(supervisor))?,
            )?,
            Command::Accept(args) => {
                let request = RequestId::new(args.request);
                let candidate = WorkerId::new(args.candidate);
                let outcome: AcceptOutcome = self.workflow.accept_offer(request, candidate)?;
                serde_json::to_value(AcceptResponse {
                    request,
                    candidate,
                    outcome,
                })?
            }
            Command::Decline(args) => serde_json::to_value(self.workflow.decline_offer(
                RequestId::new(args.request),
                WorkerId::new(args.candidate),
            )?)?,
            Command::Approve { request, approver } => serde_json::to_value(
                self.workflow
                    .approve(RequestId::new(request), WorkerId::new(approver))?,
            )?,
            Command::RejectProposal {
                request,
                approver,
                reason,
            } => serde_json::to_value(self.workflow.reject_proposal(
                RequestId::new(request),
                WorkerId::new(approver),
                reason,
            )?)?,
            Command::Reject {
                request,
                supervisor,
                reason,
            } => serde_json::to_value(self.workflow.reject_request(
                RequestId::new(request),
                WorkerId::new(supervisor),
                reason,
            )?)?,
            Command::Cancel {
                request,
                supervisor,
            } => serde_json::to_value(
                self.workflow
                    .cancel(RequestId::new(request), WorkerId::new(supervisor))?,
            )?,
        };
        Ok(value)
    }

    fn location(&self, command: LocationCommand) -> Result<Value, CliError> {
        Ok(match command {
            LocationCommand::Add { name, approver } => serde_json::to_value(
                self.store
                    .create_location(&name, approver.map(WorkerId::new))?,
            )?,
            LocationCommand::SetApprover { location, approver } => {
                let location = LocationId::new(location);
                let approver: Option<WorkerId> = approver.map(WorkerId::new);
                self.store.set_location_approver(location, approver)?;
                serde_json::to_value(ApproverResponse { location, approver })?
            }
            LocationCommand::List => serde_json::to_value(self.store.list_locations()?)?,
        })
    }

    fn worker(&self, command: WorkerCommand) -> Result<Value, CliError> {
        Ok(match command {
            WorkerCommand::Add {
                name,
                role,
                location,
                pending,
            } => serde_json::to_value(self.store.create_worker(
                &name,
                role,
                LocationId::new(location),
                !pending,
            )?)?,
            WorkerCommand::Approve { worker, revoke } => serde_json::to_value(
                self.store
                    .set_worker_approved(WorkerId::new(worker), !revoke)?,
            )?,
            WorkerCommand::List => serde_json::to_value(self.store.workers()?)?,
        })
    }

    fn shift(&self, command: ShiftCommand) -> Result<Value, CliError> {
        let ShiftCommand::Add {
            worker,
            location,
            date,
        } = command;
        let worker = WorkerId::new(worker);
        let location = LocationId::new(location);
        self.store.add_schedule_entry(worker, location, date)?;
        Ok(serde_json::to_value(ShiftResponse {
            worker,
            location,
            shift_date: date.to_string(),
        })?)
    }

    fn request(&self, command: RequestCommand) -> Result<Value, CliError> {
        Ok(match command {
            RequestCommand::Create {
                requester,
                location,
                date,
            } => serde_json::to_value(self.workflow.create_request(
                WorkerId::new(requester),
                LocationId::new(location),
                date,
            )?)?,
            RequestCommand::Show { request } => {
                serde_json::to_value(self.workflow.get_request(RequestId::new(request))?)?
            }
            RequestCommand::List { location } => serde_json::to_value(
                self.workflow
                    .list_active_requests(location.map(LocationId::new))?,
            )?,
            RequestCommand::Offers { request } => {
                serde_json::to_value(self.workflow.list_offers(RequestId::new(request))?)?
            }
        })
    }
}
