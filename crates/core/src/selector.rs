// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::collaborators::{
    ApproverDirectory, CollaboratorError, StaffDirectory, WorkScheduleQuery,
};
use shift_swap_domain::{LocationId, Scope, SubstitutionRequest, Worker, WorkerId};
use std::collections::BTreeSet;
use tracing::debug;

/// Computes the candidate pool of a request.
///
/// The pool is derived from the staff directory and work calendar at call
/// time and is never cached. A worker is a candidate when they are approved,
/// seller tier, not the requester, free on the shift date and inside the
/// scope.
pub struct CandidateSelector<'a> {
    staff: &'a dyn StaffDirectory,
    approvers: &'a dyn ApproverDirectory,
    schedule: &'a dyn WorkScheduleQuery,
}

impl<'a> CandidateSelector<'a> {
    #[must_use]
    pub const fn new(
        staff: &'a dyn StaffDirectory,
        approvers: &'a dyn ApproverDirectory,
        schedule: &'a dyn WorkScheduleQuery,
    ) -> Self {
        Self {
            staff,
            approvers,
            schedule,
        }
    }

    /// Returns the candidates for `request` under `scope`.
    ///
    /// Candidates are ordered by display name, case-insensitively, then id.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the calendar cannot be read.
    pub fn select(
        &self,
        request: &SubstitutionRequest,
        scope: Scope,
    ) -> Result<Vec<Worker>, CollaboratorError> {
        let workers: Vec<Worker> = self.staff.list_workers()?;
        let locations: Option<BTreeSet<LocationId>> =
            self.pool_locations(request.location, scope, &workers)?;

        let mut candidates: Vec<Worker> = Vec::new();
        for worker in workers {
            if !worker.is_candidate_material() || worker.id == request.requester {
                continue;
            }
            if let Some(locations) = &locations
                && !locations.contains(&worker.location)
            {
                continue;
            }
            if self
                .schedule
                .is_scheduled_to_work(worker.id, request.shift_date)?
            {
                continue;
            }
            candidates.push(worker);
        }

        candidates.sort_by_cached_key(|w| (w.display_name.to_lowercase(), w.id));
        debug!(
            request = %request.id,
            scope = scope.as_str(),
            count = candidates.len(),
            "Selected candidates"
        );
        Ok(candidates)
    }

    /// Returns true if `candidate` is in the pool of `request` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the calendar cannot be read.
    pub fn is_eligible(
        &self,
        request: &SubstitutionRequest,
        scope: Scope,
        candidate: WorkerId,
    ) -> Result<bool, CollaboratorError> {
        Ok(self
            .select(request, scope)?
            .iter()
            .any(|worker| worker.id == candidate))
    }

    /// Locations inside the scope, or `None` when every location qualifies.
    fn pool_locations(
        &self,
        home: LocationId,
        scope: Scope,
        workers: &[Worker],
    ) -> Result<Option<BTreeSet<LocationId>>, CollaboratorError> {
        match scope {
            Scope::Location => Ok(Some(BTreeSet::from([home]))),
            Scope::All => Ok(None),
            Scope::ManagerGroup => {
                let Some(approver) = self.approvers.resolve_approver(home)? else {
                    debug!(location = %home, "No approver configured, using location scope");
                    return Ok(Some(BTreeSet::from([home])));
                };
                let mut group: BTreeSet<LocationId> = BTreeSet::from([home]);
                let known: BTreeSet<LocationId> = workers.iter().map(|w| w.location).collect();
                for location in known {
                    if location != home
                        && self.approvers.resolve_approver(location)? == Some(approver)
                    {
                        group.insert(location);
                    }
                }
                Ok(Some(group))
            }
        }
    }
}
