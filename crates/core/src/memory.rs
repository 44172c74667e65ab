// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::repository::{
    CandidateRepository, CommitOutcome, LockHint, RepositoryError, RequestCommit,
    RequestRepository,
};
use crate::state::OfferChange;
use shift_swap_domain::{
    CandidateOffer, ChannelRef, LocationId, NewSubstitutionRequest, OfferId, OfferState,
    RequestId, SubstitutionRequest, WorkerId,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use time::{Date, OffsetDateTime};

/// A process-local store.
///
/// All tables sit behind one mutex, so every trait method is atomic. The
/// lock hint is ignored; version checks alone order concurrent writers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    requests: BTreeMap<RequestId, SubstitutionRequest>,
    offers: BTreeMap<OfferId, CandidateOffer>,
    last_request_id: i64,
    last_offer_id: i64,
}

impl Tables {
    fn active_for(&self, requester: WorkerId, shift_date: Date) -> Option<&SubstitutionRequest> {
        self.requests.values().find(|r| {
            r.requester == requester && r.shift_date == shift_date && r.is_active()
        })
    }

    fn offer_for(&self, request: RequestId, candidate: WorkerId) -> Option<&CandidateOffer> {
        self.offers
            .values()
            .find(|o| o.request == request && o.candidate == candidate)
    }

    fn offers_in_state(&self, request: RequestId, state: OfferState) -> Vec<OfferId> {
        self.offers
            .values()
            .filter(|o| o.request == request && o.state == state)
            .map(|o| o.id)
            .collect()
    }

    fn insert_offer(
        &mut self,
        request: RequestId,
        candidate: WorkerId,
        state: OfferState,
        channel: Option<ChannelRef>,
        now: OffsetDateTime,
    ) -> CandidateOffer {
        self.last_offer_id += 1;
        let offer = CandidateOffer {
            id: OfferId::new(self.last_offer_id),
            request,
            candidate,
            state,
            channel,
            created_at: now,
            updated_at: now,
        };
        self.offers.insert(offer.id, offer.clone());
        offer
    }

    fn set_offer_state(
        &mut self,
        id: OfferId,
        state: OfferState,
        now: OffsetDateTime,
    ) -> Option<CandidateOffer> {
        let offer = self.offers.get_mut(&id)?;
        offer.state = state;
        offer.updated_at = now;
        Some(offer.clone())
    }

    /// Refuses an acceptance by a candidate whose offer was closed.
    fn check_offer_change(
        &self,
        request: RequestId,
        change: OfferChange,
    ) -> Result<(), RepositoryError> {
        if let OfferChange::Accept { candidate } = change
            && let Some(offer) = self.offer_for(request, candidate)
            && !offer.state.is_open()
        {
            return Err(RepositoryError::OfferStateConflict {
                offer: offer.id,
                expected: OfferState::Notified,
                actual: offer.state,
            });
        }
        Ok(())
    }

    fn apply_offer_change(
        &mut self,
        request: RequestId,
        change: OfferChange,
        now: OffsetDateTime,
    ) -> Vec<CandidateOffer> {
        match change {
            OfferChange::None => Vec::new(),
            OfferChange::ExpireNotified => self
                .offers_in_state(request, OfferState::Notified)
                .into_iter()
                .filter_map(|id| self.set_offer_state(id, OfferState::Expired, now))
                .collect(),
            OfferChange::Accept { candidate } => {
                let mut changed: Vec<CandidateOffer> = Vec::new();
                for id in self.offers_in_state(request, OfferState::Accepted) {
                    if self.offers.get(&id).is_some_and(|o| o.candidate != candidate) {
                        changed.extend(self.set_offer_state(id, OfferState::Expired, now));
                    }
                }
                match self.offer_for(request, candidate).map(|o| (o.id, o.state)) {
                    Some((_, OfferState::Accepted)) => {}
                    Some((id, _)) => {
                        changed.extend(self.set_offer_state(id, OfferState::Accepted, now));
                    }
                    None => changed.push(self.insert_offer(
                        request,
                        candidate,
                        OfferState::Accepted,
                        None,
                        now,
                    )),
                }
                changed
            }
        }
    }
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable(String::from("store lock poisoned")))
    }
}

impl RequestRepository for InMemoryStore {
    fn insert(
        &self,
        request: &NewSubstitutionRequest,
    ) -> Result<SubstitutionRequest, RepositoryError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables.active_for(request.requester, request.shift_date) {
            return Err(RepositoryError::DuplicateActive {
                existing: existing.id,
            });
        }
        tables.last_request_id += 1;
        let stored: SubstitutionRequest = request
            .clone()
            .into_request(RequestId::new(tables.last_request_id));
        tables.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find(
        &self,
        id: RequestId,
        _lock: LockHint,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        Ok(self.tables()?.requests.get(&id).cloned())
    }

    fn find_active_for(
        &self,
        requester: WorkerId,
        shift_date: Date,
    ) -> Result<Option<SubstitutionRequest>, RepositoryError> {
        Ok(self.tables()?.active_for(requester, shift_date).cloned())
    }

    fn list_active(
        &self,
        location: Option<LocationId>,
    ) -> Result<Vec<SubstitutionRequest>, RepositoryError> {
        let tables = self.tables()?;
        let mut active: Vec<SubstitutionRequest> = tables
            .requests
            .values()
            .filter(|r| r.is_active() && location.is_none_or(|l| r.location == l))
            .cloned()
            .collect();
        active.sort_by_key(|r| (r.shift_date, r.id));
        Ok(active)
    }

    fn commit(&self, commit: &RequestCommit) -> Result<CommitOutcome, RepositoryError> {
        let mut tables = self.tables()?;
        let id: RequestId = commit.request.id;
        let actual: i64 = tables
            .requests
            .get(&id)
            .map(|r| r.version)
            .ok_or_else(|| RepositoryError::NotFound(format!("request {id}")))?;
        if actual != commit.expected_version {
            return Err(RepositoryError::VersionConflict {
                request_id: id,
                expected: commit.expected_version,
                actual,
            });
        }

        tables.check_offer_change(id, commit.offer_change)?;

        let changed_offers: Vec<CandidateOffer> =
            tables.apply_offer_change(id, commit.offer_change, commit.request.updated_at);
        tables.requests.insert(id, commit.request.clone());
        Ok(CommitOutcome {
            request: commit.request.clone(),
            changed_offers,
        })
    }
}

impl CandidateRepository for InMemoryStore {
    fn record_notified(
        &self,
        request: RequestId,
        candidate: WorkerId,
        channel: Option<ChannelRef>,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        let mut tables = self.tables()?;
        let status = tables
            .requests
            .get(&request)
            .map(|r| r.status)
            .ok_or_else(|| RepositoryError::NotFound(format!("request {request}")))?;
        if !status.is_searching() {
            return Err(RepositoryError::RequestNotSearching {
                request_id: request,
                status,
            });
        }

        match tables.offer_for(request, candidate).cloned() {
            Some(existing) if existing.state.is_open() => Ok(existing),
            Some(existing) => {
                let offer = tables
                    .offers
                    .get_mut(&existing.id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("offer {}", existing.id)))?;
                offer.state = OfferState::Notified;
                offer.channel = channel;
                offer.updated_at = now;
                Ok(offer.clone())
            }
            None => Ok(tables.insert_offer(request, candidate, OfferState::Notified, channel, now)),
        }
    }

    fn find_offer(
        &self,
        request: RequestId,
        candidate: WorkerId,
    ) -> Result<Option<CandidateOffer>, RepositoryError> {
        Ok(self.tables()?.offer_for(request, candidate).cloned())
    }

    fn list_offers(&self, request: RequestId) -> Result<Vec<CandidateOffer>, RepositoryError> {
        Ok(self
            .tables()?
            .offers
            .values()
            .filter(|o| o.request == request)
            .cloned()
            .collect())
    }

    fn transition_offer(
        &self,
        offer: OfferId,
        from: OfferState,
        to: OfferState,
        now: OffsetDateTime,
    ) -> Result<CandidateOffer, RepositoryError> {
        let mut tables = self.tables()?;
        let current = tables
            .offers
            .get(&offer)
            .map(|o| o.state)
            .ok_or_else(|| RepositoryError::NotFound(format!("offer {offer}")))?;
        if current != from {
            return Err(RepositoryError::OfferStateConflict {
                offer,
                expected: from,
                actual: current,
            });
        }
        tables
            .set_offer_state(offer, to, now)
            .ok_or_else(|| RepositoryError::NotFound(format!("offer {offer}")))
    }
}
