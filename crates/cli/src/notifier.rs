// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap::{CollaboratorError, NotificationDispatcher, OfferOutcome};
use shift_swap_domain::{ChannelRef, SubstitutionRequest, WorkerId};
use tracing::info;

/// Delivers offers as structured log lines on the `notify` target.
///
/// Channel references have the form `log:<request>:<candidate>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    fn notify(
        &self,
        candidate: WorkerId,
        request: &SubstitutionRequest,
    ) -> Result<ChannelRef, CollaboratorError> {
        let channel = ChannelRef::new(format!("log:{}:{candidate}", request.id));
        info!(
            target: "notify",
            channel = %channel,
            candidate = %candidate,
            request = %request.id,
            location = %request.location,
            shift_date = %request.shift_date,
            urgent = request.urgent,
            "Offer sent"
        );
        Ok(channel)
    }

    fn expire(&self, channel: &ChannelRef) -> Result<(), CollaboratorError> {
        info!(target: "notify", channel = %channel, "Offer withdrawn");
        Ok(())
    }

    fn resolve(
        &self,
        channel: &ChannelRef,
        outcome: OfferOutcome,
    ) -> Result<(), CollaboratorError> {
        info!(
            target: "notify",
            channel = %channel,
            outcome = outcome.as_str(),
            "Offer answered"
        );
        Ok(())
    }
}
