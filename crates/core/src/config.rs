// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shift_swap_domain::local_date;
use time::{Date, OffsetDateTime, UtcOffset};

/// Runtime settings of the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Offset of the retail sites' local time from UTC.
    ///
    /// Past-date and same-day checks use the date at this offset.
    pub utc_offset: UtcOffset,
}

impl WorkflowConfig {
    #[must_use]
    pub const fn new(utc_offset: UtcOffset) -> Self {
        Self { utc_offset }
    }

    /// The local calendar date at `now`.
    #[must_use]
    pub fn today(&self, now: OffsetDateTime) -> Date {
        local_date(now, self.utc_offset)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}
