// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::cli::{Cli, Command};
use crate::commands::App;
use clap::Parser;
use serde_json::Value;
use shift_swap::{Clock, WorkflowConfig};
use shift_swap_persistence::SqliteStore;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

struct FixedClock(OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("shift-swap").chain(args.iter().copied())).unwrap()
}

pub fn command(args: &[&str]) -> Command {
    parse(args).command
}

/// An app on a fresh in-memory database, frozen at 2024-06-08 09:00 UTC.
pub fn app() -> App {
    App::with_clock(
        SqliteStore::new_in_memory().unwrap(),
        WorkflowConfig::default(),
        Arc::new(FixedClock(datetime!(2024-06-08 09:00 UTC))),
    )
}

pub fn run(app: &App, args: &[&str]) -> Value {
    app.execute(command(args)).unwrap()
}
