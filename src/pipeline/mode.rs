// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use strum_macros::Display;

/// How engine requests are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum ExecutionMode {
    /// Run every request.
    #[default]
    #[strum(serialize = "execute")]
    Execute,

    /// Log each request before running it.
    #[strum(serialize = "verbose")]
    Verbose,

    /// Only log requests. Nothing on disk is touched or checked.
    #[strum(serialize = "dry-run")]
    DryRun,
}

impl ExecutionMode {
    pub fn is_dry_run(self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}
