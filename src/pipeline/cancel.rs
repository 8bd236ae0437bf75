// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;

/// A cheaply-cloneable flag that asks a running pipeline to stop. The
/// pipeline only looks at it between stages; a running engine request is
/// never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicCell<bool>>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load()
    }
}
