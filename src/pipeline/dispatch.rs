// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hand requests to the calibration engine according to the execution mode.

use std::fmt::Display;

use log::{debug, info};

use super::{Artifact, ArtifactStore, CancellationToken, ExecutionMode, PipelineError};
use crate::engine::{CalibrationEngine, EngineRequest};

pub struct CommandDispatcher<'a, E: ?Sized> {
    engine: &'a E,
    store: &'a ArtifactStore,
    mode: ExecutionMode,
    cancel: CancellationToken,
}

impl<'a, E: CalibrationEngine + ?Sized> CommandDispatcher<'a, E> {
    pub fn new(
        engine: &'a E,
        store: &'a ArtifactStore,
        mode: ExecutionMode,
        cancel: CancellationToken,
    ) -> CommandDispatcher<'a, E> {
        CommandDispatcher {
            engine,
            store,
            mode,
            cancel,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        self.store
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Stop here if the run has been cancelled. `next` describes what would
    /// have happened next.
    pub fn checkpoint(&self, next: impl Display) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled {
                before: next.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Issue a single request. If the request writes a table (`produces`),
    /// any existing copy of that table is deleted first.
    pub fn dispatch(
        &self,
        request: &EngineRequest,
        produces: Option<&Artifact>,
    ) -> Result<(), PipelineError> {
        match self.mode {
            ExecutionMode::DryRun => {
                info!("{request}");
                return Ok(());
            }
            ExecutionMode::Verbose => info!("{request}"),
            ExecutionMode::Execute => debug!("{request}"),
        }

        if let Some(artifact) = produces {
            if self.store.exists(artifact) {
                self.store.remove(artifact)?;
            }
        }
        self.engine.run(request)?;
        Ok(())
    }
}
