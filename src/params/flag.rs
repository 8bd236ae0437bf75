// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::{
    calibrators::MeasurementSet,
    engine::{CalibrationEngine, CasaEngine},
    flagging::{self, FlagRule},
    pipeline::{
        retry::RetryPolicy, ArtifactStore, CancellationToken, CommandDispatcher, ExecutionMode,
        PipelineError,
    },
};

#[derive(Debug, Clone)]
pub(crate) struct FlagParams {
    pub(crate) ms: MeasurementSet,
    pub(crate) rules: Vec<FlagRule>,
    pub(crate) mode: ExecutionMode,
    pub(crate) engine: CasaEngine,
}

impl FlagParams {
    pub(crate) fn run(&self) -> Result<(), PipelineError> {
        self.run_with(&self.engine, CancellationToken::new())
    }

    pub(crate) fn run_with<E: CalibrationEngine + ?Sized>(
        &self,
        engine: &E,
        cancel: CancellationToken,
    ) -> Result<(), PipelineError> {
        // Flagging writes no tables, so the store is never consulted.
        let store = ArtifactStore::new(&self.ms, Path::new("."), RetryPolicy::none());
        let dispatcher = CommandDispatcher::new(engine, &store, self.mode, cancel);
        flagging::flag(&dispatcher, &self.ms, &self.rules)
    }
}
