// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use log::{debug, info};

use crate::{
    calibrators::{CalibratorRoles, FluxStandard, MeasurementSet},
    engine::{CalibrationEngine, CasaEngine},
    pipeline::{
        prepare, retry::RetryPolicy, ArtifactStore, CalTables, CancellationToken,
        CommandDispatcher, ExecutionMode, Pipeline, PipelineError, PipelineOptions,
    },
};

/// Everything needed to calibrate a measurement set.
#[derive(Debug, Clone)]
pub(crate) struct CalibrateParams {
    pub(crate) ms: MeasurementSet,
    pub(crate) roles: CalibratorRoles,
    pub(crate) standard: FluxStandard,
    pub(crate) options: PipelineOptions,
    pub(crate) mode: ExecutionMode,

    /// Reset the model and corrected data columns before doing anything else.
    pub(crate) clear_existing: bool,

    /// Recalculate phase centres into a new measurement set first.
    pub(crate) fixvis: bool,

    /// Apply the solutions once they're made.
    pub(crate) apply: bool,

    /// Where calibration tables (and a phase-corrected measurement set) are
    /// written.
    pub(crate) output_dir: PathBuf,

    pub(crate) retry: RetryPolicy,
    pub(crate) engine: CasaEngine,
}

impl CalibrateParams {
    pub(crate) fn run(&self) -> Result<CalTables, PipelineError> {
        debug!("Calibrating with {}", self.engine.executable().display());
        self.run_with(&self.engine, CancellationToken::new())
    }

    /// Run the whole pipeline with the supplied engine.
    pub(crate) fn run_with<E: CalibrationEngine + ?Sized>(
        &self,
        engine: &E,
        cancel: CancellationToken,
    ) -> Result<CalTables, PipelineError> {
        // The phase-corrected measurement set changes the table prefix, so
        // the store is only made once we know which measurement set is used.
        let ms = if self.fixvis {
            let store = ArtifactStore::new(&self.ms, &self.output_dir, self.retry);
            let dispatcher = CommandDispatcher::new(engine, &store, self.mode, cancel.clone());
            prepare::fix_phase_centres(&dispatcher, &self.ms, &self.output_dir)?
        } else {
            self.ms.clone()
        };

        let store = ArtifactStore::new(&ms, &self.output_dir, self.retry);
        let dispatcher = CommandDispatcher::new(engine, &store, self.mode, cancel);
        if self.clear_existing {
            prepare::clear_calibration(&dispatcher, &ms)?;
        }
        prepare::set_flux_model(&dispatcher, &ms, self.roles.flux(), &self.standard)?;

        let pipeline = Pipeline::new(dispatcher, &ms, &self.roles, &self.options);
        let tables = pipeline.solve()?;
        if self.apply {
            pipeline.apply(&tables)?;
        } else {
            info!("Not applying solutions (use --applycal to do so)");
        }
        Ok(tables)
    }
}
