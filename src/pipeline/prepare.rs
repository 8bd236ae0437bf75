// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Steps run on the measurement set before any solutions are made.

use std::path::Path;

use log::info;

use super::{CommandDispatcher, PipelineError};
use crate::{
    calibrators::{FieldSet, FluxStandard, MeasurementSet},
    engine::{CalibrationEngine, ClearCal, EngineRequest, FixVis, SetFluxModel},
};

/// Recalculate the phase centres of `ms`, writing a new measurement set into
/// `dir`. The new measurement set is returned; all subsequent work should use
/// it instead of `ms`.
pub fn fix_phase_centres<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    dir: &Path,
) -> Result<MeasurementSet, PipelineError> {
    dispatcher.checkpoint("fixvis")?;
    let fixed = ms.fixvis_output(dir);
    info!(
        "Correcting phase centres of {} into {}",
        ms.path().display(),
        fixed.path().display()
    );
    dispatcher.dispatch(
        &EngineRequest::FixVis(FixVis {
            vis: ms.path().to_path_buf(),
            output_vis: fixed.path().to_path_buf(),
        }),
        None,
    )?;
    Ok(fixed)
}

/// Reset the model and corrected data of `ms`.
pub fn clear_calibration<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
) -> Result<(), PipelineError> {
    dispatcher.checkpoint("clearcal")?;
    info!("Clearing existing calibration");
    dispatcher.dispatch(
        &EngineRequest::ClearCal(ClearCal {
            vis: ms.path().to_path_buf(),
        }),
        None,
    )
}

/// Give the flux calibrators a model.
pub fn set_flux_model<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    flux: &FieldSet,
    standard: &FluxStandard,
) -> Result<(), PipelineError> {
    dispatcher.checkpoint("setjy")?;
    info!("Setting the flux model of {flux} to {standard}");
    dispatcher.dispatch(
        &EngineRequest::SetFluxModel(SetFluxModel {
            vis: ms.path().to_path_buf(),
            fields: flux.clone(),
            standard: standard.clone(),
        }),
        None,
    )
}
