// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indicatif::ProgressBar;

use super::{begin_stage, Artifact, CommandDispatcher, PipelineError, Stage, Table};
use crate::{
    calibrators::{FieldSet, MeasurementSet},
    engine::{CalibrationEngine, EngineRequest, ScaleFlux},
};

/// Bootstrap the flux scale of the `transfer` calibrators from the
/// `reference` (flux) calibrators, using the augmented gain table.
pub fn scale<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    reference: &FieldSet,
    transfer: &FieldSet,
    gain: &Artifact,
    progress: &ProgressBar,
) -> Result<Artifact, PipelineError> {
    begin_stage(dispatcher, progress, Stage::FluxScale)?;
    let store = dispatcher.store();
    let flux = store.artifact(Table::Flux);
    dispatcher.dispatch(
        &EngineRequest::ScaleFlux(ScaleFlux {
            vis: ms.path().to_path_buf(),
            gain_table: gain.path().to_path_buf(),
            flux_table: flux.path().to_path_buf(),
            reference: reference.clone(),
            transfer: transfer.clone(),
        }),
        Some(&flux),
    )?;
    store.require_or_fail(&flux, Stage::FluxScale, dispatcher.mode())?;
    progress.inc(1);
    Ok(flux)
}
