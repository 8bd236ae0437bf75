// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gain solutions for the calibrators that aren't flux calibrators.

use indicatif::ProgressBar;
use log::info;

use super::{
    begin_stage, primary::gain_solve, CommandDispatcher, PipelineError, PipelineOptions,
    PrimaryTables, Stage,
};
use crate::{
    calibrators::{FieldSet, MeasurementSet},
    engine::{CalibrationEngine, EngineRequest},
};

/// Append gain solutions for `secondary` to the primary gain table. The gain
/// table is not deleted first. Nothing happens if `secondary` is empty.
pub fn augment<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    secondary: &FieldSet,
    primary: &PrimaryTables,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<(), PipelineError> {
    if secondary.is_empty() {
        info!("No secondary calibrators; skipping the secondary gain and flux stages");
        return Ok(());
    }

    begin_stage(dispatcher, progress, Stage::SecondaryGain)?;
    dispatcher.dispatch(
        &EngineRequest::SolveGain(gain_solve(
            ms,
            &primary.gain,
            secondary.clone(),
            options,
            &primary.bandpass,
            &primary.delay,
            true,
        )),
        None,
    )?;
    dispatcher
        .store()
        .require_or_fail(&primary.gain, Stage::SecondaryGain, dispatcher.mode())?;
    progress.inc(1);
    Ok(())
}
