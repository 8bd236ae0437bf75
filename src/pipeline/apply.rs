// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Apply the calibration tables to the calibrators and the science targets.

use indicatif::ProgressBar;
use log::info;
use rayon::prelude::*;

use super::{begin_stage, CalTables, CommandDispatcher, PipelineError, Stage};
use crate::{
    calibrators::{CalibratorRoles, MeasurementSet},
    engine::{
        ApplyMode, ApplySolutions, CalibrationEngine, EngineRequest, GainFieldMapping,
        Interpolation,
    },
};

/// Interpolation used for each table, in (gain or flux, bandpass, delay)
/// order.
pub const INTERPOLATION: [Interpolation; 3] = [
    Interpolation::Default,
    Interpolation::Nearest,
    Interpolation::Default,
];

/// The application of calibration tables to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyPlan {
    pub field: String,
    pub gain_fields: GainFieldMapping,
}

impl ApplyPlan {
    fn request(&self, ms: &MeasurementSet, tables: &CalTables) -> EngineRequest {
        EngineRequest::Apply(ApplySolutions {
            vis: ms.path().to_path_buf(),
            field: self.field.clone(),
            tables: tables
                .tables()
                .iter()
                .map(|a| a.path().to_path_buf())
                .collect(),
            gain_fields: self.gain_fields.clone(),
            interp: INTERPOLATION.to_vec(),
            calwt: false,
            apply_mode: ApplyMode::CalFlag,
        })
    }
}

/// Work out what is applied to each field. Every calibrator uses its own
/// gain solutions; every target uses the gain calibrators' solutions. The
/// calibrator plans are returned first.
pub fn plan(roles: &CalibratorRoles) -> (Vec<ApplyPlan>, Vec<ApplyPlan>) {
    let bandpass = roles.bandpass().join();
    let delay = roles.delay().join();
    let calibrators = roles
        .all_calibrators()
        .iter()
        .map(|field| ApplyPlan {
            field: field.to_string(),
            gain_fields: GainFieldMapping {
                gain: field.to_string(),
                bandpass: bandpass.clone(),
                delay: delay.clone(),
            },
        })
        .collect();

    let target_gain = roles.target_gain_fields().join();
    let targets = roles
        .targets()
        .iter()
        .map(|field| ApplyPlan {
            field: field.to_string(),
            gain_fields: GainFieldMapping {
                gain: target_gain.clone(),
                bandpass: bandpass.clone(),
                delay: delay.clone(),
            },
        })
        .collect();
    (calibrators, targets)
}

/// Apply `tables` to every calibrator and then to every target. With
/// `parallel`, the fields within each group are done concurrently, but all
/// calibrators are finished before any target is started.
pub fn apply<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    roles: &CalibratorRoles,
    tables: &CalTables,
    parallel: bool,
    progress: &ProgressBar,
) -> Result<(), PipelineError> {
    begin_stage(dispatcher, progress, Stage::Apply)?;
    let (calibrators, targets) = plan(roles);

    for (group, plans) in [("calibrators", calibrators), ("targets", targets)] {
        if plans.is_empty() {
            continue;
        }
        info!("Applying solutions to {} {group}", plans.len());
        let run = |plan: &ApplyPlan| {
            dispatcher.checkpoint(format!("applying solutions to {}", plan.field))?;
            dispatcher.dispatch(&plan.request(ms, tables), None)
        };
        if parallel {
            plans.par_iter().try_for_each(run)?;
        } else {
            plans.iter().try_for_each(run)?;
        }
    }
    progress.inc(1);
    Ok(())
}
