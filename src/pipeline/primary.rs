// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Delay, bandpass and gain solutions from the primary calibrators.

use indicatif::ProgressBar;
use log::warn;

use super::{
    begin_stage, Artifact, CommandDispatcher, PipelineError, PipelineOptions, Stage, Table,
};
use crate::{
    calibrators::{CalibratorRoles, FieldSet, MeasurementSet},
    engine::{
        BandpassSolve, CalMode, CalibrationEngine, CombineAxis, EngineRequest, GainSolve, GainType,
        SolutionInterval,
    },
};

/// The tables written by the primary stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryTables {
    pub delay: Artifact,
    pub preliminary_gain: Option<Artifact>,
    pub bandpass: Artifact,
    pub gain: Artifact,
}

/// Solve for delays, (optionally) preliminary phases, the bandpass and
/// complex gains, in that order. Every stage must leave its table behind
/// before the next one starts.
pub fn solve<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    roles: &CalibratorRoles,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<PrimaryTables, PipelineError> {
    let store = dispatcher.store();
    let mode = dispatcher.mode();

    begin_stage(dispatcher, progress, Stage::Delay)?;
    let delay = store.artifact(Table::Delay);
    dispatcher.dispatch(
        &EngineRequest::SolveDelay(GainSolve {
            vis: ms.path().to_path_buf(),
            table: delay.path().to_path_buf(),
            fields: roles.delay_solve_fields(),
            gain_type: GainType::Delay,
            cal_mode: None,
            solint: SolutionInterval::Infinite,
            ref_ant: options.ref_ant.clone(),
            spw: None,
            combine: vec![CombineAxis::Scan, CombineAxis::Field],
            solnorm: false,
            min_snr: 3.0,
            append: false,
            upstream: vec![],
        }),
        Some(&delay),
    )?;
    store.require_or_fail(&delay, Stage::Delay, mode)?;
    progress.inc(1);

    let preliminary_gain = if options.preliminary_gain {
        begin_stage(dispatcher, progress, Stage::PreliminaryGain)?;
        let spw = options.ref_chans.clone().filter(|s| !s.trim().is_empty());
        if spw.is_none() {
            warn!("No reference channels given; the preliminary gain solve uses all channels");
        }
        let g0 = store.artifact(Table::PreliminaryGain);
        dispatcher.dispatch(
            &EngineRequest::SolveGain(GainSolve {
                vis: ms.path().to_path_buf(),
                table: g0.path().to_path_buf(),
                fields: roles.flux().clone(),
                gain_type: GainType::Complex,
                cal_mode: Some(CalMode::Phase),
                solint: SolutionInterval::Infinite,
                ref_ant: options.ref_ant.clone(),
                spw,
                combine: vec![],
                solnorm: true,
                min_snr: 3.0,
                append: false,
                upstream: vec![delay.path().to_path_buf()],
            }),
            Some(&g0),
        )?;
        store.require_or_fail(&g0, Stage::PreliminaryGain, mode)?;
        progress.inc(1);
        Some(g0)
    } else {
        None
    };

    begin_stage(dispatcher, progress, Stage::Bandpass)?;
    let bandpass = store.artifact(Table::Bandpass);
    let upstream = preliminary_gain
        .iter()
        .chain(std::iter::once(&delay))
        .map(|a| a.path().to_path_buf())
        .collect();
    dispatcher.dispatch(
        &EngineRequest::SolveBandpass(BandpassSolve {
            vis: ms.path().to_path_buf(),
            table: bandpass.path().to_path_buf(),
            fields: roles.bandpass().clone(),
            solint: SolutionInterval::Infinite,
            ref_ant: options.ref_ant.clone(),
            combine: vec![CombineAxis::Scan],
            solnorm: true,
            min_snr: 3.0,
            upstream,
        }),
        Some(&bandpass),
    )?;
    store.require_or_fail(&bandpass, Stage::Bandpass, mode)?;
    progress.inc(1);

    begin_stage(dispatcher, progress, Stage::Gain)?;
    let gain = store.artifact(Table::Gain);
    dispatcher.dispatch(
        &EngineRequest::SolveGain(gain_solve(
            ms,
            &gain,
            roles.flux().clone(),
            options,
            &bandpass,
            &delay,
            false,
        )),
        Some(&gain),
    )?;
    store.require_or_fail(&gain, Stage::Gain, mode)?;
    progress.inc(1);

    Ok(PrimaryTables {
        delay,
        preliminary_gain,
        bandpass,
        gain,
    })
}

/// The amplitude and phase solve shared by the primary and secondary gain
/// stages.
pub(super) fn gain_solve(
    ms: &MeasurementSet,
    gain: &Artifact,
    fields: FieldSet,
    options: &PipelineOptions,
    bandpass: &Artifact,
    delay: &Artifact,
    append: bool,
) -> GainSolve {
    GainSolve {
        vis: ms.path().to_path_buf(),
        table: gain.path().to_path_buf(),
        fields,
        gain_type: GainType::Complex,
        cal_mode: Some(CalMode::AmplitudePhase),
        solint: SolutionInterval::Integration,
        ref_ant: options.ref_ant.clone(),
        spw: None,
        combine: vec![CombineAxis::Spw],
        solnorm: false,
        min_snr: 1.0,
        append,
        upstream: vec![bandpass.path().to_path_buf(), delay.path().to_path_buf()],
    }
}
