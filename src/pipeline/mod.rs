// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The calibration pipeline.
//!
//! Stages run strictly in order; each stage's table must exist before the
//! next stage starts (except in a dry run, where nothing is checked):
//!
//! delay → (preliminary gain) → bandpass → gain → (secondary gain → flux) → apply
//!
//! All requests go through a [`CommandDispatcher`], which honours the
//! [`ExecutionMode`] and deletes stale tables before they are recomputed.

pub mod apply;
mod artifact;
mod cancel;
mod dispatch;
pub mod flux;
mod mode;
pub mod prepare;
pub mod primary;
pub mod retry;
pub mod secondary;

pub use artifact::{Artifact, ArtifactStore, Stage, StorageFault, Table};
pub use cancel::CancellationToken;
pub use dispatch::CommandDispatcher;
pub use mode::ExecutionMode;
pub use primary::PrimaryTables;

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use thiserror::Error;

use crate::{
    calibrators::{CalibratorRoles, FieldSet, MeasurementSet},
    engine::{CalibrationEngine, EngineFault},
    PROGRESS_BARS,
};

/// Knobs for the solve stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// The reference antenna. Empty lets the engine choose.
    pub ref_ant: String,

    /// Solve for preliminary phases before the bandpass.
    pub preliminary_gain: bool,

    /// The spectral window and channel range used for the preliminary phase
    /// solve, e.g. "0:1000~3000".
    pub ref_chans: Option<String>,

    /// Apply solutions to fields concurrently.
    pub parallel_apply: bool,
}

/// The tables that are applied to the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalTables {
    /// The flux-scaled table if secondary calibrators were solved for,
    /// otherwise the primary gain table.
    pub gain_or_flux: Artifact,
    pub bandpass: Artifact,
    pub delay: Artifact,

    /// The calibrators that were bootstrapped onto the flux scale.
    pub secondary: FieldSet,
}

impl CalTables {
    /// The tables in the order they are applied.
    pub fn tables(&self) -> [&Artifact; 3] {
        [&self.gain_or_flux, &self.bandpass, &self.delay]
    }

    pub fn names(&self) -> Vec<String> {
        self.tables().iter().map(|a| a.name()).collect()
    }
}

/// Everything needed to calibrate a single measurement set.
pub struct Pipeline<'a, E: ?Sized> {
    dispatcher: CommandDispatcher<'a, E>,
    ms: &'a MeasurementSet,
    roles: &'a CalibratorRoles,
    options: &'a PipelineOptions,
}

impl<'a, E: CalibrationEngine + ?Sized> Pipeline<'a, E> {
    pub fn new(
        dispatcher: CommandDispatcher<'a, E>,
        ms: &'a MeasurementSet,
        roles: &'a CalibratorRoles,
        options: &'a PipelineOptions,
    ) -> Pipeline<'a, E> {
        Pipeline {
            dispatcher,
            ms,
            roles,
            options,
        }
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<'a, E> {
        &self.dispatcher
    }

    /// Solve for delays, bandpasses and gains, bootstrapping the flux scale of
    /// any secondary calibrators.
    pub fn solve(&self) -> Result<CalTables, PipelineError> {
        let secondary = self.roles.secondary();
        let num_stages = 3
            + u64::from(self.options.preliminary_gain)
            + if secondary.is_empty() { 0 } else { 2 };
        let progress = make_stage_progress_bar(num_stages);

        let primary = primary::solve(
            &self.dispatcher,
            self.ms,
            self.roles,
            self.options,
            &progress,
        )?;
        secondary::augment(
            &self.dispatcher,
            self.ms,
            &secondary,
            &primary,
            self.options,
            &progress,
        )?;
        let gain_or_flux = if secondary.is_empty() {
            primary.gain
        } else {
            flux::scale(
                &self.dispatcher,
                self.ms,
                self.roles.flux(),
                &secondary,
                &primary.gain,
                &progress,
            )?
        };
        progress.finish_with_message("Solved");

        let tables = CalTables {
            gain_or_flux,
            bandpass: primary.bandpass,
            delay: primary.delay,
            secondary,
        };
        info!("Calibration tables: {}", tables.names().join(", "));
        Ok(tables)
    }

    /// Apply solved tables to every calibrator and target.
    pub fn apply(&self, tables: &CalTables) -> Result<(), PipelineError> {
        let progress = make_stage_progress_bar(1);
        apply::apply(
            &self.dispatcher,
            self.ms,
            self.roles,
            tables,
            self.options.parallel_apply,
            &progress,
        )?;
        progress.finish_with_message("Applied");
        Ok(())
    }
}

/// Called at the start of every stage.
pub(crate) fn begin_stage<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    progress: &ProgressBar,
    stage: Stage,
) -> Result<(), PipelineError> {
    dispatcher.checkpoint(stage)?;
    progress.set_message(stage.to_string());
    info!("{}", console::style(format!("Stage: {stage}")).bold());
    Ok(())
}

fn make_stage_progress_bar(num_stages: u64) -> ProgressBar {
    ProgressBar::with_draw_target(
        Some(num_stages),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:18}: [{wide_bar:.blue}] {pos:2}/{len:2} stages ({elapsed_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("The {stage} stage didn't produce '{}'; cannot continue", .path.display())]
    MissingArtifact { stage: Stage, path: PathBuf },

    #[error("Cancelled before {before}")]
    Cancelled { before: String },

    #[error(transparent)]
    Storage(#[from] StorageFault),

    #[error(transparent)]
    Engine(#[from] EngineFault),
}
