// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all calpipe-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{calibrate::CalibrateArgsError, flag::FlagArgsError};
use crate::{
    calibrators::{CatalogError, FluxStandardError, MeasurementSetError, RolesError},
    engine::EngineFault,
    pipeline::{PipelineError, StorageFault},
};

const HINT_DRY_RUN: &str = "Try --dry-run to see what would be asked of the calibration engine.";

/// The *only* publicly visible error from calpipe.
#[derive(Error, Debug)]
pub enum CalpipeError {
    /// Bad or missing arguments, or an unknown calibrator.
    #[error("{0}")]
    Configuration(String),

    /// A stage didn't produce its table.
    #[error("{0}\n\nCheck the calibration engine's log for why the stage produced nothing.")]
    MissingArtifact(String),

    /// A stale table couldn't be removed.
    #[error("{0}")]
    Storage(String),

    /// The calibration engine couldn't service a request.
    #[error("{0}\n\n{HINT_DRY_RUN}")]
    Engine(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    #[error("{0}")]
    Cancelled(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<CalibrateArgsError> for CalpipeError {
    fn from(e: CalibrateArgsError) -> Self {
        match e {
            CalibrateArgsError::NoMsfile
            | CalibrateArgsError::NoFluxCalibrators
            | CalibrateArgsError::MsfileMissing(_)
            | CalibrateArgsError::OutputDirMissing(_)
            | CalibrateArgsError::TooManyRetries => Self::Configuration(e.to_string()),
            CalibrateArgsError::MeasurementSet(e) => Self::from(e),
            CalibrateArgsError::Standard(e) => Self::from(e),
            CalibrateArgsError::Catalog(e) => Self::from(e),
        }
    }
}

impl From<FlagArgsError> for CalpipeError {
    fn from(e: FlagArgsError) -> Self {
        match e {
            FlagArgsError::NoMsfile | FlagArgsError::MsfileMissing(_) => {
                Self::Configuration(e.to_string())
            }
            FlagArgsError::MeasurementSet(e) => Self::from(e),
        }
    }
}

impl From<PipelineError> for CalpipeError {
    fn from(e: PipelineError) -> Self {
        let s = e.to_string();
        match e {
            PipelineError::MissingArtifact { .. } => Self::MissingArtifact(s),
            PipelineError::Cancelled { .. } => Self::Cancelled(s),
            PipelineError::Storage(e) => Self::from(e),
            PipelineError::Engine(e) => Self::from(e),
        }
    }
}

impl From<StorageFault> for CalpipeError {
    fn from(e: StorageFault) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<EngineFault> for CalpipeError {
    fn from(e: EngineFault) -> Self {
        Self::Engine(e.to_string())
    }
}

impl From<CatalogError> for CalpipeError {
    fn from(e: CatalogError) -> Self {
        let s = e.to_string();
        match e {
            CatalogError::UnknownFluxCalibrator { .. }
            | CatalogError::MixedStandards(_)
            | CatalogError::NoFluxCalibrators => Self::Configuration(s),
            CatalogError::Decode(_) => Self::ArgFile(s),
        }
    }
}

impl From<FluxStandardError> for CalpipeError {
    fn from(e: FluxStandardError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<MeasurementSetError> for CalpipeError {
    fn from(e: MeasurementSetError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<RolesError> for CalpipeError {
    fn from(e: RolesError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<std::io::Error> for CalpipeError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
