// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibrator roles, the measurement set being calibrated and flux standards.
//!
//! Each calibrator role (flux, bandpass, delay, gain) holds a *set* of fields.
//! Roles may overlap; e.g. the flux calibrator is very commonly also the
//! bandpass calibrator.

mod catalog;
mod fields;
mod standard;
#[cfg(test)]
mod tests;

pub use catalog::{CalibratorCatalog, CatalogError};
pub use fields::FieldSet;
pub use standard::{FluxStandard, FluxStandardError};

use std::path::{Path, PathBuf};

use strum_macros::Display;
use thiserror::Error;

/// A measurement set on disk. The "prefix" is the basename of the measurement
/// set without its extension, and is used to name all calibration tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementSet {
    path: PathBuf,
    prefix: String,
}

impl MeasurementSet {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<MeasurementSet, MeasurementSetError> {
        let path = path.into();
        if path.to_str().is_none() {
            return Err(MeasurementSetError::NotUtf8(path));
        }
        let prefix = path
            .file_stem()
            .ok_or_else(|| MeasurementSetError::NoBasename(path.clone()))?
            .to_str()
            .ok_or_else(|| MeasurementSetError::NotUtf8(path.clone()))?
            .to_string();
        Ok(MeasurementSet { path, prefix })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The measurement set that the phase-centre correction writes into
    /// `dir`.
    pub fn fixvis_output(&self, dir: &Path) -> MeasurementSet {
        let prefix = format!("{}_fixvis", self.prefix);
        MeasurementSet {
            path: dir.join(format!("{prefix}.ms")),
            prefix,
        }
    }
}

#[derive(Error, Debug)]
pub enum MeasurementSetError {
    #[error("The measurement set path '{}' has no basename", .0.display())]
    NoBasename(PathBuf),

    #[error("The measurement set path '{}' contains invalid UTF-8", .0.display())]
    NotUtf8(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CalibratorRole {
    #[strum(serialize = "flux")]
    Flux,

    #[strum(serialize = "bandpass")]
    Bandpass,

    #[strum(serialize = "delay")]
    Delay,

    #[strum(serialize = "gain")]
    Gain,
}

/// All of the fields involved in a calibration run, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibratorRoles {
    flux: FieldSet,
    bandpass: FieldSet,
    delay: FieldSet,
    gain: FieldSet,
    targets: FieldSet,
}

impl CalibratorRoles {
    /// Bandpass and delay calibrators default to the flux calibrators when
    /// they aren't specified.
    pub fn new(
        flux: FieldSet,
        bandpass: Option<FieldSet>,
        delay: Option<FieldSet>,
        gain: FieldSet,
        targets: FieldSet,
    ) -> Result<CalibratorRoles, RolesError> {
        if flux.is_empty() {
            return Err(RolesError::NoFluxCalibrators);
        }
        let bandpass = bandpass
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| flux.clone());
        let delay = delay
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| flux.clone());
        Ok(CalibratorRoles {
            flux,
            bandpass,
            delay,
            gain,
            targets,
        })
    }

    pub fn role(&self, role: CalibratorRole) -> &FieldSet {
        match role {
            CalibratorRole::Flux => &self.flux,
            CalibratorRole::Bandpass => &self.bandpass,
            CalibratorRole::Delay => &self.delay,
            CalibratorRole::Gain => &self.gain,
        }
    }

    pub fn flux(&self) -> &FieldSet {
        &self.flux
    }

    pub fn bandpass(&self) -> &FieldSet {
        &self.bandpass
    }

    pub fn delay(&self) -> &FieldSet {
        &self.delay
    }

    pub fn gain(&self) -> &FieldSet {
        &self.gain
    }

    pub fn targets(&self) -> &FieldSet {
        &self.targets
    }

    /// The fields used to solve for antenna delays.
    pub fn delay_solve_fields(&self) -> FieldSet {
        self.flux.union(&self.bandpass)
    }

    /// Calibrators whose gain solutions are appended to the primary gain
    /// table and then bootstrapped onto the flux scale. Every flux calibrator
    /// is excluded, even if it is also listed in another role.
    pub fn secondary(&self) -> FieldSet {
        self.bandpass.union(&self.gain).difference(&self.flux)
    }

    /// Every calibrator that has solutions applied to it.
    pub fn all_calibrators(&self) -> FieldSet {
        self.flux.union(&self.bandpass).union(&self.gain)
    }

    /// The field whose gain solutions are transferred to the science targets.
    /// Without any gain calibrators, the flux calibrators are used.
    pub fn target_gain_fields(&self) -> &FieldSet {
        if self.gain.is_empty() {
            &self.flux
        } else {
            &self.gain
        }
    }
}

#[derive(Error, Debug)]
pub enum RolesError {
    #[error("At least one flux calibrator must be specified")]
    NoFluxCalibrators,
}
