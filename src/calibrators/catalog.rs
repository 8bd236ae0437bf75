// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Known flux calibrators and their flux-density models.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{FieldSet, FluxStandard};

/// A lookup from a calibrator's field name to its flux-density model. New
/// calibrators can be added by reading a catalogue file; there's no need to
/// touch code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratorCatalog {
    calibrators: IndexMap<String, FluxStandard>,
}

impl Default for CalibratorCatalog {
    fn default() -> Self {
        CalibratorCatalog::meerkat()
    }
}

impl CalibratorCatalog {
    /// A catalogue with no entries.
    pub fn empty() -> CalibratorCatalog {
        CalibratorCatalog {
            calibrators: IndexMap::new(),
        }
    }

    /// The standard MeerKAT L-band flux calibrators.
    pub fn meerkat() -> CalibratorCatalog {
        let mut catalog = CalibratorCatalog::empty();
        catalog.insert("J0408-6545", FluxStandard::Stokes([17.1, 0.0, 0.0, 0.0]));
        catalog.insert(
            "J1939-6342",
            FluxStandard::Named("Stevens-Reynolds 2016".to_string()),
        );
        catalog.insert(
            "J1331+3030",
            FluxStandard::Named("Perley-Butler 2013".to_string()),
        );
        catalog
    }

    pub fn from_toml_str(s: &str) -> Result<CalibratorCatalog, CatalogError> {
        toml::from_str(s).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<CalibratorCatalog, CatalogError> {
        serde_json::from_str(s).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Add a calibrator, replacing any existing entry with the same name.
    pub fn insert<S: Into<String>>(&mut self, name: S, standard: FluxStandard) {
        self.calibrators.insert(name.into(), standard);
    }

    /// Add all of the entries of `other` to this catalogue. Entries in `other`
    /// take precedence.
    pub fn extend(&mut self, other: CalibratorCatalog) {
        self.calibrators.extend(other.calibrators);
    }

    pub fn lookup(&self, name: &str) -> Option<&FluxStandard> {
        self.calibrators.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FluxStandard)> + '_ {
        self.calibrators.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.calibrators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calibrators.is_empty()
    }

    /// Work out which flux standard to use for the flux calibrators. A
    /// user-specified standard always wins; otherwise every flux calibrator
    /// must be in the catalogue and they must all share the same model.
    pub fn resolve(
        &self,
        flux_calibrators: &FieldSet,
        explicit: Option<FluxStandard>,
    ) -> Result<FluxStandard, CatalogError> {
        if let Some(standard) = explicit {
            debug!("Using the user-specified flux standard: {standard}");
            return Ok(standard);
        }

        let mut resolved: Option<&FluxStandard> = None;
        for field in flux_calibrators {
            let standard = self
                .lookup(field)
                .ok_or_else(|| CatalogError::UnknownFluxCalibrator {
                    name: field.clone(),
                    known: self.calibrators.keys().cloned().collect::<Vec<_>>().join(", "),
                })?;
            match resolved {
                Some(r) if r != standard => {
                    return Err(CatalogError::MixedStandards(flux_calibrators.join()))
                }
                _ => resolved = Some(standard),
            }
        }

        resolved.cloned().ok_or(CatalogError::NoFluxCalibrators)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("'{name}' is not a standard flux calibrator (known: {known}); please specify a flux model with --standard <flux_model> or --standard 'I,Q,U,V'")]
    UnknownFluxCalibrator { name: String, known: String },

    #[error("The flux calibrators '{0}' have different catalogued flux models; please specify one with --standard")]
    MixedStandards(String),

    #[error("No flux calibrators were given, so no flux standard can be determined")]
    NoFluxCalibrators,

    #[error("Couldn't decode the calibrator catalogue: {0}")]
    Decode(String),
}
