// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The flux-density model applied to the flux calibrator(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FluxStandard {
    /// Literal Stokes parameters \[I, Q, U, V\] in Jy. The calibration engine
    /// is put into "manual" flux-density mode.
    Stokes([f64; 4]),

    /// A catalogued flux-density model known to the calibration engine, e.g.
    /// "Perley-Butler 2013".
    Named(String),
}

impl FluxStandard {
    /// Does this standard require the engine's manual flux-density mode?
    pub fn is_manual(&self) -> bool {
        matches!(self, FluxStandard::Stokes(_))
    }
}

impl FromStr for FluxStandard {
    type Err = FluxStandardError;

    /// A string with exactly four comma-separated elements is parsed as Stokes
    /// \[I, Q, U, V\]; anything else is treated as the name of a model.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FluxStandardError::Empty);
        }

        let elems: Vec<&str> = s.split(',').map(str::trim).collect();
        if elems.len() != 4 {
            return Ok(FluxStandard::Named(s.to_string()));
        }

        let mut stokes = [0.0; 4];
        for (out, elem) in stokes.iter_mut().zip(elems) {
            *out = elem
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| FluxStandardError::BadStokes {
                    input: s.to_string(),
                    elem: elem.to_string(),
                })?;
        }
        Ok(FluxStandard::Stokes(stokes))
    }
}

impl Display for FluxStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FluxStandard::Stokes(s) => write!(f, "[{}] Jy", s.iter().join(", ")),
            FluxStandard::Named(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FluxStandardError {
    #[error("An empty flux standard was supplied")]
    Empty,

    #[error("Couldn't parse '{elem}' in the Stokes flux density '{input}' as a finite number; expected 'I,Q,U,V'")]
    BadStokes { input: String, elem: String },
}
