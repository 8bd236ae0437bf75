// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interface to the external calibration engine.
//!
//! The numerical work (solving for delays, bandpasses and gains, applying
//! solutions) is done by an external engine; this crate only decides what to
//! ask it to do and in which order. Requests are typed; see
//! [`EngineRequest`].

mod casa;
mod requests;

pub use casa::{CasaEngine, DEFAULT_CASA_EXECUTABLE};
pub use requests::*;

use thiserror::Error;

/// A synchronous, blocking calibration engine. Implementations must be
/// shareable between threads so that independent requests (e.g. applying
/// solutions to different fields) can be issued in parallel.
pub trait CalibrationEngine: Sync {
    /// Run a single request to completion.
    fn run(&self, request: &EngineRequest) -> Result<(), EngineFault>;
}

impl<E: CalibrationEngine + ?Sized> CalibrationEngine for &E {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineFault> {
        (**self).run(request)
    }
}

/// The engine couldn't service a request. This is distinct from a domain
/// failure (e.g. a missing solution table), which is detected after the fact.
#[derive(Error, Debug)]
pub enum EngineFault {
    #[error("Couldn't start the calibration engine '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("The calibration engine failed on '{task}' ({status}):\n{stderr}")]
    TaskFailed {
        task: &'static str,
        status: String,
        stderr: String,
    },
}
