// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run requests with CASA.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, log_enabled, trace, Level::Trace};

use super::{CalibrationEngine, EngineFault, EngineRequest};

pub const DEFAULT_CASA_EXECUTABLE: &str = "casa";

/// Only this many trailing lines of CASA's stderr are kept in errors.
const STDERR_TAIL_LINES: usize = 20;

/// Runs each request as a CASA task in a fresh, non-interactive CASA session.
#[derive(Debug, Clone)]
pub struct CasaEngine {
    executable: PathBuf,
}

impl Default for CasaEngine {
    fn default() -> Self {
        CasaEngine::new(DEFAULT_CASA_EXECUTABLE)
    }
}

impl CasaEngine {
    pub fn new<P: Into<PathBuf>>(executable: P) -> CasaEngine {
        CasaEngine {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn command(&self, request: &EngineRequest) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(["--nologger", "--nogui", "--log2term", "-c"])
            .arg(request.to_string());
        cmd
    }
}

impl CalibrationEngine for CasaEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineFault> {
        let task = request.task();
        debug!("Running CASA task '{task}'");
        let output = self
            .command(request)
            .output()
            .map_err(|source| EngineFault::Spawn {
                program: self.executable.display().to_string(),
                source,
            })?;

        if log_enabled!(Trace) {
            for line in String::from_utf8_lossy(&output.stdout).lines() {
                trace!("casa: {line}");
            }
        }

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            Err(EngineFault::TaskFailed {
                task,
                status: output.status.to_string(),
                stderr: tail,
            })
        }
    }
}
