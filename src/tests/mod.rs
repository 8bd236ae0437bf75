// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful things for tests.

use std::{path::Path, sync::Mutex};

use crate::engine::{CalibrationEngine, EngineFault, EngineRequest};

/// An engine that writes (empty) tables instead of calibrating. Every
/// request is recorded along with whether the table it writes already
/// existed when the request arrived.
#[derive(Default)]
pub(crate) struct MockEngine {
    calls: Mutex<Vec<(EngineRequest, bool)>>,
    /// Tables with this extension are never written.
    pub(crate) forget: Option<&'static str>,
    /// Requests for this task fail.
    pub(crate) fail_task: Option<&'static str>,
}

impl MockEngine {
    pub(crate) fn forgetting(extension: &'static str) -> MockEngine {
        MockEngine {
            forget: Some(extension),
            ..Default::default()
        }
    }

    pub(crate) fn failing(task: &'static str) -> MockEngine {
        MockEngine {
            fail_task: Some(task),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(EngineRequest, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn tasks(&self) -> Vec<&'static str> {
        self.calls().iter().map(|(r, _)| r.task()).collect()
    }
}

/// The table a request writes, if any.
pub(crate) fn produced(request: &EngineRequest) -> Option<&Path> {
    match request {
        EngineRequest::SolveDelay(s) | EngineRequest::SolveGain(s) => Some(&s.table),
        EngineRequest::SolveBandpass(b) => Some(&b.table),
        EngineRequest::ScaleFlux(f) => Some(&f.flux_table),
        _ => None,
    }
}

impl CalibrationEngine for MockEngine {
    fn run(&self, request: &EngineRequest) -> Result<(), EngineFault> {
        let existed = produced(request).map(|p| p.exists()).unwrap_or(false);
        self.calls.lock().unwrap().push((request.clone(), existed));

        if self.fail_task == Some(request.task()) {
            return Err(EngineFault::TaskFailed {
                task: request.task(),
                status: "exit status: 1".to_string(),
                stderr: "SEVERE: something broke".to_string(),
            });
        }
        if let Some(table) = produced(request) {
            let forget = table
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| Some(e) == self.forget)
                .unwrap_or(false);
            if !forget {
                std::fs::create_dir_all(table).unwrap();
            }
        }
        Ok(())
    }
}
