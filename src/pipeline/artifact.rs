// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration tables produced by pipeline stages.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use log::{info, trace};
use strum_macros::Display;
use thiserror::Error;

use super::{retry::RetryPolicy, ExecutionMode, PipelineError};
use crate::calibrators::MeasurementSet;

/// A stage of the calibration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(serialize = "delay")]
    Delay,

    #[strum(serialize = "preliminary gain")]
    PreliminaryGain,

    #[strum(serialize = "bandpass")]
    Bandpass,

    #[strum(serialize = "gain")]
    Gain,

    #[strum(serialize = "secondary gain")]
    SecondaryGain,

    #[strum(serialize = "flux")]
    FluxScale,

    #[strum(serialize = "apply")]
    Apply,
}

/// The kinds of calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Table {
    #[strum(serialize = "K")]
    Delay,

    #[strum(serialize = "G0")]
    PreliminaryGain,

    #[strum(serialize = "B")]
    Bandpass,

    #[strum(serialize = "G")]
    Gain,

    #[strum(serialize = "flux")]
    Flux,
}

/// A handle to a calibration table. Its identity depends only on the
/// measurement-set prefix and the kind of table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    table: Table,
    path: PathBuf,
}

impl Artifact {
    pub fn table(&self) -> Table {
        self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name of this table, e.g. "obs.K".
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Knows where tables live and whether they exist.
#[derive(Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    prefix: String,
    retry: RetryPolicy,
    remover: fn(&Path) -> io::Result<()>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("dir", &self.dir)
            .field("prefix", &self.prefix)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    /// Tables are named after `ms` and live in `dir`.
    pub fn new(ms: &MeasurementSet, dir: &Path, retry: RetryPolicy) -> ArtifactStore {
        ArtifactStore {
            dir: dir.to_path_buf(),
            prefix: ms.prefix().to_string(),
            retry,
            remover: remove_path,
        }
    }

    /// Delete tables with `remover` instead of the filesystem.
    #[cfg(test)]
    pub(crate) fn with_remover(self, remover: fn(&Path) -> io::Result<()>) -> ArtifactStore {
        ArtifactStore { remover, ..self }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn artifact(&self, table: Table) -> Artifact {
        Artifact {
            table,
            path: self.dir.join(format!("{}.{table}", self.prefix)),
        }
    }

    pub fn exists(&self, artifact: &Artifact) -> bool {
        let exists = artifact.path.exists();
        trace!("{artifact} exists: {exists}");
        exists
    }

    /// Fail if `stage` didn't leave its table behind. Nothing is checked in a
    /// dry run, because nothing is ever produced.
    pub fn require_or_fail(
        &self,
        artifact: &Artifact,
        stage: Stage,
        mode: ExecutionMode,
    ) -> Result<(), PipelineError> {
        if mode.is_dry_run() || self.exists(artifact) {
            Ok(())
        } else {
            Err(PipelineError::MissingArtifact {
                stage,
                path: artifact.path.clone(),
            })
        }
    }

    /// Delete a table. Transient IO errors are retried according to this
    /// store's retry policy.
    pub fn remove(&self, artifact: &Artifact) -> Result<(), StorageFault> {
        info!("Deleting {artifact} before cal");
        self.retry
            .run(|| (self.remover)(&artifact.path))
            .map_err(|source| StorageFault::Remove {
                path: artifact.path.clone(),
                source,
            })
    }
}

/// Tables are normally directories, but be lenient.
fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[derive(Error, Debug)]
pub enum StorageFault {
    #[error("Couldn't delete the existing calibration table '{}': {source}", .path.display())]
    Remove { path: PathBuf, source: io::Error },
}
