// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared between calpipe subcommands, e.g. reading arguments files
//! and pretty printing.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::CalpipeError;
use crate::{calibrators::CalibratorCatalog, engine::CasaEngine, pipeline::ExecutionMode};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref CASA_HELP: String =
        format!("The CASA executable used to run calibration tasks. Default: {}", crate::engine::DEFAULT_CASA_EXECUTABLE);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

impl ArgFileTypes {
    /// Work out the file type from a file's extension (case insensitive).
    pub(super) fn from_path(path: &Path) -> Option<ArgFileTypes> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok())
    }
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        match ArgFileTypes::from_path(&$arg_file) {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CalpipeError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CalpipeError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            None => {
                return Err(CalpipeError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Read a calibrator catalogue file (toml or json) and add its entries to
/// the built-in MeerKAT catalogue. Entries in the file take precedence.
pub(super) fn read_catalog_file(file: &Path) -> Result<CalibratorCatalog, CalpipeError> {
    debug!("Reading calibrator catalogue {}", file.display());
    let mut contents = String::new();
    File::open(file)?.read_to_string(&mut contents)?;
    let from_file = match ArgFileTypes::from_path(file) {
        Some(ArgFileTypes::Toml) => CalibratorCatalog::from_toml_str(&contents)?,
        Some(ArgFileTypes::Json) => CalibratorCatalog::from_json_str(&contents)?,
        None => {
            return Err(CalpipeError::ArgFile(format!(
                "Calibrator catalogue '{}' doesn't have a recognised file extension! Valid extensions are: {}",
                file.display(),
                *ARG_FILE_TYPES_COMMA_SEPARATED
            )))
        }
    };
    let mut catalog = CalibratorCatalog::meerkat();
    catalog.extend(from_file);
    Ok(catalog)
}

/// Both `--debug` and the global `--dry-run` only log what would be done.
pub(super) fn execution_mode(dry_run: bool, debug: bool, verbose: bool) -> ExecutionMode {
    if dry_run || debug {
        ExecutionMode::DryRun
    } else if verbose {
        ExecutionMode::Verbose
    } else {
        ExecutionMode::Execute
    }
}

pub(super) fn casa_engine(casa: Option<PathBuf>) -> CasaEngine {
    match casa {
        Some(executable) => CasaEngine::new(executable),
        None => CasaEngine::default(),
    }
}
