// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arguments for flagging a measurement set before calibration.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    casa_engine, display_warnings, execution_mode, InfoPrinter, ARG_FILE_HELP, CASA_HELP,
};
use crate::{
    calibrators::{MeasurementSet, MeasurementSetError},
    flagging::FlagSelection,
    params::FlagParams,
    CalpipeError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct FlagArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    args_file: Option<PathBuf>,

    /// The measurement set to flag.
    #[clap(long, parse(from_os_str), help_heading = "INPUT DATA")]
    msfile: Option<PathBuf>,

    /// Flag data that are exactly zero.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    zeros: bool,

    /// Flag the edges of the L band (856-880 and 1658-1800 MHz).
    #[clap(long, alias = "bp", help_heading = "RULES")]
    #[serde(default)]
    band_edges: bool,

    /// Flag Galactic HI emission (1420-1421.3 MHz).
    #[clap(long, alias = "mw", help_heading = "RULES")]
    #[serde(default)]
    milky_way: bool,

    /// Flag the known L-band environmental RFI (aviation, GSM and Alkantpan).
    #[clap(long, alias = "lband", help_heading = "RULES")]
    #[serde(default)]
    lband_env: bool,

    /// Flag the GPS satellite bands.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    gps: bool,

    /// Flag the GLONASS satellite bands.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    glonass: bool,

    /// Flag the Galileo satellite bands.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    galileo: bool,

    /// Flag the Afristar satellite band.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    afristar: bool,

    /// Flag the Iridium satellite band.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    iridium: bool,

    /// Flag the Inmarsat satellite band.
    #[clap(long, help_heading = "RULES")]
    #[serde(default)]
    inmarsat: bool,

    #[clap(long, parse(from_os_str), help = CASA_HELP.as_str(), help_heading = "ENGINE")]
    casa: Option<PathBuf>,

    /// Print each CASA command before running it.
    #[clap(long, help_heading = "ENGINE")]
    #[serde(default)]
    verbose: bool,

    /// Print each CASA command without running it (the same as --dry-run).
    #[clap(long, help_heading = "ENGINE")]
    #[serde(default)]
    debug: bool,
}

impl FlagArgs {
    pub(super) fn merge(self) -> Result<FlagArgs, CalpipeError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;
        let arg_file = match cli_args.args_file.clone() {
            Some(f) => f,
            None => return Ok(cli_args),
        };
        let file_args: FlagArgs = unpack_arg_file!(arg_file);

        let FlagArgs {
            args_file: _,
            msfile,
            zeros,
            band_edges,
            milky_way,
            lband_env,
            gps,
            glonass,
            galileo,
            afristar,
            iridium,
            inmarsat,
            casa,
            verbose,
            debug,
        } = file_args;
        Ok(FlagArgs {
            args_file: None,
            msfile: cli_args.msfile.or(msfile),
            zeros: cli_args.zeros || zeros,
            band_edges: cli_args.band_edges || band_edges,
            milky_way: cli_args.milky_way || milky_way,
            lband_env: cli_args.lband_env || lband_env,
            gps: cli_args.gps || gps,
            glonass: cli_args.glonass || glonass,
            galileo: cli_args.galileo || galileo,
            afristar: cli_args.afristar || afristar,
            iridium: cli_args.iridium || iridium,
            inmarsat: cli_args.inmarsat || inmarsat,
            casa: cli_args.casa.or(casa),
            verbose: cli_args.verbose || verbose,
            debug: cli_args.debug || debug,
        })
    }

    fn parse(self, dry_run: bool) -> Result<FlagParams, CalpipeError> {
        let FlagArgs {
            args_file: _,
            msfile,
            zeros,
            band_edges,
            milky_way,
            lband_env,
            gps,
            glonass,
            galileo,
            afristar,
            iridium,
            inmarsat,
            casa,
            verbose,
            debug,
        } = self;

        let mode = execution_mode(dry_run, debug, verbose);
        let msfile = msfile.ok_or(FlagArgsError::NoMsfile)?;
        if !mode.is_dry_run() && !msfile.exists() {
            return Err(FlagArgsError::MsfileMissing(msfile).into());
        }
        let ms = MeasurementSet::new(msfile).map_err(FlagArgsError::from)?;

        let rules = FlagSelection {
            zeros,
            band_edges,
            milky_way,
            lband_env,
            gps,
            glonass,
            galileo,
            afristar,
            iridium,
            inmarsat,
        }
        .rules();

        let mut printer = InfoPrinter::new("Flagging set up".into());
        printer.push_line(format!("Measurement set: {}", ms.path().display()).into());
        printer.push_block(
            rules
                .iter()
                .map(|r| format!("Flagging {}", r.description()).into())
                .collect(),
        );
        printer.display();
        display_warnings();

        Ok(FlagParams {
            ms,
            rules,
            mode,
            engine: casa_engine(casa),
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CalpipeError> {
        trace!("{:#?}", self);
        let params = self.parse(dry_run)?;
        params.run()?;
        info!("Flagged {} rules", params.rules.len());
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum FlagArgsError {
    #[error("No measurement set was specified (--msfile)")]
    NoMsfile,

    #[error("The measurement set '{}' doesn't exist", .0.display())]
    MsfileMissing(PathBuf),

    #[error(transparent)]
    MeasurementSet(#[from] MeasurementSetError),
}
