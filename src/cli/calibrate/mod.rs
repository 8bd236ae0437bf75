// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parse calibration arguments into parameters.


use std::{num::NonZeroU32, path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    casa_engine, display_warnings, execution_mode, read_catalog_file, InfoPrinter, Warn,
    ARG_FILE_HELP, CASA_HELP,
};
use crate::{
    calibrators::{
        CalibratorCatalog, CalibratorRoles, CatalogError, FieldSet, FluxStandard,
        FluxStandardError, MeasurementSet, MeasurementSetError, RolesError,
    },
    params::CalibrateParams,
    pipeline::{retry::RetryPolicy, ExecutionMode, PipelineOptions},
    CalpipeError,
};

/// The number of times a failed deletion of a stale table is retried.
const DEFAULT_RETRIES: u32 = 2;

lazy_static::lazy_static! {
    static ref FLUXCAL_HELP: String =
        format!("Comma-separated flux calibrator(s). Catalogued MeerKAT flux calibrators: {}", CalibratorCatalog::meerkat().iter().map(|(name, _)| name).join(", "));

    static ref RETRIES_HELP: String =
        format!("How many times to retry deleting a stale calibration table after a transient error. Default: {DEFAULT_RETRIES}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CalibrateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    args_file: Option<PathBuf>,

    /// The measurement set to calibrate.
    #[clap(long, parse(from_os_str), help_heading = "INPUT DATA")]
    msfile: Option<PathBuf>,

    #[clap(short = 'f', long, help = FLUXCAL_HELP.as_str(), help_heading = "CALIBRATORS")]
    fluxcal: Option<String>,

    /// Comma-separated bandpass calibrator(s). Default: the flux
    /// calibrator(s).
    #[clap(short = 'b', long, help_heading = "CALIBRATORS")]
    bpcal: Option<String>,

    /// Comma-separated delay calibrator(s). Default: the flux calibrator(s).
    #[clap(short = 'd', long, help_heading = "CALIBRATORS")]
    delaycal: Option<String>,

    /// Comma-separated gain calibrator(s). Any that aren't also flux
    /// calibrators are bootstrapped onto the flux scale.
    #[clap(short = 'g', long, help_heading = "CALIBRATORS")]
    gaincal: Option<String>,

    /// Comma-separated science target(s) that solutions are applied to.
    #[clap(short = 't', long, help_heading = "CALIBRATORS")]
    target: Option<String>,

    /// The flux-density model of the flux calibrator(s). Either the name of a
    /// model known to CASA (e.g. "Perley-Butler 2013") or Stokes 'I,Q,U,V' in
    /// Jy. Default: the catalogued model of the flux calibrator(s).
    #[clap(long, help_heading = "CALIBRATORS")]
    standard: Option<String>,

    /// A toml or json file of extra flux calibrators, e.g.
    /// [calibrators] "J0010-2818" = [2.5, 0.0, 0.0, 0.0]. Entries override the
    /// built-in MeerKAT calibrators.
    #[clap(long, parse(from_os_str), help_heading = "CALIBRATORS")]
    catalog: Option<PathBuf>,

    /// The full name of the reference antenna, e.g. m002. Default: let CASA
    /// decide.
    #[clap(short = 'r', long, help_heading = "CALIBRATION")]
    ref_ant: Option<String>,

    /// The channels used for the preliminary phase solve, e.g. '0:1000~3000'.
    /// Default: all channels.
    #[clap(short = 'c', long, help_heading = "CALIBRATION")]
    ref_chans: Option<String>,

    /// Don't solve for preliminary phases before the bandpass.
    #[clap(long, help_heading = "CALIBRATION")]
    #[serde(default)]
    no_prelim_gain: bool,

    /// Recalculate (u, v, w) and the phase centres into a new measurement set
    /// (<prefix>_fixvis.ms) before calibrating.
    #[clap(long, help_heading = "CALIBRATION")]
    #[serde(default)]
    fixvis: bool,

    /// Don't reset the model and corrected data before calibrating.
    #[clap(long, help_heading = "CALIBRATION")]
    #[serde(default)]
    no_clearcal: bool,

    /// Apply the calibration solutions to the calibrators and targets.
    #[clap(long, help_heading = "CALIBRATION")]
    #[serde(default)]
    applycal: bool,

    /// Apply solutions to many fields at once.
    #[clap(long, help_heading = "CALIBRATION")]
    #[serde(default)]
    parallel_apply: bool,

    /// The directory where calibration tables are written. Default: the
    /// current directory.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    output_dir: Option<PathBuf>,

    #[clap(long, parse(from_os_str), help = CASA_HELP.as_str(), help_heading = "ENGINE")]
    casa: Option<PathBuf>,

    #[clap(long, help = RETRIES_HELP.as_str(), help_heading = "ENGINE")]
    retries: Option<u32>,

    /// Print each CASA command before running it.
    #[clap(long, help_heading = "ENGINE")]
    #[serde(default)]
    verbose: bool,

    /// Print each CASA command without running it (the same as --dry-run).
    #[clap(long, help_heading = "ENGINE")]
    #[serde(default)]
    debug: bool,
}

impl CalibrateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct. Where applicable, it will prefer CLI parameters
    /// over those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<CalibrateArgs, CalpipeError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file.clone() {
            let file_args: CalibrateArgs = unpack_arg_file!(arg_file);
            Ok(cli_args.merge_with(file_args))
        } else {
            Ok(cli_args)
        }
    }

    fn merge_with(self, other: Self) -> Self {
        // Ensure all of the file args are accounted for by pattern matching.
        let CalibrateArgs {
            args_file: _,
            msfile,
            fluxcal,
            bpcal,
            delaycal,
            gaincal,
            target,
            standard,
            catalog,
            ref_ant,
            ref_chans,
            no_prelim_gain,
            fixvis,
            no_clearcal,
            applycal,
            parallel_apply,
            output_dir,
            casa,
            retries,
            verbose,
            debug,
        } = other;
        Self {
            args_file: None,
            msfile: self.msfile.or(msfile),
            fluxcal: self.fluxcal.or(fluxcal),
            bpcal: self.bpcal.or(bpcal),
            delaycal: self.delaycal.or(delaycal),
            gaincal: self.gaincal.or(gaincal),
            target: self.target.or(target),
            standard: self.standard.or(standard),
            catalog: self.catalog.or(catalog),
            ref_ant: self.ref_ant.or(ref_ant),
            ref_chans: self.ref_chans.or(ref_chans),
            no_prelim_gain: self.no_prelim_gain || no_prelim_gain,
            fixvis: self.fixvis || fixvis,
            no_clearcal: self.no_clearcal || no_clearcal,
            applycal: self.applycal || applycal,
            parallel_apply: self.parallel_apply || parallel_apply,
            output_dir: self.output_dir.or(output_dir),
            casa: self.casa.or(casa),
            retries: self.retries.or(retries),
            verbose: self.verbose || verbose,
            debug: self.debug || debug,
        }
    }

    /// Parse the arguments into parameters ready for calibration. Nothing is
    /// asked of the calibration engine here.
    fn parse(self, dry_run: bool) -> Result<CalibrateParams, CalpipeError> {
        debug!("{:#?}", self);

        let CalibrateArgs {
            args_file: _,
            msfile,
            fluxcal,
            bpcal,
            delaycal,
            gaincal,
            target,
            standard,
            catalog,
            ref_ant,
            ref_chans,
            no_prelim_gain,
            fixvis,
            no_clearcal,
            applycal,
            parallel_apply,
            output_dir,
            casa,
            retries,
            verbose,
            debug,
        } = self;

        let mode = execution_mode(dry_run, debug, verbose);

        let msfile = msfile.ok_or(CalibrateArgsError::NoMsfile)?;
        if !mode.is_dry_run() && !msfile.exists() {
            return Err(CalibrateArgsError::MsfileMissing(msfile).into());
        }
        let ms = MeasurementSet::new(msfile)?;

        let flux = FieldSet::parse_list(fluxcal.as_deref().unwrap_or_default());
        let roles = CalibratorRoles::new(
            flux,
            bpcal.as_deref().map(FieldSet::parse_list),
            delaycal.as_deref().map(FieldSet::parse_list),
            FieldSet::parse_list(gaincal.as_deref().unwrap_or_default()),
            FieldSet::parse_list(target.as_deref().unwrap_or_default()),
        )
        .map_err(CalibrateArgsError::from)?;

        let catalog = match catalog {
            Some(file) => read_catalog_file(&file)?,
            None => CalibratorCatalog::meerkat(),
        };
        let standard = standard
            .as_deref()
            .map(FluxStandard::from_str)
            .transpose()
            .map_err(CalibrateArgsError::from)?;
        let standard = catalog
            .resolve(roles.flux(), standard)
            .map_err(CalibrateArgsError::from)?;

        let preliminary_gain = !no_prelim_gain;
        let ref_chans = ref_chans.filter(|s| !s.trim().is_empty());
        let ref_ant = ref_ant.unwrap_or_default();
        if ref_ant.is_empty() {
            "No reference antenna was given (--ref-ant); CASA picks one".warn();
        }

        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
        if !mode.is_dry_run() && !output_dir.is_dir() {
            return Err(CalibrateArgsError::OutputDirMissing(output_dir).into());
        }

        let retries = retries.unwrap_or(DEFAULT_RETRIES);
        let max_attempts = retries
            .checked_add(1)
            .and_then(NonZeroU32::new)
            .ok_or(CalibrateArgsError::TooManyRetries)?;
        let retry = RetryPolicy::default().with_max_attempts(max_attempts);
        trace!("{retry:?}");

        let engine = casa_engine(casa);

        let mut printer = InfoPrinter::new("Calibration set up".into());
        printer.push_block(vec![
            format!("Measurement set: {}", ms.path().display()).into(),
            format!("Calibration tables: {}/{}.*", output_dir.display(), ms.prefix()).into(),
        ]);
        let mut block = vec![
            format!("Flux calibrators:     {}", roles.flux()).into(),
            format!("Bandpass calibrators: {}", roles.bandpass()).into(),
            format!("Delay calibrators:    {}", roles.delay()).into(),
        ];
        if !roles.gain().is_empty() {
            block.push(format!("Gain calibrators:     {}", roles.gain()).into());
        }
        let secondary = roles.secondary();
        if !secondary.is_empty() {
            block.push(format!("Bootstrapping the flux scale of: {secondary}").into());
        }
        if !roles.targets().is_empty() {
            block.push(format!("Targets:              {}", roles.targets()).into());
        }
        printer.push_block(block);
        printer.push_line(format!("Flux standard: {standard}").into());
        printer.push_block(vec![
            format!(
                "Reference antenna: {}",
                if ref_ant.is_empty() {
                    "<auto>"
                } else {
                    ref_ant.as_str()
                }
            )
            .into(),
            match (preliminary_gain, &ref_chans) {
                (false, _) => "No preliminary phase solve".into(),
                (true, Some(chans)) => format!("Preliminary phase solve over {chans}").into(),
                (true, None) => "Preliminary phase solve over all channels".into(),
            },
        ]);
        printer.push_line(
            match mode {
                ExecutionMode::Execute => {
                    format!("Running tasks with {}", engine.executable().display())
                }
                ExecutionMode::Verbose => format!(
                    "Running (and printing) tasks with {}",
                    engine.executable().display()
                ),
                ExecutionMode::DryRun => "Only printing tasks (dry run)".to_string(),
            }
            .into(),
        );
        printer.display();
        display_warnings();

        Ok(CalibrateParams {
            ms,
            roles,
            standard,
            options: PipelineOptions {
                ref_ant,
                preliminary_gain,
                ref_chans,
                parallel_apply,
            },
            mode,
            clear_existing: !no_clearcal,
            fixvis,
            apply: applycal,
            output_dir,
            retry,
            engine,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CalpipeError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse(dry_run)?;

        let tables = params.run()?;
        let mut printer = InfoPrinter::new("Calibration tables".into());
        printer.push_block(
            tables
                .tables()
                .iter()
                .map(|a| a.path().display().to_string().into())
                .collect(),
        );
        printer.display();
        if params.mode.is_dry_run() {
            info!("Dry run -- no tables were written.");
        }

        Ok(())
    }
}

/// Errors associated with calibration arguments.
#[derive(thiserror::Error, Debug)]
pub(super) enum CalibrateArgsError {
    #[error("No measurement set was specified (--msfile)")]
    NoMsfile,

    #[error("At least one flux calibrator must be specified (--fluxcal)")]
    NoFluxCalibrators,

    #[error("The measurement set '{}' doesn't exist", .0.display())]
    MsfileMissing(PathBuf),

    #[error("The output directory '{}' doesn't exist", .0.display())]
    OutputDirMissing(PathBuf),

    #[error("The number of retries is too large")]
    TooManyRetries,

    #[error(transparent)]
    MeasurementSet(#[from] MeasurementSetError),

    #[error(transparent)]
    Standard(#[from] FluxStandardError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<RolesError> for CalibrateArgsError {
    fn from(e: RolesError) -> Self {
        match e {
            RolesError::NoFluxCalibrators => CalibrateArgsError::NoFluxCalibrators,
        }
    }
}
