// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Typed requests understood by a calibration engine.
//!
//! The [`Display`] implementations render each request as the equivalent
//! CASA task call. All values are written as escaped Python literals; user
//! input is never interpolated as code.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::{
    calibrators::{FieldSet, FluxStandard},
    flagging::FlagRule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum GainType {
    /// Antenna-based delays.
    #[strum(serialize = "K")]
    Delay,

    /// Complex antenna gains.
    #[strum(serialize = "G")]
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CalMode {
    #[strum(serialize = "ap")]
    AmplitudePhase,

    #[strum(serialize = "p")]
    Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SolutionInterval {
    /// One solution over the whole (combined) data span.
    #[strum(serialize = "inf")]
    Infinite,

    /// One solution per integration.
    #[strum(serialize = "int")]
    Integration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CombineAxis {
    #[strum(serialize = "scan")]
    Scan,

    #[strum(serialize = "field")]
    Field,

    #[strum(serialize = "spw")]
    Spw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Interpolation {
    /// Let the engine pick its default.
    #[strum(serialize = "")]
    Default,

    #[strum(serialize = "nearest")]
    Nearest,

    #[strum(serialize = "linear")]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ApplyMode {
    /// Calibrate the data and flag anything without a valid solution.
    #[strum(serialize = "calflag")]
    CalFlag,

    #[strum(serialize = "calonly")]
    CalOnly,
}

/// Reset the model and corrected data columns of a measurement set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearCal {
    pub vis: PathBuf,
}

/// Recalculate (u, v, w) and the phase centre, writing a new measurement set.
#[derive(Debug, Clone, PartialEq)]
pub struct FixVis {
    pub vis: PathBuf,
    pub output_vis: PathBuf,
}

/// Attach a flux-density model to the flux calibrator(s).
#[derive(Debug, Clone, PartialEq)]
pub struct SetFluxModel {
    pub vis: PathBuf,
    pub fields: FieldSet,
    pub standard: FluxStandard,
}

/// A delay or gain solve.
#[derive(Debug, Clone, PartialEq)]
pub struct GainSolve {
    pub vis: PathBuf,
    pub table: PathBuf,
    pub fields: FieldSet,
    pub gain_type: GainType,
    pub cal_mode: Option<CalMode>,
    pub solint: SolutionInterval,
    pub ref_ant: String,
    /// Restrict the solve to this spectral window and channel selection.
    pub spw: Option<String>,
    pub combine: Vec<CombineAxis>,
    pub solnorm: bool,
    pub min_snr: f64,
    /// Add solutions to an existing table rather than replacing it.
    pub append: bool,
    /// Tables applied on the fly before solving.
    pub upstream: Vec<PathBuf>,
}

/// A per-channel bandpass solve.
#[derive(Debug, Clone, PartialEq)]
pub struct BandpassSolve {
    pub vis: PathBuf,
    pub table: PathBuf,
    pub fields: FieldSet,
    pub solint: SolutionInterval,
    pub ref_ant: String,
    pub combine: Vec<CombineAxis>,
    pub solnorm: bool,
    pub min_snr: f64,
    pub upstream: Vec<PathBuf>,
}

/// Bootstrap the amplitude scale of `transfer` fields from the `reference`
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFlux {
    pub vis: PathBuf,
    pub gain_table: PathBuf,
    pub flux_table: PathBuf,
    pub reference: FieldSet,
    pub transfer: FieldSet,
}

/// Which fields' solutions are used from each table, in table order:
/// (gain, bandpass, delay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainFieldMapping {
    pub gain: String,
    pub bandpass: String,
    pub delay: String,
}

/// Apply calibration tables to a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplySolutions {
    pub vis: PathBuf,
    pub field: String,
    /// Tables in (gain or flux, bandpass, delay) order.
    pub tables: Vec<PathBuf>,
    pub gain_fields: GainFieldMapping,
    /// One interpolation per table.
    pub interp: Vec<Interpolation>,
    pub calwt: bool,
    pub apply_mode: ApplyMode,
}

/// Flag visibilities according to a single rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagData {
    pub vis: PathBuf,
    pub rule: FlagRule,
}

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum EngineRequest {
    #[strum(serialize = "clearcal")]
    ClearCal(ClearCal),

    #[strum(serialize = "fixvis")]
    FixVis(FixVis),

    #[strum(serialize = "setjy")]
    SetFluxModel(SetFluxModel),

    #[strum(serialize = "gaincal")]
    SolveDelay(GainSolve),

    #[strum(serialize = "gaincal")]
    SolveGain(GainSolve),

    #[strum(serialize = "bandpass")]
    SolveBandpass(BandpassSolve),

    #[strum(serialize = "fluxscale")]
    ScaleFlux(ScaleFlux),

    #[strum(serialize = "applycal")]
    Apply(ApplySolutions),

    #[strum(serialize = "flagdata")]
    FlagData(FlagData),
}

impl EngineRequest {
    /// The name of the engine task that services this request.
    pub fn task(&self) -> &'static str {
        self.into()
    }
}

/// A string rendered as a single-quoted Python literal.
pub(crate) struct PyStr<'a>(pub(crate) &'a str);

impl Display for PyStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("'")?;
        for c in self.0.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '\'' => f.write_str("\\'")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("'")
    }
}

fn py_path(p: &Path) -> String {
    PyStr(&p.display().to_string()).to_string()
}

fn py_list<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    format!("[{}]", items.into_iter().join(", "))
}

fn py_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

/// Rust's `Debug` formatting of floats always includes a decimal point, which
/// is what Python wants.
fn py_float(x: f64) -> String {
    format!("{x:?}")
}

impl Display for EngineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.task();
        match self {
            EngineRequest::ClearCal(ClearCal { vis }) => {
                write!(f, "{task}(vis={})", py_path(vis))
            }

            EngineRequest::FixVis(FixVis { vis, output_vis }) => write!(
                f,
                "{task}(vis={}, outputvis={})",
                py_path(vis),
                py_path(output_vis)
            ),

            EngineRequest::SetFluxModel(SetFluxModel {
                vis,
                fields,
                standard,
            }) => {
                write!(
                    f,
                    "{task}(vis={}, field={}, scalebychan=True, ",
                    py_path(vis),
                    PyStr(&fields.join())
                )?;
                match standard {
                    FluxStandard::Stokes(stokes) => write!(
                        f,
                        "standard='manual', fluxdensity={})",
                        py_list(stokes.iter().map(|s| py_float(*s)))
                    ),
                    FluxStandard::Named(name) => {
                        write!(f, "standard={}, fluxdensity=-1)", PyStr(name))
                    }
                }
            }

            EngineRequest::SolveDelay(solve) | EngineRequest::SolveGain(solve) => {
                let GainSolve {
                    vis,
                    table,
                    fields,
                    gain_type,
                    cal_mode,
                    solint,
                    ref_ant,
                    spw,
                    combine,
                    solnorm,
                    min_snr,
                    append,
                    upstream,
                } = solve;
                write!(
                    f,
                    "{task}(vis={}, caltable={}, field={}, gaintype='{gain_type}', ",
                    py_path(vis),
                    py_path(table),
                    PyStr(&fields.join()),
                )?;
                if let Some(cal_mode) = cal_mode {
                    write!(f, "calmode='{cal_mode}', ")?;
                }
                write!(f, "solint='{solint}', refant={}, ", PyStr(ref_ant))?;
                if let Some(spw) = spw {
                    write!(f, "spw={}, ", PyStr(spw))?;
                }
                write!(
                    f,
                    "combine={}, solnorm={}, minsnr={}, ",
                    PyStr(&combine.iter().join(",")),
                    py_bool(*solnorm),
                    py_float(*min_snr)
                )?;
                if *append {
                    write!(f, "append=True, ")?;
                }
                write!(
                    f,
                    "gaintable={})",
                    py_list(upstream.iter().map(|p| py_path(p)))
                )
            }

            EngineRequest::SolveBandpass(BandpassSolve {
                vis,
                table,
                fields,
                solint,
                ref_ant,
                combine,
                solnorm,
                min_snr,
                upstream,
            }) => write!(
                f,
                "{task}(vis={}, caltable={}, field={}, bandtype='B', solint='{solint}', refant={}, combine={}, solnorm={}, minsnr={}, gaintable={})",
                py_path(vis),
                py_path(table),
                PyStr(&fields.join()),
                PyStr(ref_ant),
                PyStr(&combine.iter().join(",")),
                py_bool(*solnorm),
                py_float(*min_snr),
                py_list(upstream.iter().map(|p| py_path(p)))
            ),

            EngineRequest::ScaleFlux(ScaleFlux {
                vis,
                gain_table,
                flux_table,
                reference,
                transfer,
            }) => write!(
                f,
                "{task}(vis={}, caltable={}, fluxtable={}, reference={}, transfer={})",
                py_path(vis),
                py_path(gain_table),
                py_path(flux_table),
                PyStr(&reference.join()),
                PyStr(&transfer.join())
            ),

            EngineRequest::Apply(ApplySolutions {
                vis,
                field,
                tables,
                gain_fields,
                interp,
                calwt,
                apply_mode,
            }) => write!(
                f,
                "{task}(vis={}, field={}, gaintable={}, gainfield={}, interp={}, calwt={}, applymode='{apply_mode}')",
                py_path(vis),
                PyStr(field),
                py_list(tables.iter().map(|p| py_path(p))),
                py_list(
                    [&gain_fields.gain, &gain_fields.bandpass, &gain_fields.delay]
                        .into_iter()
                        .map(|g| PyStr(g).to_string())
                ),
                py_list(interp.iter().map(|i| format!("'{i}'"))),
                py_bool(*calwt),
            ),

            EngineRequest::FlagData(FlagData { vis, rule }) => {
                write!(f, "{task}(vis={}, ", py_path(vis))?;
                match rule {
                    FlagRule::Shadow => write!(f, "mode='shadow', ")?,
                    FlagRule::Elevation { lower_limit_deg } => write!(
                        f,
                        "mode='elevation', lowerlimit={}, ",
                        py_float(*lower_limit_deg)
                    )?,
                    FlagRule::Clip { min, max } => write!(
                        f,
                        "mode='clip', clipminmax={}, ",
                        py_list([py_float(*min), py_float(*max)])
                    )?,
                    FlagRule::ClipZeros => write!(f, "mode='clip', field='', clipzeros=True, ")?,
                    FlagRule::Manual { spw, .. } => write!(f, "mode='manual', spw={}, ", PyStr(spw))?,
                }
                write!(f, "flagbackup=False)")
            }
        }
    }
}
