// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pre-calibration flagging rules for MeerKAT L-band data.
//!
//! Flagging is declarative: a table of rules is built from the user's choices
//! and each rule is handed to the calibration engine independently.


use itertools::Itertools;
use log::info;

use crate::{
    calibrators::MeasurementSet,
    engine::{CalibrationEngine, EngineRequest, FlagData},
    pipeline::{CommandDispatcher, PipelineError},
};

/// Visibilities below this elevation are flagged \[degrees\].
pub const ELEVATION_LIMIT_DEG: f64 = 15.0;

/// Visibility amplitudes outside of this range are clipped.
pub const CLIP_RANGE: (f64, f64) = (1e-5, 1000.0);

#[derive(Debug, Clone, PartialEq)]
pub enum FlagRule {
    /// Flag antennas shadowed by other antennas.
    Shadow,

    Elevation { lower_limit_deg: f64 },

    Clip { min: f64, max: f64 },

    /// Flag zero-valued visibilities.
    ClipZeros,

    /// Flag frequency ranges in every spectral window.
    Manual { label: &'static str, spw: String },
}

/// A named set of frequency ranges \[MHz\]. A range with no upper edge flags a
/// single frequency.
#[derive(Debug, Clone, Copy)]
pub struct RfiBand {
    pub label: &'static str,
    pub ranges_mhz: &'static [(f64, Option<f64>)],
}

impl RfiBand {
    /// The spectral-window selection for this band, e.g.
    /// `*:1565MHZ~1585MHZ;1217MHZ~1237MHZ`.
    pub fn spw(&self) -> String {
        let ranges = self
            .ranges_mhz
            .iter()
            .map(|(lo, hi)| match hi {
                Some(hi) => format!("{lo}MHZ~{hi}MHZ"),
                None => format!("{lo}MHZ"),
            })
            .join(";");
        format!("*:{ranges}")
    }

    fn rule(&self) -> FlagRule {
        FlagRule::Manual {
            label: self.label,
            spw: self.spw(),
        }
    }
}

pub const BAND_EDGES: RfiBand = RfiBand {
    label: "L-band edges",
    ranges_mhz: &[(856.0, Some(880.0)), (1658.0, Some(1800.0))],
};

/// Galactic HI emission.
pub const MILKY_WAY: RfiBand = RfiBand {
    label: "Milky Way",
    ranges_mhz: &[(1420.0, Some(1421.3))],
};

pub const AVIATION: RfiBand = RfiBand {
    label: "aviation",
    ranges_mhz: &[(1080.0, Some(1095.0))],
};

pub const GSM: RfiBand = RfiBand {
    label: "GSM",
    ranges_mhz: &[(900.0, Some(915.0)), (925.0, Some(960.0))],
};

pub const ALKANTPAN: RfiBand = RfiBand {
    label: "Alkantpan",
    ranges_mhz: &[(1600.0, None)],
};

pub const GPS: RfiBand = RfiBand {
    label: "GPS",
    ranges_mhz: &[
        (1565.0, Some(1585.0)),
        (1217.0, Some(1237.0)),
        (1375.0, Some(1387.0)),
        (1166.0, Some(1186.0)),
    ],
};

pub const GLONASS: RfiBand = RfiBand {
    label: "GLONASS",
    ranges_mhz: &[(1592.0, Some(1610.0)), (1242.0, Some(1249.0))],
};

pub const GALILEO: RfiBand = RfiBand {
    label: "Galileo",
    ranges_mhz: &[(1191.0, Some(1217.0)), (1260.0, Some(1300.0))],
};

pub const AFRISTAR: RfiBand = RfiBand {
    label: "Afristar",
    ranges_mhz: &[(1453.0, Some(1490.0))],
};

pub const IRIDIUM: RfiBand = RfiBand {
    label: "Iridium",
    ranges_mhz: &[(1616.0, Some(1626.0))],
};

pub const INMARSAT: RfiBand = RfiBand {
    label: "Inmarsat",
    ranges_mhz: &[(1526.0, Some(1554.0))],
};

/// Which optional flagging rules to use. Shadowing, elevation and clipping
/// rules are always used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagSelection {
    pub zeros: bool,
    pub band_edges: bool,
    pub milky_way: bool,
    /// Known environmental RFI (aviation, GSM and Alkantpan).
    pub lband_env: bool,
    pub gps: bool,
    pub glonass: bool,
    pub galileo: bool,
    pub afristar: bool,
    pub iridium: bool,
    pub inmarsat: bool,
}

impl FlagSelection {
    /// Build the rule table, in the order the rules should be applied.
    pub fn rules(&self) -> Vec<FlagRule> {
        let mut rules = vec![
            FlagRule::Shadow,
            FlagRule::Elevation {
                lower_limit_deg: ELEVATION_LIMIT_DEG,
            },
            FlagRule::Clip {
                min: CLIP_RANGE.0,
                max: CLIP_RANGE.1,
            },
        ];
        if self.zeros {
            rules.push(FlagRule::ClipZeros);
        }

        let bands: [(bool, &[RfiBand]); 9] = [
            (self.band_edges, &[BAND_EDGES]),
            (self.milky_way, &[MILKY_WAY]),
            (self.lband_env, &[AVIATION, GSM, ALKANTPAN]),
            (self.gps, &[GPS]),
            (self.glonass, &[GLONASS]),
            (self.galileo, &[GALILEO]),
            (self.afristar, &[AFRISTAR]),
            (self.iridium, &[IRIDIUM]),
            (self.inmarsat, &[INMARSAT]),
        ];
        rules.extend(
            bands
                .into_iter()
                .filter(|(selected, _)| *selected)
                .flat_map(|(_, bands)| bands.iter().map(RfiBand::rule)),
        );
        rules
    }
}

impl FlagRule {
    pub fn description(&self) -> String {
        match self {
            FlagRule::Shadow => "shadowed antennas".to_string(),
            FlagRule::Elevation { lower_limit_deg } => {
                format!("elevations below {lower_limit_deg}°")
            }
            FlagRule::Clip { min, max } => format!("amplitudes outside [{min}, {max}]"),
            FlagRule::ClipZeros => "zero-valued data".to_string(),
            FlagRule::Manual { label, spw } => format!("{label} ({spw})"),
        }
    }
}

/// Apply each flagging rule to the measurement set, in order.
pub fn flag<E: CalibrationEngine + ?Sized>(
    dispatcher: &CommandDispatcher<E>,
    ms: &MeasurementSet,
    rules: &[FlagRule],
) -> Result<(), PipelineError> {
    for rule in rules {
        dispatcher.checkpoint("flagging")?;
        info!("Flagging {}", rule.description());
        dispatcher.dispatch(
            &EngineRequest::FlagData(FlagData {
                vis: ms.path().to_path_buf(),
                rule: rule.clone(),
            }),
            None,
        )?;
    }
    Ok(())
}
