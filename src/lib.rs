// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Calibration pipeline orchestration for MeerKAT L-band measurement sets.

The numerical work is done by an external calibration engine (CASA); this
crate decides what is asked of the engine, and in which order, and checks
that every stage leaves its calibration table behind.
 */

pub mod calibrators;
mod cli;
pub mod engine;
pub mod flagging;
mod params;
pub mod pipeline;

#[cfg(test)]
mod tests;

use crossbeam_utils::atomic::AtomicCell;

pub use cli::{Calpipe, CalpipeError};

/// Should progress bars be drawn? Only the binary turns these on.
pub static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
