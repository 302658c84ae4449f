// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turn raw bridge voltages into calibrated results.
//!
//! Relations used for reflection measurements:
//!
//! ```text
//! Z = 50 * (V8 - v) / (V8 + v)
//! v = V8 * (50 - Z) / (50 + Z)
//! SWR = (1 + rho) / (1 - rho)
//! ```

mod bridge;
mod result;

pub use bridge::BridgeSolve;
pub(crate) use bridge::trace_bridge_params;
pub use result::{MeasurementResult, PixelResult, Reactance, Readout};

use log::{debug, trace};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    c64,
    calibration::{
        CalKind, CalibrationError, CalibrationSet, CorrectionCoefficients, CorrectionPath,
    },
    constants::{OPEN_IMPEDANCE, Z0},
    grid::{CoarseGrid, FrequencySweep},
    math::checked_div,
};

/// What a sweep is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum SweepMode {
    /// Capture the open reference.
    #[strum(serialize = "cal-open")]
    CalOpen,

    /// Capture the short reference.
    #[strum(serialize = "cal-short")]
    CalShort,

    /// Capture the load reference.
    #[strum(serialize = "cal-load")]
    CalLoad,

    /// Measure transmission through the DUT.
    #[strum(serialize = "trans")]
    Transmission,

    /// Measure the DUT's reflection and impedance.
    #[strum(serialize = "refl")]
    Reflection,
}

impl SweepMode {
    /// The reference captured by this mode, if it's a calibration mode.
    pub fn cal_kind(self) -> Option<CalKind> {
        match self {
            SweepMode::CalOpen => Some(CalKind::Open),
            SweepMode::CalShort => Some(CalKind::Short),
            SweepMode::CalLoad => Some(CalKind::Load),
            SweepMode::Transmission | SweepMode::Reflection => None,
        }
    }

    pub fn is_cal(self) -> bool {
        self.cal_kind().is_some()
    }

    /// The number of samples a sweep in this mode must have. Calibration sweeps
    /// cover the coarse grid; everything else covers the measurement sweep.
    pub fn expected_len(self, grid: &CoarseGrid, sweep: &FrequencySweep) -> usize {
        if self.is_cal() {
            grid.width()
        } else {
            sweep.data_width()
        }
    }
}

impl From<CalKind> for SweepMode {
    fn from(kind: CalKind) -> SweepMode {
        match kind {
            CalKind::Open => SweepMode::CalOpen,
            CalKind::Short => SweepMode::CalShort,
            CalKind::Load => SweepMode::CalLoad,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SweepError {
    #[error("A {mode} sweep needs {expected} samples, but got {got}; discarding it")]
    Malformed {
        mode: SweepMode,
        expected: usize,
        got: usize,
    },

    #[error("Correction coefficients were derived for {got} pixels, but the sweep has {expected}")]
    StaleCoefficients { expected: usize, got: usize },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// Compute the results of a complete sweep.
///
/// `volts` must have one sample per coarse grid point for calibration modes,
/// and one per pixel of `sweep` otherwise; anything else is rejected without
/// producing any results. Calibration modes only render the raw voltages here;
/// storing the reference is up to the caller.
///
/// `coeffs` must have been derived from `cal` for `sweep`. Without them, the
/// raw voltages are shown.
pub fn compute_sweep(
    mode: SweepMode,
    volts: &[c64],
    grid: &CoarseGrid,
    sweep: &FrequencySweep,
    cal: &CalibrationSet,
    coeffs: Option<&CorrectionCoefficients>,
) -> Result<MeasurementResult, SweepError> {
    let expected = mode.expected_len(grid, sweep);
    if volts.len() != expected {
        return Err(SweepError::Malformed {
            mode,
            expected,
            got: volts.len(),
        });
    }
    if let Some(c) = coeffs {
        if c.len() != sweep.data_width() {
            return Err(SweepError::StaleCoefficients {
                expected: sweep.data_width(),
                got: c.len(),
            });
        }
    }

    let data_width = sweep.data_width();
    let mut bridge_fallbacks = 0;
    let (correction, pixels): (Option<CorrectionPath>, Vec<PixelResult>) = match (mode, coeffs) {
        // Show the captured coarse data stretched over the display.
        (SweepMode::CalOpen | SweepMode::CalShort | SweepMode::CalLoad, _) => {
            let pixels = (0..data_width)
                .map(|x| {
                    let i = x * grid.width() / data_width;
                    PixelResult::raw(grid.freq(i), volts[i])
                })
                .collect();
            (None, pixels)
        }

        (SweepMode::Transmission | SweepMode::Reflection, None) => {
            debug!("No open or short calibration; showing raw {mode} voltages");
            let pixels = sweep
                .freqs()
                .iter()
                .zip(volts)
                .map(|(&f, &v)| PixelResult::raw(f, v))
                .collect();
            (None, pixels)
        }

        (SweepMode::Transmission, Some(c)) => {
            let pixels = sweep
                .freqs()
                .iter()
                .zip(volts)
                .enumerate()
                .map(|(x, (&f, &v))| {
                    // A zero short leaves nothing to normalise against.
                    let reflect = checked_div(v - c.open[x], c.short[x]).unwrap_or_default();
                    PixelResult::transmission(f, v, reflect)
                })
                .collect();
            (Some(c.path), pixels)
        }

        (SweepMode::Reflection, Some(c)) => {
            let refs = cal.all();
            if refs.is_none() {
                debug!("Reflection with the {} correction", c.path);
            }
            let pixels = sweep
                .freqs()
                .iter()
                .zip(volts)
                .enumerate()
                .map(|(x, (&f, &vx))| {
                    let solved = refs.and_then(|(open, short, load)| {
                        let pos = grid.position(f);
                        let solved = BridgeSolve::new(
                            short.at(grid, pos),
                            open.at(grid, pos),
                            load.at(grid, pos),
                        )
                        .and_then(|b| b.solve(vx));
                        if solved.is_none() {
                            bridge_fallbacks += 1;
                        }
                        solved
                    });
                    let (reflect, z) = solved.unwrap_or_else(|| v8_ratio(c.v8[x], vx));
                    PixelResult::reflection(f, vx, reflect, z)
                })
                .collect();
            (Some(c.path), pixels)
        }
    };

    if bridge_fallbacks > 0 {
        debug!(
            "The load-assisted solve was singular for {bridge_fallbacks}/{data_width} pixels; used the {} correction there",
            coeffs.map(|c| c.path.to_string()).unwrap_or_default()
        );
    }
    trace!("Computed a {mode} sweep of {} pixels", pixels.len());

    Ok(MeasurementResult {
        mode,
        correction,
        bridge_fallbacks,
        pixels,
    })
}

/// The reflection coefficient and impedance from the `v8` coefficient alone.
///
/// If `v8` is zero, the open and short references were identical and nothing
/// can be said; the DUT is reported as totally reflective. If the impedance
/// equation is singular, the DUT is reported as an open.
pub(crate) fn v8_ratio(v8: c64, vx: c64) -> (c64, c64) {
    let reflect = checked_div(vx, v8).unwrap_or(c64::new(1.0, 0.0));
    let z = checked_div(Z0 * (v8 - vx), v8 + vx).unwrap_or(c64::new(OPEN_IMPEDANCE, 0.0));
    (reflect, z)
}
