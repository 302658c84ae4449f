// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A measurement session: the calibration, the current sweep range and mode,
//! and the latest results.
//!
//! All mutation goes through `&mut self`, so captures, range changes and sweep
//! computations can't interleave. Correction coefficients are rebuilt in full
//! before the next sweep whenever the calibration or range has changed.


use log::{debug, info, warn};

use crate::{
    c64,
    calibration::{CalKind, CalStatus, CalibrationError, CalibrationSet, CorrectionCoefficients},
    engine::{compute_sweep, trace_bridge_params, MeasurementResult, Readout, SweepError, SweepMode},
    grid::{CoarseGrid, FrequencySweep},
    params::{ParamsError, VnaConfig},
};

/// The sweep range used before any is requested \[Hz\].
const INITIAL_FREQ_RANGE: (u64, u64) = (1_000_000, 2_000_000);

#[derive(Debug, Clone)]
pub struct VnaSession {
    config: VnaConfig,
    grid: CoarseGrid,
    sweep: FrequencySweep,
    mode: SweepMode,
    cal: CalibrationSet,

    /// `None` either if they need rebuilding or if there's nothing to build
    /// them from; `coeffs_stale` tells which.
    coeffs: Option<CorrectionCoefficients>,
    coeffs_stale: bool,

    results: Option<MeasurementResult>,
}

impl VnaSession {
    pub fn new(config: VnaConfig) -> Result<VnaSession, ParamsError> {
        let grid = config.grid()?;
        let (start, stop) = config.check_freq_range(INITIAL_FREQ_RANGE.0, INITIAL_FREQ_RANGE.1)?;
        let sweep = FrequencySweep::new(start, stop, config.data_width)?;
        debug!(
            "New session: {} calibration points every {} Hz, {} pixels per sweep",
            grid.width(),
            grid.delta(),
            sweep.data_width()
        );
        Ok(VnaSession {
            config,
            grid,
            sweep,
            mode: SweepMode::Reflection,
            cal: CalibrationSet::new(),
            coeffs: None,
            coeffs_stale: true,
            results: None,
        })
    }

    pub fn config(&self) -> &VnaConfig {
        &self.config
    }

    pub fn grid(&self) -> &CoarseGrid {
        &self.grid
    }

    pub fn sweep(&self) -> &FrequencySweep {
        &self.sweep
    }

    pub fn mode(&self) -> SweepMode {
        self.mode
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.cal
    }

    pub fn status(&self) -> CalStatus {
        self.cal.status()
    }

    /// The results of the last accepted sweep.
    pub fn results(&self) -> Option<&MeasurementResult> {
        self.results.as_ref()
    }

    /// The number of samples the next sweep must have.
    pub fn expected_sweep_len(&self) -> usize {
        self.mode.expected_len(&self.grid, &self.sweep)
    }

    /// Select what the following sweeps are for. Previous results are kept.
    pub fn set_mode(&mut self, mode: SweepMode) {
        if mode != self.mode {
            debug!("Mode {} -> {mode}", self.mode);
        }
        if !self.supports(mode) {
            debug!("{mode} without its preferred calibration; results will be degraded");
        }
        self.mode = mode;
    }

    /// Does the calibration fully support a mode? Transmission needs the short
    /// and reflection needs the open or short. Unsupported modes can still be
    /// used, but fall back to a cruder correction (or none at all).
    pub fn supports(&self, mode: SweepMode) -> bool {
        match mode {
            SweepMode::CalOpen | SweepMode::CalShort | SweepMode::CalLoad => true,
            SweepMode::Transmission => self.cal.has(CalKind::Short),
            SweepMode::Reflection => self.cal.has(CalKind::Short) || self.cal.has(CalKind::Open),
        }
    }

    /// Change the sweep range. The stop frequency is clamped to the maximum
    /// frequency; the range actually used is returned. If the range changes,
    /// previous results are discarded.
    pub fn set_freq_range(&mut self, start: u64, stop: u64) -> Result<(u64, u64), ParamsError> {
        let (start, stop) = self.config.check_freq_range(start, stop)?;
        if (start, stop) != (self.sweep.start(), self.sweep.stop()) {
            debug!("New sweep range: {start} Hz to {stop} Hz");
            self.sweep = FrequencySweep::new(start, stop, self.config.data_width)?;
            self.results = None;
            self.invalidate();
        }
        Ok((start, stop))
    }

    /// Store a reference calibration captured elsewhere.
    pub fn capture(&mut self, kind: CalKind, volts: &[c64]) -> Result<(), CalibrationError> {
        self.cal.capture(kind, volts, &self.grid)?;
        self.invalidate();
        info!("{}", self.cal.status());
        Ok(())
    }

    /// Forget all calibrations, along with any results made with them.
    pub fn remove_calibration(&mut self) {
        self.cal.remove_all();
        self.results = None;
        self.invalidate();
        info!("{}", self.cal.status());
    }

    fn invalidate(&mut self) {
        self.coeffs = None;
        self.coeffs_stale = true;
    }

    /// The correction coefficients for the current sweep, rebuilding them if
    /// anything has changed.
    pub fn coefficients(&mut self) -> Option<&CorrectionCoefficients> {
        if self.coeffs_stale {
            self.coeffs = self.cal.derive_coefficients(&self.grid, &self.sweep);
            self.coeffs_stale = false;
            if let Some((open, short, load)) = self.cal.all() {
                trace_bridge_params(&self.grid, open, short, load);
            }
        }
        self.coeffs.as_ref()
    }

    /// Process a complete sweep in the current mode. In a calibration mode the
    /// sweep is also stored as that reference.
    ///
    /// A sweep of the wrong length is dropped; the previous results and the
    /// calibration are left untouched.
    pub fn process_sweep(&mut self, volts: &[c64]) -> Result<&MeasurementResult, SweepError> {
        let mode = self.mode;
        if let Some(kind) = mode.cal_kind() {
            let expected = self.grid.width();
            if volts.len() != expected {
                debug!("Bad data array: got {} samples, expected {expected}", volts.len());
                return Err(SweepError::Malformed {
                    mode,
                    expected,
                    got: volts.len(),
                });
            }
            self.capture(kind, volts)?;
        }

        // Make sure the coefficients are current.
        self.coefficients();
        let result = compute_sweep(
            mode,
            volts,
            &self.grid,
            &self.sweep,
            &self.cal,
            self.coeffs.as_ref(),
        )
        .map_err(|e| {
            debug!("{e}");
            e
        })?;
        if result.bridge_fallbacks == result.len() && !result.is_empty() {
            warn!("The load calibration couldn't be used at any frequency; is the load connected?");
        }
        Ok(self.results.insert(result))
    }

    /// The readout at the pixel closest to `freq` in the last results.
    pub fn readout_at(&self, freq: u64) -> Option<Readout> {
        let results = self.results.as_ref()?;
        let index = if results.mode.is_cal() {
            // Calibration results are laid out over the coarse grid.
            let last = results.len().checked_sub(1)?;
            results
                .pixels
                .iter()
                .position(|p| p.freq_hz >= freq)
                .unwrap_or(last)
        } else {
            self.sweep.index_of(freq)
        };
        results.readout(index)
    }
}
