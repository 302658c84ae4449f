// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frequency axes.
//!
//! Calibrations are captured on a sparse, evenly-spaced "coarse" grid starting
//! at 0 Hz. Measurements are made on a "dense" axis with one frequency per
//! display pixel. Coarse values are linearly interpolated onto the dense axis.


use log::trace;
use vec1::Vec1;

use crate::{c64, math::lerp, params::ParamsError};

/// The coarse calibration grid. Grid point `i` is at `i * delta` Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoarseGrid {
    delta: u64,
    width: usize,
}

/// Where a frequency falls on a [`CoarseGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPosition {
    /// The grid point at or below the frequency, clamped to the last grid
    /// point.
    pub index: usize,

    /// The distance past `index` in units of the grid spacing. This is only
    /// larger than 1 when the frequency is beyond the end of the grid.
    pub frac: f64,
}

impl CoarseGrid {
    pub fn new(delta: u64, width: usize) -> Result<CoarseGrid, ParamsError> {
        if delta == 0 {
            return Err(ParamsError::ZeroDelta);
        }
        if width == 0 {
            return Err(ParamsError::EmptyGrid);
        }
        Ok(CoarseGrid { delta, width })
    }

    /// The spacing between grid points \[Hz\].
    pub fn delta(&self) -> u64 {
        self.delta
    }

    /// The number of grid points.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The frequency of a grid point \[Hz\].
    pub fn freq(&self, index: usize) -> u64 {
        index as u64 * self.delta
    }

    /// Find the bracketing grid point and fractional offset for a frequency.
    /// The index is always floored and clamped, so it is always valid.
    pub fn position(&self, freq: u64) -> GridPosition {
        let index = usize::try_from(freq / self.delta)
            .unwrap_or(usize::MAX)
            .min(self.width - 1);
        let frac = (freq - self.freq(index)) as f64 / self.delta as f64;
        GridPosition { index, frac }
    }

    /// Interpolate coarse `values` (one per grid point) at a position. Beyond
    /// the last value, the last value is used (clamp-to-last), so the result
    /// is flat past the end of the grid.
    pub fn interpolate(&self, values: &[c64], pos: GridPosition) -> c64 {
        let lo = values[pos.index];
        let hi = values.get(pos.index + 1).copied().unwrap_or(lo);
        lerp(lo, hi, pos.frac)
    }

    /// Resample coarse `values` onto every frequency of a dense sweep.
    pub fn resample(&self, values: &[c64], sweep: &FrequencySweep) -> Vec<c64> {
        sweep
            .freqs()
            .iter()
            .map(|&f| self.interpolate(values, self.position(f)))
            .collect()
    }
}

/// The dense frequency axis of a measurement sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySweep {
    start: u64,
    stop: u64,
    freqs: Vec1<u64>,
}

impl FrequencySweep {
    /// Make a sweep of `data_width` pixels from `start` to `stop` Hz
    /// inclusive. Pixel frequencies are rounded to the nearest Hertz.
    pub fn new(start: u64, stop: u64, data_width: usize) -> Result<FrequencySweep, ParamsError> {
        if data_width < 2 {
            return Err(ParamsError::DataWidthTooSmall { got: data_width });
        }
        if start > stop {
            return Err(ParamsError::StartAfterStop { start, stop });
        }

        let span = (stop - start) as f64;
        let last = (data_width - 1) as f64;
        let freqs = (0..data_width)
            .map(|i| (start as f64 + span * i as f64 / last + 0.5).floor() as u64)
            .collect::<Vec<_>>();
        trace!(
            "New sweep: {start} Hz to {stop} Hz over {data_width} pixels ({:.3} Hz per pixel)",
            span / last
        );
        Ok(FrequencySweep {
            start,
            stop,
            // data_width >= 2, so this can't fail.
            freqs: Vec1::try_from_vec(freqs).expect("sweep has at least two pixels"),
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    /// The number of pixels in the sweep.
    pub fn data_width(&self) -> usize {
        self.freqs.len()
    }

    /// The frequency of every pixel \[Hz\].
    pub fn freqs(&self) -> &[u64] {
        self.freqs.as_slice()
    }

    /// The pixel closest to a frequency, clamped to the sweep.
    pub fn index_of(&self, freq: u64) -> usize {
        let last = self.data_width() - 1;
        if self.stop == self.start {
            return 0;
        }
        let offset = freq as f64 - self.start as f64;
        let index = (offset * last as f64 / (self.stop - self.start) as f64 + 0.5).floor();
        if index < 0.0 {
            0
        } else {
            (index as usize).min(last)
        }
    }
}
