// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters of the analyser that don't change between sweeps.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters here
//! have been validated and are ready to be used directly.

mod error;
mod simulate;
#[cfg(test)]
mod tests;

pub use error::ParamsError;
pub(crate) use simulate::{SimulateError, SimulateParams};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_CORRECT_DELTA, DEFAULT_DATA_WIDTH, DEFAULT_MAX_FREQ, EXTRA_CORRECT_POINTS,
        MAX_POINTS,
    },
    grid::CoarseGrid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnaConfig {
    /// The spacing of the coarse calibration grid \[Hz\].
    pub correct_delta: u64,

    /// The maximum calculation frequency \[Hz\]. Sweeps are not allowed to go
    /// beyond this.
    pub max_freq: u64,

    /// The number of pixels in a measurement sweep.
    pub data_width: usize,
}

impl Default for VnaConfig {
    fn default() -> Self {
        Self {
            correct_delta: DEFAULT_CORRECT_DELTA,
            max_freq: DEFAULT_MAX_FREQ,
            data_width: DEFAULT_DATA_WIDTH,
        }
    }
}

impl VnaConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.correct_delta == 0 {
            return Err(ParamsError::ZeroDelta);
        }
        if self.max_freq < self.correct_delta {
            return Err(ParamsError::MaxFreqBelowDelta {
                max_freq: self.max_freq,
                delta: self.correct_delta,
            });
        }
        if self.data_width < 2 {
            return Err(ParamsError::DataWidthTooSmall {
                got: self.data_width,
            });
        }
        if self.data_width > MAX_POINTS {
            return Err(ParamsError::DataWidthTooLarge {
                got: self.data_width,
                max: MAX_POINTS,
            });
        }
        self.correct_width()?;
        Ok(())
    }

    /// The number of points on the coarse calibration grid. A few extra points
    /// beyond the maximum frequency are included. There can't be more than
    /// [`MAX_POINTS`].
    pub fn correct_width(&self) -> Result<usize, ParamsError> {
        if self.correct_delta == 0 {
            return Err(ParamsError::ZeroDelta);
        }
        usize::try_from(self.max_freq / self.correct_delta)
            .ok()
            .and_then(|w| w.checked_add(EXTRA_CORRECT_POINTS))
            .filter(|&w| w <= MAX_POINTS)
            .ok_or(ParamsError::GridTooLarge {
                max_freq: self.max_freq,
                delta: self.correct_delta,
                max: MAX_POINTS,
            })
    }

    pub fn grid(&self) -> Result<CoarseGrid, ParamsError> {
        self.validate()?;
        CoarseGrid::new(self.correct_delta, self.correct_width()?)
    }

    /// Check a requested sweep range. The start must not be after the stop,
    /// and the stop is clamped to the maximum frequency. The effective range
    /// is returned.
    pub fn check_freq_range(&self, start: u64, stop: u64) -> Result<(u64, u64), ParamsError> {
        if start > stop {
            return Err(ParamsError::StartAfterStop { start, stop });
        }
        let stop = if stop > self.max_freq {
            debug!(
                "Clamping the stop frequency {stop} Hz to the maximum {} Hz",
                self.max_freq
            );
            self.max_freq
        } else {
            stop
        };
        // Clamping the stop may have put it before the start.
        if start > stop {
            return Err(ParamsError::StartAfterStop { start, stop });
        }
        Ok((start, stop))
    }
}
