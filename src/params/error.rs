// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with analyser parameters.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamsError {
    #[error("The calibration grid spacing cannot be 0 Hz")]
    ZeroDelta,

    #[error("The calibration grid must have at least one point")]
    EmptyGrid,

    #[error("The maximum frequency ({max_freq} Hz) must be at least the calibration grid spacing ({delta} Hz)")]
    MaxFreqBelowDelta { max_freq: u64, delta: u64 },

    #[error("A sweep needs at least 2 pixels, but {got} were requested")]
    DataWidthTooSmall { got: usize },

    #[error("A maximum frequency of {max_freq} Hz with a calibration grid spacing of {delta} Hz needs more than {max} calibration points")]
    GridTooLarge { max_freq: u64, delta: u64, max: usize },

    #[error("A sweep can have at most {max} pixels, but {got} were requested")]
    DataWidthTooLarge { got: usize, max: usize },

    #[error("The sweep start frequency ({start} Hz) is after the stop frequency ({stop} Hz)")]
    StartAfterStop { start: u64, stop: u64 },
}
