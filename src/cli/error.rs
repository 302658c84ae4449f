// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all vnacal-related errors. This should be the *only* error
//! enum that is publicly visible from the binary.

use thiserror::Error;

use super::simulate::SimulateArgsError;
use crate::params::{ParamsError, SimulateError};

/// The *only* publicly visible error from the `vnacal` binary.
#[derive(Error, Debug)]
pub enum VnaError {
    /// An error related to the `simulate` subcommand.
    #[error("{0}")]
    Simulate(String),

    /// An error with the analyser's parameters or the sweep range.
    #[error("{0}\n\nCheck the --correct-delta, --max-freq, --data-width and --freq-range arguments")]
    Params(String),

    /// A sweep couldn't be used.
    #[error("{0}")]
    Sweep(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SimulateArgsError> for VnaError {
    fn from(e: SimulateArgsError) -> Self {
        Self::Simulate(e.to_string())
    }
}

impl From<SimulateError> for VnaError {
    fn from(e: SimulateError) -> Self {
        let s = e.to_string();
        match e {
            SimulateError::NoSweeps { .. } => Self::Sweep(s),
            SimulateError::ProducerPanicked => Self::Generic(s),
            SimulateError::Params(e) => Self::from(e),
        }
    }
}

impl From<ParamsError> for VnaError {
    fn from(e: ParamsError) -> Self {
        Self::Params(e.to_string())
    }
}

impl From<toml::ser::Error> for VnaError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(format!("Couldn't serialise the arguments to toml: {e}"))
    }
}

impl From<std::io::Error> for VnaError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
