// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with capturing calibrations.

use thiserror::Error;

use super::CalKind;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("Expected {expected} voltages for the {kind} calibration (one per calibration grid point), but got {got}")]
    WrongLength {
        kind: CalKind,
        expected: usize,
        got: usize,
    },
}
