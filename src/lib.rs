// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Calibration and reflection computation for reflection-bridge vector network
analysers.

Raw complex bridge voltages captured over a swept frequency range are turned
into calibrated magnitude, phase, impedance, SWR and reactance, using up to
three reference calibrations (open, short and load).
 */

pub mod acquisition;
pub mod calibration;
mod cli;
pub mod constants;
pub mod engine;
pub mod grid;
pub(crate) mod math;
pub mod params;
pub mod session;
pub mod simulate;

// Re-exports.
pub use acquisition::{consume, FeedStats, SweepFramer};
pub use calibration::{
    CalKind, CalStatus, CalibrationError, CalibrationReference, CalibrationSet,
    CorrectionCoefficients, CorrectionPath,
};
pub use cli::{Vnacal, VnaError};
pub use engine::{
    compute_sweep, MeasurementResult, PixelResult, Reactance, Readout, SweepError, SweepMode,
};
pub use grid::{CoarseGrid, FrequencySweep, GridPosition};
pub use params::{ParamsError, VnaConfig};
pub use session::VnaSession;

/// Double-precision complex numbers are used for all voltages, reflection
/// coefficients and impedances.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;
