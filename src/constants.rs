// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Frequencies are integer Hertz.
 */

pub use std::f64::consts::{PI, TAU};

/// The reference impedance of the bridge \[ohms\].
pub const Z0: f64 = 50.0;

/// The impedance reported when the reflection equations have no solution,
/// i.e. the DUT looks like an open circuit \[ohms\].
pub const OPEN_IMPEDANCE: f64 = 50e3;

/// Magnitudes below this value are reported as [`DB_FLOOR`] rather than
/// taking the logarithm.
pub const MAG_FLOOR: f64 = 1e-6;

/// The smallest magnitude that can be reported \[dB\].
pub const DB_FLOOR: f64 = -120.0;

/// The smallest SWR value that is considered sane.
pub const SWR_MIN: f64 = 0.999;

/// The largest SWR value that can be reported. Any insane SWR value is
/// reported as exactly this.
pub const SWR_MAX: f64 = 99.0;

/// Reactances with magnitudes smaller than this aren't reported as an
/// inductance or capacitance \[ohms\].
pub const REACTANCE_THRESHOLD: f64 = 0.5;

/// Raw ADC samples are divided by this to normalise them.
pub const ADC_FULL_SCALE: f64 = 2147483647.0;

/// The default spacing of the coarse calibration grid \[Hz\].
pub const DEFAULT_CORRECT_DELTA: u64 = 15_000;

/// The default maximum calculation frequency \[Hz\].
pub const DEFAULT_MAX_FREQ: u64 = 60_000_000;

/// The default number of pixels in a measurement sweep.
pub const DEFAULT_DATA_WIDTH: usize = 500;

/// The number of coarse calibration points beyond the maximum frequency.
pub const EXTRA_CORRECT_POINTS: usize = 4;

/// The most points allowed on the calibration grid or in a sweep.
pub const MAX_POINTS: usize = 4_000_000;
