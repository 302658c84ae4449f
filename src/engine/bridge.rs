// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The load-assisted solve for the unknown impedance.
//!
//! When the open, short and load references are all available, the bridge's
//! own network parameters can be estimated at each frequency and the DUT's
//! impedance solved for directly. The equations are specific to the bridge
//! topology and were derived empirically for the hardware; they are used as-is.

use log::{log_enabled, trace, Level::Trace};

use crate::{
    c64,
    calibration::CalibrationReference,
    constants::Z0,
    grid::CoarseGrid,
    math::checked_div,
};

/// The bridge parameters at a single frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeSolve {
    /// The short voltage.
    vs: c64,

    /// The source impedance \[ohms\].
    zs: c64,

    /// The detector impedance \[ohms\].
    zd: c64,
}

impl BridgeSolve {
    /// Estimate the bridge parameters from the short (`vs`), open (`vo`) and
    /// load (`vl`) voltages at one frequency. `None` is returned if any of the
    /// equations is singular.
    pub fn new(vs: c64, vo: c64, vl: c64) -> Option<BridgeSolve> {
        let zs = checked_div(25.0 * (vs - vl), vl)?;
        let zd = checked_div(
            50.0 * (-5.0 * vo * zs - 55.0 * vo + 150.0 * vs - 3.0 * vs * zs),
            250.0 * vo + 3.0 * zs * vo - 250.0 * vs + 5.0 * vs * zs,
        )?;
        Some(BridgeSolve { vs, zs, zd })
    }

    pub fn source_impedance(&self) -> c64 {
        self.zs
    }

    pub fn detector_impedance(&self) -> c64 {
        self.zd
    }

    /// The DUT impedance for a measured voltage `vx`.
    pub fn impedance(&self, vx: c64) -> Option<c64> {
        let BridgeSolve { vs, zs, zd } = *self;
        checked_div(
            250.0 * zs * (zd + 30.0) * (vs - vx),
            5.0 * vs * (zd + 30.0) * (zs - 50.0) + vx * (250.0 * (zs + zd + 30.0) + 3.0 * zs * zd),
        )
    }

    /// The reflection coefficient and impedance for a measured voltage `vx`.
    pub fn solve(&self, vx: c64) -> Option<(c64, c64)> {
        let z = self.impedance(vx)?;
        let reflect = checked_div(z - Z0, z + Z0)?;
        Some((reflect, z))
    }
}

/// Log the bridge parameters at a handful of grid points. This is only useful
/// when validating the bridge equations against hardware.
pub(crate) fn trace_bridge_params(
    grid: &CoarseGrid,
    open: &CalibrationReference,
    short: &CalibrationReference,
    load: &CalibrationReference,
) {
    if !log_enabled!(Trace) {
        return;
    }

    for index in (500..3500).step_by(500).filter(|&i| i < grid.width()) {
        let freq_mhz = grid.freq(index) as f64 * 1e-6;
        match BridgeSolve::new(
            short.voltages()[index],
            open.voltages()[index],
            load.voltages()[index],
        ) {
            Some(b) => trace!("{freq_mhz:.3} MHz: Zs = {}, Zd = {}", b.zs, b.zd),
            None => trace!("{freq_mhz:.3} MHz: bridge parameters are singular"),
        }
    }
}
