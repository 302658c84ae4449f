// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthesise the samples a reflection bridge would produce.
//!
//! An ideal bridge with complex gain `g` and a cable delay `t` produces
//!
//! ```text
//! V = g * exp(-j 2 pi f t) * (50 - Z) / (50 + Z)
//! ```
//!
//! for a DUT with impedance `Z`. An open gives `-g`, a short `+g` and a
//! matched load nothing at all (before the phase term).


use serde::{Deserialize, Serialize};

use crate::{
    c64,
    calibration::CalKind,
    constants::{ADC_FULL_SCALE, TAU, Z0},
    grid::{CoarseGrid, FrequencySweep},
};

/// A device under test: a resistor, inductor and capacitor in series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dut {
    /// \[ohms\]
    pub resistance: f64,

    /// \[H\]
    pub inductance: f64,

    /// \[F\]. `None` means there's no capacitor in the circuit (it's shorted
    /// out), not an open.
    pub capacitance: Option<f64>,
}

impl Dut {
    pub fn resistor(resistance: f64) -> Dut {
        Dut {
            resistance,
            inductance: 0.0,
            capacitance: None,
        }
    }

    /// The DUT's impedance at a frequency. `None` means it's an open circuit,
    /// which a series capacitor is at 0 Hz.
    pub fn impedance(&self, freq_hz: u64) -> Option<c64> {
        let w = TAU * freq_hz as f64;
        let xc = match self.capacitance {
            None => 0.0,
            Some(c) if c <= 0.0 || w == 0.0 => return None,
            Some(c) => -1.0 / (w * c),
        };
        Some(c64::new(self.resistance, w * self.inductance + xc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bridge {
    /// The complex gain of the detector.
    pub gain: c64,

    /// The electrical length of the cable to the DUT \[seconds\].
    pub delay_s: f64,
}

impl Default for Bridge {
    fn default() -> Self {
        Self {
            gain: c64::new(0.5, 0.0),
            delay_s: 0.0,
        }
    }
}

impl Bridge {
    fn phase(&self, freq_hz: u64) -> c64 {
        self.gain * c64::from_polar(1.0, -TAU * freq_hz as f64 * self.delay_s)
    }

    /// The detected voltage for a DUT with impedance `z` (`None` is an open).
    pub fn reflection(&self, freq_hz: u64, z: Option<c64>) -> c64 {
        let phase = self.phase(freq_hz);
        match z {
            None => -phase,
            Some(z) => phase * (Z0 - z) / (Z0 + z),
        }
    }

    /// The detected voltage when the DUT sits between the bridge and a
    /// matched detector: the open response plus the short response scaled by
    /// the DUT's transmission.
    pub fn transmission(&self, freq_hz: u64, z: Option<c64>) -> c64 {
        let phase = self.phase(freq_hz);
        let s21 = match z {
            None => c64::new(0.0, 0.0),
            Some(z) => 2.0 * Z0 / (2.0 * Z0 + z),
        };
        -phase + phase * s21
    }

    /// A calibration sweep over the coarse grid. `load_ohms` is the value of
    /// the load standard.
    pub fn cal_sweep(&self, grid: &CoarseGrid, kind: CalKind, load_ohms: f64) -> Vec<c64> {
        let z = match kind {
            CalKind::Open => None,
            CalKind::Short => Some(c64::new(0.0, 0.0)),
            CalKind::Load => Some(c64::new(load_ohms, 0.0)),
        };
        (0..grid.width())
            .map(|i| self.reflection(grid.freq(i), z))
            .collect()
    }

    /// A reflection measurement of `dut` over every pixel of `sweep`.
    pub fn reflection_sweep(&self, sweep: &FrequencySweep, dut: &Dut) -> Vec<c64> {
        sweep
            .freqs()
            .iter()
            .map(|&f| self.reflection(f, dut.impedance(f)))
            .collect()
    }

    /// A transmission measurement of `dut` over every pixel of `sweep`.
    pub fn transmission_sweep(&self, sweep: &FrequencySweep, dut: &Dut) -> Vec<c64> {
        sweep
            .freqs()
            .iter()
            .map(|&f| self.transmission(f, dut.impedance(f)))
            .collect()
    }
}

/// Convert normalised voltages into the sample stream the hardware sends: ADC
/// counts, with a zero marker closing the sweep.
///
/// Counts are rounded and limited to the ADC's range. A sample that rounds to
/// exactly zero is moved to one count, so it can't end the sweep early.
pub fn to_sample_stream(volts: &[c64]) -> Vec<c64> {
    let to_count = |x: f64| (x * ADC_FULL_SCALE).round().clamp(-ADC_FULL_SCALE, ADC_FULL_SCALE);
    let mut stream: Vec<c64> = volts
        .iter()
        .map(|v| {
            let s = c64::new(to_count(v.re), to_count(v.im));
            if s.re == 0.0 && s.im == 0.0 {
                c64::new(1.0, 0.0)
            } else {
                s
            }
        })
        .collect();
    stream.push(c64::new(0.0, 0.0));
    stream
}
