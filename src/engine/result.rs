// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The outputs of a sweep.

use std::fmt;

use crate::{
    c64,
    calibration::CorrectionPath,
    constants::{REACTANCE_THRESHOLD, TAU, Z0},
    math::{magnitude_db, phase_degrees, swr},
};

use super::SweepMode;

/// Everything computed for a single pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResult {
    /// The frequency of this pixel \[Hz\].
    pub freq_hz: u64,

    /// The (normalised) voltage measured by the bridge.
    pub raw: c64,

    /// The reflection coefficient. This is 0 when nothing was corrected.
    pub reflect: c64,

    /// The impedance \[ohms\]. This is 50 when no impedance was solved for.
    pub impedance: c64,

    /// The magnitude of whatever was displayed \[dB\].
    pub mag_db: f64,

    /// The phase of whatever was displayed \[degrees\].
    pub phase_deg: f64,

    /// Only reflection measurements have an SWR.
    pub swr: Option<f64>,

    /// Only reflection measurements report a reactance.
    pub reactance: Option<Reactance>,
}

impl PixelResult {
    /// A pixel showing an uncorrected voltage.
    pub(super) fn raw(freq_hz: u64, raw: c64) -> PixelResult {
        PixelResult {
            freq_hz,
            raw,
            reflect: c64::new(0.0, 0.0),
            impedance: c64::new(Z0, 0.0),
            mag_db: magnitude_db(raw.norm()),
            phase_deg: phase_degrees(raw),
            swr: None,
            reactance: None,
        }
    }

    /// A pixel of a transmission measurement.
    pub(super) fn transmission(freq_hz: u64, raw: c64, reflect: c64) -> PixelResult {
        PixelResult {
            freq_hz,
            raw,
            reflect,
            impedance: c64::new(Z0, 0.0),
            mag_db: magnitude_db(reflect.norm()),
            phase_deg: phase_degrees(reflect),
            swr: None,
            reactance: None,
        }
    }

    /// A pixel of a reflection measurement.
    pub(super) fn reflection(freq_hz: u64, raw: c64, reflect: c64, impedance: c64) -> PixelResult {
        let magn = reflect.norm();
        PixelResult {
            freq_hz,
            raw,
            reflect,
            impedance,
            mag_db: magnitude_db(magn),
            phase_deg: phase_degrees(reflect),
            swr: Some(swr(magn)),
            reactance: Reactance::from_impedance(impedance, freq_hz),
        }
    }
}

/// The reactive part of an impedance expressed as a component value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reactance {
    /// \[henries\]
    Inductance(f64),

    /// \[farads\]
    Capacitance(f64),
}

impl Reactance {
    /// Small reactances (and anything at 0 Hz) aren't reported.
    pub fn from_impedance(z: c64, freq_hz: u64) -> Option<Reactance> {
        if freq_hz == 0 {
            return None;
        }
        let omega = TAU * freq_hz as f64;
        let x = z.im;
        if x >= REACTANCE_THRESHOLD {
            Some(Reactance::Inductance(x / omega))
        } else if x < -REACTANCE_THRESHOLD {
            Some(Reactance::Capacitance(-1.0 / (omega * x)))
        } else {
            None
        }
    }
}

impl fmt::Display for Reactance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reactance::Inductance(l) => write!(f, "L {:10.0} nH", l * 1e9),
            Reactance::Capacitance(c) => write!(f, "C {:10.3} nF", c * 1e9),
        }
    }
}

/// The results of a whole sweep. These are always produced in full.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementResult {
    pub mode: SweepMode,

    /// The correction applied, if any.
    pub correction: Option<CorrectionPath>,

    /// The number of pixels where the load-assisted solve was attempted but
    /// was singular.
    pub bridge_fallbacks: usize,

    pub pixels: Vec<PixelResult>,
}

impl MeasurementResult {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The values at a pixel, for display. The index is clamped to the sweep.
    pub fn readout(&self, index: usize) -> Option<Readout> {
        let last = self.pixels.len().checked_sub(1)?;
        Some(Readout {
            mode: self.mode,
            calibrated: self.correction.is_some(),
            pixel: self.pixels[index.min(last)],
        })
    }
}

/// A single pixel's values formatted for a status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub mode: SweepMode,
    pub calibrated: bool,
    pub pixel: PixelResult,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.pixel;
        match (self.mode, self.calibrated) {
            (SweepMode::Transmission, true) => {
                write!(f, "Mag {:8.2} dB  Phase {:8.2}", p.mag_db, p.phase_deg)
            }
            (SweepMode::Reflection, true) => {
                let z = p.impedance;
                write!(
                    f,
                    "Mag {:7.2} dB  Phase {:6.1}  SWR {:6.1}  Imped {:8.1} {:8.1} J  Mag {:7.2}  Phase {:6.1}",
                    p.mag_db,
                    p.phase_deg,
                    p.swr.unwrap_or_else(|| swr(p.reflect.norm())),
                    z.re,
                    z.im,
                    z.norm(),
                    phase_degrees(z),
                )?;
                if let Some(r) = p.reactance {
                    write!(f, "  {r}")?;
                }
                Ok(())
            }
            // Nothing is shown for a load reference.
            (SweepMode::CalLoad, _) => Ok(()),
            _ => write!(f, "Mag {:7.2} dB  Phase {:6.1}", p.mag_db, p.phase_deg),
        }
    }
}
