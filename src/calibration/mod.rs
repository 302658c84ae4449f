// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reference calibrations and the correction coefficients derived from them.
//!
//! Up to three references can be captured on the coarse grid: an open, a
//! short and a load. Which correction is possible depends on which of these
//! are available; see [`CorrectionPath`].

mod error;

pub use error::CalibrationError;

use std::fmt;

use log::debug;
use ndarray::Array1;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use crate::{
    c64,
    grid::{CoarseGrid, FrequencySweep, GridPosition},
};

/// The kinds of reference calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum CalKind {
    #[strum(serialize = "open")]
    Open,

    #[strum(serialize = "short")]
    Short,

    #[strum(serialize = "load")]
    Load,
}

/// A single reference measurement: one voltage per coarse grid point. These
/// are never modified after capture; recapturing replaces the whole thing.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReference {
    kind: CalKind,
    voltages: Vec1<c64>,
}

impl CalibrationReference {
    /// Any complex values are accepted; only the length is checked against the
    /// grid.
    pub fn new(
        kind: CalKind,
        voltages: &[c64],
        grid: &CoarseGrid,
    ) -> Result<CalibrationReference, CalibrationError> {
        let wrong_length = || CalibrationError::WrongLength {
            kind,
            expected: grid.width(),
            got: voltages.len(),
        };
        if voltages.len() != grid.width() {
            return Err(wrong_length());
        }
        let voltages = Vec1::try_from_vec(voltages.to_vec()).map_err(|_| wrong_length())?;
        Ok(CalibrationReference { kind, voltages })
    }

    pub fn kind(&self) -> CalKind {
        self.kind
    }

    pub fn voltages(&self) -> &[c64] {
        self.voltages.as_slice()
    }

    /// The reference voltage interpolated to a grid position.
    pub fn at(&self, grid: &CoarseGrid, pos: GridPosition) -> c64 {
        grid.interpolate(self.voltages(), pos)
    }
}

/// Which correction the available references allow. Variants are listed in
/// order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CorrectionPath {
    /// Both the short and the open are available.
    #[strum(serialize = "short and open")]
    ShortOpen,

    #[strum(serialize = "short only")]
    ShortOnly,

    #[strum(serialize = "open only")]
    OpenOnly,
}

/// Correction coefficients interpolated onto every pixel of a measurement
/// sweep. These are always rebuilt in full.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionCoefficients {
    pub path: CorrectionPath,

    /// The bridge voltage that corresponds to a reflection coefficient of 1.
    pub v8: Array1<c64>,

    /// The open voltage used by transmission measurements.
    pub open: Array1<c64>,

    /// The short voltage used by transmission measurements.
    pub short: Array1<c64>,
}

impl CorrectionCoefficients {
    /// The number of pixels these coefficients were derived for.
    pub fn len(&self) -> usize {
        self.v8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v8.is_empty()
    }
}

/// At most one reference of each kind. Starts empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationSet {
    open: Option<CalibrationReference>,
    short: Option<CalibrationReference>,
    load: Option<CalibrationReference>,
}

impl CalibrationSet {
    pub fn new() -> CalibrationSet {
        CalibrationSet::default()
    }

    /// Store a reference, replacing any earlier capture of the same kind.
    pub fn capture(
        &mut self,
        kind: CalKind,
        voltages: &[c64],
        grid: &CoarseGrid,
    ) -> Result<(), CalibrationError> {
        let reference = CalibrationReference::new(kind, voltages, grid)?;
        debug!("Captured the {kind} calibration ({} points)", voltages.len());
        *self.slot_mut(kind) = Some(reference);
        Ok(())
    }

    /// Forget every reference.
    pub fn remove_all(&mut self) {
        debug!("Removing all calibrations");
        self.open = None;
        self.short = None;
        self.load = None;
    }

    pub fn get(&self, kind: CalKind) -> Option<&CalibrationReference> {
        match kind {
            CalKind::Open => self.open.as_ref(),
            CalKind::Short => self.short.as_ref(),
            CalKind::Load => self.load.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: CalKind) -> &mut Option<CalibrationReference> {
        match kind {
            CalKind::Open => &mut self.open,
            CalKind::Short => &mut self.short,
            CalKind::Load => &mut self.load,
        }
    }

    pub fn has(&self, kind: CalKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn has_any(&self) -> bool {
        self.open.is_some() || self.short.is_some() || self.load.is_some()
    }

    /// Are all three references available? Only then can the load-assisted
    /// solve be used.
    pub fn has_all(&self) -> bool {
        self.open.is_some() && self.short.is_some() && self.load.is_some()
    }

    /// The open, short and load references, if all three are present.
    pub fn all(
        &self,
    ) -> Option<(
        &CalibrationReference,
        &CalibrationReference,
        &CalibrationReference,
    )> {
        match (&self.open, &self.short, &self.load) {
            (Some(o), Some(s), Some(l)) => Some((o, s, l)),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<CorrectionPath> {
        match (&self.short, &self.open) {
            (Some(_), Some(_)) => Some(CorrectionPath::ShortOpen),
            (Some(_), None) => Some(CorrectionPath::ShortOnly),
            (None, Some(_)) => Some(CorrectionPath::OpenOnly),
            (None, None) => None,
        }
    }

    pub fn status(&self) -> CalStatus {
        CalStatus {
            open: self.has(CalKind::Open),
            short: self.has(CalKind::Short),
            load: self.has(CalKind::Load),
        }
    }

    /// Derive correction coefficients for every pixel of `sweep`. `None` is
    /// returned if neither the open nor the short is available; the load alone
    /// is useless.
    pub fn derive_coefficients(
        &self,
        grid: &CoarseGrid,
        sweep: &FrequencySweep,
    ) -> Option<CorrectionCoefficients> {
        let path = self.path()?;
        let width = grid.width();
        let (v8, open, short): (Vec<c64>, Vec<c64>, Vec<c64>) =
            match (&self.short, &self.open) {
                (Some(s), Some(o)) => (
                    s.voltages()
                        .iter()
                        .zip(o.voltages())
                        .map(|(&s, &o)| (s - o) / 2.0)
                        .collect(),
                    o.voltages().to_vec(),
                    s.voltages().to_vec(),
                ),
                (Some(s), None) => (
                    s.voltages().to_vec(),
                    vec![c64::new(0.0, 0.0); width],
                    s.voltages().to_vec(),
                ),
                (None, Some(o)) => (
                    o.voltages().iter().map(|&o| -o).collect(),
                    o.voltages().to_vec(),
                    vec![c64::new(1.0, 0.0); width],
                ),
                (None, None) => unreachable!("path() checked for a reference"),
            };
        debug!(
            "Deriving correction coefficients ({path}) for {} pixels",
            sweep.data_width()
        );

        let n = sweep.data_width();
        let mut dense_v8 = Vec::with_capacity(n);
        let mut dense_open = Vec::with_capacity(n);
        let mut dense_short = Vec::with_capacity(n);
        for &freq in sweep.freqs() {
            let pos = grid.position(freq);
            dense_v8.push(grid.interpolate(&v8, pos));
            dense_open.push(grid.interpolate(&open, pos));
            dense_short.push(grid.interpolate(&short, pos));
        }

        Some(CorrectionCoefficients {
            path,
            v8: Array1::from_vec(dense_v8),
            open: Array1::from_vec(dense_open),
            short: Array1::from_vec(dense_short),
        })
    }
}

/// Which references are available, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalStatus {
    pub open: bool,
    pub short: bool,
    pub load: bool,
}

impl fmt::Display for CalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !(self.open || self.short || self.load) {
            return write!(f, "Calibration None");
        }
        write!(f, "Calibration ")?;
        if self.open {
            write!(f, "Op")?;
        }
        if self.short {
            write!(f, "Sh")?;
        }
        if self.load {
            write!(f, "Lo")?;
        }
        Ok(())
    }
}
