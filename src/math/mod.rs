// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use num_traits::Zero;

use crate::{
    c64,
    constants::{DB_FLOOR, MAG_FLOOR, SWR_MAX, SWR_MIN},
};

/// Inverse tangent. y comes before x, like the C function.
#[inline]
pub(crate) fn atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}

/// Divide two complex numbers. `None` is returned if the denominator is
/// exactly zero, or if the quotient isn't finite (i.e. it has overflowed).
///
/// Every place a reflection coefficient or impedance is solved for goes
/// through here; callers substitute their own fallback on `None`.
#[inline]
pub(crate) fn checked_div(num: c64, den: c64) -> Option<c64> {
    if den.is_zero() {
        return None;
    }
    let q = num / den;
    q.is_finite().then_some(q)
}

/// Linear interpolation between `lo` and `hi`. A `frac` of exactly 0 returns
/// `lo` exactly.
#[inline]
pub(crate) fn lerp(lo: c64, hi: c64, frac: f64) -> c64 {
    lo + (hi - lo) * frac
}

/// Convert a linear magnitude to decibels. Magnitudes below [`MAG_FLOOR`] are
/// reported as [`DB_FLOOR`].
#[inline]
pub(crate) fn magnitude_db(magn: f64) -> f64 {
    if magn < MAG_FLOOR {
        DB_FLOOR
    } else {
        20.0 * magn.log10()
    }
}

/// The standing-wave ratio for a reflection-coefficient magnitude. If the SWR
/// isn't within `[SWR_MIN, SWR_MAX]` it is reported as exactly [`SWR_MAX`]
/// (not clamped to the nearer bound). This also catches a magnitude of 1 or
/// more.
#[inline]
pub(crate) fn swr(magn: f64) -> f64 {
    let swr = (1.0 + magn) / (1.0 - magn);
    if (SWR_MIN..=SWR_MAX).contains(&swr) {
        swr
    } else {
        SWR_MAX
    }
}

/// The phase of a complex number \[degrees\].
#[inline]
pub(crate) fn phase_degrees(z: c64) -> f64 {
    atan2(z.im, z.re).to_degrees()
}
