// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed point values and the x10 wire encoding.
//!
//! Every report field is the physical value multiplied by 10,
//! truncated and saturated into an u16.
//! Signed quantities are shifted by a documented offset first.

use derive_more::{Add, AddAssign, Sub};

/// Offset added to temperatures before encoding, in degrees Celsius.
pub const TEMP_OFFSET: i16 = 100;

/// Offset added to extended range wind directions before encoding, in degrees.
pub const DIR_OFFSET: i16 = 90;

macro_rules! centi {
    ($int:literal) => {
        $crate::fixpt::Centi::from_int($int)
    };
    ($int:literal, $frac:literal) => {
        $crate::fixpt::Centi::from_parts($int, $frac)
    };
}
#[allow(unused_imports)]
pub(crate) use centi;

#[inline(never)]
const fn sat_u16(v: i64) -> u16 {
    if v < 0 {
        0
    } else if v > u16::MAX as i64 {
        u16::MAX
    } else {
        v as u16
    }
}

/// Wind speed in 1/10000 km/h.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Add, AddAssign, Sub)]
pub struct WindSpeed(u32);

impl WindSpeed {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_kmh_e4(v: u32) -> Self {
        Self(v)
    }

    pub const fn to_kmh_e4(self) -> u32 {
        self.0
    }

    /// Speed of `rotations` anemometer rotations within one sample period.
    pub const fn from_rotations(rotations: u32, factor: WindSpeed) -> Self {
        Self(rotations.saturating_mul(factor.0))
    }

    /// km/h x10, truncated.
    pub const fn to_x10(self) -> u16 {
        sat_u16((self.0 / 1000) as i64)
    }
}

/// Signed value in hundredths of the physical unit.
///
/// Used for degrees Celsius, percent relative humidity and hPa.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Add, AddAssign, Sub)]
pub struct Centi(i32);

impl Centi {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_centi(v: i32) -> Self {
        Self(v)
    }

    pub const fn from_int(v: i16) -> Self {
        Self(v as i32 * 100)
    }

    /// Build from an integer part and two decimal digits.
    /// The sign of `int` applies to the fraction, too.
    pub const fn from_parts(int: i16, frac: u8) -> Self {
        let int = int as i32 * 100;
        if int < 0 {
            Self(int - frac as i32)
        } else {
            Self(int + frac as i32)
        }
    }

    /// Convert 1/16 degree probe counts.
    pub const fn from_sixteenths(v: i16) -> Self {
        Self(v as i32 * 100 / 16)
    }

    pub const fn to_centi(self) -> i32 {
        self.0
    }

    /// Value x10, truncated, after adding `offset` whole units.
    #[inline(never)]
    pub const fn to_x10(self, offset: i16) -> u16 {
        sat_u16(((self.0 as i64) + (offset as i64) * 100) / 10)
    }

    /// Inverse of [Self::to_x10].
    pub const fn from_x10(wire: u16, offset: i16) -> Self {
        Self(wire as i32 * 10 - offset as i32 * 100)
    }
}

/// Rain depth x10 in mm of `tips` bucket tips.
#[inline(never)]
pub const fn rain_x10(tips: u32, bucket_size_um: u16) -> u16 {
    sat_u16((tips as i64 * bucket_size_um as i64) / 100)
}

/// Rain rate x10 in mm/h of `tips` bucket tips within `period_secs`.
#[inline(never)]
pub const fn rain_rate_x10(tips: u32, bucket_size_um: u16, period_secs: u32) -> u16 {
    if period_secs == 0 {
        return 0;
    }
    let num = tips as i64 * bucket_size_um as i64 * 3600;
    let den = period_secs as i64 * 100;
    sat_u16(num / den)
}

/// Extended range direction (-90..450 degrees) to the wire.
pub const fn dir_ext_to_wire(dir: i16) -> u16 {
    sat_u16(dir as i64 + DIR_OFFSET as i64)
}

/// Inverse of [dir_ext_to_wire].
pub const fn dir_ext_from_wire(wire: u16) -> i16 {
    wire as i16 - DIR_OFFSET
}


// vim: ts=4 sw=4 expandtab
