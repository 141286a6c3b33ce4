// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Free running millisecond time stamp.
///
/// Wraps around after approximately 49 days.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Millis(pub u32);

/// Distance between two [Millis] time stamps.
#[derive(PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Debug)]
pub struct RelMillis(pub u32);

impl Millis {
    #[inline]
    pub const fn new() -> Self {
        Millis(0)
    }

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Millis(ms)
    }

    /// Wrapping time elapsed since `earlier`.
    #[inline]
    pub const fn since(self, earlier: Millis) -> RelMillis {
        RelMillis(self.0.wrapping_sub(earlier.0))
    }
}

impl RelMillis {
    #[inline]
    pub const fn new() -> Self {
        RelMillis(0)
    }

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        RelMillis(ms)
    }

    #[inline]
    pub const fn from_secs(s: u32) -> Self {
        RelMillis(s * 1000)
    }

    #[inline]
    pub const fn as_millis(self) -> u32 {
        self.0
    }
}

impl Default for Millis {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RelMillis {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ord for Millis {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        if self.0 == other.0 {
            core::cmp::Ordering::Equal
        } else if self.0.wrapping_sub(other.0) & (1 << (u32::BITS - 1)) == 0 {
            core::cmp::Ordering::Greater
        } else {
            core::cmp::Ordering::Less
        }
    }
}

impl PartialOrd for Millis {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::ops::Add<RelMillis> for Millis {
    type Output = Self;

    #[inline]
    fn add(self, other: RelMillis) -> Self::Output {
        Millis(self.0.wrapping_add(other.0))
    }
}

impl core::ops::Sub for Millis {
    type Output = RelMillis;

    #[inline]
    fn sub(self, other: Self) -> Self::Output {
        self.since(other)
    }
}

impl From<u32> for Millis {
    #[inline]
    fn from(stamp: u32) -> Self {
        Millis(stamp)
    }
}

impl From<Millis> for u32 {
    #[inline]
    fn from(stamp: Millis) -> Self {
        stamp.0
    }
}


// vim: ts=4 sw=4 expandtab
