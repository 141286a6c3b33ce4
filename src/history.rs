// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{MainCtx, MutexCell};

/// Boxcar moving average over the last `SIZE` values.
///
/// Starts out filled with zeros.
pub struct Boxcar<const SIZE: usize> {
    hist: [MutexCell<i16>; SIZE],
    pos: MutexCell<u8>,
    sum: MutexCell<i32>,
}

impl<const SIZE: usize> Boxcar<SIZE> {
    pub const fn new() -> Self {
        Self {
            hist: [const { MutexCell::new(0) }; SIZE],
            pos: MutexCell::new(0),
            sum: MutexCell::new(0),
        }
    }

    /// Overwrite the oldest value with `new` and return the new average.
    ///
    /// The average is truncated towards zero.
    pub fn push(&self, m: &MainCtx<'_>, new: i16) -> i16 {
        let pos = self.pos.get(m) as usize;
        let sum = self.sum.get(m) - self.hist[pos].get(m) as i32 + new as i32;
        self.hist[pos].set(m, new);
        self.sum.set(m, sum);
        self.pos.set(m, ((pos + 1) % SIZE) as u8);
        (sum / SIZE as i32) as i16
    }

    pub fn average(&self, m: &MainCtx<'_>) -> i16 {
        (self.sum.get(m) / SIZE as i32) as i16
    }
}

impl<const SIZE: usize> Default for Boxcar<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
