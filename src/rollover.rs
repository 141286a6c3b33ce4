// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End of day rollover of the daily totals.
//!
//! The rollover window opens one hour before the end of day hour
//! and closes one hour after it. Outside of the window the rollover is armed.
//! An armed rollover fires exactly once inside of the window.

use crate::{
    mutex::{MainCtx, MutexCell},
    sensors::TimeOfDay,
};

/// Width of the rollover window in minutes.
const WINDOW_MINS: u32 = 120;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    /// Outside of the window. Arm for the next one.
    Arm,
    /// Inside of the window. Not due yet or already done today.
    Wait,
    /// Reset the daily totals now.
    Rollover,
}

/// Minutes since the rollover window opened, if `now` is inside of the window.
fn window_minutes(now: TimeOfDay, eod_hour: u8) -> Option<u32> {
    let open = (eod_hour as u32 + 23) % 24;
    let hours = (now.hour as u32 + 24 - open) % 24;
    let mins = hours * 60 + now.minute as u32;
    (mins < WINDOW_MINS).then_some(mins)
}

/// Rollover decision for the report pass at `now`.
///
/// `interval_mins` is the time until the next report pass.
pub fn decide(now: TimeOfDay, eod_hour: u8, interval_mins: u32, armed: bool) -> Decision {
    let Some(mins) = window_minutes(now, eod_hour) else {
        return Decision::Arm;
    };
    if !armed {
        return Decision::Wait;
    }
    if now.hour == eod_hour % 24 {
        return Decision::Rollover;
    }
    // Still before the end of day hour.
    // Wait, if the next pass also lands inside of the window.
    if mins + interval_mins < WINDOW_MINS {
        Decision::Wait
    } else {
        Decision::Rollover
    }
}

pub struct Rollover {
    armed: MutexCell<bool>,
    eod_hour: u8,
    interval_mins: u32,
}

impl Rollover {
    pub const fn new(eod_hour: u8, interval_mins: u32) -> Self {
        Self {
            armed: MutexCell::new(true),
            eod_hour,
            interval_mins,
        }
    }

    /// Returns true, if the daily totals must be reset now.
    pub fn check(&self, m: &MainCtx<'_>, now: TimeOfDay) -> bool {
        match decide(now, self.eod_hour, self.interval_mins, self.armed.get(m)) {
            Decision::Arm => {
                self.armed.set(m, true);
                false
            }
            Decision::Wait => false,
            Decision::Rollover => {
                self.armed.set(m, false);
                true
            }
        }
    }

    pub fn is_armed(&self, m: &MainCtx<'_>) -> bool {
        self.armed.get(m)
    }
}


// vim: ts=4 sw=4 expandtab
