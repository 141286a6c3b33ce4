// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sensor collaborators.
//!
//! The drivers themselves live outside of this crate.

use crate::fixpt::Centi;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Probe {
    /// Air temperature in the radiation shield.
    Air,
    /// Station case temperature.
    Case,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display)]
pub enum SensorError {
    #[display("sensor not found")]
    NotFound,
}

/// Digital temperature probes.
pub trait Thermometers {
    fn set_resolution(&mut self, probe: Probe, bits: u8);

    /// Start a conversion on all probes.
    /// Does not wait for the conversion to finish.
    fn request_readings(&mut self);

    fn temperature(&mut self, probe: Probe) -> Centi;
}

/// Combined humidity and pressure sensor.
pub trait Barometer {
    fn begin(&mut self) -> Result<(), SensorError>;

    fn read_sensor(&mut self);

    /// Relative humidity in percent.
    fn humidity(&mut self) -> Centi;

    /// Pressure at station level in hPa.
    fn pressure(&mut self) -> Centi;
}

/// Wind vane potentiometer.
pub trait WindVane {
    /// Raw ADC value.
    fn read_raw(&mut self) -> u16;
}

/// Real time clock.
pub trait Clock {
    /// Seconds since the epoch, UTC.
    fn now_utc(&mut self) -> u32;

    /// Convert to local time.
    /// Returns the local seconds since the epoch
    /// and whether daylight saving time is in effect.
    fn to_local(&mut self, utc: u32) -> (u32, bool);
}

/// Wall clock time of day.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub const fn from_epoch(secs: u32) -> Self {
        Self {
            hour: ((secs / 3600) % 24) as u8,
            minute: ((secs / 60) % 60) as u8,
        }
    }
}


// vim: ts=4 sw=4 expandtab
