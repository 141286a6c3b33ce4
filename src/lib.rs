// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampling and reporting core of a LoRaWAN weather station.
//!
//! Wind speed is sampled from the anemometer reed switch every 2.5 seconds.
//! Every 5 minutes an observation report is handed to the radio.
//! Rainfall totals roll over once a day at the configured end of day hour.
//!
//! The board binary supplies the sensor drivers, the radio stack and
//! the `#[avr_device::entry]` function. See `hw` on AVR targets.

#![no_std]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod config;
pub mod counter;
pub mod debug;
pub mod direction;
pub mod error;
pub mod fixpt;
pub mod history;
pub mod mutex;
pub mod radio;
pub mod report;
pub mod rollover;
pub mod sampler;
pub mod sensors;
pub mod station;
pub mod timer;

#[cfg(target_arch = "avr")]
pub mod hw;

pub use crate::{
    config::Config,
    error::Error,
    report::ObservationRecord,
    station::{Station, StationPeriph},
};

// vim: ts=4 sw=4 expandtab
