// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{radio::RadioError, sensors::SensorError};

#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display)]
pub enum Error {
    /// A sensor could not be brought up. Fatal.
    #[display("sensor initialization failed: {_0}")]
    SensorInit(SensorError),
    /// The previous report is still being transmitted.
    /// This report is dropped.
    #[display("previous report still in flight")]
    TxPending,
    /// The radio refused the report.
    /// This report is dropped.
    #[display("radio: {_0}")]
    Radio(RadioError),
}

impl Error {
    /// Whether the station can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::SensorInit(_))
    }
}

// vim: ts=4 sw=4 expandtab
