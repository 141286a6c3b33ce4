// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radio collaborator.
//!
//! Channel plan, session keys, duty cycle and retransmission
//! are handled by the radio stack outside of this crate.

#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display)]
pub enum RadioError {
    #[display("transmission pending")]
    Busy,
}

/// Events reported back by the radio stack.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RadioEvent {
    /// The uplink went on air.
    TxStart,
    /// The uplink and its receive windows are finished.
    TxComplete,
}

pub trait Radio {
    /// Queue `payload` for transmission.
    ///
    /// Returns immediately. Completion is reported as [RadioEvent::TxComplete].
    fn transmit(&mut self, payload: &[u8]) -> Result<(), RadioError>;

    /// Fetch the next pending event of the radio stack.
    ///
    /// Called from the main loop on every pass.
    fn poll_event(&mut self) -> Option<RadioEvent>;
}

// vim: ts=4 sw=4 expandtab
