// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{CriticalSection, IrqCtx, Mutex};
use core::cell::Cell;

/// Debug value channels.
///
/// The latest value of every channel is streamed over the serial port
/// as `[id, low byte, high byte]` frames.
/// Each round is terminated by an `[0xFF, 0xFF, 0xFF]` frame.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Debug {
    WindSpeed,
    WindGust,
    Direction,
    DirectionAvg,
    RainTips,
    SampleOverruns,
    TxDropped,
    Rollovers,
}
const NRVALUES: usize = 8;

const INDEXSHIFT: usize = 2;
const INDEXMASK: u8 = (1 << INDEXSHIFT) - 1;

pub struct DebugTable {
    values: Mutex<[Cell<u16>; NRVALUES]>,
    index: Mutex<Cell<u8>>,
}

impl DebugTable {
    pub const fn new() -> Self {
        Self {
            values: Mutex::new([
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
                Cell::new(0),
            ]),
            index: Mutex::new(Cell::new(0)),
        }
    }

    pub fn set(&self, cs: CriticalSection<'_>, id: Debug, value: u16) {
        let id = id as usize;
        let values = self.values.borrow(cs);
        if id < values.len() {
            values[id].set(value);
        }
    }

    /// Get the next byte of the debug stream.
    pub fn next_byte(&self, cs: CriticalSection<'_>) -> u8 {
        let index_cell = self.index.borrow(cs);
        let index = index_cell.get();
        let id = index >> INDEXSHIFT;
        let txindex = index & INDEXMASK;

        let value = if id < NRVALUES as u8 {
            self.values.borrow(cs)[id as usize].get()
        } else {
            0xFFFF
        };

        match txindex {
            0 => {
                index_cell.set(index + 1);
                if id < NRVALUES as u8 { id } else { 0xFF }
            }
            1 => {
                index_cell.set(index + 1);
                value as u8
            }
            _ => {
                if id >= NRVALUES as u8 {
                    index_cell.set(0);
                } else {
                    index_cell.set((id + 1) << INDEXSHIFT);
                }
                (value >> 8) as u8
            }
        }
    }
}

impl Default for DebugTable {
    fn default() -> Self {
        Self::new()
    }
}

static TABLE: DebugTable = DebugTable::new();

impl Debug {
    pub fn log_u16(&self, value: u16) {
        if cfg!(feature = "debug") {
            critical_section::with(|cs| self.log_u16_cs(cs, value));
        }
    }

    pub fn log_u16_cs(&self, cs: CriticalSection<'_>, value: u16) {
        if cfg!(feature = "debug") {
            TABLE.set(cs, *self, value);
        }
    }

    pub fn log_i16(&self, value: i16) {
        self.log_u16(value as u16)
    }

    pub fn log_u32(&self, value: u32) {
        self.log_u16(value.min(u16::MAX as u32) as u16)
    }
}

/// Serial transmit complete interrupt.
///
/// Returns the next byte to put into the transmit data register.
pub fn irq_handler_tx_complete(c: &IrqCtx<'_>) -> u8 {
    TABLE.next_byte(c.cs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream() {
        let table = DebugTable::new();
        critical_section::with(|cs| {
            table.set(cs, Debug::WindSpeed, 0x1234);
            table.set(cs, Debug::Rollovers, 0xBEEF);

            let mut frames = [0_u8; (NRVALUES + 1) * 3];
            for byte in frames.iter_mut() {
                *byte = table.next_byte(cs);
            }
            assert_eq!(frames[0..3], [0, 0x34, 0x12]);
            assert_eq!(frames[3..6], [1, 0, 0]);
            assert_eq!(frames[21..24], [7, 0xEF, 0xBE]);
            assert_eq!(frames[24..27], [0xFF, 0xFF, 0xFF]);

            // Next round starts over.
            assert_eq!(table.next_byte(cs), 0);
            assert_eq!(table.next_byte(cs), 0x34);
        });
    }

    #[test]
    fn test_latest_value() {
        let table = DebugTable::new();
        critical_section::with(|cs| {
            table.set(cs, Debug::TxDropped, 3);
            table.set(cs, Debug::TxDropped, 0x105);

            let mut frames = [0_u8; NRVALUES * 3];
            for byte in frames.iter_mut() {
                *byte = table.next_byte(cs);
            }
            assert_eq!(frames[12..15], [4, 0, 0]);
            assert_eq!(frames[18..21], [6, 0x05, 0x01]);
        });
    }
}

// vim: ts=4 sw=4 expandtab
