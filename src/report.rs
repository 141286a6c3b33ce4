// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{MainCtx, MutexCell};

/// Number of u16 fields in a record.
pub const RECORD_FIELDS: usize = 10;

/// Size of an encoded record in bytes.
pub const RECORD_SIZE: usize = RECORD_FIELDS * 2;

/// One observation report.
///
/// All fields are x10 fixed point.
/// Encoded as little endian u16 in declaration order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ObservationRecord {
    /// Gust speed, km/h.
    pub wind_gust_x10: u16,
    /// Gust direction, degrees 0..=360. Not scaled.
    pub wind_gust_dir: u16,
    /// Air temperature + 100, degrees Celsius.
    pub temp_x10: u16,
    /// Relative humidity, percent.
    pub humid_x10: u16,
    /// Pressure at station level, hPa.
    pub press_x10: u16,
    /// Rainfall rate, mm/h.
    pub rain_rate_x10: u16,
    /// Last wind speed sample, km/h.
    pub wind_speed_x10: u16,
    /// Averaged direction + 90, degrees -90..450. Not scaled.
    pub wind_dir: u16,
    /// Rainfall since the last daily rollover, mm.
    pub daily_rain_x10: u16,
    /// Case temperature + 100, degrees Celsius.
    pub case_temp_x10: u16,
}

impl ObservationRecord {
    pub const fn new() -> Self {
        Self::from_fields([0; RECORD_FIELDS])
    }

    const fn fields(&self) -> [u16; RECORD_FIELDS] {
        [
            self.wind_gust_x10,
            self.wind_gust_dir,
            self.temp_x10,
            self.humid_x10,
            self.press_x10,
            self.rain_rate_x10,
            self.wind_speed_x10,
            self.wind_dir,
            self.daily_rain_x10,
            self.case_temp_x10,
        ]
    }

    const fn from_fields(f: [u16; RECORD_FIELDS]) -> Self {
        Self {
            wind_gust_x10: f[0],
            wind_gust_dir: f[1],
            temp_x10: f[2],
            humid_x10: f[3],
            press_x10: f[4],
            rain_rate_x10: f[5],
            wind_speed_x10: f[6],
            wind_dir: f[7],
            daily_rain_x10: f[8],
            case_temp_x10: f[9],
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0; RECORD_SIZE];
        for (chunk, field) in buf.chunks_exact_mut(2).zip(self.fields()) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != RECORD_SIZE {
            return None;
        }
        let mut fields = [0; RECORD_FIELDS];
        for (field, chunk) in fields.iter_mut().zip(buf.chunks_exact(2)) {
            *field = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Some(Self::from_fields(fields))
    }
}

/// One of the two record buffers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub const fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Double buffered observation records.
///
/// The active slot is filled during the report cycle.
/// The ready slot holds the last completed record.
/// A slot handed to the radio is never written until the
/// transmission is complete.
pub struct ReportBuffer {
    slots: [MutexCell<ObservationRecord>; 2],
    active: MutexCell<Slot>,
    in_flight: MutexCell<Option<Slot>>,
}

impl ReportBuffer {
    pub const fn new() -> Self {
        Self {
            slots: [
                MutexCell::new(ObservationRecord::new()),
                MutexCell::new(ObservationRecord::new()),
            ],
            active: MutexCell::new(Slot::A),
            in_flight: MutexCell::new(None),
        }
    }

    pub fn active(&self, m: &MainCtx<'_>) -> Slot {
        self.active.get(m)
    }

    pub fn ready(&self, m: &MainCtx<'_>) -> Slot {
        self.active.get(m).other()
    }

    pub fn get(&self, m: &MainCtx<'_>, slot: Slot) -> ObservationRecord {
        self.slots[slot.index()].get(m)
    }

    /// Write the active slot.
    ///
    /// Returns false, if the active slot is still in flight.
    pub fn fill(&self, m: &MainCtx<'_>, record: ObservationRecord) -> bool {
        let active = self.active.get(m);
        if self.in_flight.get(m) == Some(active) {
            false
        } else {
            self.slots[active.index()].set(m, record);
            true
        }
    }

    /// Whether the roles can be swapped without touching a slot in flight.
    pub fn can_swap(&self, m: &MainCtx<'_>) -> bool {
        self.in_flight.get(m).is_none()
    }

    /// Swap the active and ready roles. Returns the new ready slot.
    pub fn swap(&self, m: &MainCtx<'_>) -> Option<Slot> {
        if self.can_swap(m) {
            let ready = self.active.get(m);
            self.active.set(m, ready.other());
            Some(ready)
        } else {
            None
        }
    }

    pub fn set_in_flight(&self, m: &MainCtx<'_>, slot: Slot) {
        self.in_flight.set(m, Some(slot));
    }

    pub fn in_flight(&self, m: &MainCtx<'_>) -> Option<Slot> {
        self.in_flight.get(m)
    }

    /// The radio has finished with the slot in flight.
    pub fn tx_complete(&self, m: &MainCtx<'_>) {
        self.in_flight.set(m, None);
    }
}

impl Default for ReportBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ObservationRecord {
        ObservationRecord {
            wind_gust_x10: 1234,
            wind_gust_dir: 359,
            temp_x10: 1213,
            humid_x10: 555,
            press_x10: 10132,
            rain_rate_x10: 240,
            wind_speed_x10: 144,
            wind_dir: 539,
            daily_rain_x10: 20,
            case_temp_x10: 1350,
        }
    }

    #[test]
    fn test_layout() {
        let buf = record().encode();
        assert_eq!(buf.len(), 20);
        assert_eq!(buf[0..2], [0xD2, 0x04]); // 1234
        assert_eq!(buf[2..4], [0x67, 0x01]); // 359
        assert_eq!(buf[8..10], [0x94, 0x27]); // 10132
        assert_eq!(buf[10..12], [0xF0, 0x00]); // 240
        assert_eq!(buf[18..20], [0x46, 0x05]); // 1350
    }

    #[test]
    fn test_decode() {
        let buf = record().encode();
        assert_eq!(ObservationRecord::decode(&buf), Some(record()));
        assert_eq!(ObservationRecord::decode(&buf[..19]), None);
        assert_eq!(ObservationRecord::decode(&[]), None);
    }

    #[test]
    fn test_swap() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let b = ReportBuffer::new();
        assert_eq!(b.active(&m), Slot::A);
        assert_eq!(b.ready(&m), Slot::B);

        assert!(b.fill(&m, record()));
        assert_eq!(b.swap(&m), Some(Slot::A));
        assert_eq!(b.active(&m), Slot::B);
        assert_eq!(b.get(&m, Slot::A), record());
        assert_eq!(b.get(&m, Slot::B), ObservationRecord::new());
    }

    #[test]
    fn test_in_flight_guard() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let b = ReportBuffer::new();

        assert!(b.fill(&m, record()));
        let ready = b.swap(&m).unwrap();
        b.set_in_flight(&m, ready);

        // The other slot can still be filled,
        // but the in flight slot never becomes active.
        assert!(b.fill(&m, ObservationRecord::new()));
        assert_eq!(b.swap(&m), None);
        assert_eq!(b.active(&m), Slot::B);
        assert_eq!(b.get(&m, Slot::A), record());

        b.tx_complete(&m);
        assert_eq!(b.swap(&m), Some(Slot::B));
        assert_eq!(b.active(&m), Slot::A);
    }
}

// vim: ts=4 sw=4 expandtab
