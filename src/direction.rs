// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::Config,
    debug::Debug,
    history::Boxcar,
    mutex::{MainCtx, MutexCell},
    sensors::WindVane,
};

/// Number of directions in the moving average.
const AVG_COUNT: usize = 4;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Range {
    /// Fresh reading in 0..=360 degrees.
    Base,
    /// Last reading, reconciled against the moving average (-90..450 degrees).
    Extended,
}

/// Map the raw vane ADC value to degrees and apply the magnetic offset.
pub fn vane_to_degrees(raw: u16, adc_max: u16, offset: i16) -> i16 {
    let raw = raw.min(adc_max) as i32;
    let deg = (raw * 359 / adc_max.max(1) as i32) as i16;
    let dir = deg + offset;
    if dir > 360 {
        dir - 360
    } else if dir < 0 {
        dir + 360
    } else {
        dir
    }
}

/// Pick the representation of `dir` closest to `avg`.
///
/// Directions near north may be moved into the extended range
/// below 0 or above 360 degrees.
fn closest_representation(dir: i16, avg: i16) -> i16 {
    let alt = if dir > 270 {
        dir - 360
    } else if dir < 90 {
        dir + 360
    } else {
        dir
    };
    if (dir - avg).abs() < (alt - avg).abs() {
        dir
    } else {
        alt
    }
}

pub struct DirectionFilter {
    current: MutexCell<i16>,
    boxcar: Boxcar<AVG_COUNT>,
    offset: i16,
    adc_max: u16,
}

impl DirectionFilter {
    pub const fn new(config: &Config) -> Self {
        Self {
            current: MutexCell::new(0),
            boxcar: Boxcar::new(),
            offset: config.vane_offset,
            adc_max: config.vane_adc_max,
        }
    }

    pub fn read_direction(
        &self,
        m: &MainCtx<'_>,
        vane: &mut impl WindVane,
        range: Range,
    ) -> i16 {
        match range {
            Range::Base => {
                let dir = vane_to_degrees(vane.read_raw(), self.adc_max, self.offset);
                self.current.set(m, dir);
                Debug::Direction.log_i16(dir);
                dir
            }
            Range::Extended => {
                // No new reading. Average the last one.
                let dir = closest_representation(self.current.get(m), self.boxcar.average(m));
                self.current.set(m, dir);
                let avg = self.boxcar.push(m, dir);
                Debug::DirectionAvg.log_i16(avg);
                avg
            }
        }
    }

    /// The last corrected direction.
    pub fn current(&self, m: &MainCtx<'_>) -> i16 {
        self.current.get(m)
    }

    pub fn average(&self, m: &MainCtx<'_>) -> i16 {
        self.boxcar.average(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vane(u16);

    impl WindVane for Vane {
        fn read_raw(&mut self) -> u16 {
            self.0
        }
    }

    /// Raw ADC value of a compass direction.
    fn raw(deg: u16) -> u16 {
        // Round up, so that the truncating map gives `deg` back.
        ((deg as u32 * 1023).div_ceil(359)) as u16
    }

    fn feed(f: &DirectionFilter, m: &MainCtx<'_>, deg: u16) -> i16 {
        let mut vane = Vane(raw(deg));
        assert_eq!(f.read_direction(m, &mut vane, Range::Base), deg as i16);
        f.read_direction(m, &mut vane, Range::Extended)
    }

    #[test]
    fn test_map() {
        assert_eq!(vane_to_degrees(0, 1023, 0), 0);
        assert_eq!(vane_to_degrees(1023, 1023, 0), 359);
        assert_eq!(vane_to_degrees(512, 1023, 0), 179);
        assert_eq!(vane_to_degrees(2000, 1023, 0), 359);
        for deg in 0..360 {
            assert_eq!(vane_to_degrees(raw(deg), 1023, 0), deg as i16);
        }
    }

    #[test]
    fn test_offset() {
        assert_eq!(vane_to_degrees(1023, 1023, 10), 9);
        assert_eq!(vane_to_degrees(0, 1023, 10), 10);
        // Exactly 360 is not wrapped.
        assert_eq!(vane_to_degrees(1023, 1023, 1), 360);
        assert_eq!(vane_to_degrees(0, 1023, -20), 340);
    }

    #[test]
    fn test_base_does_not_average() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        let mut vane = Vane(raw(200));
        assert_eq!(f.read_direction(&m, &mut vane, Range::Base), 200);
        assert_eq!(f.current(&m), 200);
        assert_eq!(f.average(&m), 0);
    }

    #[test]
    fn test_constant() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        assert_eq!(feed(&f, &m, 180), 45);
        assert_eq!(feed(&f, &m, 180), 90);
        assert_eq!(feed(&f, &m, 180), 135);
        assert_eq!(feed(&f, &m, 180), 180);
        assert_eq!(feed(&f, &m, 180), 180);
        assert_eq!(feed(&f, &m, 180), 180);
    }

    #[test]
    fn test_constant_near_north() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        for _ in 0..4 {
            feed(&f, &m, 10);
        }
        assert_eq!(f.average(&m), 10);

        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        for _ in 0..4 {
            feed(&f, &m, 350);
        }
        // 350 degrees in the extended range.
        assert_eq!(f.average(&m), -10);
        assert_eq!(f.current(&m), -10);
    }

    #[test]
    fn test_wrap_around() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        for deg in [359, 1, 359, 1, 359, 1, 358, 2] {
            let avg = feed(&f, &m, deg);
            assert!(avg.abs() <= 2, "average {avg} is not near north");
        }
    }

    #[test]
    fn test_wrap_around_high() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        for _ in 0..4 {
            feed(&f, &m, 340);
        }
        assert_eq!(f.average(&m), -20);
        // Crossing north from the west side stays continuous.
        feed(&f, &m, 20);
        assert_eq!(f.current(&m), 20);
        assert_eq!(f.average(&m), -10);
    }

    #[test]
    fn test_extended_above_360() {
        // SAFETY: Test runs single threaded.
        let m = unsafe { MainCtx::new() };
        let f = DirectionFilter::new(&Config::DEFAULT);
        for _ in 0..4 {
            feed(&f, &m, 260);
        }
        assert_eq!(f.average(&m), 260);
        // 370 degrees is closer to the average than 10 degrees.
        feed(&f, &m, 10);
        assert_eq!(f.current(&m), 370);
        assert_eq!(f.average(&m), 287);
    }
}

// vim: ts=4 sw=4 expandtab
