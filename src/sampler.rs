// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::Config,
    counter::EdgeCounter,
    debug::Debug,
    fixpt::WindSpeed,
    mutex::{CriticalSection, IrqCtx, Mutex},
    timer::Millis,
};
use core::cell::Cell;

/// Periodic wind speed sampler.
///
/// Runs in the sampling timer interrupt.
pub struct Sampler {
    ticks: Mutex<Cell<u8>>,
    speed: Mutex<Cell<WindSpeed>>,
    ready: Mutex<Cell<bool>>,
    overruns: Mutex<Cell<u16>>,
    interval: u8,
    factor: WindSpeed,
}

impl Sampler {
    pub const fn new(config: &Config) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
            speed: Mutex::new(Cell::new(WindSpeed::zero())),
            ready: Mutex::new(Cell::new(false)),
            overruns: Mutex::new(Cell::new(0)),
            interval: config.sample_interval,
            factor: config.speed_factor(),
        }
    }

    /// Sampling timer interrupt.
    ///
    /// Converts the rotations of the finished sample period into a speed.
    /// The rotation count is read and reset within this interrupt,
    /// so no rotation is lost or counted twice.
    pub fn irq_handler_tick(&self, c: &IrqCtx<'_>, rotations: &EdgeCounter) -> bool {
        let cs = c.cs();

        let ticks = self.ticks.borrow(cs);
        let tick = ticks.get().wrapping_add(1);
        if tick < self.interval {
            ticks.set(tick);
            return false;
        }
        ticks.set(0);

        let speed = WindSpeed::from_rotations(rotations.take(cs), self.factor);
        self.speed.borrow(cs).set(speed);

        let ready = self.ready.borrow(cs);
        if ready.get() {
            // The main loop did not pick up the previous sample.
            let overruns = self.overruns.borrow(cs);
            overruns.set(overruns.get().saturating_add(1));
        }
        ready.set(true);

        true
    }

    /// Fetch the pending sample and clear the "sample ready" flag.
    pub fn take_sample(&self, cs: CriticalSection<'_>) -> Option<WindSpeed> {
        if self.ready.borrow(cs).replace(false) {
            Some(self.speed.borrow(cs).get())
        } else {
            None
        }
    }

    pub fn overruns(&self, cs: CriticalSection<'_>) -> u16 {
        self.overruns.borrow(cs).get()
    }
}

/// State shared between the interrupt handlers and the main loop.
pub struct SensorState {
    pub rotations: EdgeCounter,
    pub tips: EdgeCounter,
    pub sampler: Sampler,
}

impl SensorState {
    pub const fn new(config: &Config) -> Self {
        Self {
            rotations: EdgeCounter::new(config.bounce_interval),
            tips: EdgeCounter::new(config.bounce_interval),
            sampler: Sampler::new(config),
        }
    }

    /// Anemometer reed switch interrupt.
    pub fn irq_handler_rotation(&self, c: &IrqCtx<'_>, now: Millis) {
        self.rotations.irq_handler_edge(c, now);
    }

    /// Rain gauge bucket tip interrupt.
    pub fn irq_handler_rain(&self, c: &IrqCtx<'_>, now: Millis) {
        self.tips.irq_handler_edge(c, now);
    }

    /// Sampling timer interrupt.
    pub fn irq_handler_tick(&self, c: &IrqCtx<'_>) {
        if self.sampler.irq_handler_tick(c, &self.rotations) {
            Debug::SampleOverruns.log_u16_cs(c.cs(), self.sampler.overruns(c.cs()));
        }
    }

    /// Main loop poll for a new wind sample.
    pub fn take_sample(&self) -> Option<WindSpeed> {
        critical_section::with(|cs| self.sampler.take_sample(cs))
    }

    /// Rain gauge tips counted since the last rollover.
    pub fn tips(&self) -> u32 {
        critical_section::with(|cs| self.tips.snapshot(cs))
    }

    /// Forget `base` tips, keeping the ones counted after `base` was read.
    pub fn rebase_tips(&self, base: u32) {
        critical_section::with(|cs| self.tips.rebase(cs, base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(state: &SensorState, c: &IrqCtx<'_>, now: &mut u32, count: u32) {
        for _ in 0..count {
            *now += 20;
            state.irq_handler_rotation(c, Millis::from_millis(*now));
        }
    }

    #[test]
    fn test_sample_interval() {
        let state = SensorState::new(&Config::DEFAULT);
        // SAFETY: Test runs single threaded.
        let c = unsafe { IrqCtx::new() };
        let mut now = 0;

        rotate(&state, &c, &mut now, 7);
        for _ in 0..4 {
            assert!(!state.sampler.irq_handler_tick(&c, &state.rotations));
        }
        assert!(state.sampler.irq_handler_tick(&c, &state.rotations));
        drop(c);

        assert_eq!(state.take_sample(), Some(WindSpeed::from_kmh_e4(7 * 14481)));
        assert_eq!(state.take_sample(), None);
    }

    #[test]
    fn test_no_residual() {
        let state = SensorState::new(&Config::DEFAULT);
        let factor = Config::DEFAULT.speed_factor();
        let mut now = 0;

        for rot in [3_u32, 0, 12, 1] {
            // SAFETY: Test runs single threaded.
            let c = unsafe { IrqCtx::new() };
            rotate(&state, &c, &mut now, rot);
            for _ in 0..5 {
                state.irq_handler_tick(&c);
            }
            drop(c);
            assert_eq!(
                state.take_sample(),
                Some(WindSpeed::from_rotations(rot, factor))
            );
        }
    }

    #[test]
    fn test_overrun() {
        let state = SensorState::new(&Config::DEFAULT);
        // SAFETY: Test runs single threaded.
        let c = unsafe { IrqCtx::new() };
        let mut now = 0;

        rotate(&state, &c, &mut now, 2);
        for _ in 0..5 {
            state.irq_handler_tick(&c);
        }
        rotate(&state, &c, &mut now, 4);
        for _ in 0..5 {
            state.irq_handler_tick(&c);
        }
        assert_eq!(state.sampler.overruns(c.cs()), 1);
        drop(c);

        // The newest sample wins.
        assert_eq!(state.take_sample(), Some(WindSpeed::from_kmh_e4(4 * 14481)));
        assert_eq!(state.take_sample(), None);
    }

    #[test]
    fn test_rain_rebase() {
        let state = SensorState::new(&Config::DEFAULT);
        // SAFETY: Test runs single threaded.
        let c = unsafe { IrqCtx::new() };
        for stamp in [100, 200, 300] {
            state.irq_handler_rain(&c, Millis::from_millis(stamp));
        }
        drop(c);
        let base = state.tips();
        assert_eq!(base, 3);

        // SAFETY: Test runs single threaded.
        let c = unsafe { IrqCtx::new() };
        state.irq_handler_rain(&c, Millis::from_millis(400));
        drop(c);

        state.rebase_tips(base);
        assert_eq!(state.tips(), 1);
    }
}

// vim: ts=4 sw=4 expandtab
