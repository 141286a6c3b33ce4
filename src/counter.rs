// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    mutex::{CriticalSection, IrqCtx, Mutex},
    timer::{Millis, RelMillis},
};
use core::cell::Cell;

/// Debounced reed switch edge counter.
///
/// Incremented from the edge interrupt.
/// Read and reset from the timer interrupt or from the main loop,
/// always within one critical section.
pub struct EdgeCounter {
    count: Mutex<Cell<u32>>,
    last_edge: Mutex<Cell<Millis>>,
    bounce: RelMillis,
}

impl EdgeCounter {
    pub const fn new(bounce: RelMillis) -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
            last_edge: Mutex::new(Cell::new(Millis::new())),
            bounce,
        }
    }

    /// Edge interrupt.
    ///
    /// Edges closer than the bounce interval to the previous
    /// accepted edge are contact bounce and are ignored.
    pub fn irq_handler_edge(&self, c: &IrqCtx<'_>, now: Millis) -> bool {
        let cs = c.cs();
        let last_edge = self.last_edge.borrow(cs);
        if now.since(last_edge.get()) > self.bounce {
            let count = self.count.borrow(cs);
            count.set(count.get().wrapping_add(1));
            last_edge.set(now);
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self, cs: CriticalSection<'_>) -> u32 {
        self.count.borrow(cs).get()
    }

    /// Read the count and restart from zero.
    pub fn take(&self, cs: CriticalSection<'_>) -> u32 {
        self.count.borrow(cs).replace(0)
    }

    /// Subtract `base` from the count.
    ///
    /// Edges counted after `base` was read are kept.
    pub fn rebase(&self, cs: CriticalSection<'_>, base: u32) {
        let count = self.count.borrow(cs);
        count.set(count.get().saturating_sub(base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_edges(counter: &EdgeCounter, stamps: &[u32]) -> u32 {
        // SAFETY: Test runs single threaded.
        let c = unsafe { IrqCtx::new() };
        for stamp in stamps {
            counter.irq_handler_edge(&c, Millis::from_millis(*stamp));
        }
        counter.snapshot(c.cs())
    }

    #[test]
    fn test_spaced_edges() {
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        let stamps: [u32; 6] = [100, 116, 200, 1000, 1016, 5000];
        assert_eq!(count_edges(&counter, &stamps), 6);
    }

    #[test]
    fn test_bounce() {
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        // One closure bouncing for 12 ms, then the next one.
        let stamps: [u32; 8] = [100, 101, 103, 107, 112, 200, 205, 215];
        assert_eq!(count_edges(&counter, &stamps), 2);

        // Exactly the bounce interval is still bounce.
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        assert_eq!(count_edges(&counter, &[100, 115]), 1);
        assert_eq!(count_edges(&counter, &[131]), 2);
    }

    #[test]
    fn test_bounce_relative_to_accepted() {
        // The bounce window does not get extended by rejected edges.
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        let stamps: [u32; 4] = [100, 110, 114, 116];
        assert_eq!(count_edges(&counter, &stamps), 2);
    }

    #[test]
    fn test_timer_wrap() {
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        let stamps: [u32; 3] = [u32::MAX - 20, u32::MAX - 10, 10];
        assert_eq!(count_edges(&counter, &stamps), 2);
    }

    #[test]
    fn test_take_rebase() {
        let counter = EdgeCounter::new(RelMillis::from_millis(15));
        assert_eq!(count_edges(&counter, &[100, 200, 300, 400]), 4);
        critical_section::with(|cs| {
            counter.rebase(cs, 3);
            assert_eq!(counter.snapshot(cs), 1);
            counter.rebase(cs, 3);
            assert_eq!(counter.snapshot(cs), 0);
        });
        assert_eq!(count_edges(&counter, &[500, 600]), 2);
        critical_section::with(|cs| {
            assert_eq!(counter.take(cs), 2);
            assert_eq!(counter.snapshot(cs), 0);
        });
    }
}

// vim: ts=4 sw=4 expandtab
