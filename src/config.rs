// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{fixpt::WindSpeed, timer::RelMillis};

/// Anemometer constant: 2.25 mph per rotation per second (Davis),
/// times 1.609 km/mile, in 1/10000 km/h.
const ANEMO_KMH_E4_PER_RPS: u32 = 36_202_500;

/// Station configuration.
///
/// There is no reconfiguration at run time.
/// The firmware uses [Config::DEFAULT].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Sampling timer period in microseconds.
    pub timing_clock_us: u32,
    /// Number of timer ticks per wind sample.
    pub sample_interval: u8,
    /// Number of wind samples per report.
    pub report_interval: u8,
    /// Reed switch contact bounce suppression.
    pub bounce_interval: RelMillis,
    /// Rain gauge bucket capacity in micrometres.
    pub bucket_size_um: u16,
    /// Wind vane offset from magnetic north in degrees.
    pub vane_offset: i16,
    /// Largest raw value of the wind vane ADC.
    pub vane_adc_max: u16,
    /// Local hour at which the daily totals are closed.
    pub eod_hour: u8,
    /// Resolution of the air temperature probe in bits.
    pub air_temp_resolution: u8,
    /// Resolution of the case temperature probe in bits.
    pub case_temp_resolution: u8,
}

impl Config {
    pub const DEFAULT: Config = Config {
        timing_clock_us: 500_000,                      // 0.5 s
        sample_interval: 5,                            // 2.5 s
        report_interval: 120,                          // 5 min
        bounce_interval: RelMillis::from_millis(15),
        bucket_size_um: 200,                           // 0.2 mm
        vane_offset: 0,
        vane_adc_max: 1023,
        eod_hour: 9,
        air_temp_resolution: 12,
        case_temp_resolution: 10,
    };

    /// Duration of one wind sample in milliseconds.
    pub const fn sample_period_ms(&self) -> u32 {
        self.timing_clock_us / 1000 * self.sample_interval as u32
    }

    /// Duration of one report cycle in seconds.
    pub const fn report_secs(&self) -> u32 {
        self.sample_period_ms() * self.report_interval as u32 / 1000
    }

    /// Duration of one report cycle in minutes.
    pub const fn report_mins(&self) -> u32 {
        self.report_secs() / 60
    }

    /// Wind speed of one anemometer rotation within one sample period.
    ///
    /// This depends on the sample period and must be recomputed
    /// whenever the sample interval changes.
    pub const fn speed_factor(&self) -> WindSpeed {
        WindSpeed::from_kmh_e4(ANEMO_KMH_E4_PER_RPS / self.sample_period_ms())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived() {
        let c = Config::DEFAULT;
        assert_eq!(c.sample_period_ms(), 2500);
        assert_eq!(c.report_secs(), 300);
        assert_eq!(c.report_mins(), 5);
        assert_eq!(c.speed_factor(), WindSpeed::from_kmh_e4(14481));
    }

    #[test]
    fn test_speed_factor_follows_interval() {
        let c = Config {
            sample_interval: 10,
            ..Config::DEFAULT
        };
        assert_eq!(c.sample_period_ms(), 5000);
        // 2.25 / 5 * 1.609
        assert_eq!(c.speed_factor(), WindSpeed::from_kmh_e4(7240));
    }
}

// vim: ts=4 sw=4 expandtab
