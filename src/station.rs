// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::Config,
    debug::Debug,
    direction::{DirectionFilter, Range},
    error::Error,
    fixpt::{TEMP_OFFSET, WindSpeed, dir_ext_to_wire, rain_rate_x10, rain_x10},
    mutex::{MainCtx, MutexCell},
    radio::{Radio, RadioEvent},
    report::{ObservationRecord, ReportBuffer, Slot},
    rollover::Rollover,
    sampler::SensorState,
    sensors::{Barometer, Clock, Probe, Thermometers, TimeOfDay, WindVane},
};

/// The station's collaborators.
pub struct StationPeriph<T, B, V, C, R> {
    pub thermometers: T,
    pub barometer: B,
    pub vane: V,
    pub clock: C,
    pub radio: R,
}

pub struct Station {
    config: Config,
    direction: DirectionFilter,
    samples: MutexCell<u8>,
    gust: MutexCell<WindSpeed>,
    gust_dir: MutexCell<i16>,
    last_speed: MutexCell<WindSpeed>,
    /// Tip count at the last report.
    report_tips: MutexCell<u32>,
    rollover: Rollover,
    buffer: ReportBuffer,
    tx_active: MutexCell<bool>,
    tx_dropped: MutexCell<u16>,
    rollovers: MutexCell<u16>,
}

impl Station {
    pub const fn new(config: &Config) -> Self {
        Self {
            config: *config,
            direction: DirectionFilter::new(config),
            samples: MutexCell::new(0),
            gust: MutexCell::new(WindSpeed::zero()),
            gust_dir: MutexCell::new(0),
            last_speed: MutexCell::new(WindSpeed::zero()),
            report_tips: MutexCell::new(0),
            rollover: Rollover::new(config.eod_hour, config.report_mins()),
            buffer: ReportBuffer::new(),
            tx_active: MutexCell::new(false),
            tx_dropped: MutexCell::new(0),
            rollovers: MutexCell::new(0),
        }
    }

    pub fn init<T, B, V, C, R>(
        &self,
        _m: &MainCtx<'_>,
        sp: &mut StationPeriph<T, B, V, C, R>,
    ) -> Result<(), Error>
    where
        T: Thermometers,
        B: Barometer,
    {
        sp.thermometers
            .set_resolution(Probe::Air, self.config.air_temp_resolution);
        sp.thermometers
            .set_resolution(Probe::Case, self.config.case_temp_resolution);
        sp.barometer.begin().map_err(Error::SensorInit)?;
        log::info!("station up");
        Ok(())
    }

    /// Main loop pass.
    ///
    /// Handles pending radio events.
    /// Does nothing else, unless a new wind sample is pending.
    pub fn run<T, B, V, C, R>(
        &self,
        m: &MainCtx<'_>,
        state: &SensorState,
        sp: &mut StationPeriph<T, B, V, C, R>,
    ) -> Result<(), Error>
    where
        T: Thermometers,
        B: Barometer,
        V: WindVane,
        C: Clock,
        R: Radio,
    {
        self.poll_radio(m, &mut sp.radio);
        match state.take_sample() {
            Some(speed) => self.process_sample(m, state, sp, speed),
            None => Ok(()),
        }
    }

    fn process_sample<T, B, V, C, R>(
        &self,
        m: &MainCtx<'_>,
        state: &SensorState,
        sp: &mut StationPeriph<T, B, V, C, R>,
        speed: WindSpeed,
    ) -> Result<(), Error>
    where
        T: Thermometers,
        B: Barometer,
        V: WindVane,
        C: Clock,
        R: Radio,
    {
        // Start the slow conversions early.
        // The results are picked up in the report pass.
        sp.thermometers.request_readings();
        sp.barometer.read_sensor();

        let dir = self.direction.read_direction(m, &mut sp.vane, Range::Base);

        self.last_speed.set(m, speed);
        if speed > self.gust.get(m) {
            self.gust.set(m, speed);
            self.gust_dir.set(m, dir);
        }
        Debug::WindSpeed.log_u16(speed.to_x10());
        Debug::WindGust.log_u16(self.gust.get(m).to_x10());

        let samples = self.samples.get(m).saturating_add(1);
        if samples < self.config.report_interval {
            self.samples.set(m, samples);
            return Ok(());
        }
        self.samples.set(m, 0);

        self.report(m, state, sp)
    }

    fn report<T, B, V, C, R>(
        &self,
        m: &MainCtx<'_>,
        state: &SensorState,
        sp: &mut StationPeriph<T, B, V, C, R>,
    ) -> Result<(), Error>
    where
        T: Thermometers,
        B: Barometer,
        V: WindVane,
        C: Clock,
        R: Radio,
    {
        let bucket = self.config.bucket_size_um;

        let daily_tips = state.tips();
        let cycle_tips = daily_tips.saturating_sub(self.report_tips.get(m));
        self.report_tips.set(m, daily_tips);
        Debug::RainTips.log_u32(daily_tips);

        let avg_dir = self
            .direction
            .read_direction(m, &mut sp.vane, Range::Extended);

        let record = ObservationRecord {
            wind_gust_x10: self.gust.get(m).to_x10(),
            wind_gust_dir: self.gust_dir.get(m).max(0) as u16,
            temp_x10: sp.thermometers.temperature(Probe::Air).to_x10(TEMP_OFFSET),
            humid_x10: sp.barometer.humidity().to_x10(0),
            press_x10: sp.barometer.pressure().to_x10(0),
            rain_rate_x10: rain_rate_x10(cycle_tips, bucket, self.config.report_secs()),
            wind_speed_x10: self.last_speed.get(m).to_x10(),
            wind_dir: dir_ext_to_wire(avg_dir),
            daily_rain_x10: rain_x10(daily_tips, bucket),
            case_temp_x10: sp.thermometers.temperature(Probe::Case).to_x10(TEMP_OFFSET),
        };

        let result = self.hand_off(m, sp, record);

        self.gust.set(m, WindSpeed::zero());
        self.gust_dir.set(m, 0);

        let utc = sp.clock.now_utc();
        let (local, _dst) = sp.clock.to_local(utc);
        if self.rollover.check(m, TimeOfDay::from_epoch(local)) {
            // Tips counted after the snapshot above belong to the new day.
            state.rebase_tips(daily_tips);
            self.report_tips.set(m, 0);

            let rollovers = self.rollovers.get(m).wrapping_add(1);
            self.rollovers.set(m, rollovers);
            Debug::Rollovers.log_u16(rollovers);
            log::info!("daily totals reset");
        }

        result
    }

    /// Store the record and pass it to the radio.
    fn hand_off<T, B, V, C, R: Radio>(
        &self,
        m: &MainCtx<'_>,
        sp: &mut StationPeriph<T, B, V, C, R>,
        record: ObservationRecord,
    ) -> Result<(), Error> {
        if !self.buffer.fill(m, record) || !self.buffer.can_swap(m) {
            return self.drop_report(m, Error::TxPending);
        }
        let active = self.buffer.active(m);
        if let Err(e) = sp.radio.transmit(&self.buffer.get(m, active).encode()) {
            return self.drop_report(m, Error::Radio(e));
        }
        if let Some(ready) = self.buffer.swap(m) {
            self.buffer.set_in_flight(m, ready);
        }
        Ok(())
    }

    fn drop_report(&self, m: &MainCtx<'_>, err: Error) -> Result<(), Error> {
        let dropped = self.tx_dropped.get(m).wrapping_add(1);
        self.tx_dropped.set(m, dropped);
        Debug::TxDropped.log_u16(dropped);
        log::warn!("report dropped: {err}");
        Err(err)
    }

    fn poll_radio(&self, m: &MainCtx<'_>, radio: &mut impl Radio) {
        while let Some(event) = radio.poll_event() {
            self.radio_event(m, event);
        }
    }

    /// Radio stack event callback.
    pub fn radio_event(&self, m: &MainCtx<'_>, event: RadioEvent) {
        match event {
            RadioEvent::TxStart => {
                log::info!("tx start");
                self.tx_active.set(m, true);
            }
            RadioEvent::TxComplete => {
                log::info!("tx complete");
                self.tx_active.set(m, false);
                self.buffer.tx_complete(m);
            }
        }
    }

    /// The transmit indicator.
    pub fn tx_active(&self, m: &MainCtx<'_>) -> bool {
        self.tx_active.get(m)
    }

    /// The last completed record.
    pub fn ready_record(&self, m: &MainCtx<'_>) -> ObservationRecord {
        self.buffer.get(m, self.buffer.ready(m))
    }

    pub fn in_flight(&self, m: &MainCtx<'_>) -> Option<Slot> {
        self.buffer.in_flight(m)
    }

    pub fn tx_dropped(&self, m: &MainCtx<'_>) -> u16 {
        self.tx_dropped.get(m)
    }
}


// vim: ts=4 sw=4 expandtab
