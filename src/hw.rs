// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ATmega2560 board glue.
//!
//! INT2 (PD2): anemometer reed switch, active low.
//! INT3 (PD3): rain gauge reed switch, active low.
//! ADC0: wind vane potentiometer.
//! PG5: transmit LED.
//! USART0: debug value stream.
//!
//! The sensor drivers and the radio stack are not part of this crate.
//! The board binary provides them and the entry point:
//!
//! ```ignore
//! #[avr_device::entry]
//! fn main() -> ! {
//!     let hp = HwPeriph::take();
//!     let mut sp = StationPeriph {
//!         thermometers: Ds18b20Pair::new(/* ... */),
//!         barometer: Bme280::new(/* ... */),
//!         vane: AdcVane { adc: &hp.ADC },
//!         clock: Ds3231::new(/* ... */),
//!         radio: Lmic::new(/* ... */),
//!     };
//!     run_station(&hp, &mut sp)
//! }
//! ```

pub use avr_device::atmega2560::{self as mcu, Peripherals};

use crate::{
    config::Config,
    debug,
    mutex::{IrqCtx, MainCtx, Mutex, halt, unwrap_result},
    radio::Radio,
    sampler::SensorState,
    sensors::{Barometer, Clock, Thermometers, WindVane},
    station::{Station, StationPeriph},
    timer::{Millis, RelMillis},
};
use core::cell::Cell;

const F_CPU: u32 = 16_000_000;
const DEBUG_BAUD: u32 = 19_200;

/// Timer 1 prescaler.
const TC1_PRESCALE: u32 = 256;

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[avr_device::interrupt(atmega2560)]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler.
            // Therefore, it is safe to construct an `IrqCtx`.
            let c = unsafe { IrqCtx::new() };
            $handler(&c);
        }
    };
}

define_isr!(INT2, irq_handler_int2);
define_isr!(INT3, irq_handler_int3);
define_isr!(TIMER0_COMPA, irq_handler_timer0_compa);
define_isr!(TIMER1_COMPA, irq_handler_timer1_compa);
define_isr!(USART0_TX, irq_handler_usart0_tx);

pub static SENSORS: SensorState = SensorState::new(&Config::DEFAULT);

pub static STATION: Station = Station::new(&Config::DEFAULT);

static MILLIS: Mutex<Cell<Millis>> = Mutex::new(Cell::new(Millis::new()));

fn millis_irq(c: &IrqCtx<'_>) -> Millis {
    MILLIS.borrow(c.cs()).get()
}

fn irq_handler_timer0_compa(c: &IrqCtx<'_>) {
    let millis = MILLIS.borrow(c.cs());
    millis.set(millis.get() + RelMillis::from_millis(1));
}

fn irq_handler_int2(c: &IrqCtx<'_>) {
    SENSORS.irq_handler_rotation(c, millis_irq(c));
}

fn irq_handler_int3(c: &IrqCtx<'_>) {
    SENSORS.irq_handler_rain(c, millis_irq(c));
}

fn irq_handler_timer1_compa(c: &IrqCtx<'_>) {
    SENSORS.irq_handler_tick(c);
}

fn irq_handler_usart0_tx(c: &IrqCtx<'_>) {
    let byte = debug::irq_handler_tx_complete(c);
    // SAFETY: UDR0 is only written here and once during init
    //         before the interrupt is enabled.
    let usart = unsafe { &*mcu::USART0::ptr() };
    // SAFETY: Any byte is a valid data register value.
    usart.udr0().write(|w| unsafe { w.bits(byte) });
}

#[allow(non_snake_case)]
pub struct HwPeriph {
    pub ADC: mcu::ADC,
    pub EXINT: mcu::EXINT,
    pub PORTD: mcu::PORTD,
    pub PORTG: mcu::PORTG,
    pub TC0: mcu::TC0,
    pub TC1: mcu::TC1,
    pub USART0: mcu::USART0,
}

impl HwPeriph {
    /// Take the peripherals. Halts, if they were already taken.
    pub fn take() -> Self {
        match Peripherals::take() {
            Some(dp) => Self::from_dp(dp),
            None => halt(),
        }
    }

    pub fn from_dp(dp: Peripherals) -> Self {
        Self {
            ADC: dp.ADC,
            EXINT: dp.EXINT,
            PORTD: dp.PORTD,
            PORTG: dp.PORTG,
            TC0: dp.TC0,
            TC1: dp.TC1,
            USART0: dp.USART0,
        }
    }
}

#[rustfmt::skip]
pub fn hw_init(_m: &MainCtx<'_>, hp: &HwPeriph, config: &Config) {
    // SAFETY: All raw register values below are valid for the ATmega2560.
    unsafe {
        // PD2, PD3: Inputs with pull up.
        hp.PORTD.ddrd().modify(|r, w| w.bits(r.bits() & !0x0C));
        hp.PORTD.portd().modify(|r, w| w.bits(r.bits() | 0x0C));

        // PG5: TX LED, off.
        hp.PORTG.portg().modify(|r, w| w.bits(r.bits() & !0x20));
        hp.PORTG.ddrg().modify(|r, w| w.bits(r.bits() | 0x20));

        // Timer 0: CTC, prescaler 64, 1 ms.
        hp.TC0.tccr0a().write(|w| w.bits(0x02));
        hp.TC0.ocr0a().write(|w| w.bits((F_CPU / 64 / 1000 - 1) as u8));
        hp.TC0.timsk0().write(|w| w.bits(0x02)); // OCIE0A
        hp.TC0.tccr0b().write(|w| w.bits(0x03));

        // Timer 1: CTC, prescaler 256, sampling timer period.
        let top = F_CPU / TC1_PRESCALE * (config.timing_clock_us / 1000) / 1000 - 1;
        hp.TC1.tccr1a().write(|w| w.bits(0x00));
        hp.TC1.ocr1a().write(|w| w.bits(top as u16));
        hp.TC1.timsk1().write(|w| w.bits(0x02)); // OCIE1A
        hp.TC1.tccr1b().write(|w| w.bits(0x0C)); // WGM12, CS12

        // INT2, INT3: falling edge.
        hp.EXINT.eicra().modify(|r, w| w.bits((r.bits() & 0x0F) | 0xA0));
        hp.EXINT.eifr().write(|w| w.bits(0x0C));
        hp.EXINT.eimsk().modify(|r, w| w.bits(r.bits() | 0x0C));

        // ADC: AVcc reference, channel 0, prescaler 128.
        hp.ADC.admux().write(|w| w.bits(0x40));
        hp.ADC.adcsra().write(|w| w.bits(0x87));
    }

    if cfg!(feature = "debug") {
        let ubrr = (F_CPU / (16 * DEBUG_BAUD) - 1) as u16;
        // SAFETY: All raw register values below are valid for the ATmega2560.
        unsafe {
            hp.USART0.ubrr0().write(|w| w.bits(ubrr));
            hp.USART0.ucsr0c().write(|w| w.bits(0x06)); // 8N1
            hp.USART0.ucsr0b().write(|w| w.bits(0x48)); // TXEN0, TXCIE0
            // Kick off the stream. The TX complete interrupt keeps it running.
            hp.USART0.udr0().write(|w| w.bits(0xFF));
        }
    }
}

pub fn set_tx_led(hp: &HwPeriph, on: bool) {
    // SAFETY: Only touches PG5.
    hp.PORTG.portg().modify(|r, w| unsafe {
        w.bits(if on { r.bits() | 0x20 } else { r.bits() & !0x20 })
    });
}

/// Wind vane on ADC0.
pub struct AdcVane<'a> {
    pub adc: &'a mcu::ADC,
}

impl WindVane for AdcVane<'_> {
    fn read_raw(&mut self) -> u16 {
        // SAFETY: ADSC starts a single conversion.
        self.adc
            .adcsra()
            .modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });
        while self.adc.adcsra().read().bits() & 0x40 != 0 {}
        self.adc.adc().read().bits()
    }
}

/// Bring the station up and run it forever.
///
/// A sensor initialization failure halts the system.
pub fn run_station<T, B, V, C, R>(
    hp: &HwPeriph,
    sp: &mut StationPeriph<T, B, V, C, R>,
) -> !
where
    T: Thermometers,
    B: Barometer,
    V: WindVane,
    C: Clock,
    R: Radio,
{
    // SAFETY: This is the only construction of the main context.
    //         It happens in main() before interrupts are enabled.
    let m = unsafe { MainCtx::new() };

    hw_init(&m, hp, &Config::DEFAULT);
    unwrap_result(STATION.init(&m, sp));

    // SAFETY: This must be after construction of MainCtx
    //         and after the initialization of the hardware.
    unsafe { avr_device::interrupt::enable() };

    loop {
        // Radio events are handled in here, too.
        // Dropped reports are counted and logged by the station.
        let _ = STATION.run(&m, &SENSORS, sp);
        set_tx_led(hp, STATION.tx_active(&m));
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    halt()
}

// vim: ts=4 sw=4 expandtab
