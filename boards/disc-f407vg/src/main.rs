//! Referee: STM32F4DISCOVERY (F407VG).
//!
//! Answers each announced hand with its own draw and the round outcome,
//! shows the outcome on the four user LEDs, and asks the first mover for the
//! score when the user button is held.

#![no_std]
#![no_main]

#[macro_use]
mod pinout;
mod calendar;

use core::fmt::Write;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::bind_interrupts;
use embassy_stm32::can::{
    Can, CanRx, Rx0InterruptHandler, Rx1InterruptHandler, SceInterruptHandler, TxInterruptHandler,
};
use embassy_stm32::gpio::{AnyPin, Input, Level, Output, Pin as _, Pull, Speed};
use embassy_stm32::peripherals::{CAN1, PA0, RNG};
use embassy_stm32::rcc::LsConfig;
use embassy_stm32::rng::{self, Rng};
use embassy_stm32::rtc::{DayOfWeek, Rtc, RtcConfig};
use embassy_time::{Duration, Ticker, Timer};
use rps_bsp::can_bus::{self, CanTransport};
use rps_bsp::diag::DiagUart;
use rps_bsp::power::Stm32Power;
use rps_common::config::{CAN_BITRATE, FAULT_BLINK_MS, INITIAL_DATETIME, SAMPLE_TICK_MS};
use rps_common::platform::IndicatorBank;
use rps_common::power::PowerTransition;
use rps_common::referee::Referee;
use rps_common::Error;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::calendar::RtcCalendar;

bind_interrupts!(struct Irqs {
    CAN1_RX0 => Rx0InterruptHandler<CAN1>;
    CAN1_RX1 => Rx1InterruptHandler<CAN1>;
    CAN1_SCE => SceInterruptHandler<CAN1>;
    CAN1_TX => TxInterruptHandler<CAN1>;
    RNG => rng::InterruptHandler<RNG>;
});

type Node = Referee<
    CanTransport<'static, 'static, CAN1>,
    Rng<'static, RNG>,
    Output<'static, AnyPin>,
    RtcCalendar,
    DiagUart<'static>,
    Stm32Power,
>;

static CAN: StaticCell<Can<'static, CAN1>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let core = unwrap!(cortex_m::Peripherals::take());
    let mut config = embassy_stm32::Config::default();
    config.rcc.ls = LsConfig::default_lsi();
    let p = embassy_stm32::init(config);

    let mut sink = unwrap!(DiagUart::new(pinout!(p.diag_usart), pinout!(p.diag_tx)));

    // 2020-02-01 was a Saturday.
    let rtc = Rtc::new(p.RTC, RtcConfig::default());
    let Ok(calendar) = RtcCalendar::start(rtc, INITIAL_DATETIME, DayOfWeek::Saturday) else {
        let _ = sink.write_str("RTC SetTime error\r\n");
        rps_bsp::trap(&mut sink, Error::Calendar);
    };

    let can = CAN.init(Can::new(
        pinout!(p.can),
        pinout!(p.can_rx),
        pinout!(p.can_tx),
        Irqs,
    ));
    can_bus::start(can, CAN_BITRATE).await;
    let (tx, rx) = can.split();

    let leds = IndicatorBank::new([
        Output::new(pinout!(p.led_first_mover).degrade(), Level::Low, Speed::Low),
        Output::new(pinout!(p.led_referee).degrade(), Level::Low, Speed::Low),
        Output::new(pinout!(p.led_tie).degrade(), Level::Low, Speed::Low),
        Output::new(pinout!(p.led_error).degrade(), Level::Low, Speed::Low),
    ]);

    let mut node: Node = Referee::boot(
        CanTransport::new(tx),
        Rng::new(p.RNG, Irqs),
        leds,
        calendar,
        sink,
        PowerTransition::new(Stm32Power::new(core.SCB, true)),
    );

    let stats_btn = Input::new(pinout!(p.stats_btn), Pull::None);

    let _ = node.sink_mut().write_str("Disc initialization successful\r\n");
    info!("referee up, boot cause {}", node.boot_cause());
    spawner.must_spawn(run_node(node, rx, stats_btn));
}

#[embassy_executor::task]
async fn run_node(
    mut node: Node,
    mut rx: CanRx<'static, 'static, CAN1>,
    stats_btn: Input<'static, PA0>,
) {
    let mut sample = Ticker::every(Duration::from_millis(SAMPLE_TICK_MS));
    loop {
        let result = match select(rx.read(), sample.next()).await {
            Either::First(Ok(envelope)) => match can_bus::from_bxcan(&envelope.frame) {
                Some(frame) => node.handle(&frame),
                None => Ok(()),
            },
            Either::First(Err(e)) => {
                node.on_bus_fault(can_bus::bus_fault(e));
                Ok(())
            }
            Either::Second(()) => node.on_tick(stats_btn.is_high()),
        };

        if let Err(e) = result {
            crash(&mut node, e).await;
        }
    }
}

/// Report `err` and blink the error LED forever.
async fn crash(node: &mut Node, err: Error) -> ! {
    rps_bsp::report(node.sink_mut(), err);
    loop {
        let _ = node.fault_blink();
        Timer::after_millis(FAULT_BLINK_MS).await;
    }
}
