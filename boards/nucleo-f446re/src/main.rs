//! First mover: NUCLEO-F446RE.
//!
//! Announces a hand every 4 s once the user button is pressed, keeps the
//! score in backup SRAM and puts both boards into standby when the light
//! sensor goes dark.

#![no_std]
#![no_main]

#[macro_use]
mod pinout;

use core::fmt::Write;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::select::{select4, Either4};
use embassy_stm32::bind_interrupts;
use embassy_stm32::can::{
    Can, CanRx, Rx0InterruptHandler, Rx1InterruptHandler, SceInterruptHandler, TxInterruptHandler,
};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::peripherals::{CAN1, PC13, PC4};
use embassy_time::{Delay, Duration, Instant, Ticker};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rps_bsp::backup_sram::BackupSram;
use rps_bsp::can_bus::{self, CanTransport};
use rps_bsp::diag::DiagUart;
use rps_bsp::power::Stm32Power;
use rps_common::config::{CAN_BITRATE, HAND_PERIOD_MS, SCORE_BLOCK_OFFSET};
use rps_common::first_mover::FirstMover;
use rps_common::persist::ScoreStore;
use rps_common::power::{prepare_resume_signal, PowerTransition};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    CAN1_RX0 => Rx0InterruptHandler<CAN1>;
    CAN1_RX1 => Rx1InterruptHandler<CAN1>;
    CAN1_SCE => SceInterruptHandler<CAN1>;
    CAN1_TX => TxInterruptHandler<CAN1>;
});

type Node = FirstMover<
    CanTransport<'static, 'static, CAN1>,
    BackupSram,
    SmallRng,
    DiagUart<'static>,
    Stm32Power,
>;

static CAN: StaticCell<Can<'static, CAN1>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let core = unwrap!(cortex_m::Peripherals::take());
    let p = embassy_stm32::init(Default::default());

    let sink = unwrap!(DiagUart::new(pinout!(p.diag_usart), pinout!(p.diag_tx)));

    let can = CAN.init(Can::new(
        pinout!(p.can),
        pinout!(p.can_rx),
        pinout!(p.can_tx),
        Irqs,
    ));
    can_bus::start(can, CAN_BITRATE).await;
    let (tx, rx) = can.split();

    let mut node: Node = unwrap!(FirstMover::boot(
        CanTransport::new(tx),
        ScoreStore::new(BackupSram::new(), SCORE_BLOCK_OFFSET),
        SmallRng::seed_from_u64(seed()),
        sink,
        PowerTransition::new(Stm32Power::new(core.SCB, false)),
    ));

    let peer_wake = Output::new(pinout!(p.peer_wake), Level::Low, Speed::Low);
    unwrap!(prepare_resume_signal(node.boot_cause(), peer_wake, &mut Delay));

    let start = ExtiInput::new(
        Input::new(pinout!(p.start_btn), Pull::None),
        pinout!(p.start_btn_exti),
    );
    let light = ExtiInput::new(
        Input::new(pinout!(p.light_lost), Pull::None),
        pinout!(p.light_lost_exti),
    );

    let _ = node.sink_mut().write_str("Nucleo initialization successful\r\n");
    info!("first mover up, boot cause {}", node.boot_cause());
    spawner.must_spawn(run_node(node, rx, start, light));
}

#[embassy_executor::task]
async fn run_node(
    mut node: Node,
    mut rx: CanRx<'static, 'static, CAN1>,
    mut start: ExtiInput<'static, PC13>,
    mut light: ExtiInput<'static, PC4>,
) {
    let mut cadence: Option<Ticker> = None;
    loop {
        let event = {
            let hand_due = async {
                match cadence.as_mut() {
                    Some(ticker) => ticker.next().await,
                    None => core::future::pending().await,
                }
            };
            select4(
                rx.read(),
                hand_due,
                start.wait_for_falling_edge(),
                light.wait_for_rising_edge(),
            )
            .await
        };

        let result = match event {
            Either4::First(Ok(envelope)) => match can_bus::from_bxcan(&envelope.frame) {
                Some(frame) => node.handle(&frame),
                None => Ok(()),
            },
            Either4::First(Err(e)) => {
                node.on_bus_fault(can_bus::bus_fault(e));
                Ok(())
            }
            Either4::Second(()) => node.on_period_elapsed(),
            Either4::Third(()) => {
                if node.on_start_button() {
                    cadence = Some(Ticker::every(Duration::from_millis(HAND_PERIOD_MS)));
                }
                Ok(())
            }
            Either4::Fourth(()) => node.on_light_lost(),
        };

        if let Err(e) = result {
            rps_bsp::trap(node.sink_mut(), e);
        }
    }
}

/// No RNG peripheral on the F446: seed the software generator from the
/// device ID and the time since reset.
fn seed() -> u64 {
    let mut seed = Instant::now().as_ticks();
    for chunk in embassy_stm32::uid::uid().chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        seed ^= u64::from_le_bytes(word);
    }
    seed
}
