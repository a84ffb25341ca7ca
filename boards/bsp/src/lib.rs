//! STM32F4 implementations of the `rps-common` seams, shared by both boards.
//!
//! The chip is picked by the board binary through its `embassy-stm32`
//! feature.

#![no_std]

pub mod backup_sram;
pub mod can_bus;
pub mod diag;
pub mod power;

use core::fmt::Write;

use rps_common::Error;

/// Print a fatal node error on the diagnostic sink and the developer log.
pub fn report<W: Write>(sink: &mut W, err: Error) {
    let _ = write!(sink, "Fatal error: {err:?}\r\n");
    defmt::error!("fatal: {}", err);
}

/// Report `err` and park the core.
pub fn trap<W: Write>(sink: &mut W, err: Error) -> ! {
    report(sink, err);
    loop {
        cortex_m::asm::wfi();
    }
}
