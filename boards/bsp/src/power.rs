//! PWR controller access for standby entry and resume detection.
//!
//! Register bits are written raw: the wakeup-pin enable field is named
//! differently on the F407 and the F446, but sits at the same place.

use cortex_m::peripheral::SCB;
use embassy_stm32::pac;
use rps_common::power::PowerControl;

const CR_PDDS: u32 = 1 << 1;
const CR_CWUF: u32 = 1 << 2;
const CR_CSBF: u32 = 1 << 3;
pub(crate) const CR_DBP: u32 = 1 << 8;

const CSR_SBF: u32 = 1 << 1;
const CSR_BRR: u32 = 1 << 3;
const CSR_EWUP: u32 = 1 << 8;
const CSR_BRE: u32 = 1 << 9;

/// Turn on the PWR peripheral clock. Needed before any PWR register access.
pub(crate) fn enable_clock() {
    pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
}

pub struct Stm32Power {
    scb: SCB,
    wake_pin: bool,
}

impl Stm32Power {
    /// `wake_pin` selects whether standby is left on a rising edge of the
    /// WKUP pin (PA0) in addition to reset.
    pub fn new(scb: SCB, wake_pin: bool) -> Self {
        enable_clock();
        Self { scb, wake_pin }
    }
}

impl PowerControl for Stm32Power {
    fn standby_flag(&self) -> bool {
        pac::PWR.csr1().read().0 & CSR_SBF != 0
    }

    fn clear_wake_flags(&mut self) {
        pac::PWR.cr1().modify(|w| w.0 |= CR_CSBF | CR_CWUF);
    }

    fn arm_wake_source(&mut self) {
        if self.wake_pin {
            pac::PWR.csr1().modify(|w| w.0 |= CSR_EWUP);
        }
    }

    fn retain_backup_domain(&mut self) {
        pac::PWR.cr1().modify(|w| w.0 |= CR_DBP);
        pac::PWR.csr1().modify(|w| w.0 |= CSR_BRE);
        while pac::PWR.csr1().read().0 & CSR_BRR == 0 {}
    }

    fn enter_standby(&mut self) {
        defmt::info!("standby");
        pac::PWR.cr1().modify(|w| w.0 |= CR_PDDS);
        self.scb.set_sleepdeep();
        loop {
            cortex_m::asm::dsb();
            cortex_m::asm::wfi();
        }
    }
}
