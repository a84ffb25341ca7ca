//! Blocking USART2 diagnostic sink, 115200 8N1, TX only.

use core::fmt;

use embassy_stm32::dma::NoDma;
use embassy_stm32::peripherals::{PA2, USART2};
use embassy_stm32::usart::{Config, ConfigError, UartTx};
use rps_common::config::DIAG_BAUDRATE;

pub struct DiagUart<'d> {
    tx: UartTx<'d, USART2, NoDma>,
}

impl<'d> DiagUart<'d> {
    pub fn new(usart: USART2, pin: PA2) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.baudrate = DIAG_BAUDRATE;
        let tx = UartTx::new(usart, pin, NoDma, config)?;
        Ok(Self { tx })
    }
}

impl fmt::Write for DiagUart<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.blocking_write(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
