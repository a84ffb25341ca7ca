//! The 4 KB backup SRAM as an [`embedded_storage::Storage`].
//!
//! Contents survive standby as long as the backup regulator is on and are
//! lost on power-down.

use embassy_stm32::pac;
use embedded_storage::{ReadStorage, Storage};
use rps_common::config::BACKUP_SRAM_SIZE;

use crate::power::{enable_clock, CR_DBP};

const BKPSRAM_BASE: usize = 0x4002_4000;

#[derive(Debug, defmt::Format)]
pub struct OutOfRange;

pub struct BackupSram {
    _private: (),
}

impl BackupSram {
    /// Enable the backup SRAM clock. Writes additionally unlock the backup
    /// domain on first use.
    pub fn new() -> Self {
        pac::RCC.ahb1enr().modify(|w| w.set_bkpsramen(true));
        Self { _private: () }
    }

    fn check(offset: u32, len: usize) -> Result<usize, OutOfRange> {
        let start = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= BACKUP_SRAM_SIZE => Ok(start),
            _ => Err(OutOfRange),
        }
    }

    fn unlock() {
        enable_clock();
        pac::PWR.cr1().modify(|w| w.0 |= CR_DBP);
    }
}

impl Default for BackupSram {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStorage for BackupSram {
    type Error = OutOfRange;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), OutOfRange> {
        let start = Self::check(offset, bytes.len())?;
        let base = (BKPSRAM_BASE + start) as *const u8;
        for (i, b) in bytes.iter_mut().enumerate() {
            // SAFETY: in bounds of the backup SRAM, clock enabled in `new`.
            *b = unsafe { core::ptr::read_volatile(base.add(i)) };
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        BACKUP_SRAM_SIZE
    }
}

impl Storage for BackupSram {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), OutOfRange> {
        let start = Self::check(offset, bytes.len())?;
        Self::unlock();
        let base = (BKPSRAM_BASE + start) as *mut u8;
        for (i, &b) in bytes.iter().enumerate() {
            // SAFETY: in bounds of the backup SRAM, write access unlocked above.
            unsafe { core::ptr::write_volatile(base.add(i), b) };
        }
        Ok(())
    }
}
