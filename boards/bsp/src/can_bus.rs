//! bxCAN transport.

use embassy_stm32::can::bxcan::filter::Mask32;
use embassy_stm32::can::bxcan::{self, Data, Fifo, Id, StandardId};
use embassy_stm32::can::{BusError, BxcanInstance, Can, CanTx, Instance, TryWriteError};
use rps_common::transport::{BusFault, BusTransport};
use rps_common::{Frame, Identifier, TransportError};

/// Accept every identifier into FIFO0, enable automatic retransmission and
/// bring the controller onto the bus.
pub async fn start<'d, T: Instance>(can: &mut Can<'d, T>, bitrate: u32)
where
    BxcanInstance<'d, T>: bxcan::FilterOwner,
{
    can.as_mut()
        .modify_filters()
        .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    can.as_mut()
        .modify_config()
        .set_loopback(false)
        .set_silent(false)
        .set_automatic_retransmit(true)
        .leave_disabled();
    can.set_bitrate(bitrate);
    can.enable().await;
    defmt::info!("can up at {=u32} bit/s", bitrate);
}

pub struct CanTransport<'c, 'd, T: Instance> {
    tx: CanTx<'c, 'd, T>,
}

impl<'c, 'd, T: Instance> CanTransport<'c, 'd, T> {
    pub fn new(tx: CanTx<'c, 'd, T>) -> Self {
        Self { tx }
    }
}

impl<T: Instance> BusTransport for CanTransport<'_, '_, T> {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let raw = to_bxcan(frame).ok_or(TransportError::Rejected)?;
        match self.tx.try_write(&raw) {
            Ok(_) => Ok(()),
            Err(TryWriteError::Full) => Err(TransportError::NoFreeMailbox),
        }
    }
}

pub fn to_bxcan(frame: &Frame) -> Option<bxcan::Frame> {
    let id = StandardId::new(frame.id().raw())?;
    if frame.is_remote() {
        Some(bxcan::Frame::new_remote(id, frame.dlc()))
    } else {
        Some(bxcan::Frame::new_data(id, Data::new(frame.payload())?))
    }
}

/// `None` for extended identifiers; those never match the message table.
pub fn from_bxcan(raw: &bxcan::Frame) -> Option<Frame> {
    let Id::Standard(std_id) = raw.id() else {
        return None;
    };
    let id = Identifier::new(std_id.as_raw())?;
    let frame = if raw.is_remote_frame() {
        Frame::new_remote(id, raw.dlc())
    } else {
        let data = raw.data().map_or(&[][..], |d| &d[..]);
        Frame::new_data(id, data)
    };
    frame.ok()
}

pub fn bus_fault(err: BusError) -> BusFault {
    match err {
        BusError::Stuff => BusFault::Stuff,
        BusError::Form => BusFault::Form,
        BusError::Acknowledge => BusFault::Acknowledge,
        BusError::BitRecessive => BusFault::BitRecessive,
        BusError::BitDominant => BusFault::BitDominant,
        BusError::Crc => BusFault::Crc,
        BusError::Software => BusFault::Software,
        BusError::BusOff => BusFault::BusOff,
        BusError::BusPassive => BusFault::BusPassive,
        BusError::BusWarning => BusFault::BusWarning,
    }
}
