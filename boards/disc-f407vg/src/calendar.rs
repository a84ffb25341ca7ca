use embassy_stm32::rtc::{self, DayOfWeek, Rtc, RtcError};
use rps_common::platform::{Calendar, DateTime};

pub struct RtcCalendar {
    rtc: Rtc,
}

impl RtcCalendar {
    /// Take over the RTC and load `start` into it. `start` must fall on a
    /// `weekday`.
    pub fn start(rtc: Rtc, start: DateTime, weekday: DayOfWeek) -> Result<Self, ()> {
        let mut rtc = rtc;
        let value = rtc::DateTime::from(
            start.year,
            start.month,
            start.day,
            weekday,
            start.hour,
            start.minute,
            start.second,
        )
        .map_err(|_| ())?;
        rtc.set_datetime(value).map_err(|_| ())?;
        Ok(Self { rtc })
    }
}

impl Calendar for RtcCalendar {
    type Error = RtcError;

    fn now(&mut self) -> Result<DateTime, RtcError> {
        let t = self.rtc.now()?;
        Ok(DateTime {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        })
    }
}
