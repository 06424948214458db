//! The MXF Timestamp compound: {year, month, day, hour, minute, second,
//! quarter-millisecond}.

use crate::error::{Error, Location, Result};
use crate::primitives::Reader;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// A TimeStamp value, wire size 9 bytes: year (u16), month, day, hour,
/// minute, second (u8 each), and quarter-millisecond (u8, 0-249).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub quarter_ms: u8,
}

impl Timestamp {
    pub const WIRE_SIZE: usize = 9;

    pub fn read(r: &mut Reader) -> Result<Self> {
        let year = r.u16()?;
        let month = r.u8()?;
        let day = r.u8()?;
        let hour = r.u8()?;
        let minute = r.u8()?;
        let second = r.u8()?;
        let quarter_ms = r.u8()?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            quarter_ms,
        })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.year.to_be_bytes());
        buf.extend_from_slice(&[
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.quarter_ms,
        ]);
    }

    pub fn from_chrono(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            quarter_ms: (dt.and_utc().timestamp_subsec_millis() / 4) as u8,
        }
    }

    pub fn to_chrono(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_milli_opt(
                self.hour as u32,
                self.minute as u32,
                self.second as u32,
                (self.quarter_ms as u32) * 4,
            ))
            .ok_or_else(|| {
                Error::semantic(Location::unknown(), "timestamp fields do not form a valid date/time")
            })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.quarter_ms as u32 * 4
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_wire() {
        let ts = Timestamp {
            year: 2024,
            month: 3,
            day: 14,
            hour: 9,
            minute: 26,
            second: 53,
            quarter_ms: 10,
        };
        let mut buf = Vec::new();
        ts.write(&mut buf);
        assert_eq!(buf.len(), Timestamp::WIRE_SIZE);
        let mut r = Reader::new(&buf, "test");
        assert_eq!(Timestamp::read(&mut r).unwrap(), ts);
    }

    #[test]
    fn chrono_round_trip() {
        let ts = Timestamp {
            year: 2023,
            month: 12,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            quarter_ms: 0,
        };
        let dt = ts.to_chrono().unwrap();
        assert_eq!(Timestamp::from_chrono(dt), ts);
    }
}
