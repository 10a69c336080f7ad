//! Real-time clock fields as seen by the core.

/// Snapshot of the RTC registers.
///
/// `day_of_week` runs 1..=7 with Monday as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Default for RtcTime {
    fn default() -> Self {
        // 2000-01-01 was a Saturday.
        Self {
            year: 2000,
            month: 1,
            day: 1,
            day_of_week: 6,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl RtcTime {
    /// Length of the host wire representation.
    pub const WIRE_LEN: usize = 8;

    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            day_of_week: 0,
            hour,
            minute,
            second,
        }
    }

    pub fn with_day_of_week(mut self, day_of_week: u8) -> Self {
        self.day_of_week = day_of_week;
        self
    }

    /// Host layout: year (big endian), month, day, day of week, hour, minute, second.
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let [hi, lo] = self.year.to_be_bytes();
        [
            hi,
            lo,
            self.month,
            self.day,
            self.day_of_week,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Decodes the host layout. Fields outside the calendar yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::WIRE_LEN {
            return None;
        }
        let time = Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
            day_of_week: bytes[4],
            hour: bytes[5],
            minute: bytes[6],
            second: bytes[7],
        };
        time.is_valid().then_some(time)
    }

    /// Days in `month` of `year`, zero for a month outside 1..=12.
    pub const fn days_in_month(year: u16, month: u8) -> u8 {
        let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
        match month {
            2 if leap => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            1..=12 => 31,
            _ => 0,
        }
    }

    /// Every field within its calendar range.
    pub fn is_valid(&self) -> bool {
        (1..=Self::days_in_month(self.year, self.month)).contains(&self.day)
            && (1..=7).contains(&self.day_of_week)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}
