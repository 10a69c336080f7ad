//! Calendar arithmetic and the calendar page's edit cursor.

use chrono::{Datelike, NaiveDate};
use watch_kernel::message::CalendarOp;
use watch_platform::RtcTime;

pub fn is_leap_year(year: u16) -> bool {
    NaiveDate::from_ymd_opt(i32::from(year), 1, 1).is_some_and(|date| date.leap_year())
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Day of week, 1..=7 with Monday as 1. Invalid dates yield `None`.
pub fn day_of_week(year: u16, month: u8, day: u8) -> Option<u8> {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .map(|date| date.weekday().number_from_monday() as u8)
}

/// Clamps the day to the month length and recomputes the day of week.
pub fn clamp_date(time: &mut RtcTime) {
    time.day = time.day.clamp(1, days_in_month(time.year, time.month));
    if let Some(dow) = day_of_week(time.year, time.month, time.day) {
        time.day_of_week = dow;
    }
}

/// Which date field the +/- buttons change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalendarEdit {
    /// +/- browse months without touching the clock.
    #[default]
    None,
    Year,
    Month,
    Day,
}

impl CalendarEdit {
    pub fn next(self) -> Self {
        match self {
            CalendarEdit::None => CalendarEdit::Year,
            CalendarEdit::Year => CalendarEdit::Month,
            CalendarEdit::Month => CalendarEdit::Day,
            CalendarEdit::Day => CalendarEdit::None,
        }
    }
}

/// Month shown by the calendar page plus the edit cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarView {
    pub year: u16,
    pub month: u8,
    pub edit: CalendarEdit,
}

impl Default for CalendarView {
    fn default() -> Self {
        Self {
            year: 2000,
            month: 1,
            edit: CalendarEdit::None,
        }
    }
}

impl CalendarView {
    /// Shows the month of `now`.
    pub fn sync(&mut self, now: &RtcTime) {
        self.year = now.year;
        self.month = now.month.clamp(1, 12);
    }

    /// Applies one calendar button to the view and, while editing, to `rtc`.
    ///
    /// Returns `true` if `rtc` was modified.
    pub fn apply(&mut self, op: CalendarOp, rtc: &mut RtcTime) -> bool {
        let forward = match op {
            CalendarOp::Edit => {
                self.edit = self.edit.next();
                if self.edit == CalendarEdit::Year {
                    self.sync(rtc);
                }
                return false;
            }
            CalendarOp::MonthPlus => true,
            CalendarOp::MonthMinus => false,
        };

        match self.edit {
            CalendarEdit::None => {
                self.browse(forward);
                false
            }
            CalendarEdit::Year => {
                rtc.year = if forward {
                    rtc.year.saturating_add(1)
                } else {
                    rtc.year.saturating_sub(1)
                };
                clamp_date(rtc);
                self.sync(rtc);
                true
            }
            CalendarEdit::Month => {
                rtc.month = match (forward, rtc.month.clamp(1, 12)) {
                    (true, 12) => 1,
                    (true, month) => month + 1,
                    (false, 1) => 12,
                    (false, month) => month - 1,
                };
                clamp_date(rtc);
                self.sync(rtc);
                true
            }
            CalendarEdit::Day => {
                let last = days_in_month(rtc.year, rtc.month);
                rtc.day = match (forward, rtc.day) {
                    (true, day) if day >= last => 1,
                    (true, day) => day + 1,
                    (false, day) if day <= 1 => last,
                    (false, day) => day - 1,
                };
                clamp_date(rtc);
                true
            }
        }
    }

    fn browse(&mut self, forward: bool) {
        match (forward, self.month.clamp(1, 12)) {
            (true, 12) => {
                self.month = 1;
                self.year = self.year.saturating_add(1);
            }
            (true, month) => self.month = month + 1,
            (false, 1) => {
                self.month = 12;
                self.year = self.year.saturating_sub(1);
            }
            (false, month) => self.month = month - 1,
        }
    }

    /// Day of week of the first day of the viewed month.
    pub fn first_weekday(&self) -> u8 {
        day_of_week(self.year, self.month, 1).unwrap_or(1)
    }
}
