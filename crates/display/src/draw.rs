//! What each page puts on screen, in renderer terms.

use core::fmt::Write;

use heapless::String;
use watch_kernel::message::AlarmSlot;
use watch_platform::render::{IDLE_TOP_ROWS, NUM_LCD_ROWS};
use watch_platform::{
    BatteryStatus, Font, Image, RadioState, RadioStatus, Renderer, RtcTime, TextStyle,
};

use crate::calendar::{days_in_month, CalendarEdit, CalendarView};
use crate::mode::IdlePage;
use crate::settings::{DateFormat, DisplaySettings, TimeFormat};

type Text = String<24>;

const ICON_ROWS: u8 = 32;
const ICON_TOP: u8 = 0;
const ICON_MIDDLE: u8 = 32;
const ICON_BOTTOM: u8 = 64;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const DAY_LETTERS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn text(args: core::fmt::Arguments<'_>) -> Text {
    let mut out = Text::new();
    // Every string drawn here is shorter than the buffer; overflow truncates.
    let _ = out.write_fmt(args);
    out
}

pub fn splash<R: Renderer>(r: &mut R) {
    r.blit_image(Image::Splash, 0, NUM_LCD_ROWS);
    r.present(NUM_LCD_ROWS);
}

/// `hh:mm[:ss]` in the configured format, plus AM/PM in 12 hour mode when
/// seconds are hidden.
pub fn time_string(
    rtc: &RtcTime,
    settings: &DisplaySettings,
    seconds: bool,
) -> (Text, Option<&'static str>) {
    let (hour, suffix) = match settings.time_format {
        TimeFormat::TwentyFourHour => (rtc.hour, None),
        TimeFormat::TwelveHour => {
            let hour = match rtc.hour {
                0 => 12,
                h if h > 12 => h - 12,
                h => h,
            };
            (hour, Some(if rtc.hour >= 12 { "PM" } else { "AM" }))
        }
    };
    let time = match (seconds, settings.time_format) {
        (true, _) => text(format_args!("{hour:02}:{:02}:{:02}", rtc.minute, rtc.second)),
        (false, TimeFormat::TwelveHour) => text(format_args!("{hour:>2}:{:02}", rtc.minute)),
        (false, TimeFormat::TwentyFourHour) => text(format_args!("{hour:02}:{:02}", rtc.minute)),
    };
    (time, if seconds { None } else { suffix })
}

pub fn date_string(rtc: &RtcTime, format: DateFormat) -> Text {
    match format {
        DateFormat::MonthFirst => text(format_args!("{:02}/{:02}", rtc.month, rtc.day)),
        DateFormat::DayFirst => text(format_args!("{:02}/{:02}", rtc.day, rtc.month)),
    }
}

fn battery_icon(battery: &BatteryStatus) -> Image {
    if battery.charging {
        Image::BatteryCharging
    } else if battery.average_mv > BatteryStatus::FULL_MV {
        Image::BatteryFull
    } else if battery.average_mv < BatteryStatus::LOW_MV {
        Image::BatteryLow
    } else {
        Image::BatteryNormal
    }
}

fn draw_time<R: Renderer>(
    r: &mut R,
    row: u8,
    rtc: &RtcTime,
    settings: &DisplaySettings,
    seconds: bool,
) {
    let (time, suffix) = time_string(rtc, settings, seconds);
    r.draw_text(row, 0, Font::Time, &time, TextStyle::Normal);
    if let Some(suffix) = suffix {
        r.draw_text(row, 70, Font::Small, suffix, TextStyle::Normal);
    }
}

/// The watch-drawn top of the idle screen: time, day, date and a battery
/// warning icon when charging or low.
pub fn idle_top<R: Renderer>(
    r: &mut R,
    rtc: &RtcTime,
    settings: &DisplaySettings,
    battery: &BatteryStatus,
) {
    r.clear_region(0, IDLE_TOP_ROWS);
    draw_time(r, 6, rtc, settings, settings.seconds);

    match battery_icon(battery) {
        icon @ (Image::BatteryCharging | Image::BatteryLow) => r.blit_image(icon, 0, 10),
        _ => {}
    }
    if !settings.seconds {
        let day = usize::from(rtc.day_of_week.clamp(1, 7) - 1);
        r.draw_text(6, 80, Font::Small, DAY_NAMES[day], TextStyle::Normal);
        let date = date_string(rtc, settings.date_format);
        r.draw_text(18, 80, Font::Small, &date, TextStyle::Normal);
    }
    r.present(IDLE_TOP_ROWS);
}

/// Idle screen variant shown while the phone is not connected.
pub fn radio_page<R: Renderer>(
    r: &mut R,
    page: IdlePage,
    rtc: &RtcTime,
    settings: &DisplaySettings,
    battery: &BatteryStatus,
) {
    idle_top(r, rtc, settings, battery);
    let icon = match page {
        IdlePage::RadioOnPairing => Image::PairingOn,
        IdlePage::BluetoothOff => Image::BluetoothOff,
        _ => Image::PairingOff,
    };
    r.clear_region(IDLE_TOP_ROWS, NUM_LCD_ROWS - IDLE_TOP_ROWS);
    r.blit_image(icon, IDLE_TOP_ROWS, NUM_LCD_ROWS - IDLE_TOP_ROWS);
    r.present(NUM_LCD_ROWS);
}

pub fn watch_status<R: Renderer>(r: &mut R, radio: &RadioStatus, battery: &BatteryStatus) {
    r.clear_region(0, NUM_LCD_ROWS);
    r.blit_image(
        if radio.bluetooth_on() {
            Image::BluetoothOn
        } else {
            Image::BluetoothOff
        },
        0,
        ICON_ROWS,
    );
    r.blit_image(
        if radio.connected() {
            Image::PhoneConnected
        } else {
            Image::PhoneDisconnected
        },
        0,
        ICON_ROWS,
    );
    r.blit_image(battery_icon(battery), 0, ICON_ROWS);

    let mv = battery.average_mv;
    let voltage = text(format_args!("{}.{:03}", mv / 1000, mv % 1000));
    r.draw_text(29, 8, Font::Medium, &voltage, TextStyle::Normal);
    r.present(NUM_LCD_ROWS);
}

pub fn qr_code<R: Renderer>(r: &mut R) {
    r.clear_region(0, NUM_LCD_ROWS);
    r.blit_image(Image::QrCode, 0, NUM_LCD_ROWS);
    r.present(NUM_LCD_ROWS);
}

/// Inputs of the menu pages.
pub struct MenuView<'a> {
    pub settings: &'a DisplaySettings,
    pub radio: &'a RadioStatus,
    pub alarm: &'a AlarmSlot,
    pub rtc: &'a RtcTime,
}

pub fn menu<R: Renderer>(r: &mut R, page: IdlePage, view: &MenuView<'_>) {
    r.clear_region(0, NUM_LCD_ROWS);
    match page {
        IdlePage::MenuMain => {
            let bluetooth = match view.radio.state {
                RadioState::Initializing => Image::PairingOff,
                _ if view.radio.bluetooth_on() => Image::BluetoothOn,
                _ => Image::BluetoothOff,
            };
            r.blit_image(bluetooth, ICON_TOP, ICON_ROWS);
            r.blit_image(Image::NextMenu, ICON_TOP, ICON_ROWS);
            r.blit_image(Image::NextMenu, ICON_MIDDLE, ICON_ROWS);
            r.blit_image(
                if view.settings.link_alarm {
                    Image::LinkAlarmOn
                } else {
                    Image::LinkAlarmOff
                },
                ICON_MIDDLE,
                ICON_ROWS,
            );
        }
        IdlePage::MenuSettings => {
            r.blit_image(Image::Reset, ICON_TOP, ICON_ROWS);
            r.blit_image(
                if view.settings.invert {
                    Image::InvertOn
                } else {
                    Image::InvertOff
                },
                ICON_TOP,
                ICON_ROWS,
            );
            r.blit_image(Image::NextMenu, ICON_MIDDLE, ICON_ROWS);
            r.blit_image(
                if view.settings.seconds {
                    Image::SecondsOn
                } else {
                    Image::SecondsOff
                },
                ICON_MIDDLE,
                ICON_ROWS,
            );
        }
        IdlePage::AlarmSettings => {
            let alarm = view.alarm;
            r.draw_text(6, 3, Font::Time, &text(format_args!("{}", alarm.slot)), TextStyle::Normal);
            r.draw_text(
                38,
                0,
                Font::Time,
                &text(format_args!("{:02}:{:02}", alarm.hour, alarm.minute)),
                TextStyle::Normal,
            );
            r.blit_image(Image::NextAlarm, ICON_TOP, ICON_ROWS);
            r.blit_image(
                if alarm.on { Image::AlarmOn } else { Image::AlarmOff },
                ICON_TOP,
                ICON_ROWS,
            );
        }
        IdlePage::TimeSettings => {
            r.blit_image(Image::Plus, ICON_TOP, ICON_ROWS);
            r.blit_image(Image::Minus, ICON_TOP, ICON_ROWS);
            let correction = view.settings.correction;
            let sign = match correction {
                0 => ' ',
                c if c > 0 => '+',
                _ => '-',
            };
            r.draw_text(
                6,
                3,
                Font::Time,
                &text(format_args!("{sign}{:02}", correction.unsigned_abs())),
                TextStyle::Normal,
            );
            draw_time(r, 38, view.rtc, view.settings, false);
        }
        other => log::warn!("{other:?} is not a menu page"),
    }
    r.blit_image(Image::Exit, ICON_BOTTOM, ICON_ROWS);
    r.present(NUM_LCD_ROWS);
}

pub fn calendar<R: Renderer>(r: &mut R, view: &CalendarView, rtc: &RtcTime) {
    let underline = |field: CalendarEdit| {
        if view.edit == field {
            TextStyle::Underlined
        } else {
            TextStyle::Normal
        }
    };

    r.clear_region(0, NUM_LCD_ROWS);
    let year = text(format_args!("{:04}", view.year));
    r.draw_text(4, 0, Font::Time, &year, underline(CalendarEdit::Year));
    let month = MONTH_NAMES[usize::from(view.month.clamp(1, 12) - 1)];
    r.draw_text(16, 7, Font::Small, month, underline(CalendarEdit::Month));

    for (index, letter) in DAY_LETTERS.iter().enumerate() {
        r.draw_text(26, index as u8 * 13 + 6, Font::Small, letter, TextStyle::Normal);
    }

    let mut row = 37;
    let mut weekday = view.first_weekday();
    for day in 1..=days_in_month(view.year, view.month) {
        let today = view.year == rtc.year && view.month == rtc.month && day == rtc.day;
        let style = match (today, view.edit) {
            (true, CalendarEdit::Day) => TextStyle::Underlined,
            (true, _) => TextStyle::Inverted,
            _ => TextStyle::Normal,
        };
        let col = (weekday - 1) * 13 + 4;
        r.draw_text(row, col, Font::Small, &text(format_args!("{day:>2}")), style);

        if weekday == 7 {
            weekday = 1;
            row += 10;
        } else {
            weekday += 1;
        }
    }
    r.present(NUM_LCD_ROWS);
}
