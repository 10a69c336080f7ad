//! Button bindings of every page.
//!
//! Each watch-drawn page lists the bindings it needs on top of the global
//! ones. Installing a page resets its whole button-table column first, so a
//! binding never leaks from one page into the next.

use watch_kernel::input::{Button, ButtonKey, ButtonMode, PressKind};
use watch_kernel::message::{
    CalendarOp, LedAction, MenuAction, MenuOption, MessageKind, ResetOption, SecondsOption,
    TimeAdjust,
};

use crate::buttons::ButtonTable;
use crate::mode::IdlePage;

/// One button binding within a column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub button: Button,
    pub press: PressKind,
    pub kind: MessageKind,
    pub options: u8,
}

const fn on_press(button: Button, kind: MessageKind, options: u8) -> Binding {
    Binding {
        button,
        press: PressKind::Immediate,
        kind,
        options,
    }
}

const fn menu(button: Button, option: MenuOption) -> Binding {
    on_press(button, MessageKind::MenuMode, option as u8)
}

const fn action(button: Button, action: MenuAction) -> Binding {
    on_press(button, MessageKind::MenuButton, action as u8)
}

const fn adjust(button: Button, adjust: TimeAdjust) -> Binding {
    on_press(button, MessageKind::ModifyTime, adjust as u8)
}

const fn calendar(button: Button, op: CalendarOp) -> Binding {
    on_press(button, MessageKind::Calendar, op as u8)
}

/// Bound in every column: the LED button and the master reset.
pub const GLOBAL: [Binding; 3] = [
    Binding {
        button: Button::D,
        press: PressKind::Pressed,
        kind: MessageKind::LedChange,
        options: LedAction::StartOffTimer as u8,
    },
    Binding {
        button: Button::D,
        press: PressKind::Immediate,
        kind: MessageKind::LedChange,
        options: LedAction::On as u8,
    },
    Binding {
        button: Button::F,
        press: PressKind::LongHold,
        kind: MessageKind::SoftwareReset,
        options: ResetOption::Master as u8,
    },
];

const NORMAL: &[Binding] = &[
    on_press(Button::F, MessageKind::WatchStatus, 0),
    on_press(Button::B, MessageKind::ShowCalendar, 0),
    menu(Button::E, MenuOption::Main),
    on_press(Button::A, MessageKind::ToggleSeconds, SecondsOption::UpdateIdle as u8),
];

const RADIO_PAIRING: &[Binding] = &[
    on_press(Button::F, MessageKind::WatchStatus, 0),
    on_press(Button::E, MessageKind::ShowCalendar, 0),
    menu(Button::C, MenuOption::Main),
    on_press(Button::B, MessageKind::ToggleSeconds, SecondsOption::UpdateIdle as u8),
    on_press(Button::A, MessageKind::BarCode, 0),
];

/// Radio off or no pairing info to show: the free buttons set the clock.
const RADIO_CLOCK: &[Binding] = &[
    adjust(Button::F, TimeAdjust::HourPlus),
    on_press(Button::E, MessageKind::ShowCalendar, 0),
    menu(Button::C, MenuOption::Main),
    adjust(Button::B, TimeAdjust::DayOfWeekPlus),
    adjust(Button::A, TimeAdjust::MinutePlus),
];

const MENU_MAIN: &[Binding] = &[
    menu(Button::F, MenuOption::AlarmSettings),
    action(Button::A, MenuAction::ToggleBluetooth),
    action(Button::C, MenuAction::Exit),
    menu(Button::B, MenuOption::Settings),
    action(Button::E, MenuAction::ToggleLinkAlarm),
];

const MENU_SETTINGS: &[Binding] = &[
    Binding {
        button: Button::F,
        press: PressKind::Pressed,
        kind: MessageKind::SoftwareReset,
        options: ResetOption::Normal as u8,
    },
    menu(Button::E, MenuOption::TimeSettings),
    action(Button::C, MenuAction::Exit),
    action(Button::A, MenuAction::InvertDisplay),
    action(Button::B, MenuAction::ToggleSecondsDisplay),
];

const ALARM_SETTINGS: &[Binding] = &[
    action(Button::F, MenuAction::NextAlarm),
    action(Button::E, MenuAction::AlarmHourPlus),
    action(Button::A, MenuAction::AlarmOnOff),
    action(Button::B, MenuAction::AlarmMinutePlus),
    action(Button::C, MenuAction::Exit),
];

const TIME_SETTINGS: &[Binding] = &[
    adjust(Button::F, TimeAdjust::CorrectionInc),
    adjust(Button::A, TimeAdjust::CorrectionDec),
    adjust(Button::B, TimeAdjust::MinutePlus),
    adjust(Button::E, TimeAdjust::HourPlus),
    action(Button::C, MenuAction::Exit),
];

const CALENDAR: &[Binding] = &[
    calendar(Button::A, CalendarOp::MonthMinus),
    calendar(Button::B, CalendarOp::MonthPlus),
    calendar(Button::F, CalendarOp::Edit),
    on_press(Button::C, MessageKind::IdleUpdate, 0),
];

const WATCH_STATUS: &[Binding] = &[
    on_press(Button::F, MessageKind::IdleUpdate, 0),
    on_press(Button::E, MessageKind::ShowCalendar, 0),
    menu(Button::C, MenuOption::Main),
    on_press(Button::A, MessageKind::BarCode, 0),
];

const QR_CODE: &[Binding] = &[
    on_press(Button::F, MessageKind::WatchStatus, 0),
    on_press(Button::E, MessageKind::ShowCalendar, 0),
    menu(Button::C, MenuOption::Main),
    on_press(Button::A, MessageKind::IdleUpdate, 0),
];

impl IdlePage {
    /// Page-specific bindings, installed after [`GLOBAL`].
    pub fn bindings(self) -> &'static [Binding] {
        match self {
            IdlePage::Normal => NORMAL,
            IdlePage::RadioOnPairing => RADIO_PAIRING,
            IdlePage::RadioOnNoPairing | IdlePage::BluetoothOff => RADIO_CLOCK,
            IdlePage::MenuMain => MENU_MAIN,
            IdlePage::MenuSettings => MENU_SETTINGS,
            IdlePage::AlarmSettings => ALARM_SETTINGS,
            IdlePage::TimeSettings => TIME_SETTINGS,
            IdlePage::Calendar => CALENDAR,
            IdlePage::WatchStatus => WATCH_STATUS,
            IdlePage::QrCode => QR_CODE,
        }
    }
}

fn apply(table: &mut ButtonTable, mode: ButtonMode, bindings: &[Binding]) {
    for binding in bindings {
        table.enable(
            ButtonKey::new(mode, binding.button, binding.press),
            binding.kind,
            binding.options,
        );
    }
}

/// Replaces the column of `page` with the global and page bindings.
pub fn install_page(table: &mut ButtonTable, page: IdlePage) {
    let mode = page.button_mode();
    table.reset_mode(mode);
    apply(table, mode, &GLOBAL);
    apply(table, mode, page.bindings());
}

/// Boot-time programming of every column other than the idle pages.
pub fn install_defaults(table: &mut ButtonTable) {
    for mode in ButtonMode::ALL {
        apply(table, *mode, &GLOBAL);
    }
    for mode in [ButtonMode::Application, ButtonMode::Notification, ButtonMode::Scroll] {
        for button in Button::ALL {
            table.enable(
                ButtonKey::new(mode, *button, PressKind::Pressed),
                MessageKind::ButtonEventToHost,
                u8::from(*button),
            );
        }
    }
}
