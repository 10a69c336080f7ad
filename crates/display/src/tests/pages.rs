use watch_kernel::input::{Button, ButtonEvent, ButtonKey, ButtonMode, PressKind};
use watch_kernel::message::{MenuAction, MenuOption, Message, MessageKind, TimeAdjust};

use crate::buttons::ButtonTable;
use crate::mode::IdlePage;
use crate::pages::{install_defaults, install_page, GLOBAL};

fn snapshot(table: &ButtonTable, mode: ButtonMode) -> Vec<(ButtonKey, MessageKind, u8)> {
    table
        .enabled_in(mode)
        .map(|(key, entry)| (key, entry.kind, entry.options))
        .collect()
}

#[test]
fn installing_a_page_twice_is_idempotent() {
    for page in IdlePage::ALL {
        let mut table = ButtonTable::new();
        install_page(&mut table, page);
        let first = snapshot(&table, page.button_mode());
        install_page(&mut table, page);
        assert_eq!(first, snapshot(&table, page.button_mode()), "{page:?}");
    }
}

#[test]
fn bindings_do_not_leak_between_pages() {
    let mut table = ButtonTable::new();
    install_page(&mut table, IdlePage::MenuMain);
    install_page(&mut table, IdlePage::Calendar);

    let mut fresh = ButtonTable::new();
    install_page(&mut fresh, IdlePage::Calendar);
    assert_eq!(
        snapshot(&table, ButtonMode::WatchDrawn),
        snapshot(&fresh, ButtonMode::WatchDrawn)
    );
}

#[test]
fn every_page_can_be_left() {
    for page in IdlePage::ALL {
        if page == IdlePage::Normal {
            continue;
        }
        let leaves = page.bindings().iter().any(|binding| match binding.kind {
            MessageKind::IdleUpdate | MessageKind::MenuMode => true,
            MessageKind::MenuButton => binding.options == MenuAction::Exit as u8,
            _ => false,
        });
        assert!(leaves, "{page:?} has no way out");
    }
}

#[test]
fn every_page_binding_is_dispatchable() {
    for page in IdlePage::ALL {
        let mut table = ButtonTable::new();
        install_page(&mut table, page);
        for binding in page.bindings() {
            let event = ButtonEvent::new(binding.button, binding.press);
            assert!(
                table.dispatch(page.button_mode(), event).is_some(),
                "{page:?} {binding:?}"
            );
        }
    }
}

#[test]
fn global_bindings_are_installed_on_every_page() {
    for page in IdlePage::ALL {
        let mut table = ButtonTable::new();
        install_page(&mut table, page);
        let global = GLOBAL.iter().filter(|binding| {
            table
                .lookup(ButtonKey::new(page.button_mode(), binding.button, binding.press))
                .is_some()
        });
        assert_eq!(global.count(), GLOBAL.len(), "{page:?}");
    }
}

#[test]
fn radio_pages_without_pairing_info_set_the_clock() {
    for page in [IdlePage::BluetoothOff, IdlePage::RadioOnNoPairing] {
        let mut table = ButtonTable::new();
        install_page(&mut table, page);
        let press = |button| {
            table.dispatch(ButtonMode::WatchDrawn, ButtonEvent::new(button, PressKind::Immediate))
        };
        assert_eq!(press(Button::F), Some(Message::ModifyTime(TimeAdjust::HourPlus)));
        assert_eq!(press(Button::A), Some(Message::ModifyTime(TimeAdjust::MinutePlus)));
        assert_eq!(press(Button::B), Some(Message::ModifyTime(TimeAdjust::DayOfWeekPlus)));
        assert_eq!(press(Button::E), Some(Message::ShowCalendar));
        assert_eq!(press(Button::C), Some(Message::MenuMode(MenuOption::Main)));
    }
}

#[test]
fn pairing_page_keeps_the_clock_read_only() {
    let adjusts = IdlePage::RadioOnPairing
        .bindings()
        .iter()
        .filter(|binding| binding.kind == MessageKind::ModifyTime);
    assert_eq!(adjusts.count(), 0);
}

#[test]
fn host_modes_report_every_button() {
    let mut table = ButtonTable::new();
    install_defaults(&mut table);

    for mode in [ButtonMode::Application, ButtonMode::Notification, ButtonMode::Scroll] {
        for button in Button::ALL {
            // The host report replaces the global LED binding on D.
            assert_eq!(
                table.dispatch(mode, ButtonEvent::new(*button, PressKind::Pressed)),
                Some(Message::ButtonEventToHost(u8::from(*button))),
                "{mode:?} {button:?}"
            );
        }
        let led = ButtonEvent::new(Button::D, PressKind::Immediate);
        assert!(table.dispatch(mode, led).is_some());
    }
}
