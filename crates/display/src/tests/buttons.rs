use watch_kernel::input::{Button, ButtonEvent, ButtonKey, ButtonMode, PressKind};
use watch_kernel::message::{LedAction, Message, MessageKind};

use crate::buttons::{ButtonEntry, ButtonTable};

fn key(mode: ButtonMode, button: Button, press: PressKind) -> ButtonKey {
    ButtonKey::new(mode, button, press)
}

#[test]
fn dispatch_uses_the_live_column() {
    let mut table = ButtonTable::new();
    table.enable(
        key(ButtonMode::Idle, Button::A, PressKind::Immediate),
        MessageKind::WatchStatus,
        0,
    );

    let event = ButtonEvent::new(Button::A, PressKind::Immediate);
    assert_eq!(table.dispatch(ButtonMode::Idle, event), Some(Message::WatchStatus));
    assert_eq!(table.dispatch(ButtonMode::WatchDrawn, event), None);
    assert_eq!(
        table.dispatch(ButtonMode::Idle, ButtonEvent::new(Button::A, PressKind::Pressed)),
        None
    );
}

#[test]
fn enable_overwrites() {
    let mut table = ButtonTable::new();
    let k = key(ButtonMode::Scroll, Button::D, PressKind::Pressed);
    table.enable(k, MessageKind::LedChange, LedAction::On as u8);
    table.enable(k, MessageKind::LedChange, LedAction::Off as u8);

    assert_eq!(
        table.dispatch(ButtonMode::Scroll, ButtonEvent::new(Button::D, PressKind::Pressed)),
        Some(Message::LedChange(LedAction::Off))
    );
    assert_eq!(table.enabled_in(ButtonMode::Scroll).count(), 1);
}

#[test]
fn disable_keeps_the_entry_for_restore() {
    let mut table = ButtonTable::new();
    let k = key(ButtonMode::Application, Button::B, PressKind::LongHold);
    table.enable(k, MessageKind::ButtonEventToHost, 1);
    let saved = table.read_config(k);

    table.disable(k);
    assert_eq!(table.lookup(k), None);
    assert_eq!(
        table.read_config(k),
        Some(ButtonEntry {
            kind: MessageKind::ButtonEventToHost,
            options: 1,
            enabled: false,
        })
    );

    table.restore(k, saved);
    assert!(table.lookup(k).is_some());
}

#[test]
fn disabling_an_empty_key_is_harmless() {
    let mut table = ButtonTable::new();
    let k = key(ButtonMode::Notification, Button::F, PressKind::Deferred);
    table.disable(k);
    assert_eq!(table.read_config(k), None);
}

#[test]
fn reset_mode_only_touches_its_column() {
    let mut table = ButtonTable::new();
    for mode in ButtonMode::ALL {
        table.enable(key(*mode, Button::C, PressKind::Immediate), MessageKind::IdleUpdate, 0);
    }
    table.reset_mode(ButtonMode::WatchDrawn);

    assert_eq!(table.enabled_in(ButtonMode::WatchDrawn).count(), 0);
    assert_eq!(table.enabled_in(ButtonMode::Idle).count(), 1);
}

#[test]
fn invalid_binding_dispatches_nothing() {
    let mut table = ButtonTable::new();
    // MenuMode needs a valid menu option.
    table.enable(
        key(ButtonMode::Idle, Button::E, PressKind::Immediate),
        MessageKind::MenuMode,
        0x7f,
    );
    assert_eq!(
        table.dispatch(ButtonMode::Idle, ButtonEvent::new(Button::E, PressKind::Immediate)),
        None
    );
}

#[test]
fn response_bytes_hide_disabled_entries() {
    let k = key(ButtonMode::Idle, Button::B, PressKind::Pressed);
    let entry = ButtonEntry {
        kind: MessageKind::ShowCalendar,
        options: 3,
        enabled: true,
    };
    assert_eq!(ButtonEntry::response_bytes(k, Some(entry)), [0, 1, 1, 0x24, 3]);
    assert_eq!(
        ButtonEntry::response_bytes(k, Some(ButtonEntry { enabled: false, ..entry })),
        [0, 1, 1, 0, 0]
    );
    assert_eq!(ButtonEntry::response_bytes(k, None), [0, 1, 1, 0, 0]);
}
