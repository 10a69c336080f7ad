use watch_kernel::input::{Button, ButtonKey, ButtonMode, PressKind};
use watch_kernel::message::{
    AlarmEdit, AlarmOp, AlarmSlot, CalendarOp, HostResponse, LedAction, MenuAction, MenuOption,
    Message, Mode, ResponseKind, StatusChange, StatusCode, TimeAdjust,
};
use watch_kernel::task::TaskId;
use watch_platform::mocks::{FakeHardware, MemoryNvStore};
use watch_platform::{Image, NvId, PairingOp, RadioState, RadioStatus, RtcTime};

use super::Harness;
use crate::calendar::CalendarEdit;
use crate::controller::{LINK_ALARM_PATTERN, WATCH_STATUS_SECONDS};
use crate::mode::IdlePage;

fn status(mode: Mode, status: StatusCode) -> Message {
    Message::StatusChangeEvent(StatusChange { mode, status })
}

fn with_app_timeout(seconds: u32) -> Harness {
    let nv = MemoryNvStore::new();
    nv.preset(NvId::APPLICATION_MODE_TIMEOUT, 2, seconds);
    let mut harness = Harness::with_nv(nv);
    harness.start();
    harness.tick(3);
    harness.take_sent();
    harness
}

#[test]
fn boot_shows_splash_and_turns_radio_on() {
    let mut harness = Harness::new();
    harness.start();

    assert_eq!(harness.renderer.images().first(), Some(&Image::Splash));
    assert_eq!(harness.sent_to(TaskId::Host), vec![Message::TurnRadioOn]);
    assert_eq!(harness.task.state().last_page, Some(IdlePage::Normal));

    // Connection changes during the splash do not redraw.
    harness.renderer.take();
    harness.deliver(Message::ConnectionStateChange);
    assert!(harness.renderer.ops().is_empty());
}

#[test]
fn splash_timeout_enters_the_radio_page() {
    let hardware = FakeHardware::new();
    hardware.set_radio(RadioStatus {
        state: RadioState::Off,
        discoverable: false,
    });
    let mut harness = Harness::with_parts(MemoryNvStore::new(), hardware);
    harness.start();
    harness.tick(2);
    assert_eq!(harness.task.state().page, IdlePage::Normal);

    harness.tick(1);
    assert_eq!(harness.task.state().page, IdlePage::BluetoothOff);
    assert_eq!(harness.task.state().button_mode(), ButtonMode::WatchDrawn);
}

#[test]
fn connected_splash_timeout_lands_on_normal() {
    let harness = Harness::booted();
    assert!(harness.task.state().is_idle_on(IdlePage::Normal));
    assert_eq!(harness.task.state().button_mode(), ButtonMode::Idle);
}

#[test]
fn connection_loss_redraws_the_idle_page() {
    let mut harness = Harness::booted();
    harness.hardware.set_radio(RadioStatus {
        state: RadioState::On,
        discoverable: true,
    });
    harness.deliver(Message::ConnectionStateChange);
    assert_eq!(harness.task.state().page, IdlePage::RadioOnPairing);

    harness.hardware.set_radio(RadioStatus {
        state: RadioState::Connected,
        discoverable: false,
    });
    harness.deliver(Message::ConnectionStateChange);
    assert_eq!(harness.task.state().page, IdlePage::Normal);
}

#[test]
fn menu_round_trip_saves_each_setting_once() {
    let mut harness = Harness::booted();
    harness.nv.reset_counters();

    harness.press(Button::E, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::MenuMain);

    harness.press(Button::B, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::MenuSettings);

    // Toggling only changes memory.
    harness.press(Button::A, PressKind::Immediate);
    harness.press(Button::B, PressKind::Immediate);
    assert!(harness.task.settings().invert);
    assert!(harness.task.settings().seconds);
    assert_eq!(harness.nv.total_saves(), 0);

    harness.press(Button::C, PressKind::Immediate);
    assert!(harness.task.state().is_idle_on(IdlePage::Normal));
    for id in [
        NvId::LINK_ALARM_ENABLE,
        NvId::RST_NMI_CONFIG,
        NvId::IDLE_BUFFER_INVERT,
        NvId::DISPLAY_SECONDS,
    ] {
        assert_eq!(harness.nv.save_count(id), 1, "{id:?}");
    }
    assert_eq!(harness.nv.value(NvId::IDLE_BUFFER_INVERT), Some(1));

    let sent = harness.take_sent();
    assert!(sent.contains(&Message::PairingControl(PairingOp::SaveSpp)));
    assert!(sent.contains(&Message::SaveAlarms));
}

#[test]
fn menu_toggles_route_radio_requests() {
    let mut harness = Harness::booted();
    harness.press(Button::E, PressKind::Immediate);
    harness.press(Button::A, PressKind::Immediate);
    assert_eq!(harness.take_sent(), vec![Message::TurnRadioOff]);

    harness.press(Button::E, PressKind::Immediate);
    assert!(!harness.task.settings().link_alarm);
}

#[test]
fn application_mode_times_out() {
    let mut harness = with_app_timeout(5);
    harness.deliver(Message::ChangeMode(Mode::Application));
    assert_eq!(
        harness.take_sent(),
        vec![status(Mode::Application, StatusCode::UpdateComplete)]
    );

    harness.tick(4);
    assert_eq!(harness.task.state().current, Mode::Application);
    assert!(harness.take_sent().is_empty());

    harness.tick(1);
    assert!(harness.task.state().is_idle_on(IdlePage::Normal));
    assert_eq!(
        harness.take_sent(),
        vec![status(Mode::Application, StatusCode::ModeTimeout)]
    );
}

#[test]
fn zero_timeout_never_returns_to_idle() {
    let mut harness = with_app_timeout(0);
    harness.deliver(Message::ChangeMode(Mode::Application));
    harness.take_sent();

    harness.tick(700);
    assert_eq!(harness.task.state().current, Mode::Application);
    assert!(harness.take_sent().is_empty());
}

#[test]
fn same_mode_change_is_silent() {
    let mut harness = Harness::booted();
    harness.deliver(Message::ChangeMode(Mode::Idle));
    assert!(harness.take_sent().is_empty());
    assert_eq!(harness.task.state().current, Mode::Idle);
}

#[test]
fn stale_timeout_is_ignored() {
    let mut harness = Harness::booted();
    harness.deliver(Message::ChangeMode(Mode::Notification));
    harness.take_sent();

    harness.deliver(Message::ModeTimeout(Mode::Application));
    assert_eq!(harness.task.state().current, Mode::Notification);
    assert!(harness.take_sent().is_empty());

    harness.deliver(Message::ChangeMode(Mode::Idle));
    harness.take_sent();
    harness.deliver(Message::ModeTimeout(Mode::Idle));
    assert!(harness.take_sent().is_empty());
}

#[test]
fn leaving_a_mode_cancels_its_timeout() {
    let mut harness = with_app_timeout(5);
    harness.deliver(Message::ChangeMode(Mode::Application));
    harness.tick(2);
    harness.deliver(Message::ChangeMode(Mode::Scroll));
    harness.take_sent();

    harness.tick(10);
    assert_eq!(harness.task.state().current, Mode::Scroll);
}

#[test]
fn application_buttons_go_to_the_host() {
    let mut harness = Harness::booted();
    harness.deliver(Message::ChangeMode(Mode::Application));
    harness.take_sent();

    harness.press(Button::B, PressKind::Pressed);
    harness.press(Button::B, PressKind::Immediate);
    assert_eq!(harness.take_sent(), vec![Message::ButtonEventToHost(1)]);
}

#[test]
fn global_bindings_work_everywhere() {
    let mut harness = Harness::booted();
    harness.press(Button::F, PressKind::LongHold);
    harness.deliver(Message::WatchStatus);
    harness.press(Button::D, PressKind::Immediate);

    let sent = harness.take_sent();
    assert_eq!(
        sent,
        vec![
            Message::SoftwareReset(watch_kernel::message::ResetOption::Master),
            Message::LedChange(LedAction::On),
        ]
    );
}

#[test]
fn page_entry_is_ignored_outside_idle() {
    let mut harness = Harness::booted();
    harness.deliver(Message::ChangeMode(Mode::Notification));
    harness.renderer.take();

    harness.deliver(Message::WatchStatus);
    harness.deliver(Message::MenuMode(MenuOption::Main));
    harness.deliver(Message::BarCode);
    assert!(harness.renderer.ops().is_empty());
    assert_eq!(harness.task.state().button_mode(), ButtonMode::Notification);
}

#[test]
fn idle_update_outside_idle_only_resets_the_page() {
    let mut harness = Harness::booted();
    harness.deliver(Message::WatchStatus);
    harness.deliver(Message::ChangeMode(Mode::Scroll));
    harness.renderer.take();

    harness.deliver(Message::IdleUpdate);
    assert_eq!(harness.task.state().page, IdlePage::Normal);
    assert!(harness.renderer.ops().is_empty());
}

#[test]
fn watch_status_refreshes_itself() {
    let mut harness = Harness::booted();
    harness.press(Button::F, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::WatchStatus);

    harness.renderer.take();
    harness.tick(WATCH_STATUS_SECONDS - 1);
    assert_eq!(harness.renderer.present_count(), 0);
    harness.tick(1);
    assert_eq!(harness.renderer.present_count(), 1);

    harness.press(Button::F, PressKind::Immediate);
    assert!(harness.task.state().is_idle_on(IdlePage::Normal));
}

#[test]
fn watch_status_leads_to_qr_code_and_back() {
    let mut harness = Harness::booted();
    harness.press(Button::F, PressKind::Immediate);
    harness.press(Button::A, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::QrCode);
    assert!(harness.renderer.images().contains(&Image::QrCode));

    harness.press(Button::A, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::Normal);
}

#[test]
fn calendar_edit_changes_the_clock() {
    let mut harness = Harness::booted();
    harness.hardware.set_time(RtcTime::new(2024, 2, 29, 12, 0, 0));

    harness.press(Button::B, PressKind::Immediate);
    assert_eq!(harness.task.state().page, IdlePage::Calendar);
    assert_eq!(harness.task.calendar().month, 2);

    harness.press(Button::F, PressKind::Immediate);
    assert_eq!(harness.task.calendar().edit, CalendarEdit::Year);
    harness.press(Button::B, PressKind::Immediate);

    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!((rtc.year, rtc.month, rtc.day), (2025, 2, 28));
    assert_eq!(harness.task.calendar().year, 2025);

    // Leaving the page drops the edit cursor.
    harness.press(Button::C, PressKind::Immediate);
    assert_eq!(harness.task.calendar().edit, CalendarEdit::None);
}

#[test]
fn calendar_browse_leaves_the_clock_alone() {
    let mut harness = Harness::booted();
    harness.hardware.set_time(RtcTime::new(2024, 12, 5, 8, 0, 0));
    harness.deliver(Message::ShowCalendar);
    harness.deliver(Message::Calendar(CalendarOp::MonthPlus));

    assert_eq!(
        (harness.task.calendar().year, harness.task.calendar().month),
        (2025, 1)
    );
    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!((rtc.year, rtc.month), (2024, 12));
}

#[test]
fn time_settings_adjust_clock_and_correction() {
    let mut harness = Harness::booted();
    harness.hardware.set_time(RtcTime::new(2024, 3, 10, 23, 59, 0));
    harness.deliver(Message::MenuMode(MenuOption::TimeSettings));
    harness.nv.reset_counters();

    harness.press(Button::E, PressKind::Immediate);
    harness.press(Button::B, PressKind::Immediate);
    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!((rtc.hour, rtc.minute), (0, 0));

    harness.press(Button::F, PressKind::Immediate);
    harness.press(Button::F, PressKind::Immediate);
    harness.press(Button::A, PressKind::Immediate);
    assert_eq!(harness.task.settings().correction, 1);
    assert_eq!(harness.hardware.correction(), 1);
    assert_eq!(harness.nv.save_count(NvId::RTC_CORRECTION), 3);
    assert_eq!(harness.nv.value(NvId::RTC_CORRECTION), Some(1));
}

#[test]
fn day_of_week_wraps_after_sunday() {
    let mut harness = Harness::booted();
    let mut time = RtcTime::new(2024, 3, 10, 9, 0, 0);
    time.day_of_week = 7;
    harness.hardware.set_time(time);

    harness.deliver(Message::ModifyTime(TimeAdjust::DayOfWeekPlus));
    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!(rtc.day_of_week, 1);
}

fn on_radio_page(radio: RadioStatus) -> Harness {
    let hardware = FakeHardware::new();
    hardware.set_radio(radio);
    let mut harness = Harness::with_parts(MemoryNvStore::new(), hardware);
    harness.start();
    harness.tick(3);
    harness.take_sent();
    harness
}

#[test]
fn radio_off_page_buttons_set_the_clock() {
    let mut harness = on_radio_page(RadioStatus {
        state: RadioState::Off,
        discoverable: false,
    });
    assert_eq!(harness.task.state().page, IdlePage::BluetoothOff);
    harness.hardware.set_time(RtcTime::new(2024, 3, 10, 23, 59, 0).with_day_of_week(7));
    harness.renderer.take();

    harness.press(Button::F, PressKind::Immediate);
    harness.press(Button::A, PressKind::Immediate);
    harness.press(Button::B, PressKind::Immediate);
    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!((rtc.hour, rtc.minute, rtc.day_of_week), (0, 0, 1));

    // Each adjustment redraws the page it was made on.
    assert_eq!(harness.task.state().page, IdlePage::BluetoothOff);
    let redraws = harness.renderer.images();
    assert_eq!(redraws.iter().filter(|image| **image == Image::BluetoothOff).count(), 3);
}

#[test]
fn pairing_page_buttons_open_status_and_code() {
    let pairing = RadioStatus {
        state: RadioState::On,
        discoverable: true,
    };
    for (button, page) in [
        (Button::F, IdlePage::WatchStatus),
        (Button::E, IdlePage::Calendar),
        (Button::C, IdlePage::MenuMain),
        (Button::A, IdlePage::QrCode),
    ] {
        let mut harness = on_radio_page(pairing);
        assert_eq!(harness.task.state().page, IdlePage::RadioOnPairing);
        harness.press(button, PressKind::Immediate);
        assert_eq!(harness.task.state().page, page, "{button:?}");
    }

    let mut harness = on_radio_page(pairing);
    harness.press(Button::B, PressKind::Immediate);
    assert!(harness.task.settings().seconds);
}

#[test]
fn page_local_messages_are_dropped_off_their_page() {
    let mut harness = Harness::booted();
    harness.hardware.set_time(RtcTime::new(2024, 3, 10, 9, 30, 0));
    harness.deliver(Message::MenuMode(MenuOption::Main));
    harness.deliver(Message::ChangeMode(Mode::Application));
    harness.renderer.take();
    harness.take_sent();

    harness.deliver(Message::MenuButton(MenuAction::ToggleLinkAlarm));
    harness.deliver(Message::MenuButton(MenuAction::ToggleBluetooth));
    harness.deliver(Message::Calendar(CalendarOp::MonthPlus));
    harness.deliver(Message::ModifyTime(TimeAdjust::HourPlus));

    assert!(harness.renderer.ops().is_empty());
    assert!(harness.take_sent().is_empty());
    assert!(harness.task.settings().link_alarm);
    assert_eq!(harness.task.state().page, IdlePage::MenuMain);
    assert_eq!(harness.task.state().button_mode(), ButtonMode::Application);
    let rtc = watch_platform::Hardware::rtc(&harness.hardware);
    assert_eq!((rtc.hour, rtc.minute), (9, 30));

    // Idle again, but on a page that binds neither.
    harness.deliver(Message::ChangeMode(Mode::Idle));
    harness.deliver(Message::MenuButton(MenuAction::InvertDisplay));
    harness.deliver(Message::Calendar(CalendarOp::Edit));
    assert!(!harness.task.settings().invert);
    assert_eq!(harness.task.calendar().edit, CalendarEdit::None);
    assert_eq!(watch_platform::Hardware::rtc(&harness.hardware).month, 3);
}

#[test]
fn secure_pairing_toggle_waits_for_the_radio() {
    let mut harness = Harness::booted();
    harness.deliver(Message::MenuMode(MenuOption::Main));
    harness.take_sent();

    harness.deliver(Message::MenuButton(MenuAction::ToggleSecureSimplePairing));
    assert_eq!(
        harness.take_sent(),
        vec![Message::PairingControl(PairingOp::ToggleSsp)]
    );

    harness.hardware.set_radio(RadioStatus {
        state: RadioState::Initializing,
        discoverable: false,
    });
    harness.deliver(Message::MenuButton(MenuAction::ToggleSecureSimplePairing));
    assert!(harness.take_sent().is_empty());
}

#[test]
fn rst_pin_toggle_is_saved_on_exit() {
    let mut harness = Harness::booted();
    harness.deliver(Message::MenuMode(MenuOption::Settings));
    harness.renderer.take();

    harness.deliver(Message::MenuButton(MenuAction::ToggleRstNmiPin));
    assert!(harness.task.settings().rst_pin);
    assert_eq!(harness.renderer.present_count(), 1);
    assert_eq!(harness.task.state().page, IdlePage::MenuSettings);

    harness.deliver(Message::MenuButton(MenuAction::Exit));
    assert_eq!(harness.nv.value(NvId::RST_NMI_CONFIG), Some(1));
}

#[test]
fn alarm_page_edits_go_through_the_alarm_task() {
    let mut harness = Harness::booted();
    harness.deliver(Message::MenuMode(MenuOption::AlarmSettings));
    assert_eq!(harness.take_sent(), vec![Message::QueryAlarm(0)]);

    harness.press(Button::A, PressKind::Immediate);
    assert_eq!(
        harness.take_sent(),
        vec![Message::AlarmEdit(AlarmEdit {
            slot: 0,
            op: AlarmOp::ToggleOn,
        })]
    );

    harness.press(Button::F, PressKind::Immediate);
    assert_eq!(harness.take_sent(), vec![Message::QueryAlarm(1)]);

    let reply = AlarmSlot {
        slot: 1,
        on: true,
        hour: 7,
        minute: 30,
    };
    harness.renderer.take();
    harness.deliver(Message::AlarmStatus(reply));
    assert_eq!(harness.task.status_handle().get().alarm, reply);
    assert!(harness.renderer.texts().iter().any(|text| text == "07:30"));

    // Replies for another slot are stale.
    harness.deliver(Message::AlarmStatus(AlarmSlot {
        slot: 4,
        ..reply
    }));
    assert_eq!(harness.task.status_handle().get().alarm.slot, 1);
}

#[test]
fn next_alarm_wraps_to_the_first_slot() {
    let mut harness = Harness::booted();
    harness.deliver(Message::MenuMode(MenuOption::AlarmSettings));
    for _ in 0..10 {
        harness.deliver(Message::MenuButton(MenuAction::NextAlarm));
    }
    assert_eq!(harness.take_sent().last(), Some(&Message::QueryAlarm(0)));
}

#[test]
fn link_alarm_follows_the_setting() {
    let mut harness = Harness::booted();
    harness.deliver(Message::LinkAlarm);
    assert_eq!(
        harness.take_sent(),
        vec![Message::SetVibrateMode(LINK_ALARM_PATTERN)]
    );

    harness.deliver(Message::MenuMode(MenuOption::Main));
    harness.deliver(Message::MenuButton(MenuAction::ToggleLinkAlarm));
    harness.deliver(Message::LinkAlarm);
    assert!(harness.take_sent().is_empty());
}

#[test]
fn host_reprograms_and_reads_buttons() {
    let mut harness = Harness::booted();
    let key = ButtonKey::new(ButtonMode::Idle, Button::C, PressKind::Pressed);
    harness.deliver(Message::EnableButton(watch_kernel::input::ButtonAction {
        key,
        kind: watch_kernel::message::MessageKind::ButtonEventToHost,
        options: 0x22,
    }));
    harness.press(Button::C, PressKind::Pressed);
    assert_eq!(harness.take_sent(), vec![Message::ButtonEventToHost(0x22)]);

    harness.deliver(Message::ReadButtonConfig(key));
    let expected = HostResponse::new(ResponseKind::ButtonConfig, &[0, 2, 1, 0x62, 0x22]).unwrap();
    assert_eq!(harness.take_sent(), vec![Message::Response(expected)]);

    harness.deliver(Message::DisableButton(key));
    harness.press(Button::C, PressKind::Pressed);
    assert!(harness.take_sent().is_empty());

    harness.deliver(Message::ReadButtonConfig(key));
    let expected = HostResponse::new(ResponseKind::ButtonConfig, &[0, 2, 1, 0, 0]).unwrap();
    assert_eq!(harness.take_sent(), vec![Message::Response(expected)]);
}

#[test]
fn rtc_redraw_follows_the_seconds_setting() {
    let mut harness = Harness::booted();
    harness.renderer.take();
    harness.tick(59);
    assert_eq!(harness.renderer.present_count(), 0);
    harness.tick(1);
    assert_eq!(harness.renderer.present_count(), 1);

    harness.press(Button::A, PressKind::Immediate);
    assert!(harness.task.settings().seconds);
    harness.renderer.take();
    harness.tick(3);
    assert_eq!(harness.renderer.present_count(), 3);
}

#[test]
fn nv_update_reloads_settings() {
    let mut harness = Harness::booted();
    harness.nv.preset(NvId::NOTIFICATION_MODE_TIMEOUT, 2, 7);
    harness.deliver(Message::NvUpdated(NvId::NOTIFICATION_MODE_TIMEOUT));
    assert_eq!(harness.task.settings().timeouts.notification, 7);

    harness.nv.preset(NvId::RTC_CORRECTION, 1, 0xfe);
    harness.deliver(Message::NvUpdated(NvId::RTC_CORRECTION));
    assert_eq!(harness.hardware.correction(), -2);
}

#[test]
fn status_handle_tracks_the_task() {
    let mut harness = Harness::booted();
    let handle = harness.task.status_handle();
    harness.deliver(Message::ChangeMode(Mode::Scroll));
    assert_eq!(handle.get().mode.current, Mode::Scroll);
    assert_eq!(handle.get().mode.last, Mode::Idle);
}
