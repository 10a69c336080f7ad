//! The four tasks assembled on one kernel over the platform mocks.

use watch_display::IdlePage;
use watch_kernel::message::{MenuOption, Message, Mode, NvalOp, NvalRequest};
use watch_kernel::{Button, KernelConfig, PressKind};
use watch_platform::mocks::{FakeHardware, MemoryNvStore, RecordingHostLink, RecordingRenderer};
use watch_platform::{NvId, RtcTime};
use watch_services::{Collaborators, WatchSystem, ALARM_PATTERN};

struct Rig {
    system: WatchSystem,
    nv: MemoryNvStore,
    hardware: FakeHardware,
    link: RecordingHostLink,
}

fn rig_with(nv: MemoryNvStore, hardware: FakeHardware) -> Rig {
    let link = RecordingHostLink::new();
    let system = WatchSystem::assemble(
        KernelConfig::default(),
        Collaborators {
            nv: nv.clone(),
            renderer: RecordingRenderer::new(),
            hardware: hardware.clone(),
            link: link.clone(),
        },
    )
    .unwrap();
    system.start().unwrap();
    Rig {
        system,
        nv,
        hardware,
        link,
    }
}

fn rig() -> Rig {
    rig_with(MemoryNvStore::new(), FakeHardware::new())
}

fn advance(rig: &Rig, seconds: u32) {
    for _ in 0..seconds {
        rig.system.tick();
    }
}

#[test]
fn boots_to_the_idle_screen() {
    let rig = rig();
    assert_eq!(rig.link.radio_power(), vec![true]);

    advance(&rig, 3);
    assert!(rig.system.display().mode.is_idle_on(IdlePage::Normal));
    assert_eq!(rig.system.pool_stats().used, 0);
}

#[test]
fn timers_fit_the_default_pool() {
    let rig = rig();
    // Display two, background three, alarm one.
    assert_eq!(rig.system.kernel().timers().allocated(), 6);
}

#[test]
fn two_alarms_at_the_same_minute_vibrate_once() {
    let nv = MemoryNvStore::new();
    for slot in [3, 6] {
        nv.preset(NvId::ALARM_ON.offset(slot), 1, 1);
        nv.preset(NvId::ALARM_HOUR.offset(slot), 1, 7);
        nv.preset(NvId::ALARM_MINUTE.offset(slot), 1, 30);
    }
    let hardware = FakeHardware::new();
    hardware.set_time(RtcTime::new(2024, 6, 3, 7, 29, 58));
    let rig = rig_with(nv, hardware);

    advance(&rig, 4);
    assert!(rig.hardware.vibrations().is_empty());

    rig.hardware.set_time(RtcTime::new(2024, 6, 3, 7, 30, 2));
    advance(&rig, 10);
    assert_eq!(rig.hardware.vibrations(), vec![ALARM_PATTERN]);
}

#[test]
fn application_mode_round_trip_reports_to_the_host() {
    let rig = rig();
    advance(&rig, 3);
    rig.link.take_frames();

    rig.system.route(Message::ChangeMode(Mode::Application)).unwrap();
    rig.system.press(Button::A, PressKind::Pressed).unwrap();
    rig.system.route(Message::ChangeMode(Mode::Idle)).unwrap();

    let kinds: Vec<(u8, u8)> = rig
        .link
        .take_frames()
        .into_iter()
        .map(|frame| (frame.kind, frame.options))
        .collect();
    assert_eq!(kinds, vec![(0x60, 1), (0x62, 0), (0x60, 0)]);
}

#[test]
fn menu_exit_persists_through_the_store() {
    let rig = rig();
    advance(&rig, 3);
    rig.system.route(Message::MenuMode(MenuOption::Settings)).unwrap();
    rig.system.press(Button::A, PressKind::Immediate).unwrap();
    rig.system.press(Button::C, PressKind::Immediate).unwrap();

    assert_eq!(rig.nv.value(NvId::IDLE_BUFFER_INVERT), Some(1));
    assert_eq!(rig.nv.save_count(NvId::ALARM_ON.offset(0)), 1);
    assert!(rig.system.display().settings.invert);
}

#[test]
fn host_nv_write_reaches_the_display() {
    let rig = rig();
    advance(&rig, 3);
    rig.system
        .route(Message::NvalOperation(NvalRequest {
            op: NvalOp::Write,
            id: NvId::NOTIFICATION_MODE_TIMEOUT,
            size: 2,
            data: 4u32.to_le_bytes(),
        }))
        .unwrap();
    assert_eq!(rig.system.display().settings.timeouts.notification, 4);

    rig.system.route(Message::ChangeMode(Mode::Notification)).unwrap();
    advance(&rig, 4);
    assert_eq!(rig.system.display().mode.current, Mode::Idle);
}

#[test]
fn led_button_lights_the_led_for_three_seconds() {
    let rig = rig();
    advance(&rig, 3);
    rig.system.press(Button::D, PressKind::Immediate).unwrap();
    assert!(rig.hardware.led());
    advance(&rig, 3);
    assert!(!rig.hardware.led());
}
