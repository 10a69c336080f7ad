use watch_kernel::message::{
    HostResponse, Message, Mode, ResponseKind, StatusChange, StatusCode,
};
use watch_kernel::task::TaskId;
use watch_platform::mocks::{HostFrame, RecordingHostLink};
use watch_platform::PairingOp;

use super::TaskHarness;
use crate::host::HostBridge;

fn harness() -> (TaskHarness<HostBridge<RecordingHostLink>>, RecordingHostLink) {
    let link = RecordingHostLink::new();
    let harness = TaskHarness::start(TaskId::Host, HostBridge::new(link.clone()));
    (harness, link)
}

fn frame(kind: u8, options: u8, payload: &[u8]) -> HostFrame {
    HostFrame {
        kind,
        options,
        payload: payload.to_vec(),
    }
}

#[test]
fn outbound_messages_become_frames() {
    let (mut harness, link) = harness();
    harness.deliver(Message::StatusChangeEvent(StatusChange {
        mode: Mode::Notification,
        status: StatusCode::ModeTimeout,
    }));
    harness.deliver(Message::ButtonEventToHost(4));
    harness.deliver(Message::CallbackTimeout(9));
    harness.deliver(Message::Response(
        HostResponse::new(ResponseKind::DeviceType, &[2]).unwrap(),
    ));

    assert_eq!(
        link.frames(),
        vec![
            frame(0x60, 2, &[2]),
            frame(0x62, 4, &[]),
            frame(0x63, 9, &[]),
            frame(0x02, 0, &[2]),
        ]
    );
    assert_eq!(harness.task.counters(), (4, 0));
}

#[test]
fn radio_and_pairing_requests() {
    let (mut harness, link) = harness();
    harness.deliver(Message::TurnRadioOn);
    harness.deliver(Message::TurnRadioOff);
    harness.deliver(Message::PairingControl(PairingOp::SaveSpp));
    harness.deliver(Message::PairingControl(PairingOp::ToggleSsp));

    assert_eq!(link.radio_power(), vec![true, false]);
    assert_eq!(link.pairing_ops(), vec![PairingOp::SaveSpp, PairingOp::ToggleSsp]);
    assert!(link.frames().is_empty());
}

#[test]
fn link_failures_are_counted_and_dropped() {
    let (mut harness, link) = harness();
    link.set_failing(true);
    harness.deliver(Message::ButtonEventToHost(0));
    assert_eq!(harness.task.counters(), (0, 1));

    link.set_failing(false);
    harness.deliver(Message::ButtonEventToHost(1));
    assert_eq!(link.frames(), vec![frame(0x62, 1, &[])]);
}
