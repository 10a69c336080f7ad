//! Host bridge: turns outbound messages into frames on the phone link.

use watch_kernel::message::{Message, PayloadBytes};
use watch_kernel::task::{TaskContext, TaskHandler};
use watch_platform::HostLink;

/// `(kind, options, payload)` wire form of an outbound message.
pub fn frame(message: &Message) -> (u8, u8, PayloadBytes) {
    match message {
        // Responses travel under their own frame kind.
        Message::Response(response) => {
            let mut payload = PayloadBytes::new();
            // The response data is one byte shorter than the payload buffer.
            let _ = payload.extend_from_slice(&response.data);
            (response.kind.into(), response.status, payload)
        }
        other => (other.kind().into(), other.options(), other.encode_payload()),
    }
}

pub struct HostBridge<L> {
    link: L,
    sent: u32,
    failed: u32,
}

impl<L> HostBridge<L>
where
    L: HostLink + Send + 'static,
{
    pub fn new(link: L) -> Self {
        Self {
            link,
            sent: 0,
            failed: 0,
        }
    }

    /// Frames handed to the link, and frames it refused.
    pub fn counters(&self) -> (u32, u32) {
        (self.sent, self.failed)
    }

    fn transmit(&mut self, message: &Message) {
        let (kind, options, payload) = frame(message);
        match self.link.transmit(kind, options, &payload) {
            Ok(()) => self.sent += 1,
            Err(err) => {
                self.failed += 1;
                log::warn!("host: dropping {:?}: {err}", message.kind());
            }
        }
    }
}

impl<L> TaskHandler for HostBridge<L>
where
    L: HostLink + Send + 'static,
{
    fn on_message(&mut self, _ctx: &mut TaskContext<'_>, message: Message) {
        match message {
            Message::StatusChangeEvent(_)
            | Message::Response(_)
            | Message::ButtonEventToHost(_)
            | Message::CallbackTimeout(_) => self.transmit(&message),
            Message::TurnRadioOn => self.link.set_radio_power(true),
            Message::TurnRadioOff => self.link.set_radio_power(false),
            Message::PairingControl(op) => self.link.pairing(op),
            other => log::warn!("host: unhandled {:?}", other.kind()),
        }
    }
}
