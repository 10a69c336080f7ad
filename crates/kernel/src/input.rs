//! Button identities and the values that travel with button messages.

use crate::message::MessageKind;

option_enum! {
    /// Physical buttons.
    pub enum Button {
        A = 0,
        B = 1,
        C = 2,
        D = 3,
        E = 4,
        F = 5,
    }
}

option_enum! {
    /// Classification of a button event.
    pub enum PressKind {
        /// Reported on press.
        Immediate = 0,
        /// Reported on release.
        Pressed = 1,
        LongHold = 2,
        /// Synthesized: a timer starts on press and the action fires on release.
        Deferred = 3,
    }
}

option_enum! {
    /// Which column of the dispatch table is live.
    pub enum ButtonMode {
        /// The normal idle screen.
        Idle = 0,
        Application = 1,
        Notification = 2,
        Scroll = 3,
        /// Any idle page the watch draws itself.
        WatchDrawn = 4,
    }
}

impl Button {
    pub const COUNT: usize = 6;

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl PressKind {
    pub const COUNT: usize = 4;

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl ButtonMode {
    pub const COUNT: usize = 5;

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Raw event from the button interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: Button,
    pub press: PressKind,
}

impl ButtonEvent {
    pub const fn new(button: Button, press: PressKind) -> Self {
        Self { button, press }
    }

    /// Packs into one option byte: press kind in the high nibble.
    pub fn to_option(self) -> u8 {
        ((self.press as u8) << 4) | self.button as u8
    }

    pub fn from_option(value: u8) -> Option<Self> {
        let button = Button::try_from(value & 0x0f).ok()?;
        let press = PressKind::try_from(value >> 4).ok()?;
        Some(Self { button, press })
    }
}

/// Address of one dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonKey {
    pub mode: ButtonMode,
    pub button: Button,
    pub press: PressKind,
}

impl ButtonKey {
    pub const WIRE_LEN: usize = 3;

    pub const fn new(mode: ButtonMode, button: Button, press: PressKind) -> Self {
        Self {
            mode,
            button,
            press,
        }
    }

    pub fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        [self.mode.into(), self.button.into(), self.press.into()]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            mode: ButtonMode::try_from(*bytes.first()?).ok()?,
            button: Button::try_from(*bytes.get(1)?).ok()?,
            press: PressKind::try_from(*bytes.get(2)?).ok()?,
        })
    }
}

/// Host request to bind `key` to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonAction {
    pub key: ButtonKey,
    pub kind: MessageKind,
    pub options: u8,
}

impl ButtonAction {
    pub const WIRE_LEN: usize = 5;

    pub fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        let [mode, button, press] = self.key.to_bytes();
        [mode, button, press, self.kind.into(), self.options]
    }
}
