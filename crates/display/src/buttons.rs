//! Per-mode button dispatch table.
//!
//! The table maps `(mode, button, press)` to the message a button event turns
//! into. It is owned by the display task and reprogrammed on every page change.

use watch_kernel::input::{Button, ButtonEvent, ButtonKey, ButtonMode, PressKind};
use watch_kernel::message::{Message, MessageKind};

/// Action bound to one key. A disabled entry keeps its last binding so that
/// it can be snapshotted and restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonEntry {
    pub kind: MessageKind,
    pub options: u8,
    pub enabled: bool,
}

impl ButtonEntry {
    /// Host wire form of `(key, entry)`; inactive entries read as kind 0.
    pub fn response_bytes(key: ButtonKey, entry: Option<ButtonEntry>) -> [u8; 5] {
        let [mode, button, press] = key.to_bytes();
        match entry {
            Some(entry) if entry.enabled => [mode, button, press, entry.kind.into(), entry.options],
            _ => [mode, button, press, 0, 0],
        }
    }
}

type PressRow = [Option<ButtonEntry>; PressKind::COUNT];
type ModeTable = [PressRow; Button::COUNT];

pub struct ButtonTable {
    entries: [ModeTable; ButtonMode::COUNT],
}

impl Default for ButtonTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonTable {
    pub const fn new() -> Self {
        Self {
            entries: [[[None; PressKind::COUNT]; Button::COUNT]; ButtonMode::COUNT],
        }
    }

    fn slot(&mut self, key: ButtonKey) -> &mut Option<ButtonEntry> {
        &mut self.entries[key.mode.index()][key.button.index()][key.press.index()]
    }

    /// Installs or overwrites the action for `key`.
    pub fn enable(&mut self, key: ButtonKey, kind: MessageKind, options: u8) {
        *self.slot(key) = Some(ButtonEntry {
            kind,
            options,
            enabled: true,
        });
    }

    pub fn disable(&mut self, key: ButtonKey) {
        if let Some(entry) = self.slot(key) {
            entry.enabled = false;
        }
    }

    /// The active action for `key`, if any.
    pub fn lookup(&self, key: ButtonKey) -> Option<ButtonEntry> {
        self.read_config(key).filter(|entry| entry.enabled)
    }

    /// Raw entry, enabled or not.
    pub fn read_config(&self, key: ButtonKey) -> Option<ButtonEntry> {
        self.entries[key.mode.index()][key.button.index()][key.press.index()]
    }

    /// Puts back an entry taken with [`read_config`](Self::read_config).
    pub fn restore(&mut self, key: ButtonKey, entry: Option<ButtonEntry>) {
        *self.slot(key) = entry;
    }

    /// Disables every entry of `mode`.
    pub fn reset_mode(&mut self, mode: ButtonMode) {
        for row in self.entries[mode.index()].iter_mut() {
            for entry in row.iter_mut().flatten() {
                entry.enabled = false;
            }
        }
    }

    pub fn enabled_in(
        &self,
        mode: ButtonMode,
    ) -> impl Iterator<Item = (ButtonKey, ButtonEntry)> + '_ {
        Button::ALL.iter().flat_map(move |&button| {
            PressKind::ALL.iter().filter_map(move |&press| {
                let key = ButtonKey::new(mode, button, press);
                self.lookup(key).map(|entry| (key, entry))
            })
        })
    }

    /// Translates a raw button event in `mode` into the bound message.
    pub fn dispatch(&self, mode: ButtonMode, event: ButtonEvent) -> Option<Message> {
        let key = ButtonKey::new(mode, event.button, event.press);
        let entry = self.lookup(key)?;
        match Message::from_kind(entry.kind, entry.options) {
            Ok(message) => Some(message),
            Err(err) => {
                log::warn!("button {key:?} bound to unusable action: {err}");
                None
            }
        }
    }
}
