//! Top-level display mode and idle page bookkeeping.

use watch_kernel::input::ButtonMode;
use watch_kernel::message::Mode;

/// Sub-state of [`Mode::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdlePage {
    #[default]
    Normal,
    WatchStatus,
    Calendar,
    MenuMain,
    MenuSettings,
    AlarmSettings,
    TimeSettings,
    QrCode,
    RadioOnPairing,
    RadioOnNoPairing,
    BluetoothOff,
}

impl IdlePage {
    pub const ALL: [IdlePage; 11] = [
        IdlePage::Normal,
        IdlePage::WatchStatus,
        IdlePage::Calendar,
        IdlePage::MenuMain,
        IdlePage::MenuSettings,
        IdlePage::AlarmSettings,
        IdlePage::TimeSettings,
        IdlePage::QrCode,
        IdlePage::RadioOnPairing,
        IdlePage::RadioOnNoPairing,
        IdlePage::BluetoothOff,
    ];

    /// Column of the button table that serves this page.
    pub const fn button_mode(self) -> ButtonMode {
        match self {
            IdlePage::Normal => ButtonMode::Idle,
            _ => ButtonMode::WatchDrawn,
        }
    }

    pub const fn is_menu(self) -> bool {
        matches!(
            self,
            IdlePage::MenuMain
                | IdlePage::MenuSettings
                | IdlePage::AlarmSettings
                | IdlePage::TimeSettings
        )
    }

    /// Pages that redraw from scratch when the connection state changes.
    pub const fn is_connection_page(self) -> bool {
        matches!(
            self,
            IdlePage::Normal
                | IdlePage::RadioOnPairing
                | IdlePage::RadioOnNoPairing
                | IdlePage::BluetoothOff
        )
    }
}

/// Current and previous mode, and the idle page when idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeState {
    pub current: Mode,
    pub last: Mode,
    /// Meaningful only while `current` is [`Mode::Idle`].
    pub page: IdlePage,
    /// Page whose bindings are installed in the table; `None` forces a rebind.
    pub last_page: Option<IdlePage>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            current: Mode::Idle,
            last: Mode::Idle,
            page: IdlePage::Normal,
            last_page: None,
        }
    }
}

impl ModeState {
    /// Records a switch to `mode`; returns `false` if already there.
    pub fn enter(&mut self, mode: Mode) -> bool {
        self.last = self.current;
        self.current = mode;
        self.last != self.current
    }

    pub fn is_idle(&self) -> bool {
        self.current == Mode::Idle
    }

    pub fn is_idle_on(&self, page: IdlePage) -> bool {
        self.is_idle() && self.page == page
    }

    /// Column of the button table live right now.
    pub fn button_mode(&self) -> ButtonMode {
        match self.current {
            Mode::Idle => self.page.button_mode(),
            Mode::Application => ButtonMode::Application,
            Mode::Notification => ButtonMode::Notification,
            Mode::Scroll => ButtonMode::Scroll,
        }
    }

    /// Sets the page; returns `true` if its bindings must be installed.
    pub fn show(&mut self, page: IdlePage) -> bool {
        self.page = page;
        if self.last_page == Some(page) {
            false
        } else {
            self.last_page = Some(page);
            true
        }
    }
}
