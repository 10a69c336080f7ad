//! Frame-buffer rendering collaborator.
//!
//! The core never touches pixels. Pages describe what to draw in terms of
//! rows, named images and text; the renderer owns the bitmap layout.

/// Total LCD rows.
pub const NUM_LCD_ROWS: u8 = 96;
/// Rows drawn by the watch at the top of the idle screen.
pub const IDLE_TOP_ROWS: u8 = 30;

/// Named bitmap assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Image {
    Splash,
    BluetoothOn,
    BluetoothOff,
    PhoneConnected,
    PhoneDisconnected,
    BatteryFull,
    BatteryNormal,
    BatteryLow,
    BatteryCharging,
    PairingOn,
    PairingOff,
    LinkAlarmOn,
    LinkAlarmOff,
    InvertOn,
    InvertOff,
    SecondsOn,
    SecondsOff,
    AlarmOn,
    AlarmOff,
    NextAlarm,
    Plus,
    Minus,
    Reset,
    NextMenu,
    Exit,
    QrCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    Small,
    Medium,
    Large,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextStyle {
    #[default]
    Normal,
    Inverted,
    /// Marks the field currently being edited.
    Underlined,
}

pub trait Renderer {
    /// Blanks `row_count` rows starting at `start_row`.
    fn clear_region(&mut self, start_row: u8, row_count: u8);

    fn blit_image(&mut self, image: Image, start_row: u8, row_count: u8);

    fn draw_text(&mut self, row: u8, col: u8, font: Font, text: &str, style: TextStyle);

    /// Pushes the first `row_count` rows of the frame buffer to the LCD.
    fn present(&mut self, row_count: u8);
}
