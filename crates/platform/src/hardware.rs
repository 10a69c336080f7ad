//! Hardware status queries and commands.

use crate::rtc::RtcTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryStatus {
    pub power_good: bool,
    pub charging: bool,
    /// Last sample in millivolts.
    pub voltage_mv: u16,
    /// Running average in millivolts.
    pub average_mv: u16,
}

impl BatteryStatus {
    pub const FULL_MV: u16 = 4000;
    pub const LOW_MV: u16 = 3500;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    #[default]
    Initializing,
    Off,
    On,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioStatus {
    pub state: RadioState,
    pub discoverable: bool,
}

impl RadioStatus {
    pub fn bluetooth_on(&self) -> bool {
        matches!(self.state, RadioState::On | RadioState::Connected)
    }

    pub fn connected(&self) -> bool {
        self.state == RadioState::Connected
    }
}

/// Motor pattern, durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VibratePattern {
    pub enable: bool,
    pub on_ms: u16,
    pub off_ms: u16,
    pub cycles: u8,
}

impl VibratePattern {
    pub const WIRE_LEN: usize = 6;

    pub fn to_bytes(&self) -> [u8; Self::WIRE_LEN] {
        let on = self.on_ms.to_le_bytes();
        let off = self.off_ms.to_le_bytes();
        [self.enable as u8, on[0], on[1], off[0], off[1], self.cycles]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::WIRE_LEN {
            return None;
        }
        Some(Self {
            enable: bytes[0] != 0,
            on_ms: u16::from_le_bytes([bytes[1], bytes[2]]),
            off_ms: u16::from_le_bytes([bytes[3], bytes[4]]),
            cycles: bytes[5],
        })
    }
}

pub trait Hardware {
    fn rtc(&self) -> RtcTime;
    fn set_rtc(&mut self, time: RtcTime);
    fn set_rtc_correction(&mut self, correction: i8);

    /// Runs a sense cycle and returns the result.
    fn battery(&mut self) -> BatteryStatus;
    fn radio(&self) -> RadioStatus;
    fn board_type(&self) -> u8;

    fn set_led(&mut self, on: bool);
    fn vibrate(&mut self, pattern: VibratePattern);
    /// Resets the processor; `master` clears persisted settings first.
    fn reset(&mut self, master: bool);
}
