//! Non-volatile key/value storage.

use thiserror::Error;

/// Identifier of one non-volatile item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvId(pub u16);

impl NvId {
    pub const IDLE_BUFFER_CONFIG: NvId = NvId(0x0001);
    pub const IDLE_BUFFER_INVERT: NvId = NvId(0x0002);
    pub const IDLE_MODE_TIMEOUT: NvId = NvId(0x0003);
    pub const APPLICATION_MODE_TIMEOUT: NvId = NvId(0x0004);
    pub const NOTIFICATION_MODE_TIMEOUT: NvId = NvId(0x0005);
    pub const SCROLL_MODE_TIMEOUT: NvId = NvId(0x0006);
    pub const RST_NMI_CONFIG: NvId = NvId(0x000b);
    pub const MASTER_RESET: NvId = NvId(0x000c);
    pub const BATTERY_SENSE_INTERVAL: NvId = NvId(0x0010);
    pub const LINK_ALARM_ENABLE: NvId = NvId(0x0014);
    pub const TIME_FORMAT: NvId = NvId(0x2009);
    pub const DATE_FORMAT: NvId = NvId(0x200a);
    pub const DISPLAY_SECONDS: NvId = NvId(0x200b);
    pub const RTC_CORRECTION: NvId = NvId(0x200c);

    /// First of ten consecutive alarm on/off items.
    pub const ALARM_ON: NvId = NvId(0x3000);
    /// First of ten consecutive alarm minute items.
    pub const ALARM_MINUTE: NvId = NvId(0x3010);
    /// First of ten consecutive alarm hour items.
    pub const ALARM_HOUR: NvId = NvId(0x3020);

    /// Item `index` of a consecutive block starting at `self`.
    pub const fn offset(self, index: u8) -> NvId {
        NvId(self.0 + index as u16)
    }

    pub const fn is_alarm(self) -> bool {
        self.0 >= Self::ALARM_ON.0 && self.0 < Self::ALARM_HOUR.0 + 0x10
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NvError {
    /// The item was never registered.
    #[error("nv item {0:?} is not registered")]
    UnknownItem(NvId),
    /// The caller's size does not match the registered item size.
    #[error("nv item {id:?} holds {expected} bytes, not {actual}")]
    SizeMismatch { id: NvId, expected: u8, actual: u8 },
}

/// Key/value store for small persisted settings (1, 2 or 4 byte items).
pub trait NvStore {
    /// Creates the item with `default` unless it already exists.
    fn register_default(&mut self, id: NvId, size: u8, default: u32);

    /// Returns the stored value, or `None` if the item does not exist.
    fn load(&self, id: NvId) -> Option<u32>;

    fn save(&mut self, id: NvId, value: u32) -> Result<(), NvError>;

    /// Registered size of the item in bytes.
    fn item_len(&self, id: NvId) -> Option<u8>;

    /// Registers `default` and returns whatever the store now holds.
    fn init_item(&mut self, id: NvId, size: u8, default: u32) -> u32 {
        self.register_default(id, size, default);
        self.load(id).unwrap_or(default)
    }
}
