//! Radio transport to the paired phone.

use thiserror::Error;

/// Pairing control requests forwarded to the radio stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PairingOp {
    EnableDiscoverable = 1,
    DisableDiscoverable = 2,
    /// Persist the serial-port-profile link keys.
    SaveSpp = 3,
    /// Flip secure simple pairing on or off.
    ToggleSsp = 4,
}

impl TryFrom<u8> for PairingOp {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            1 => Ok(Self::EnableDiscoverable),
            2 => Ok(Self::DisableDiscoverable),
            3 => Ok(Self::SaveSpp),
            4 => Ok(Self::ToggleSsp),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("no phone connected")]
    Disconnected,
    #[error("radio rejected the frame")]
    Rejected,
}

pub trait HostLink {
    /// Sends one `(kind, options, payload)` frame to the phone.
    fn transmit(&mut self, kind: u8, options: u8, payload: &[u8]) -> Result<(), LinkError>;
    fn set_radio_power(&mut self, on: bool);
    fn pairing(&mut self, op: PairingOp);
}
