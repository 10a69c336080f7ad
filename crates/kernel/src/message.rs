//! Message kinds, typed options and payloads.
//!
//! Every stimulus in the system (button, timer expiry, host command, reply
//! between tasks) is one [`Message`]. Raw `(kind, options, payload)` triples
//! coming from the host or from the button table are validated into the closed
//! set by [`Message::from_parts`].

use heapless::Vec;
use watch_platform::{NvId, PairingOp, RtcTime, VibratePattern};

use crate::error::MessageError;
use crate::input::{Button, ButtonAction, ButtonEvent, ButtonKey};
use crate::task::TaskId;

/// Largest payload a message buffer holds.
pub const MAX_PAYLOAD: usize = 32;

pub type PayloadBytes = Vec<u8, MAX_PAYLOAD>;

/// Response data; one byte of the buffer carries the response kind.
pub type ResponseBytes = Vec<u8, { MAX_PAYLOAD - 1 }>;

fn opt<T: TryFrom<u8, Error = u8>>(kind: MessageKind, value: u8) -> Result<T, MessageError> {
    T::try_from(value).map_err(|value| MessageError::InvalidOption { kind, value })
}

option_enum! {
    /// Closed set of message kinds.
    pub enum MessageKind {
        GetDeviceType = 0x01,
        GetRealTimeClock = 0x02,
        SetRealTimeClock = 0x03,
        ReadBatteryVoltage = 0x04,
        NvalOperation = 0x05,
        SetVibrateMode = 0x06,
        LedChange = 0x07,
        SoftwareReset = 0x08,
        BatteryChargeControl = 0x09,
        SetCallbackTimer = 0x0a,

        IdleUpdate = 0x20,
        ChangeMode = 0x21,
        ModeTimeout = 0x22,
        WatchStatus = 0x23,
        ShowCalendar = 0x24,
        Calendar = 0x25,
        BarCode = 0x26,
        ConfigureDisplay = 0x27,
        ConfigureIdleBufferSize = 0x28,
        ModifyTime = 0x29,
        MenuMode = 0x2a,
        MenuButton = 0x2b,
        ToggleSeconds = 0x2c,
        SplashTimeout = 0x2d,
        ConnectionStateChange = 0x2e,
        LinkAlarm = 0x2f,
        LowBatteryWarning = 0x30,
        LowBatteryBtOff = 0x31,
        RtcUpdate = 0x32,
        ButtonEvent = 0x33,
        EnableButton = 0x34,
        DisableButton = 0x35,
        ReadButtonConfig = 0x36,
        AlarmStatus = 0x37,
        NvUpdated = 0x38,

        AlarmControl = 0x50,
        AlarmEdit = 0x51,
        QueryAlarm = 0x52,
        SaveAlarms = 0x53,

        StatusChangeEvent = 0x60,
        Response = 0x61,
        ButtonEventToHost = 0x62,
        CallbackTimeout = 0x63,
        TurnRadioOn = 0x64,
        TurnRadioOff = 0x65,
        PairingControl = 0x66,
    }
}

impl MessageKind {
    /// Static routing table: the task whose mailbox receives this kind.
    pub const fn owner(self) -> TaskId {
        use MessageKind::*;
        match self {
            GetDeviceType | GetRealTimeClock | SetRealTimeClock | ReadBatteryVoltage
            | NvalOperation | SetVibrateMode | LedChange | SoftwareReset
            | BatteryChargeControl | SetCallbackTimer => TaskId::Background,
            AlarmControl | AlarmEdit | QueryAlarm | SaveAlarms => TaskId::Alarm,
            StatusChangeEvent | Response | ButtonEventToHost | CallbackTimeout | TurnRadioOn
            | TurnRadioOff | PairingControl => TaskId::Host,
            _ => TaskId::Display,
        }
    }
}

option_enum! {
    /// Top-level display mode.
    pub enum Mode {
        Idle = 0,
        Application = 1,
        Notification = 2,
        Scroll = 3,
    }
}

option_enum! {
    pub enum MenuOption {
        Main = 1,
        Settings = 2,
        AlarmSettings = 3,
        TimeSettings = 4,
        /// Redraw whichever menu page is showing.
        UpdateCurrentPage = 5,
    }
}

option_enum! {
    pub enum MenuAction {
        ToggleBluetooth = 1,
        ToggleDiscoverability = 2,
        ToggleLinkAlarm = 3,
        /// Persist pending settings and return to idle.
        Exit = 4,
        InvertDisplay = 5,
        ToggleSecondsDisplay = 6,
        AlarmOnOff = 7,
        AlarmMinutePlus = 8,
        AlarmHourPlus = 9,
        NextAlarm = 10,
        ToggleSecureSimplePairing = 11,
        ToggleRstNmiPin = 12,
    }
}

option_enum! {
    pub enum CalendarOp {
        MonthPlus = 1,
        MonthMinus = 2,
        /// Advance the edited field: none, year, month, day.
        Edit = 3,
    }
}

option_enum! {
    /// Volatile display overrides from the host.
    pub enum DisplayOption {
        HideSeconds = 1,
        ShowSeconds = 2,
        NormalVideo = 3,
        InvertVideo = 4,
    }
}

option_enum! {
    pub enum IdleBufferConfig {
        /// The watch draws the top of the idle screen.
        WatchControlsTop = 0,
        PhoneControlsAll = 1,
    }
}

option_enum! {
    pub enum TimeAdjust {
        HourPlus = 1,
        MinutePlus = 2,
        DayOfWeekPlus = 3,
        CorrectionInc = 4,
        CorrectionDec = 5,
    }
}

option_enum! {
    pub enum SecondsOption {
        ToggleOnly = 0,
        UpdateIdle = 1,
    }
}

option_enum! {
    pub enum LedAction {
        Off = 0,
        On = 1,
        Toggle = 2,
        StartOffTimer = 3,
    }
}

option_enum! {
    pub enum ResetOption {
        Normal = 0,
        /// Clear persisted settings before resetting.
        Master = 0x5a,
    }
}

option_enum! {
    pub enum NvalOp {
        Init = 1,
        Read = 2,
        Write = 3,
    }
}

option_enum! {
    pub enum AlarmOp {
        ToggleOn = 1,
        HourPlus = 2,
        MinutePlus = 3,
    }
}

option_enum! {
    pub enum StatusCode {
        UpdateComplete = 1,
        ModeTimeout = 2,
    }
}

option_enum! {
    /// Host response frames; the value is the frame kind on the wire.
    pub enum ResponseKind {
        DeviceType = 0x02,
        RealTimeClock = 0x27,
        ButtonConfig = 0x48,
        NvalOperation = 0x0b,
        BatteryVoltage = 0x57,
    }
}

/// Status byte carried in an NVAL response's options.
pub const NV_SUCCESS: u8 = 0x00;
pub const NV_FAILURE: u8 = 0x0a;

/// Host read or write of one NV item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvalRequest {
    pub op: NvalOp,
    pub id: NvId,
    pub size: u8,
    /// Little-endian value for writes.
    pub data: [u8; 4],
}

impl NvalRequest {
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.data)
    }
}

/// Host-requested wake-up timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallbackTimer {
    pub timeout: u16,
    /// Zero cancels the timer.
    pub repeat: u8,
    /// Echoed back in `CallbackTimeout`.
    pub options: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmEdit {
    pub slot: u8,
    pub op: AlarmOp,
}

/// Number of alarm slots in the bank.
pub const ALARM_SLOTS: u8 = 10;

/// Current value of one alarm slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSlot {
    pub slot: u8,
    pub on: bool,
    pub hour: u8,
    pub minute: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusChange {
    pub mode: Mode,
    pub status: StatusCode,
}

/// Reply to a host query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostResponse {
    pub kind: ResponseKind,
    pub status: u8,
    pub data: ResponseBytes,
}

impl HostResponse {
    pub fn new(kind: ResponseKind, data: &[u8]) -> Result<Self, MessageError> {
        Ok(Self {
            kind,
            status: 0,
            data: ResponseBytes::from_slice(data)
                .map_err(|_| MessageError::PayloadTooLong(data.len()))?,
        })
    }

    pub fn with_status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }
}

/// One message; the variant is the kind, its fields are the typed options
/// and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    GetDeviceType,
    GetRealTimeClock,
    SetRealTimeClock(RtcTime),
    ReadBatteryVoltage,
    NvalOperation(NvalRequest),
    SetVibrateMode(VibratePattern),
    LedChange(LedAction),
    SoftwareReset(ResetOption),
    BatteryChargeControl,
    SetCallbackTimer(CallbackTimer),

    IdleUpdate,
    ChangeMode(Mode),
    /// Carries the mode that armed the timeout.
    ModeTimeout(Mode),
    WatchStatus,
    ShowCalendar,
    Calendar(CalendarOp),
    BarCode,
    ConfigureDisplay(DisplayOption),
    ConfigureIdleBufferSize(IdleBufferConfig),
    ModifyTime(TimeAdjust),
    MenuMode(MenuOption),
    MenuButton(MenuAction),
    ToggleSeconds(SecondsOption),
    SplashTimeout,
    ConnectionStateChange,
    LinkAlarm,
    LowBatteryWarning,
    LowBatteryBtOff,
    RtcUpdate,
    ButtonEvent(ButtonEvent),
    EnableButton(ButtonAction),
    DisableButton(ButtonKey),
    ReadButtonConfig(ButtonKey),
    AlarmStatus(AlarmSlot),
    NvUpdated(NvId),

    AlarmControl,
    AlarmEdit(AlarmEdit),
    QueryAlarm(u8),
    SaveAlarms,

    StatusChangeEvent(StatusChange),
    Response(HostResponse),
    ButtonEventToHost(u8),
    CallbackTimeout(u8),
    TurnRadioOn,
    TurnRadioOff,
    PairingControl(PairingOp),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::GetDeviceType => MessageKind::GetDeviceType,
            Message::GetRealTimeClock => MessageKind::GetRealTimeClock,
            Message::SetRealTimeClock(_) => MessageKind::SetRealTimeClock,
            Message::ReadBatteryVoltage => MessageKind::ReadBatteryVoltage,
            Message::NvalOperation(_) => MessageKind::NvalOperation,
            Message::SetVibrateMode(_) => MessageKind::SetVibrateMode,
            Message::LedChange(_) => MessageKind::LedChange,
            Message::SoftwareReset(_) => MessageKind::SoftwareReset,
            Message::BatteryChargeControl => MessageKind::BatteryChargeControl,
            Message::SetCallbackTimer(_) => MessageKind::SetCallbackTimer,
            Message::IdleUpdate => MessageKind::IdleUpdate,
            Message::ChangeMode(_) => MessageKind::ChangeMode,
            Message::ModeTimeout(_) => MessageKind::ModeTimeout,
            Message::WatchStatus => MessageKind::WatchStatus,
            Message::ShowCalendar => MessageKind::ShowCalendar,
            Message::Calendar(_) => MessageKind::Calendar,
            Message::BarCode => MessageKind::BarCode,
            Message::ConfigureDisplay(_) => MessageKind::ConfigureDisplay,
            Message::ConfigureIdleBufferSize(_) => MessageKind::ConfigureIdleBufferSize,
            Message::ModifyTime(_) => MessageKind::ModifyTime,
            Message::MenuMode(_) => MessageKind::MenuMode,
            Message::MenuButton(_) => MessageKind::MenuButton,
            Message::ToggleSeconds(_) => MessageKind::ToggleSeconds,
            Message::SplashTimeout => MessageKind::SplashTimeout,
            Message::ConnectionStateChange => MessageKind::ConnectionStateChange,
            Message::LinkAlarm => MessageKind::LinkAlarm,
            Message::LowBatteryWarning => MessageKind::LowBatteryWarning,
            Message::LowBatteryBtOff => MessageKind::LowBatteryBtOff,
            Message::RtcUpdate => MessageKind::RtcUpdate,
            Message::ButtonEvent(_) => MessageKind::ButtonEvent,
            Message::EnableButton(_) => MessageKind::EnableButton,
            Message::DisableButton(_) => MessageKind::DisableButton,
            Message::ReadButtonConfig(_) => MessageKind::ReadButtonConfig,
            Message::AlarmStatus(_) => MessageKind::AlarmStatus,
            Message::NvUpdated(_) => MessageKind::NvUpdated,
            Message::AlarmControl => MessageKind::AlarmControl,
            Message::AlarmEdit(_) => MessageKind::AlarmEdit,
            Message::QueryAlarm(_) => MessageKind::QueryAlarm,
            Message::SaveAlarms => MessageKind::SaveAlarms,
            Message::StatusChangeEvent(_) => MessageKind::StatusChangeEvent,
            Message::Response(_) => MessageKind::Response,
            Message::ButtonEventToHost(_) => MessageKind::ButtonEventToHost,
            Message::CallbackTimeout(_) => MessageKind::CallbackTimeout,
            Message::TurnRadioOn => MessageKind::TurnRadioOn,
            Message::TurnRadioOff => MessageKind::TurnRadioOff,
            Message::PairingControl(_) => MessageKind::PairingControl,
        }
    }

    /// The option byte as it appears on the wire.
    pub fn options(&self) -> u8 {
        match self {
            Message::NvalOperation(req) => req.op.into(),
            Message::LedChange(action) => (*action).into(),
            Message::SoftwareReset(option) => (*option).into(),
            Message::SetCallbackTimer(timer) => timer.options,
            Message::ChangeMode(mode) | Message::ModeTimeout(mode) => (*mode).into(),
            Message::Calendar(op) => (*op).into(),
            Message::ConfigureDisplay(option) => (*option).into(),
            Message::ConfigureIdleBufferSize(config) => (*config).into(),
            Message::ModifyTime(adjust) => (*adjust).into(),
            Message::MenuMode(option) => (*option).into(),
            Message::MenuButton(action) => (*action).into(),
            Message::ToggleSeconds(option) => (*option).into(),
            Message::ButtonEvent(event) => event.to_option(),
            Message::AlarmEdit(edit) => edit.op.into(),
            Message::QueryAlarm(slot) => *slot,
            Message::StatusChangeEvent(change) => change.mode.into(),
            Message::Response(response) => response.status,
            Message::ButtonEventToHost(options) | Message::CallbackTimeout(options) => *options,
            Message::PairingControl(op) => *op as u8,
            _ => 0,
        }
    }

    /// Serializes the payload part of the message.
    pub fn encode_payload(&self) -> PayloadBytes {
        let mut out = PayloadBytes::new();
        // Every payload below is shorter than MAX_PAYLOAD.
        let _ = match self {
            Message::SetRealTimeClock(time) => out.extend_from_slice(&time.to_bytes()),
            Message::NvalOperation(req) => {
                let id = req.id.0.to_le_bytes();
                out.extend_from_slice(&[id[0], id[1], req.size])
                    .and_then(|_| out.extend_from_slice(&req.data[..usize::from(req.size.min(4))]))
            }
            Message::SetVibrateMode(pattern) => out.extend_from_slice(&pattern.to_bytes()),
            Message::SetCallbackTimer(timer) => {
                let timeout = timer.timeout.to_le_bytes();
                out.extend_from_slice(&[timeout[0], timeout[1], timer.repeat])
            }
            Message::EnableButton(action) => out.extend_from_slice(&action.to_bytes()),
            Message::DisableButton(key) | Message::ReadButtonConfig(key) => {
                out.extend_from_slice(&key.to_bytes())
            }
            Message::AlarmStatus(slot) => {
                out.extend_from_slice(&[slot.slot, slot.on as u8, slot.hour, slot.minute])
            }
            Message::NvUpdated(id) => out.extend_from_slice(&id.0.to_le_bytes()),
            Message::AlarmEdit(edit) => out.extend_from_slice(&[edit.slot]),
            Message::StatusChangeEvent(change) => out.extend_from_slice(&[change.status.into()]),
            Message::Response(response) => out
                .push(response.kind.into())
                .map_err(|_| ())
                .and_then(|_| out.extend_from_slice(&response.data)),
            _ => Ok(()),
        };
        out
    }

    /// Builds a message from its raw parts, rejecting anything outside the
    /// closed set.
    pub fn from_parts(kind: u8, options: u8, payload: &[u8]) -> Result<Self, MessageError> {
        let kind = MessageKind::try_from(kind).map_err(MessageError::UnknownKind)?;
        if payload.len() > MAX_PAYLOAD {
            return Err(MessageError::PayloadTooLong(payload.len()));
        }

        let need = |expected: usize| {
            if payload.len() < expected {
                Err(MessageError::PayloadTooShort {
                    kind,
                    expected,
                    actual: payload.len(),
                })
            } else {
                Ok(())
            }
        };
        let bad_payload = |value: u8| MessageError::InvalidOption { kind, value };

        let message = match kind {
            MessageKind::GetDeviceType => Message::GetDeviceType,
            MessageKind::GetRealTimeClock => Message::GetRealTimeClock,
            MessageKind::SetRealTimeClock => {
                need(RtcTime::WIRE_LEN)?;
                Message::SetRealTimeClock(
                    RtcTime::from_bytes(payload).ok_or(MessageError::InvalidPayload(kind))?,
                )
            }
            MessageKind::ReadBatteryVoltage => Message::ReadBatteryVoltage,
            MessageKind::NvalOperation => {
                need(3)?;
                let size = payload[2];
                let mut data = [0u8; 4];
                let available = payload.len().saturating_sub(3).min(4);
                data[..available].copy_from_slice(&payload[3..3 + available]);
                Message::NvalOperation(NvalRequest {
                    op: opt(kind, options)?,
                    id: NvId(u16::from_le_bytes([payload[0], payload[1]])),
                    size,
                    data,
                })
            }
            MessageKind::SetVibrateMode => {
                need(VibratePattern::WIRE_LEN)?;
                Message::SetVibrateMode(
                    VibratePattern::from_bytes(payload).ok_or(bad_payload(options))?,
                )
            }
            MessageKind::LedChange => Message::LedChange(opt(kind, options)?),
            MessageKind::SoftwareReset => {
                // Any option other than the master key is a plain reset.
                Message::SoftwareReset(
                    ResetOption::try_from(options).unwrap_or(ResetOption::Normal),
                )
            }
            MessageKind::BatteryChargeControl => Message::BatteryChargeControl,
            MessageKind::SetCallbackTimer => {
                need(3)?;
                Message::SetCallbackTimer(CallbackTimer {
                    timeout: u16::from_le_bytes([payload[0], payload[1]]),
                    repeat: payload[2],
                    options,
                })
            }
            MessageKind::IdleUpdate => Message::IdleUpdate,
            MessageKind::ChangeMode => Message::ChangeMode(opt(kind, options & 0x03)?),
            MessageKind::ModeTimeout => Message::ModeTimeout(opt(kind, options & 0x03)?),
            MessageKind::WatchStatus => Message::WatchStatus,
            MessageKind::ShowCalendar => Message::ShowCalendar,
            MessageKind::Calendar => Message::Calendar(opt(kind, options)?),
            MessageKind::BarCode => Message::BarCode,
            MessageKind::ConfigureDisplay => Message::ConfigureDisplay(opt(kind, options)?),
            MessageKind::ConfigureIdleBufferSize => {
                need(1)?;
                Message::ConfigureIdleBufferSize(opt(kind, payload[0] & 0x01)?)
            }
            MessageKind::ModifyTime => Message::ModifyTime(opt(kind, options)?),
            MessageKind::MenuMode => Message::MenuMode(opt(kind, options)?),
            MessageKind::MenuButton => Message::MenuButton(opt(kind, options)?),
            MessageKind::ToggleSeconds => Message::ToggleSeconds(opt(kind, options)?),
            MessageKind::SplashTimeout => Message::SplashTimeout,
            MessageKind::ConnectionStateChange => Message::ConnectionStateChange,
            MessageKind::LinkAlarm => Message::LinkAlarm,
            MessageKind::LowBatteryWarning => Message::LowBatteryWarning,
            MessageKind::LowBatteryBtOff => Message::LowBatteryBtOff,
            MessageKind::RtcUpdate => Message::RtcUpdate,
            MessageKind::ButtonEvent => Message::ButtonEvent(
                ButtonEvent::from_option(options).ok_or(bad_payload(options))?,
            ),
            MessageKind::EnableButton => {
                need(ButtonAction::WIRE_LEN)?;
                let key = ButtonKey::from_bytes(payload).ok_or(bad_payload(payload[0]))?;
                let target = MessageKind::try_from(payload[3]).map_err(MessageError::UnknownKind)?;
                Message::EnableButton(ButtonAction {
                    key,
                    kind: target,
                    options: payload[4],
                })
            }
            MessageKind::DisableButton => {
                need(ButtonKey::WIRE_LEN)?;
                Message::DisableButton(
                    ButtonKey::from_bytes(payload).ok_or(bad_payload(payload[0]))?,
                )
            }
            MessageKind::ReadButtonConfig => {
                need(ButtonKey::WIRE_LEN)?;
                Message::ReadButtonConfig(
                    ButtonKey::from_bytes(payload).ok_or(bad_payload(payload[0]))?,
                )
            }
            MessageKind::AlarmStatus => {
                need(4)?;
                Message::AlarmStatus(AlarmSlot {
                    slot: payload[0],
                    on: payload[1] != 0,
                    hour: payload[2],
                    minute: payload[3],
                })
            }
            MessageKind::NvUpdated => {
                need(2)?;
                Message::NvUpdated(NvId(u16::from_le_bytes([payload[0], payload[1]])))
            }
            MessageKind::AlarmControl => Message::AlarmControl,
            MessageKind::AlarmEdit => {
                need(1)?;
                Message::AlarmEdit(AlarmEdit {
                    slot: payload[0],
                    op: opt(kind, options)?,
                })
            }
            MessageKind::QueryAlarm => Message::QueryAlarm(options),
            MessageKind::SaveAlarms => Message::SaveAlarms,
            MessageKind::StatusChangeEvent => {
                need(1)?;
                Message::StatusChangeEvent(StatusChange {
                    mode: opt(kind, options & 0x03)?,
                    status: opt(kind, payload[0])?,
                })
            }
            MessageKind::Response => {
                need(1)?;
                Message::Response(
                    HostResponse::new(opt(kind, payload[0])?, &payload[1..])?
                        .with_status(options),
                )
            }
            MessageKind::ButtonEventToHost => Message::ButtonEventToHost(options),
            MessageKind::CallbackTimeout => Message::CallbackTimeout(options),
            MessageKind::TurnRadioOn => Message::TurnRadioOn,
            MessageKind::TurnRadioOff => Message::TurnRadioOff,
            MessageKind::PairingControl => Message::PairingControl(opt(kind, options)?),
        };
        Ok(message)
    }

    /// Builds a message that needs no payload, as stored in the button table.
    pub fn from_kind(kind: MessageKind, options: u8) -> Result<Self, MessageError> {
        Self::from_parts(kind.into(), options, &[])
    }

    pub fn button(button: Button) -> Self {
        Message::ButtonEventToHost(button.into())
    }
}
