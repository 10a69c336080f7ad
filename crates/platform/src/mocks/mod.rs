//! Mock implementations for testing
//!
//! Every mock is a cheap handle around shared state: clone it, hand one copy
//! to the task under test and keep the other to inspect what happened.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::hardware::{BatteryStatus, Hardware, RadioState, RadioStatus, VibratePattern};
use crate::host::{HostLink, LinkError, PairingOp};
use crate::nv::{NvError, NvId, NvStore};
use crate::render::{Font, Image, Renderer, TextStyle};
use crate::rtc::RtcTime;

#[derive(Default)]
struct NvState {
    items: BTreeMap<NvId, (u8, u32)>,
    saves: BTreeMap<NvId, usize>,
}

/// In-memory NV store counting saves per item.
#[derive(Clone, Default)]
pub struct MemoryNvStore {
    state: Arc<Mutex<NvState>>,
}

impl MemoryNvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item without counting it as a save.
    pub fn preset(&self, id: NvId, size: u8, value: u32) {
        self.state.lock().items.insert(id, (size, value));
    }

    pub fn value(&self, id: NvId) -> Option<u32> {
        self.state.lock().items.get(&id).map(|(_, value)| *value)
    }

    pub fn save_count(&self, id: NvId) -> usize {
        self.state.lock().saves.get(&id).copied().unwrap_or(0)
    }

    pub fn total_saves(&self) -> usize {
        self.state.lock().saves.values().sum()
    }

    pub fn reset_counters(&self) {
        self.state.lock().saves.clear();
    }
}

impl NvStore for MemoryNvStore {
    fn register_default(&mut self, id: NvId, size: u8, default: u32) {
        self.state.lock().items.entry(id).or_insert((size, default));
    }

    fn load(&self, id: NvId) -> Option<u32> {
        self.value(id)
    }

    fn save(&mut self, id: NvId, value: u32) -> Result<(), NvError> {
        let mut state = self.state.lock();
        match state.items.get_mut(&id) {
            Some(item) => item.1 = value,
            None => return Err(NvError::UnknownItem(id)),
        }
        *state.saves.entry(id).or_insert(0) += 1;
        Ok(())
    }

    fn item_len(&self, id: NvId) -> Option<u8> {
        self.state.lock().items.get(&id).map(|(size, _)| *size)
    }
}

/// One renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RenderOp {
    Clear { start_row: u8, row_count: u8 },
    Blit { image: Image, start_row: u8, row_count: u8 },
    Text { row: u8, col: u8, font: Font, text: String, style: TextStyle },
    Present { row_count: u8 },
}

/// Renderer that records every call.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    ops: Arc<Mutex<Vec<RenderOp>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.lock().clone()
    }

    pub fn take(&self) -> Vec<RenderOp> {
        core::mem::take(&mut *self.ops.lock())
    }

    pub fn present_count(&self) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| matches!(op, RenderOp::Present { .. }))
            .count()
    }

    pub fn images(&self) -> Vec<Image> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Blit { image, .. } => Some(*image),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn underlined(&self) -> Vec<String> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Text {
                    text,
                    style: TextStyle::Underlined,
                    ..
                } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn clear_region(&mut self, start_row: u8, row_count: u8) {
        self.ops.lock().push(RenderOp::Clear { start_row, row_count });
    }

    fn blit_image(&mut self, image: Image, start_row: u8, row_count: u8) {
        self.ops.lock().push(RenderOp::Blit {
            image,
            start_row,
            row_count,
        });
    }

    fn draw_text(&mut self, row: u8, col: u8, font: Font, text: &str, style: TextStyle) {
        self.ops.lock().push(RenderOp::Text {
            row,
            col,
            font,
            text: text.to_owned(),
            style,
        });
    }

    fn present(&mut self, row_count: u8) {
        self.ops.lock().push(RenderOp::Present { row_count });
    }
}

struct HardwareState {
    rtc: RtcTime,
    correction: i8,
    battery: BatteryStatus,
    radio: RadioStatus,
    board_type: u8,
    led: bool,
    vibrations: Vec<VibratePattern>,
    resets: Vec<bool>,
}

/// Scriptable hardware: tests set the queried values and read back commands.
#[derive(Clone)]
pub struct FakeHardware {
    state: Arc<Mutex<HardwareState>>,
}

impl Default for FakeHardware {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(HardwareState {
                rtc: RtcTime::default(),
                correction: 0,
                battery: BatteryStatus {
                    power_good: false,
                    charging: false,
                    voltage_mv: 3900,
                    average_mv: 3900,
                },
                radio: RadioStatus {
                    state: RadioState::Connected,
                    discoverable: false,
                },
                board_type: 2,
                led: false,
                vibrations: Vec::new(),
                resets: Vec::new(),
            })),
        }
    }
}

impl FakeHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, time: RtcTime) {
        self.state.lock().rtc = time;
    }

    pub fn set_battery(&self, battery: BatteryStatus) {
        self.state.lock().battery = battery;
    }

    pub fn set_radio(&self, radio: RadioStatus) {
        self.state.lock().radio = radio;
    }

    pub fn led(&self) -> bool {
        self.state.lock().led
    }

    pub fn correction(&self) -> i8 {
        self.state.lock().correction
    }

    pub fn vibrations(&self) -> Vec<VibratePattern> {
        self.state.lock().vibrations.clone()
    }

    pub fn resets(&self) -> Vec<bool> {
        self.state.lock().resets.clone()
    }
}

impl Hardware for FakeHardware {
    fn rtc(&self) -> RtcTime {
        self.state.lock().rtc
    }

    fn set_rtc(&mut self, time: RtcTime) {
        self.state.lock().rtc = time;
    }

    fn set_rtc_correction(&mut self, correction: i8) {
        self.state.lock().correction = correction;
    }

    fn battery(&mut self) -> BatteryStatus {
        self.state.lock().battery
    }

    fn radio(&self) -> RadioStatus {
        self.state.lock().radio
    }

    fn board_type(&self) -> u8 {
        self.state.lock().board_type
    }

    fn set_led(&mut self, on: bool) {
        self.state.lock().led = on;
    }

    fn vibrate(&mut self, pattern: VibratePattern) {
        self.state.lock().vibrations.push(pattern);
    }

    fn reset(&mut self, master: bool) {
        self.state.lock().resets.push(master);
    }
}

/// One frame handed to the host link.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HostFrame {
    pub kind: u8,
    pub options: u8,
    pub payload: Vec<u8>,
}

#[derive(Default)]
struct LinkState {
    frames: Vec<HostFrame>,
    radio_power: Vec<bool>,
    pairing: Vec<PairingOp>,
    fail: bool,
}

/// Host link that records frames instead of transmitting them.
#[derive(Clone, Default)]
pub struct RecordingHostLink {
    state: Arc<Mutex<LinkState>>,
}

impl RecordingHostLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<HostFrame> {
        self.state.lock().frames.clone()
    }

    pub fn take_frames(&self) -> Vec<HostFrame> {
        core::mem::take(&mut self.state.lock().frames)
    }

    pub fn radio_power(&self) -> Vec<bool> {
        self.state.lock().radio_power.clone()
    }

    pub fn pairing_ops(&self) -> Vec<PairingOp> {
        self.state.lock().pairing.clone()
    }

    /// Makes every following transmit fail with [`LinkError::Disconnected`].
    pub fn set_failing(&self, fail: bool) {
        self.state.lock().fail = fail;
    }
}

impl HostLink for RecordingHostLink {
    fn transmit(&mut self, kind: u8, options: u8, payload: &[u8]) -> Result<(), LinkError> {
        let mut state = self.state.lock();
        if state.fail {
            return Err(LinkError::Disconnected);
        }
        state.frames.push(HostFrame {
            kind,
            options,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn set_radio_power(&mut self, on: bool) {
        self.state.lock().radio_power.push(on);
    }

    fn pairing(&mut self, op: PairingOp) {
        self.state.lock().pairing.push(op);
    }
}
