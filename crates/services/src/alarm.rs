//! Alarm task: a bank of one-shot alarms checked against the RTC.

use watch_kernel::message::{AlarmEdit, AlarmOp, AlarmSlot, Message, ALARM_SLOTS};
use watch_kernel::task::{TaskContext, TaskHandler, TaskId};
use watch_kernel::time::{TimerId, TimerSetup};
use watch_kernel::KernelError;
use watch_platform::{Hardware, NvId, NvStore, VibratePattern};

/// Seconds between two alarm checks.
pub const ALARM_CHECK_SECONDS: u32 = 5;

pub const ALARM_PATTERN: VibratePattern = VibratePattern {
    enable: true,
    on_ms: 0x0100,
    off_ms: 0x0100,
    cycles: 10,
};

/// The ten alarm slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmBank {
    slots: [AlarmSlot; ALARM_SLOTS as usize],
}

impl Default for AlarmBank {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|index| AlarmSlot {
                slot: index as u8,
                ..AlarmSlot::default()
            }),
        }
    }
}

impl AlarmBank {
    /// Registers the defaults of every slot and loads what the store holds.
    pub fn load<N: NvStore>(nv: &mut N) -> Self {
        let mut bank = Self::default();
        for slot in bank.slots.iter_mut() {
            let index = slot.slot;
            slot.on = nv.init_item(NvId::ALARM_ON.offset(index), 1, 0) != 0;
            slot.hour = (nv.init_item(NvId::ALARM_HOUR.offset(index), 1, 0) % 24) as u8;
            slot.minute = (nv.init_item(NvId::ALARM_MINUTE.offset(index), 1, 0) % 60) as u8;
        }
        bank
    }

    /// Writes all three items of every slot.
    pub fn save<N: NvStore>(&self, nv: &mut N) {
        for slot in &self.slots {
            let items = [
                (NvId::ALARM_ON.offset(slot.slot), u32::from(slot.on)),
                (NvId::ALARM_HOUR.offset(slot.slot), slot.hour.into()),
                (NvId::ALARM_MINUTE.offset(slot.slot), slot.minute.into()),
            ];
            for (id, value) in items {
                if let Err(err) = nv.save(id, value) {
                    log::error!("alarm: {err}");
                }
            }
        }
    }

    /// Re-reads the slot item `id` belongs to; `false` if it is not an alarm item.
    pub fn reload<N: NvStore>(&mut self, nv: &N, id: NvId) -> bool {
        let Some(value) = nv.load(id) else {
            return false;
        };
        for slot in self.slots.iter_mut() {
            if id == NvId::ALARM_ON.offset(slot.slot) {
                slot.on = value != 0;
            } else if id == NvId::ALARM_HOUR.offset(slot.slot) {
                slot.hour = (value % 24) as u8;
            } else if id == NvId::ALARM_MINUTE.offset(slot.slot) {
                slot.minute = (value % 60) as u8;
            } else {
                continue;
            }
            return true;
        }
        false
    }

    pub fn get(&self, slot: u8) -> Option<AlarmSlot> {
        self.slots.get(usize::from(slot)).copied()
    }

    pub fn set(&mut self, alarm: AlarmSlot) -> bool {
        match self.slots.get_mut(usize::from(alarm.slot)) {
            Some(slot) => {
                *slot = alarm;
                true
            }
            None => false,
        }
    }

    pub fn edit(&mut self, slot: u8, op: AlarmOp) -> Option<AlarmSlot> {
        let alarm = self.slots.get_mut(usize::from(slot))?;
        match op {
            AlarmOp::ToggleOn => alarm.on = !alarm.on,
            AlarmOp::HourPlus => alarm.hour = (alarm.hour + 1) % 24,
            AlarmOp::MinutePlus => alarm.minute = (alarm.minute + 1) % 60,
        }
        Some(*alarm)
    }

    /// Switches off every enabled slot set to `hour:minute` and returns how
    /// many went off.
    pub fn fire(&mut self, hour: u8, minute: u8) -> usize {
        let mut fired = 0;
        for slot in self.slots.iter_mut() {
            if slot.on && slot.hour == hour && slot.minute == minute {
                slot.on = false;
                fired += 1;
            }
        }
        fired
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlarmSlot> {
        self.slots.iter()
    }
}

pub struct AlarmTask<N, H> {
    nv: N,
    hardware: H,
    bank: AlarmBank,
    timer: Option<TimerId>,
}

impl<N, H> AlarmTask<N, H>
where
    N: NvStore + Send + 'static,
    H: Hardware + Send + 'static,
{
    pub fn new(nv: N, hardware: H) -> Self {
        Self {
            nv,
            hardware,
            bank: AlarmBank::default(),
            timer: None,
        }
    }

    pub fn bank(&self) -> &AlarmBank {
        &self.bank
    }

    fn check(&mut self, ctx: &TaskContext<'_>) {
        let now = self.hardware.rtc();
        let fired = self.bank.fire(now.hour, now.minute);
        if fired > 0 {
            log::info!("alarm: {fired} alarm(s) at {:02}:{:02}", now.hour, now.minute);
            // Simultaneous alarms share one vibration.
            ctx.route(Message::SetVibrateMode(ALARM_PATTERN));
        }
    }

    fn reply(&self, ctx: &TaskContext<'_>, slot: u8) {
        match self.bank.get(slot) {
            Some(alarm) => ctx.send(TaskId::Display, Message::AlarmStatus(alarm)),
            None => log::warn!("alarm: no slot {slot}"),
        }
    }

    fn edit(&mut self, ctx: &TaskContext<'_>, edit: AlarmEdit) {
        if self.bank.edit(edit.slot, edit.op).is_some() {
            self.reply(ctx, edit.slot);
        } else {
            log::warn!("alarm: no slot {}", edit.slot);
        }
    }
}

impl<N, H> TaskHandler for AlarmTask<N, H>
where
    N: NvStore + Send + 'static,
    H: Hardware + Send + 'static,
{
    fn on_start(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), KernelError> {
        self.bank = AlarmBank::load(&mut self.nv);
        let id = ctx.allocate_timer()?;
        ctx.setup_timer(
            id,
            TimerSetup::forever(ALARM_CHECK_SECONDS, TaskId::Alarm, Message::AlarmControl),
        );
        ctx.start_timer(id);
        self.timer = Some(id);
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut TaskContext<'_>, message: Message) {
        match message {
            Message::AlarmControl => self.check(ctx),
            Message::AlarmEdit(edit) => self.edit(ctx, edit),
            Message::QueryAlarm(slot) => self.reply(ctx, slot),
            Message::SaveAlarms => self.bank.save(&mut self.nv),
            Message::NvUpdated(id) => {
                if !self.bank.reload(&self.nv, id) {
                    log::debug!("alarm: {id:?} is not an alarm item");
                }
            }
            other => log::warn!("alarm: unhandled {:?}", other.kind()),
        }
    }
}
