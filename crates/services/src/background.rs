//! Background task: battery monitor, LED, host wake-up timer, host queries
//! on hardware state, NV access on behalf of the host, motor and reset.

use watch_kernel::message::{
    CallbackTimer, HostResponse, LedAction, Message, NvalOp, NvalRequest, ResetOption,
    ResponseKind, NV_FAILURE, NV_SUCCESS,
};
use watch_kernel::task::{TaskContext, TaskHandler, TaskId};
use watch_kernel::time::{TimerId, TimerSetup};
use watch_kernel::KernelError;
use watch_platform::{BatteryStatus, Hardware, NvId, NvStore, RtcTime};

/// Default seconds between battery samples.
pub const BATTERY_SENSE_INTERVAL: u32 = 8;
/// Seconds the LED stays on.
pub const LED_ON_SECONDS: u32 = 3;

pub struct BackgroundTask<N, H> {
    nv: N,
    hardware: H,
    battery_timer: Option<TimerId>,
    led_timer: Option<TimerId>,
    callback_timer: Option<TimerId>,
    led_on: bool,
    battery_interval: u32,
    last_battery: BatteryStatus,
}

impl<N, H> BackgroundTask<N, H>
where
    N: NvStore + Send + 'static,
    H: Hardware + Send + 'static,
{
    pub fn new(nv: N, hardware: H) -> Self {
        Self {
            nv,
            hardware,
            battery_timer: None,
            led_timer: None,
            callback_timer: None,
            led_on: false,
            battery_interval: BATTERY_SENSE_INTERVAL,
            last_battery: BatteryStatus::default(),
        }
    }

    pub fn battery_interval(&self) -> u32 {
        self.battery_interval
    }

    fn arm_battery_monitor(&self, ctx: &TaskContext<'_>) {
        if let Some(id) = self.battery_timer {
            ctx.setup_timer(
                id,
                TimerSetup::forever(
                    self.battery_interval,
                    TaskId::Background,
                    Message::BatteryChargeControl,
                ),
            );
            ctx.start_timer(id);
        }
    }

    fn monitor_battery(&mut self, ctx: &TaskContext<'_>) {
        let battery = self.hardware.battery();
        if battery.charging != self.last_battery.charging {
            log::debug!("background: charging {}", battery.charging);
            ctx.route(Message::IdleUpdate);
        }
        let low = |status: &BatteryStatus| {
            !status.power_good
                && status.average_mv != 0
                && status.average_mv < BatteryStatus::LOW_MV
        };
        if low(&battery) && !low(&self.last_battery) {
            log::warn!("background: battery low ({} mV)", battery.average_mv);
            ctx.route(Message::LowBatteryWarning);
        }
        self.last_battery = battery;
    }

    fn led(&mut self, ctx: &TaskContext<'_>, action: LedAction) {
        let Some(id) = self.led_timer else {
            return;
        };
        let on = match action {
            LedAction::On | LedAction::StartOffTimer => true,
            LedAction::Toggle => !self.led_on,
            LedAction::Off => false,
        };
        self.led_on = on;
        self.hardware.set_led(on);
        if on {
            ctx.start_timer(id);
        } else {
            ctx.stop_timer(id);
        }
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// A repeat count of zero cancels; one fires once; anything else repeats
    /// until the host cancels.
    fn callback_timer(&mut self, ctx: &TaskContext<'_>, timer: CallbackTimer) {
        let Some(id) = self.callback_timer else {
            return;
        };
        ctx.stop_timer(id);
        if timer.repeat == 0 {
            return;
        }
        let period = u32::from(timer.timeout);
        let message = Message::CallbackTimeout(timer.options);
        let setup = if timer.repeat == 1 {
            TimerSetup::once(period, TaskId::Host, message)
        } else {
            TimerSetup::forever(period, TaskId::Host, message)
        };
        ctx.setup_timer(id, setup);
        ctx.start_timer(id);
    }

    fn respond(&self, ctx: &TaskContext<'_>, kind: ResponseKind, status: u8, data: &[u8]) {
        match HostResponse::new(kind, data) {
            Ok(response) => ctx.route(Message::Response(response.with_status(status))),
            Err(err) => log::error!("background: {err}"),
        }
    }

    fn set_rtc(&mut self, ctx: &TaskContext<'_>, time: RtcTime) {
        self.hardware.set_rtc(time);
        ctx.route(Message::IdleUpdate);
    }

    fn read_battery(&mut self, ctx: &TaskContext<'_>) {
        let battery = self.hardware.battery();
        let sense = battery.voltage_mv.to_le_bytes();
        let average = battery.average_mv.to_le_bytes();
        let data = [
            battery.power_good.into(),
            battery.charging.into(),
            sense[0],
            sense[1],
            average[0],
            average[1],
        ];
        self.respond(ctx, ResponseKind::BatteryVoltage, 0, &data);
    }

    fn nval(&mut self, ctx: &TaskContext<'_>, request: NvalRequest) {
        let [lo, hi] = request.id.0.to_le_bytes();
        match request.op {
            NvalOp::Read => match (self.nv.item_len(request.id), self.nv.load(request.id)) {
                (Some(len), Some(value)) => {
                    let bytes = value.to_le_bytes();
                    let len = usize::from(len.min(4));
                    let mut data = [lo, hi, 0, 0, 0, 0];
                    data[2..2 + len].copy_from_slice(&bytes[..len]);
                    self.respond(ctx, ResponseKind::NvalOperation, NV_SUCCESS, &data[..2 + len]);
                }
                _ => {
                    log::warn!("background: read of unknown nv item {:?}", request.id);
                    self.respond(ctx, ResponseKind::NvalOperation, NV_FAILURE, &[lo, hi]);
                }
            },
            NvalOp::Write => {
                let status = match self.nv.item_len(request.id) {
                    Some(len) if len == request.size => {
                        match self.nv.save(request.id, request.value()) {
                            Ok(()) => NV_SUCCESS,
                            Err(err) => {
                                log::warn!("background: {err}");
                                NV_FAILURE
                            }
                        }
                    }
                    Some(len) => {
                        log::warn!(
                            "background: nv item {:?} holds {len} bytes, write has {}",
                            request.id,
                            request.size
                        );
                        NV_FAILURE
                    }
                    None => NV_FAILURE,
                };
                self.respond(ctx, ResponseKind::NvalOperation, status, &[lo, hi]);
                self.nv_updated(ctx, request.id);
            }
            NvalOp::Init => self.respond(ctx, ResponseKind::NvalOperation, NV_FAILURE, &[lo, hi]),
        }
    }

    /// Tells the owner of `id` to reload it.
    fn nv_updated(&mut self, ctx: &TaskContext<'_>, id: NvId) {
        if id == NvId::BATTERY_SENSE_INTERVAL {
            self.battery_interval = self.load_interval();
            self.arm_battery_monitor(ctx);
        } else if id.is_alarm() {
            ctx.send(TaskId::Alarm, Message::NvUpdated(id));
        } else {
            ctx.send(TaskId::Display, Message::NvUpdated(id));
        }
    }

    fn load_interval(&self) -> u32 {
        match self.nv.load(NvId::BATTERY_SENSE_INTERVAL) {
            Some(0) | None => BATTERY_SENSE_INTERVAL,
            Some(seconds) => seconds,
        }
    }

    fn reset(&mut self, option: ResetOption) {
        let master = option == ResetOption::Master;
        if master {
            if let Err(err) = self.nv.save(NvId::MASTER_RESET, u8::from(option).into()) {
                log::error!("background: {err}");
            }
        }
        log::info!("background: software reset (master: {master})");
        self.hardware.reset(master);
    }
}

impl<N, H> TaskHandler for BackgroundTask<N, H>
where
    N: NvStore + Send + 'static,
    H: Hardware + Send + 'static,
{
    fn on_start(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), KernelError> {
        self.nv
            .register_default(NvId::BATTERY_SENSE_INTERVAL, 1, BATTERY_SENSE_INTERVAL);
        self.nv.register_default(NvId::MASTER_RESET, 1, 0);
        self.battery_interval = self.load_interval();
        self.last_battery = self.hardware.battery();

        self.battery_timer = Some(ctx.allocate_timer()?);
        let led = ctx.allocate_timer()?;
        ctx.setup_timer(
            led,
            TimerSetup::once(
                LED_ON_SECONDS,
                TaskId::Background,
                Message::LedChange(LedAction::Off),
            ),
        );
        self.led_timer = Some(led);
        self.callback_timer = Some(ctx.allocate_timer()?);

        self.arm_battery_monitor(ctx);
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut TaskContext<'_>, message: Message) {
        match message {
            Message::BatteryChargeControl => self.monitor_battery(ctx),
            Message::LedChange(action) => self.led(ctx, action),
            Message::SetCallbackTimer(timer) => self.callback_timer(ctx, timer),
            Message::GetDeviceType => {
                let board = self.hardware.board_type();
                self.respond(ctx, ResponseKind::DeviceType, 0, &[board]);
            }
            Message::GetRealTimeClock => {
                let rtc = self.hardware.rtc().to_bytes();
                self.respond(ctx, ResponseKind::RealTimeClock, 0, &rtc);
            }
            Message::SetRealTimeClock(time) => self.set_rtc(ctx, time),
            Message::ReadBatteryVoltage => self.read_battery(ctx),
            Message::NvalOperation(request) => self.nval(ctx, request),
            Message::SetVibrateMode(pattern) => self.hardware.vibrate(pattern),
            Message::SoftwareReset(option) => self.reset(option),
            other => log::warn!("background: unhandled {:?}", other.kind()),
        }
    }
}
