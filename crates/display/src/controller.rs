//! The display task: owner of the button table and the mode/page state.
//!
//! Every state change happens inside one handler invocation. Requests for
//! other tasks (radio, alarms, host status) leave as routed messages; nothing
//! outside this task writes the button table or the mode state.

use watch_kernel::input::{ButtonAction, ButtonEvent, ButtonKey};
use watch_kernel::message::{
    AlarmEdit, AlarmOp, AlarmSlot, CalendarOp, DisplayOption, HostResponse, IdleBufferConfig,
    MenuAction, MenuOption, Message, Mode, ResponseKind, SecondsOption, StatusChange, StatusCode,
    TimeAdjust, ALARM_SLOTS,
};
use watch_kernel::sync::{Arc, Mutex};
use watch_kernel::task::{TaskContext, TaskHandler, TaskId};
use watch_kernel::time::{TimerId, TimerSetup};
use watch_kernel::KernelError;
use watch_platform::{
    Hardware, NvId, NvStore, PairingOp, RadioState, RadioStatus, Renderer, VibratePattern,
};

use crate::buttons::{ButtonEntry, ButtonTable};
use crate::calendar::{CalendarEdit, CalendarView};
use crate::draw::{self, MenuView};
use crate::mode::{IdlePage, ModeState};
use crate::pages;
use crate::settings::DisplaySettings;

/// Seconds the splash screen stays up.
pub const SPLASH_SECONDS: u32 = 3;
/// Refresh period of the status page.
pub const WATCH_STATUS_SECONDS: u32 = 60;

pub const LINK_ALARM_PATTERN: VibratePattern = VibratePattern {
    enable: true,
    on_ms: 0x00c8,
    off_ms: 0x00c8,
    cycles: 3,
};

/// Idle page matching the radio state.
pub fn idle_page_for(radio: &RadioStatus) -> IdlePage {
    if radio.connected() {
        IdlePage::Normal
    } else if !radio.bluetooth_on() {
        IdlePage::BluetoothOff
    } else if radio.discoverable {
        IdlePage::RadioOnPairing
    } else {
        IdlePage::RadioOnNoPairing
    }
}

/// Copy of the display state published after every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisplayStatus {
    pub mode: ModeState,
    pub settings: DisplaySettings,
    pub calendar: CalendarView,
    pub alarm: AlarmSlot,
}

/// Read side of [`DisplayStatus`], usable while the task runs in a kernel.
#[derive(Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<DisplayStatus>>,
}

impl StatusHandle {
    pub fn get(&self) -> DisplayStatus {
        *self.inner.lock()
    }

    fn publish(&self, status: DisplayStatus) {
        *self.inner.lock() = status;
    }
}

pub struct DisplayTask<N, R, H> {
    nv: N,
    renderer: R,
    hardware: H,
    buttons: ButtonTable,
    state: ModeState,
    settings: DisplaySettings,
    calendar: CalendarView,
    /// Slot shown on the alarm settings page, as last reported by the alarm task.
    alarm: AlarmSlot,
    display_timer: Option<TimerId>,
    rtc_timer: Option<TimerId>,
    rtc_update: bool,
    /// Cleared while the splash screen is up.
    connection_redraw: bool,
    status: StatusHandle,
}

impl<N, R, H> DisplayTask<N, R, H>
where
    N: NvStore + Send + 'static,
    R: Renderer + Send + 'static,
    H: Hardware + Send + 'static,
{
    pub fn new(nv: N, renderer: R, hardware: H) -> Self {
        Self {
            nv,
            renderer,
            hardware,
            buttons: ButtonTable::new(),
            state: ModeState::default(),
            settings: DisplaySettings::default(),
            calendar: CalendarView::default(),
            alarm: AlarmSlot::default(),
            display_timer: None,
            rtc_timer: None,
            rtc_update: false,
            connection_redraw: false,
            status: StatusHandle::default(),
        }
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn buttons(&self) -> &ButtonTable {
        &self.buttons
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn calendar(&self) -> &CalendarView {
        &self.calendar
    }

    fn publish(&self) {
        self.status.publish(DisplayStatus {
            mode: self.state,
            settings: self.settings,
            calendar: self.calendar,
            alarm: self.alarm,
        });
    }

    fn start_display_timer(&self, ctx: &TaskContext<'_>, setup: TimerSetup) {
        if let Some(id) = self.display_timer {
            ctx.setup_timer(id, setup);
            ctx.start_timer(id);
        }
    }

    /// Stops the generic display timer and the RTC-driven redraw.
    fn stop_display_timer(&mut self, ctx: &TaskContext<'_>) {
        self.rtc_update = false;
        for id in [self.display_timer, self.rtc_timer].into_iter().flatten() {
            ctx.stop_timer(id);
        }
    }

    fn enable_rtc_update(&mut self, ctx: &TaskContext<'_>) {
        self.rtc_update = true;
        if let Some(id) = self.rtc_timer {
            let period = self.settings.rtc_redraw_period();
            ctx.setup_timer(id, TimerSetup::forever(period, TaskId::Display, Message::RtcUpdate));
            ctx.start_timer(id);
        }
    }

    /// Makes `page` current, reprogramming its button column only when the
    /// installed bindings belong to another page.
    fn show_page(&mut self, page: IdlePage) {
        if self.state.show(page) {
            log::debug!("display: binding buttons for {page:?}");
            pages::install_page(&mut self.buttons, page);
        }
    }

    fn draw_idle_top(&mut self) {
        let rtc = self.hardware.rtc();
        let battery = self.hardware.battery();
        draw::idle_top(&mut self.renderer, &rtc, &self.settings, &battery);
    }

    fn idle_update(&mut self, ctx: &TaskContext<'_>) {
        self.calendar.edit = CalendarEdit::None;
        if !self.state.is_idle() {
            // Redrawn when the mode returns to idle.
            self.state.page = IdlePage::Normal;
            return;
        }
        self.stop_display_timer(ctx);
        self.enable_rtc_update(ctx);
        if self.settings.idle_buffer == IdleBufferConfig::WatchControlsTop {
            self.draw_idle_top();
        }
        self.show_page(IdlePage::Normal);
    }

    /// Enters the idle page that matches the radio state.
    fn enter_radio_page(&mut self, ctx: &TaskContext<'_>) {
        let page = idle_page_for(&self.hardware.radio());
        if page == IdlePage::Normal {
            self.idle_update(ctx);
            return;
        }
        self.calendar.edit = CalendarEdit::None;
        self.stop_display_timer(ctx);
        let rtc = self.hardware.rtc();
        let battery = self.hardware.battery();
        draw::radio_page(&mut self.renderer, page, &rtc, &self.settings, &battery);
        self.show_page(page);
    }

    fn change_mode(&mut self, ctx: &TaskContext<'_>, mode: Mode) {
        if !self.state.enter(mode) {
            log::debug!("display: already in {mode:?}");
            return;
        }
        log::info!("display: mode {:?} -> {mode:?}", self.state.last);

        match mode {
            Mode::Idle => self.idle_update(ctx),
            Mode::Application | Mode::Notification | Mode::Scroll => {
                self.stop_display_timer(ctx);
                let timeout = self.settings.timeouts.for_mode(mode);
                // A zero timeout never returns on its own.
                if timeout > 0 {
                    self.start_display_timer(
                        ctx,
                        TimerSetup::once(timeout, TaskId::Display, Message::ModeTimeout(mode)),
                    );
                }
            }
        }

        ctx.route(Message::StatusChangeEvent(StatusChange {
            mode,
            status: StatusCode::UpdateComplete,
        }));
    }

    fn mode_timeout(&mut self, ctx: &TaskContext<'_>, mode: Mode) {
        if self.state.is_idle() || mode != self.state.current {
            log::debug!("display: stale timeout for {mode:?}, now {:?}", self.state.current);
            return;
        }
        log::info!("display: {mode:?} timed out");
        self.state.enter(Mode::Idle);
        self.idle_update(ctx);
        ctx.route(Message::StatusChangeEvent(StatusChange {
            mode,
            status: StatusCode::ModeTimeout,
        }));
    }

    fn watch_status(&mut self, ctx: &TaskContext<'_>) {
        self.stop_display_timer(ctx);
        let radio = self.hardware.radio();
        let battery = self.hardware.battery();
        draw::watch_status(&mut self.renderer, &radio, &battery);
        self.show_page(IdlePage::WatchStatus);
        self.start_display_timer(
            ctx,
            TimerSetup::once(WATCH_STATUS_SECONDS, TaskId::Display, Message::WatchStatus),
        );
    }

    fn bar_code(&mut self, ctx: &TaskContext<'_>) {
        self.stop_display_timer(ctx);
        draw::qr_code(&mut self.renderer);
        self.show_page(IdlePage::QrCode);
    }

    fn draw_calendar(&mut self) {
        let rtc = self.hardware.rtc();
        draw::calendar(&mut self.renderer, &self.calendar, &rtc);
        self.show_page(IdlePage::Calendar);
    }

    fn show_calendar(&mut self, ctx: &TaskContext<'_>) {
        self.stop_display_timer(ctx);
        self.calendar.sync(&self.hardware.rtc());
        self.draw_calendar();
    }

    fn calendar_op(&mut self, op: CalendarOp) {
        let mut rtc = self.hardware.rtc();
        if self.calendar.apply(op, &mut rtc) {
            self.hardware.set_rtc(rtc);
        }
        self.draw_calendar();
    }

    fn draw_menu(&mut self, page: IdlePage) {
        let radio = self.hardware.radio();
        let rtc = self.hardware.rtc();
        let view = MenuView {
            settings: &self.settings,
            radio: &radio,
            alarm: &self.alarm,
            rtc: &rtc,
        };
        draw::menu(&mut self.renderer, page, &view);
        self.show_page(page);
    }

    /// Menu pages never arm a mode timeout; they are left through a button.
    fn menu_mode(&mut self, ctx: &TaskContext<'_>, option: MenuOption) {
        self.stop_display_timer(ctx);
        let page = match option {
            MenuOption::Main => IdlePage::MenuMain,
            MenuOption::Settings => IdlePage::MenuSettings,
            MenuOption::AlarmSettings => IdlePage::AlarmSettings,
            MenuOption::TimeSettings => IdlePage::TimeSettings,
            MenuOption::UpdateCurrentPage if self.state.page.is_menu() => self.state.page,
            MenuOption::UpdateCurrentPage => {
                log::warn!("display: no menu page to update on {:?}", self.state.page);
                return;
            }
        };
        if page == IdlePage::AlarmSettings && self.state.page != IdlePage::AlarmSettings {
            ctx.route(Message::QueryAlarm(self.alarm.slot));
        }
        self.draw_menu(page);
    }

    fn redraw_menu(&mut self, ctx: &TaskContext<'_>) {
        self.menu_mode(ctx, MenuOption::UpdateCurrentPage);
    }

    fn menu_button(&mut self, ctx: &TaskContext<'_>, action: MenuAction) {
        self.stop_display_timer(ctx);
        let radio = self.hardware.radio();
        let slot = self.alarm.slot;
        let edit = |op| Message::AlarmEdit(AlarmEdit { slot, op });

        match action {
            MenuAction::ToggleBluetooth => {
                // The radio reports back with a connection change.
                if radio.state != RadioState::Initializing {
                    ctx.route(if radio.bluetooth_on() {
                        Message::TurnRadioOff
                    } else {
                        Message::TurnRadioOn
                    });
                }
            }
            MenuAction::ToggleDiscoverability => {
                if radio.state != RadioState::Initializing {
                    ctx.route(Message::PairingControl(if radio.discoverable {
                        PairingOp::DisableDiscoverable
                    } else {
                        PairingOp::EnableDiscoverable
                    }));
                }
            }
            MenuAction::ToggleSecureSimplePairing => {
                if radio.state != RadioState::Initializing {
                    ctx.route(Message::PairingControl(PairingOp::ToggleSsp));
                }
            }
            MenuAction::ToggleLinkAlarm => {
                self.settings.link_alarm = !self.settings.link_alarm;
                self.redraw_menu(ctx);
            }
            MenuAction::ToggleRstNmiPin => {
                self.settings.rst_pin = !self.settings.rst_pin;
                self.redraw_menu(ctx);
            }
            MenuAction::Exit => {
                ctx.route(Message::PairingControl(PairingOp::SaveSpp));
                self.settings.save_menu_items(&mut self.nv);
                ctx.route(Message::SaveAlarms);
                self.idle_update(ctx);
            }
            MenuAction::InvertDisplay => {
                self.settings.invert = !self.settings.invert;
                self.redraw_menu(ctx);
            }
            MenuAction::ToggleSecondsDisplay => {
                self.settings.seconds = !self.settings.seconds;
                self.redraw_menu(ctx);
            }
            // The alarm task answers with AlarmStatus, which redraws the page.
            MenuAction::AlarmOnOff => ctx.route(edit(AlarmOp::ToggleOn)),
            MenuAction::AlarmMinutePlus => ctx.route(edit(AlarmOp::MinutePlus)),
            MenuAction::AlarmHourPlus => ctx.route(edit(AlarmOp::HourPlus)),
            MenuAction::NextAlarm => {
                let next = (self.alarm.slot + 1) % ALARM_SLOTS;
                self.alarm = AlarmSlot {
                    slot: next,
                    ..AlarmSlot::default()
                };
                ctx.route(Message::QueryAlarm(next));
            }
        }
    }

    fn modify_time(&mut self, ctx: &TaskContext<'_>, adjust: TimeAdjust) {
        let mut rtc = self.hardware.rtc();
        match adjust {
            TimeAdjust::HourPlus => rtc.hour = (rtc.hour % 24 + 1) % 24,
            TimeAdjust::MinutePlus => rtc.minute = (rtc.minute % 60 + 1) % 60,
            TimeAdjust::DayOfWeekPlus => rtc.day_of_week = rtc.day_of_week % 7 + 1,
            TimeAdjust::CorrectionInc | TimeAdjust::CorrectionDec => {
                let delta = if adjust == TimeAdjust::CorrectionInc { 1 } else { -1 };
                self.settings.adjust_correction(delta);
                self.settings.save_correction(&mut self.nv);
                self.hardware.set_rtc_correction(self.settings.correction);
            }
        }
        if matches!(
            adjust,
            TimeAdjust::HourPlus | TimeAdjust::MinutePlus | TimeAdjust::DayOfWeekPlus
        ) {
            self.hardware.set_rtc(rtc);
        }

        match self.state.page {
            page if page.is_menu() => self.redraw_menu(ctx),
            IdlePage::Normal => self.draw_idle_top(),
            IdlePage::BluetoothOff | IdlePage::RadioOnNoPairing => self.enter_radio_page(ctx),
            _ => {}
        }
    }

    fn configure_display(&mut self, ctx: &TaskContext<'_>, option: DisplayOption) {
        match option {
            DisplayOption::HideSeconds => self.settings.seconds = false,
            DisplayOption::ShowSeconds => self.settings.seconds = true,
            DisplayOption::NormalVideo => self.settings.invert = false,
            DisplayOption::InvertVideo => self.settings.invert = true,
        }
        if self.state.is_idle() {
            self.idle_update(ctx);
        }
    }

    fn configure_idle_buffer(&mut self, ctx: &TaskContext<'_>, config: IdleBufferConfig) {
        self.settings.idle_buffer = config;
        if self.state.is_idle() && config == IdleBufferConfig::WatchControlsTop {
            self.idle_update(ctx);
        }
    }

    fn toggle_seconds(&mut self, ctx: &TaskContext<'_>, option: SecondsOption) {
        self.settings.seconds = !self.settings.seconds;
        if option == SecondsOption::UpdateIdle {
            self.idle_update(ctx);
        }
    }

    fn connection_changed(&mut self, ctx: &TaskContext<'_>) {
        if !self.connection_redraw || !self.state.is_idle() {
            return;
        }
        match self.state.page {
            page if page.is_connection_page() => self.enter_radio_page(ctx),
            IdlePage::MenuMain => self.redraw_menu(ctx),
            IdlePage::WatchStatus => self.watch_status(ctx),
            _ => {}
        }
    }

    fn rtc_update(&mut self) {
        if self.rtc_update
            && self.state.is_idle_on(IdlePage::Normal)
            && self.settings.idle_buffer == IdleBufferConfig::WatchControlsTop
        {
            self.draw_idle_top();
        }
    }

    fn alarm_status(&mut self, ctx: &TaskContext<'_>, slot: AlarmSlot) {
        if slot.slot != self.alarm.slot {
            return;
        }
        self.alarm = slot;
        if self.state.is_idle_on(IdlePage::AlarmSettings) {
            self.redraw_menu(ctx);
        }
    }

    fn nv_updated(&mut self, id: NvId) {
        if self.settings.reload(&self.nv, id) {
            log::debug!("display: reloaded {id:?}");
            if id == NvId::RTC_CORRECTION {
                self.hardware.set_rtc_correction(self.settings.correction);
            }
        }
    }

    fn button_event(&mut self, ctx: &TaskContext<'_>, event: ButtonEvent) {
        let mode = self.state.button_mode();
        match self.buttons.dispatch(mode, event) {
            Some(message) => ctx.route(message),
            None => log::trace!("display: {event:?} unbound in {mode:?}"),
        }
    }

    fn read_button_config(&mut self, ctx: &TaskContext<'_>, key: ButtonKey) {
        let bytes = ButtonEntry::response_bytes(key, self.buttons.read_config(key));
        match HostResponse::new(ResponseKind::ButtonConfig, &bytes) {
            Ok(response) => ctx.route(Message::Response(response)),
            Err(err) => log::error!("display: {err}"),
        }
    }

    fn enable_button(&mut self, action: ButtonAction) {
        self.buttons.enable(action.key, action.kind, action.options);
    }

    /// Page-entry and page-local messages are only meaningful while idle,
    /// and page-local ones only on the page that binds them.
    fn ignored_outside_idle(&self, message: &Message) -> bool {
        let idle = self.state.is_idle();
        let stale = match message {
            Message::WatchStatus
            | Message::ShowCalendar
            | Message::BarCode
            | Message::MenuMode(_)
            | Message::ModifyTime(_) => !idle,
            Message::Calendar(_) => !self.state.is_idle_on(IdlePage::Calendar),
            Message::MenuButton(_) => !(idle && self.state.page.is_menu()),
            _ => false,
        };
        if stale {
            log::debug!(
                "display: ignoring {:?} in {:?}",
                message.kind(),
                self.state.current
            );
            return true;
        }
        false
    }
}

impl<N, R, H> TaskHandler for DisplayTask<N, R, H>
where
    N: NvStore + Send + 'static,
    R: Renderer + Send + 'static,
    H: Hardware + Send + 'static,
{
    fn on_start(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), KernelError> {
        draw::splash(&mut self.renderer);
        self.settings = DisplaySettings::load(&mut self.nv);
        self.hardware.set_rtc_correction(self.settings.correction);

        self.display_timer = Some(ctx.allocate_timer()?);
        self.rtc_timer = Some(ctx.allocate_timer()?);
        self.start_display_timer(
            ctx,
            TimerSetup::once(SPLASH_SECONDS, TaskId::Display, Message::SplashTimeout),
        );
        self.connection_redraw = false;

        pages::install_defaults(&mut self.buttons);
        self.show_page(IdlePage::Normal);

        ctx.route(Message::TurnRadioOn);
        self.publish();
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut TaskContext<'_>, message: Message) {
        if self.ignored_outside_idle(&message) {
            return;
        }
        match message {
            Message::ButtonEvent(event) => self.button_event(ctx, event),
            Message::EnableButton(action) => self.enable_button(action),
            Message::DisableButton(key) => self.buttons.disable(key),
            Message::ReadButtonConfig(key) => self.read_button_config(ctx, key),

            Message::IdleUpdate => self.idle_update(ctx),
            Message::ChangeMode(mode) => self.change_mode(ctx, mode),
            Message::ModeTimeout(mode) => self.mode_timeout(ctx, mode),
            Message::WatchStatus => self.watch_status(ctx),
            Message::ShowCalendar => self.show_calendar(ctx),
            Message::Calendar(op) => self.calendar_op(op),
            Message::BarCode => self.bar_code(ctx),
            Message::MenuMode(option) => self.menu_mode(ctx, option),
            Message::MenuButton(action) => self.menu_button(ctx, action),
            Message::ConfigureDisplay(option) => self.configure_display(ctx, option),
            Message::ConfigureIdleBufferSize(config) => self.configure_idle_buffer(ctx, config),
            Message::ModifyTime(adjust) => self.modify_time(ctx, adjust),
            Message::ToggleSeconds(option) => self.toggle_seconds(ctx, option),

            Message::SplashTimeout => {
                self.connection_redraw = true;
                self.enter_radio_page(ctx);
            }
            Message::ConnectionStateChange => self.connection_changed(ctx),
            Message::RtcUpdate => self.rtc_update(),
            Message::LinkAlarm => {
                if self.settings.link_alarm {
                    ctx.route(Message::SetVibrateMode(LINK_ALARM_PATTERN));
                }
            }
            Message::LowBatteryWarning | Message::LowBatteryBtOff => {}
            Message::AlarmStatus(slot) => self.alarm_status(ctx, slot),
            Message::NvUpdated(id) => self.nv_updated(id),

            other => log::warn!("display: unhandled {:?}", other.kind()),
        }
        self.publish();
    }
}
