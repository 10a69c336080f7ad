//! Assembly of the four tasks into a running watch.

use watch_display::{DisplayStatus, DisplayTask, StatusHandle};
use watch_kernel::input::{Button, PressKind};
use watch_kernel::message::Message;
use watch_kernel::{Kernel, KernelConfig, KernelError, PoolStats, SendError, TaskId};
use watch_platform::{Hardware, HostLink, NvStore, Renderer};

use crate::alarm::AlarmTask;
use crate::background::BackgroundTask;
use crate::host::HostBridge;

/// Collaborators the tasks are built over. The store and the hardware are
/// shared by several tasks, so they must be cheap handles.
pub struct Collaborators<N, R, H, L> {
    pub nv: N,
    pub renderer: R,
    pub hardware: H,
    pub link: L,
}

pub struct WatchSystem {
    kernel: Kernel,
    display: StatusHandle,
}

impl WatchSystem {
    /// Registers every task and creates their mailboxes. Nothing runs until
    /// [`start`](Self::start).
    pub fn assemble<N, R, H, L>(
        config: KernelConfig,
        parts: Collaborators<N, R, H, L>,
    ) -> Result<Self, KernelError>
    where
        N: NvStore + Clone + Send + 'static,
        R: Renderer + Send + 'static,
        H: Hardware + Clone + Send + 'static,
        L: HostLink + Send + 'static,
    {
        let Collaborators {
            nv,
            renderer,
            hardware,
            link,
        } = parts;

        let display = DisplayTask::new(nv.clone(), renderer, hardware.clone());
        let status = display.status_handle();

        let kernel = Kernel::with_config(config)
            .register(TaskId::Display, display)
            .register(TaskId::Alarm, AlarmTask::new(nv.clone(), hardware.clone()))
            .register(TaskId::Host, HostBridge::new(link))
            .register(TaskId::Background, BackgroundTask::new(nv, hardware))
            .build()?;

        Ok(Self {
            kernel,
            display: status,
        })
    }

    /// Runs every task's start hook and the messages they produce.
    pub fn start(&self) -> Result<(), KernelError> {
        self.kernel.start()?;
        self.kernel.run_until_idle();
        Ok(())
    }

    /// One second of wall time: advance the timers and drain the mailboxes.
    pub fn tick(&self) -> usize {
        let fired = self.kernel.tick();
        self.kernel.run_until_idle();
        fired
    }

    pub fn press(&self, button: Button, press: PressKind) -> Result<(), SendError> {
        self.kernel.post_button(button, press)?;
        self.kernel.run_until_idle();
        Ok(())
    }

    pub fn route(&self, message: Message) -> Result<(), SendError> {
        self.kernel.route(message)?;
        self.kernel.run_until_idle();
        Ok(())
    }

    pub fn display(&self) -> DisplayStatus {
        self.display.get()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.kernel.pool_stats()
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}
