//! Poller service layer - owns the poller in a tokio task.
//!
//! [`PollerHandle::spawn`] moves an [`InputPoller`] into a single tokio task,
//! giving it exactly one thread of control: a `tokio::time::interval` fires
//! ticks at the configured rate, and each loop iteration drains source
//! connect/disconnect events before ticking, so event handling is atomic with
//! respect to ticks.
//!
//! # Architecture
//!
//! ```text
//! DeviceSource ──► InputPoller ──► watch::channel(CommandFrame) ──► consumers
//!                      ▲
//!                 mpsc control (vibrate / pause / resume / shutdown)
//! ```
//!
//! State fans out as [`CommandFrame`] values over a watch channel; consumers
//! clone the receiver via [`PollerHandle::subscribe`] and always observe the
//! latest frame. Control requests travel over a small mpsc channel, and a
//! [`CancellationToken`] guarantees the task exits even if the control channel
//! backs up.

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::poller::command::{ConnectionState, NormalizedCommand};
use crate::poller::input_poller::{InputPoller, PollerSettings};
use crate::source::DeviceSource;

/// Snapshot published after every successful tick.
#[derive(Debug, Clone)]
pub struct CommandFrame {
    pub state: ConnectionState,
    pub command: NormalizedCommand,
    pub timestamp: DateTime<Local>,
}

impl CommandFrame {
    fn disconnected() -> Self {
        Self {
            state: ConnectionState::default(),
            command: NormalizedCommand::default(),
            timestamp: Local::now(),
        }
    }
}

/// Control requests handled by the poller task between ticks.
#[derive(Debug)]
enum PollerRequest {
    Vibrate {
        duration_ms: u32,
        weak: f32,
        strong: f32,
    },
    Pause,
    Resume,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Poller control channel closed: {0}")]
    ChannelError(String),
}

/// Handle for the running poller task.
///
/// Dropping the handle closes the control channel, which also stops the task.
pub struct PollerHandle {
    request_sender: mpsc::Sender<PollerRequest>,
    frame_receiver: watch::Receiver<CommandFrame>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Spawns the poller task and starts sampling immediately.
    pub fn spawn<S>(settings: PollerSettings, source: S) -> Self
    where
        S: DeviceSource + Send + 'static,
    {
        info!("Spawning poller task with settings: {:?}", settings);

        let (request_sender, mut request_receiver) = mpsc::channel(32);
        let (frame_sender, frame_receiver) = watch::channel(CommandFrame::disconnected());
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut poller = InputPoller::new(source, settings);
            let interval_period = poller.settings().tick_interval();

            // Production fan-out rides the same subscriber registry the
            // public API exposes.
            poller.subscribe(move |state, command| {
                let _ = frame_sender.send(CommandFrame {
                    state: state.clone(),
                    command: command.clone(),
                    timestamp: Local::now(),
                });
            });
            poller.start();

            let mut ticker = tokio::time::interval(interval_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        debug!("Poller task cancelled");
                        break;
                    }
                    request = request_receiver.recv() => {
                        match request {
                            Some(PollerRequest::Vibrate { duration_ms, weak, strong }) => {
                                poller.vibrate(duration_ms, weak, strong);
                            }
                            Some(PollerRequest::Pause) => poller.stop(),
                            Some(PollerRequest::Resume) => poller.start(),
                            Some(PollerRequest::Shutdown) | None => break,
                        }
                    }
                    _ = ticker.tick() => {
                        poller.pump_events();
                        poller.tick();
                    }
                }
            }

            if poller.is_running() {
                poller.stop();
            }
            info!("Poller task finished");
        });

        Self {
            request_sender,
            frame_receiver,
            cancel,
            task,
        }
    }

    /// Clones the frame receiver; consumers always observe the latest frame.
    pub fn subscribe(&self) -> watch::Receiver<CommandFrame> {
        self.frame_receiver.clone()
    }

    /// Latest published frame.
    pub fn current_frame(&self) -> CommandFrame {
        self.frame_receiver.borrow().clone()
    }

    /// Requests haptic feedback on the tracked device (best-effort).
    pub async fn vibrate(
        &self,
        duration_ms: u32,
        weak: f32,
        strong: f32,
    ) -> Result<(), PollerError> {
        self.request(PollerRequest::Vibrate {
            duration_ms,
            weak,
            strong,
        })
        .await
    }

    /// Pauses sampling; last-known state stays published.
    pub async fn pause(&self) -> Result<(), PollerError> {
        self.request(PollerRequest::Pause).await
    }

    /// Resumes sampling after a pause.
    pub async fn resume(&self) -> Result<(), PollerError> {
        self.request(PollerRequest::Resume).await
    }

    async fn request(&self, request: PollerRequest) -> Result<(), PollerError> {
        self.request_sender
            .send(request)
            .await
            .map_err(|e| PollerError::ChannelError(e.to_string()))
    }

    /// Stops the task and waits for it to exit. No frame is published after
    /// this returns.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Poller task join failed: {e}");
        }
    }
}
