//! Core fixed-rate input poller.
//!
//! [`InputPoller`] owns the tracked-device selection, the latest
//! [`ConnectionState`]/[`NormalizedCommand`] pair, and an ordered subscriber
//! registry. It is a plain synchronous struct: ticks only happen when the
//! driver calls [`InputPoller::tick`], which makes the stop contract trivial
//! (after `stop()` returns, `tick()` is a no-op) and lets tests drive it
//! deterministically against a fake [`DeviceSource`].
//!
//! Nothing in here is fatal. Missing devices, short samples, and unsupported
//! haptics all degrade to safe defaults and are observable only through
//! logging; a teleoperation consumer must never see a stale non-neutral
//! command presented as authoritative.

use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::classify_device;
use crate::poller::command::{ConnectionState, NormalizedCommand};
use crate::source::{DeviceSource, SourceEvent};

pub const DEFAULT_POLL_RATE_HZ: u32 = 60;
pub const DEFAULT_DEADZONE: f32 = 0.15;

/// Sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Target sampling rate. 60 Hz nominal, one sample every ~16.67ms.
    pub poll_rate_hz: u32,

    /// Stick deadzone threshold, valid range [0, 1).
    pub deadzone: f32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_rate_hz: DEFAULT_POLL_RATE_HZ,
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

impl PollerSettings {
    /// Tick period derived from the poll rate.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.poll_rate_hz.max(1)))
    }

    /// Replaces out-of-range values with defaults, logging each correction.
    pub fn sanitized(mut self) -> Self {
        if !(0.0..1.0).contains(&self.deadzone) {
            warn!(
                "Deadzone {} outside [0, 1), falling back to {}",
                self.deadzone, DEFAULT_DEADZONE
            );
            self.deadzone = DEFAULT_DEADZONE;
        }
        if self.poll_rate_hz == 0 {
            warn!("Poll rate of 0 Hz requested, falling back to {DEFAULT_POLL_RATE_HZ} Hz");
            self.poll_rate_hz = DEFAULT_POLL_RATE_HZ;
        }
        self
    }
}

/// Handle returned from [`InputPoller::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ConnectionState, &NormalizedCommand) + Send>;

pub struct InputPoller<S: DeviceSource> {
    source: S,
    settings: PollerSettings,
    state: ConnectionState,
    command: NormalizedCommand,
    tracked: Option<usize>,
    // Vec keeps registration order; delivery happens in that order.
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    running: bool,
}

impl<S: DeviceSource> InputPoller<S> {
    pub fn new(source: S, settings: PollerSettings) -> Self {
        let settings = settings.sanitized();
        debug!("Creating input poller with settings: {:?}", settings);
        Self {
            source,
            settings,
            state: ConnectionState::default(),
            command: NormalizedCommand::default(),
            tracked: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            running: false,
        }
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }

    /// Begins sampling. Idempotent: starting a running poller is a logged no-op.
    pub fn start(&mut self) {
        if self.running {
            warn!("Poller already running, ignoring start");
            return;
        }
        info!(
            "Starting input poller at {} Hz (deadzone {})",
            self.settings.poll_rate_hz, self.settings.deadzone
        );
        self.running = true;
    }

    /// Halts sampling. Idempotent; last-known state stays readable.
    ///
    /// Synchronous by construction: ticks only run through [`Self::tick`],
    /// which checks the running flag, so no tick can execute after this
    /// returns.
    pub fn stop(&mut self) {
        if !self.running {
            warn!("Poller not running, ignoring stop");
            return;
        }
        info!("Stopping input poller");
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registers a subscriber invoked after every successful tick. Returns a
    /// handle for [`Self::unsubscribe`].
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&ConnectionState, &NormalizedCommand) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        debug!("Registered subscriber {:?}", id);
        id
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != self.subscribers.len()
    }

    /// Latest published connection snapshot. Never blocks, never samples.
    pub fn current_state(&self) -> ConnectionState {
        self.state.clone()
    }

    /// Latest published command snapshot. Never blocks, never samples.
    pub fn current_command(&self) -> NormalizedCommand {
        self.command.clone()
    }

    /// Vendor label for a device identifier string.
    pub fn classify_device(&self, device_id: &str) -> &'static str {
        classify_device(device_id)
    }

    /// Device attached. Adopts it as the tracked device if none is tracked and
    /// refreshes state from it immediately, without waiting for the next tick.
    pub fn on_connect(&mut self, index: usize, device_id: &str) {
        if self.tracked.is_some() {
            debug!(
                "Already tracking a device, ignoring connect of {} (index {})",
                device_id, index
            );
            return;
        }
        info!(
            "Adopting device {} (index {}, {})",
            device_id,
            index,
            classify_device(device_id)
        );
        self.tracked = Some(index);
        self.refresh_from_tracked();
    }

    /// Device detached. If it was the tracked device, resets to disconnected
    /// defaults so downstream consumers see a neutral command.
    pub fn on_disconnect(&mut self, index: usize, device_id: &str) {
        if self.tracked != Some(index) {
            debug!(
                "Disconnect of untracked device {} (index {}), ignoring",
                device_id, index
            );
            return;
        }
        info!("Tracked device {} disconnected, resetting state", device_id);
        self.tracked = None;
        self.state = ConnectionState::default();
        self.command = NormalizedCommand::default();
        self.notify();
    }

    /// Drains source connect/disconnect events and applies them. Called by the
    /// driver between ticks so event handling is atomic with respect to ticks.
    pub fn pump_events(&mut self) {
        for event in self.source.drain_events() {
            match event {
                SourceEvent::Connected { index, id } => self.on_connect(index, &id),
                SourceEvent::Disconnected { index, id } => self.on_disconnect(index, &id),
            }
        }
    }

    /// Best-effort haptic feedback on the tracked device. Magnitudes in
    /// [0, 1]. Missing device or unsupported haptics is a logged no-op.
    pub fn vibrate(&mut self, duration_ms: u32, weak: f32, strong: f32) {
        let Some(index) = self.tracked else {
            warn!("Vibrate requested without a tracked device, ignoring");
            return;
        };
        if let Err(e) = self.source.rumble(index, duration_ms, weak, strong) {
            warn!("Haptic feedback unavailable: {e}");
        }
    }

    /// Executes one sampling tick.
    ///
    /// No-op unless running. Discovers a device if none is tracked (first
    /// present index wins). A tracked device missing from enumeration is a
    /// tick no-op: disconnect stays event-driven, briefly stale enumerations
    /// from flaky platform polling must not force a disconnect.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        let index = match self.tracked {
            Some(index) => index,
            None => match self.source.device_indices().first().copied() {
                Some(index) => {
                    debug!("Discovered device at index {index}, tracking it");
                    self.tracked = Some(index);
                    index
                }
                None => return,
            },
        };

        if !self.source.device_indices().contains(&index) {
            debug!("Tracked device {index} absent from enumeration, skipping tick");
            return;
        }

        self.refresh(index);
    }

    fn refresh_from_tracked(&mut self) {
        if let Some(index) = self.tracked {
            self.refresh(index);
        }
    }

    fn refresh(&mut self, index: usize) {
        let Some(sample) = self.source.sample(index) else {
            debug!("No sample for device {index}, skipping update");
            return;
        };
        self.state = ConnectionState::from_sample(&sample);
        self.command = NormalizedCommand::from_sample(&sample, self.settings.deadzone);
        self.notify();
    }

    // Delivers the current snapshots in registration order. A panicking
    // subscriber is caught and logged; the remaining subscribers still
    // receive the tick and poller state stays consistent.
    fn notify(&mut self) {
        let Self {
            subscribers,
            state,
            command,
            ..
        } = self;
        for (id, subscriber) in subscribers.iter_mut() {
            let delivery = catch_unwind(AssertUnwindSafe(|| subscriber(state, command)));
            if delivery.is_err() {
                warn!("Subscriber {:?} panicked during notification, continuing", id);
            }
        }
    }
}
