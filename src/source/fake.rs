//! Deterministic in-memory source for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::poller::command::RawDeviceSample;
use crate::source::{DeviceSource, SourceError, SourceEvent};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RumbleCall {
    pub index: usize,
    pub duration_ms: u32,
    pub weak: f32,
    pub strong: f32,
}

#[derive(Default)]
struct FakeInner {
    devices: BTreeMap<usize, RawDeviceSample>,
    events: VecDeque<SourceEvent>,
    rumbles: Vec<RumbleCall>,
    rumble_supported: bool,
}

/// Shared-handle fake: tests keep a clone to mutate the simulated hardware
/// while the poller owns another clone as its `DeviceSource`.
#[derive(Clone)]
pub(crate) struct FakeSource {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInner {
                rumble_supported: true,
                ..Default::default()
            })),
        }
    }

    pub fn attach(&self, index: usize, sample: RawDeviceSample) {
        self.inner.lock().unwrap().devices.insert(index, sample);
    }

    pub fn detach(&self, index: usize) {
        self.inner.lock().unwrap().devices.remove(&index);
    }

    pub fn push_event(&self, event: SourceEvent) {
        self.inner.lock().unwrap().events.push_back(event);
    }

    pub fn set_rumble_supported(&self, supported: bool) {
        self.inner.lock().unwrap().rumble_supported = supported;
    }

    pub fn rumbles(&self) -> Vec<RumbleCall> {
        self.inner.lock().unwrap().rumbles.clone()
    }
}

impl DeviceSource for FakeSource {
    fn device_indices(&mut self) -> Vec<usize> {
        self.inner.lock().unwrap().devices.keys().copied().collect()
    }

    fn sample(&mut self, index: usize) -> Option<RawDeviceSample> {
        self.inner.lock().unwrap().devices.get(&index).cloned()
    }

    fn drain_events(&mut self) -> Vec<SourceEvent> {
        self.inner.lock().unwrap().events.drain(..).collect()
    }

    fn rumble(
        &mut self,
        index: usize,
        duration_ms: u32,
        weak: f32,
        strong: f32,
    ) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.rumble_supported {
            return Err(SourceError::Unsupported(format!(
                "device {index} has no force feedback"
            )));
        }
        inner.rumbles.push(RumbleCall {
            index,
            duration_ms,
            weak,
            strong,
        });
        Ok(())
    }
}

/// Sample builder used across the poller tests.
pub(crate) fn sample_with(id: &str, buttons: Vec<bool>, axes: Vec<f32>) -> RawDeviceSample {
    RawDeviceSample {
        device_id: id.to_string(),
        connected: true,
        buttons,
        axes,
    }
}
