//! Raw input source abstraction.
//!
//! The poller never talks to platform device APIs directly. It works against
//! [`DeviceSource`], a small capability surface (enumerate, sample, drain
//! connect/disconnect events, rumble) that can be backed by real hardware
//! ([`GilrsSource`]) or by a deterministic fake in tests.

pub mod gilrs_source;

#[cfg(test)]
pub(crate) mod fake;

pub use gilrs_source::GilrsSource;

use crate::poller::command::RawDeviceSample;
use thiserror::Error;

/// Errors surfaced by input source backends.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to initialize input source: {0}")]
    InitializationError(String),

    #[error("Force feedback not supported: {0}")]
    Unsupported(String),

    #[error("Force feedback failed: {0}")]
    RumbleError(String),
}

/// Connect/disconnect notification from the underlying platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Connected { index: usize, id: String },
    Disconnected { index: usize, id: String },
}

/// Capability surface for a raw input backend.
///
/// All queries are synchronous and non-blocking: they read already-buffered
/// platform state and never perform I/O that could stall a tick.
pub trait DeviceSource {
    /// Indices of currently present devices, in ascending index order.
    fn device_indices(&mut self) -> Vec<usize>;

    /// Reads the current sample for the device at `index`, or `None` when the
    /// device is not present.
    fn sample(&mut self, index: usize) -> Option<RawDeviceSample>;

    /// Drains pending connect/disconnect events in arrival order.
    fn drain_events(&mut self) -> Vec<SourceEvent>;

    /// Best-effort haptic feedback on the device at `index`.
    fn rumble(
        &mut self,
        index: usize,
        duration_ms: u32,
        weak: f32,
        strong: f32,
    ) -> Result<(), SourceError>;
}
