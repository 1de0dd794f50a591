//! Input polling subsystem.
//!
//! Bridges an event-driven raw input source into a fixed-rate, normalized
//! command stream:
//!
//! 1. [`command`] - sample/command data model and deadzone correction
//! 2. [`input_poller`] - deterministic core poller with subscriber registry
//! 3. [`poller_handle`] - tokio task ownership and watch-channel fan-out
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► DeviceSource ──► InputPoller ──► NormalizedCommand ──► subscribers
//!             (raw samples)    (60 Hz ticks)   (deadzone applied)
//! ```

pub mod command;
pub mod input_poller;
pub mod poller_handle;
