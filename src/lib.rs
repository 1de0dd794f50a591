//! padstream - fixed-rate gamepad polling and normalization.
//!
//! Bridges an event-driven raw input source (connect/disconnect events,
//! on-demand samples) into a regular-cadence, deadzone-corrected command
//! stream for downstream control surfaces such as drone teleoperation.
//!
//! ```text
//! Gamepad ──► DeviceSource ──► InputPoller ──► NormalizedCommand ──► subscribers
//! ```

pub mod classify;
pub mod config;
pub mod poller;
pub mod source;

pub use classify::classify_device;
pub use config::PadstreamConfig;
pub use poller::command::{ConnectionState, NormalizedCommand, RawDeviceSample};
pub use poller::input_poller::{InputPoller, PollerSettings, SubscriptionId};
pub use poller::poller_handle::{CommandFrame, PollerError, PollerHandle};
pub use source::{DeviceSource, GilrsSource, SourceError, SourceEvent};
