//! Hardware backend built on gilrs.
//!
//! Maps gilrs gamepad state into the fixed sample layout from
//! [`crate::poller::command`] and translates gilrs connect/disconnect events
//! into [`SourceEvent`]s. Gamepad ids are assigned stable small indices in
//! discovery order so the poller can address devices without knowing gilrs
//! types.
//!
//! gilrs only refreshes its cached gamepad state while its event queue is
//! pumped, so `drain_events` must be called regularly (the poller service loop
//! does this once per tick) for `sample` to stay fresh.

use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, info};

use crate::poller::command::RawDeviceSample;
use crate::source::{DeviceSource, SourceError, SourceEvent};

// Button read order matching the sample layout slots.
const BUTTON_ORDER: [Button; 10] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
];

// Axis read order matching the sample layout slots.
const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

pub struct GilrsSource {
    gilrs: Gilrs,
    // Stable index registry: position in this vec is the device index handed
    // to the poller.
    known: Vec<GamepadId>,
    // Kept alive while playing; dropping an effect stops it.
    active_effect: Option<Effect>,
}

impl GilrsSource {
    pub fn new() -> Result<Self, SourceError> {
        info!("Initializing gilrs input source");
        let gilrs = Gilrs::new().map_err(|e| SourceError::InitializationError(e.to_string()))?;

        for (id, gamepad) in gilrs.gamepads() {
            info!("Found gamepad {}: {}", id, gamepad.name());
        }

        Ok(Self {
            gilrs,
            known: Vec::new(),
            active_effect: None,
        })
    }

    fn index_for(&mut self, id: GamepadId) -> usize {
        if let Some(pos) = self.known.iter().position(|known| *known == id) {
            pos
        } else {
            self.known.push(id);
            self.known.len() - 1
        }
    }

    fn gamepad_at(&self, index: usize) -> Option<Gamepad<'_>> {
        let id = *self.known.get(index)?;
        self.gilrs.connected_gamepad(id)
    }
}

impl DeviceSource for GilrsSource {
    fn device_indices(&mut self) -> Vec<usize> {
        let ids: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        let mut indices: Vec<usize> = ids.into_iter().map(|id| self.index_for(id)).collect();
        indices.sort_unstable();
        indices
    }

    fn sample(&mut self, index: usize) -> Option<RawDeviceSample> {
        let gamepad = self.gamepad_at(index)?;
        Some(RawDeviceSample {
            device_id: gamepad.name().to_string(),
            connected: true,
            buttons: BUTTON_ORDER
                .iter()
                .map(|b| gamepad.is_pressed(*b))
                .collect(),
            axes: AXIS_ORDER.iter().map(|a| gamepad.value(*a)).collect(),
        })
    }

    fn drain_events(&mut self) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    let index = self.index_for(id);
                    info!("Gamepad connected: {} (index {})", name, index);
                    events.push(SourceEvent::Connected { index, id: name });
                }
                EventType::Disconnected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    let index = self.index_for(id);
                    info!("Gamepad disconnected: {} (index {})", name, index);
                    events.push(SourceEvent::Disconnected { index, id: name });
                }
                // Other events only matter for gilrs' cached state, which
                // pumping the queue already refreshed.
                other => debug!("Ignoring gilrs event: {:?}", other),
            }
        }
        events
    }

    fn rumble(
        &mut self,
        index: usize,
        duration_ms: u32,
        weak: f32,
        strong: f32,
    ) -> Result<(), SourceError> {
        let id = *self
            .known
            .get(index)
            .ok_or_else(|| SourceError::Unsupported(format!("no device at index {index}")))?;

        let supported = self
            .gilrs
            .connected_gamepad(id)
            .map(|g| g.is_ff_supported())
            .unwrap_or(false);
        if !supported {
            return Err(SourceError::Unsupported(format!(
                "gamepad {id} has no force feedback"
            )));
        }

        // Dropping the previous effect stops it.
        self.active_effect.take();

        let play_for = Ticks::from_ms(duration_ms);
        let strong_magnitude = (strong.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        let weak_magnitude = (weak.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;

        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: strong_magnitude,
                },
                scheduling: Replay {
                    play_for,
                    ..Default::default()
                },
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: weak_magnitude,
                },
                scheduling: Replay {
                    play_for,
                    ..Default::default()
                },
                ..Default::default()
            })
            .gamepads(&[id])
            .finish(&mut self.gilrs)
            .map_err(|e| SourceError::RumbleError(e.to_string()))?;

        effect
            .play()
            .map_err(|e| SourceError::RumbleError(e.to_string()))?;

        debug!(
            "Playing rumble on gamepad {id}: {duration_ms}ms weak={weak:.2} strong={strong:.2}"
        );
        self.active_effect = Some(effect);
        Ok(())
    }
}
