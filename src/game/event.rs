//! Event System
//!
//! The collision resolver and the game loop never call into audio, HUD or
//! camera code directly. They send events; the host reads them after the
//! tick and reacts (plays a sound, starts a fade, logs a transition).
//!
//! Example flow:
//! 1. Resolver sees the hero overlap a coin → sends PickupEvent + Cue::Coin
//! 2. Session already updated the counter, HUD sync picks it up
//! 3. Host plays the coin sound for Cue::Coin
//!
//! Queues are cleared at the start of every tick, so after `tick` returns
//! they hold exactly what that tick produced.

use super::entity::Entity;
use super::schedule::DeathCause;

/// A queue for events of a single type.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fire-and-forget presentation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Jump,
    Coin,
    Key,
    Stomp,
    Door,
    /// Start looping background track `n` (0-based)
    Music(u8),
}

/// Container for all game events.
#[derive(Debug, Default)]
pub struct Events {
    /// Sounds and music to play
    pub cues: EventQueue<Cue>,

    /// Coin or key collected
    pub pickups: EventQueue<PickupEvent>,

    /// Hero landed on a spider
    pub stomps: EventQueue<StompEvent>,

    /// Hero started dying
    pub hero_deaths: EventQueue<HeroDeathEvent>,

    /// Exit door opened with the key
    pub door_opened: EventQueue<DoorEvent>,

    /// Pull-door removed by the switch
    pub switch_pulled: EventQueue<SwitchEvent>,

    /// A level was (re)loaded
    pub transitions: EventQueue<TransitionEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Called at the start of every tick.
    pub fn clear_all(&mut self) {
        self.cues.clear();
        self.pickups.clear();
        self.stomps.clear();
        self.hero_deaths.clear();
        self.door_opened.clear();
        self.switch_pulled.clear();
        self.transitions.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Coin,
    Key,
}

/// An item was collected (the entity is already queued for removal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupEvent {
    pub item: Entity,
    pub kind: PickupKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StompEvent {
    pub hero: Entity,
    pub enemy: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroDeathEvent {
    pub hero: Entity,
    pub cause: DeathCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorEvent {
    pub door: Entity,
    pub opener: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEvent {
    pub switch: Entity,
    pub pull_door: Entity,
}

/// Why a level was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// First load at startup
    Boot,
    /// Walked through the door
    Advance,
    /// Died with lives left
    Retry,
    /// Out of lives, back to level 0
    GameOver,
    /// Skip-level key
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    pub level: usize,
    pub epoch: u64,
    pub reason: TransitionReason,
}
