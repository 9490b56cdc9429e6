//! Deferred effects
//!
//! Two kinds of suspension exist in the game loop: one-shot timers (retry
//! delay, hint dismissal, start-menu pause) and completion continuations
//! (run this when that entity's death clip or tween finishes). Both carry
//! the session epoch they were scheduled in. When they come due the runtime
//! compares that token with the current epoch; a mismatch means the level
//! they targeted has already been torn down, so the effect is dropped and
//! reported as a `StaleTimer` instead of being applied.

use std::collections::HashSet;
use std::fmt;
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Touched the water hazard (life already taken on contact)
    Drowned,
    /// Walked into a spider (life taken when the death clip ends)
    Enemy,
}

/// Something the runtime applies later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The hero's death clip finished
    HeroKilled { hero: Entity, cause: DeathCause },
    /// Remove an entity whose death clip finished
    Despawn(Entity),
    /// Door entry finished: fade the camera out
    BeginExitFade,
    /// Tear down and load this level index (wrapped by the session)
    RestartLevel(usize),
    /// Hide the locked-door hint if it is still the one with this serial
    DismissHint(u64),
    /// Freeze the world behind the start menu
    PauseForMenu,
}

/// One-shot completion sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    Animation(Entity),
    Tween(Entity),
}

/// A completion was delivered a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateCompletionError {
    pub completion: Completion,
}

impl fmt::Display for DuplicateCompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion {:?} delivered more than once", self.completion)
    }
}

impl std::error::Error for DuplicateCompletionError {}

/// A deferred effect came due after its level was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimer {
    pub effect: Effect,
    pub scheduled_epoch: u64,
    pub current_epoch: u64,
}

impl fmt::Display for StaleTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stale {:?} (scheduled in epoch {}, now epoch {}); ignored",
            self.effect, self.scheduled_epoch, self.current_epoch
        )
    }
}

#[derive(Debug, Clone)]
struct Timer {
    due: f32,
    epoch: u64,
    effect: Effect,
}

#[derive(Debug, Clone)]
struct Continuation {
    on: Completion,
    epoch: u64,
    effect: Effect,
}

/// Clock plus pending timers and continuations. Time is in seconds.
#[derive(Debug, Default)]
pub struct Scheduler {
    clock: f32,
    timers: Vec<Timer>,
    continuations: Vec<Continuation>,
    delivered: HashSet<Completion>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.clock += dt;
    }

    /// Run `effect` once `delay_ms` has elapsed. Zero fires on the next check.
    pub fn after_ms(&mut self, delay_ms: f32, epoch: u64, effect: Effect) {
        let due = self.clock + delay_ms.max(0.0) / 1000.0;
        self.timers.push(Timer { due, epoch, effect });
    }

    /// Run `effect` when `on` completes.
    pub fn on_complete(&mut self, on: Completion, epoch: u64, effect: Effect) {
        self.continuations.push(Continuation { on, epoch, effect });
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_continuations(&self) -> usize {
        self.continuations.len()
    }

    /// Remove and return every timer that is due, oldest deadline first.
    pub fn take_due(&mut self, current_epoch: u64) -> Vec<Result<Effect, StaleTimer>> {
        let clock = self.clock;
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due <= clock);
        self.timers = pending;
        // Stable sort keeps scheduling order for equal deadlines
        due.sort_by(|a, b| a.due.total_cmp(&b.due));

        due.into_iter()
            .map(|t| {
                if t.epoch == current_epoch {
                    Ok(t.effect)
                } else {
                    Err(StaleTimer { effect: t.effect, scheduled_epoch: t.epoch, current_epoch })
                }
            })
            .collect()
    }

    /// Deliver a completion and collect the continuations waiting on it.
    ///
    /// A completion is only ever delivered once; a repeat is an error and
    /// runs nothing.
    pub fn complete(
        &mut self,
        on: Completion,
        current_epoch: u64,
    ) -> Result<Vec<Effect>, DuplicateCompletionError> {
        if !self.delivered.insert(on) {
            return Err(DuplicateCompletionError { completion: on });
        }

        let (ready, waiting): (Vec<Continuation>, Vec<Continuation>) =
            std::mem::take(&mut self.continuations).into_iter().partition(|c| c.on == on);
        self.continuations = waiting;

        let mut effects = Vec::with_capacity(ready.len());
        for c in ready {
            if c.epoch == current_epoch {
                effects.push(c.effect);
            } else {
                log::warn!(
                    "{}",
                    StaleTimer { effect: c.effect, scheduled_epoch: c.epoch, current_epoch }
                );
            }
        }
        Ok(effects)
    }

    /// Level teardown: every entity is gone, so nothing can complete any more.
    /// Timers are kept; their epoch check handles them.
    pub fn forget_entities(&mut self) {
        self.continuations.clear();
        self.delivered.clear();
    }
}
