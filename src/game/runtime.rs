//! Play State
//!
//! The game loop proper. `PlayState` owns the session, the current level's
//! world and every collaborator, and advances all of them by one `tick` per
//! rendered frame:
//!
//! 1. Start-menu / game-over keys
//! 2. Stop here while paused
//! 3. Clock and physics step
//! 4. Collision resolver
//! 5. Player input
//! 6. Hero and spider updates
//! 7. Animations, tweens, completions, due timers
//! 8. HUD, despawns, pending level load
//!
//! Level loads requested during a tick are applied at its very end, so the
//! world is never rebuilt while a pass is still walking it.

use ::rand::rngs::StdRng;
use ::rand::Rng;
use macroquad::math::Rect;
use crate::config::GameConfig;
use crate::input::FrameInput;
use crate::world::{ConfigError, LevelCatalog};
use super::animation::Animator;
use super::behavior::{Mortal, Updatable};
use super::collision::{self, CollisionContext};
use super::component::ComponentStorage;
use super::entity::Entity;
use super::event::{Cue, Events, TransitionEvent, TransitionReason};
use super::loader::{load_level, LevelHandles};
use super::overlay::Overlays;
use super::physics::{ArcadePhysics, Body, PhysicsWorld};
use super::schedule::{Completion, DeathCause, Effect, Scheduler};
use super::session::{DeathOutcome, Session};
use super::world::{Kind, World};

/// Scoreboard values, refreshed every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub coins_text: String,
    pub lives_text: String,
    /// Key icon frame: 1 while the key is held
    pub key_frame: u16,
}

impl Hud {
    fn from_session(session: &Session) -> Self {
        Self {
            coins_text: format!("x{}", session.coins()),
            lives_text: format!("x{}", session.lives()),
            key_frame: u16::from(session.has_key()),
        }
    }
}

pub struct PlayState {
    pub config: GameConfig,
    catalog: LevelCatalog,

    pub session: Session,
    pub world: World,
    pub physics: ArcadePhysics,
    pub scheduler: Scheduler,
    pub events: Events,
    pub overlays: Overlays,
    pub hud: Hud,

    /// Frozen behind the start menu or the game-over box
    pub paused: bool,

    rng: StdRng,
    handles: Option<LevelHandles>,
    music: u8,
    pending_restart: Option<(usize, TransitionReason)>,
    /// Level to start once the game-over box is dismissed
    game_over_level: Option<usize>,
}

impl PlayState {
    /// Check every level against `config`, then load level 0.
    pub fn new(config: GameConfig, catalog: LevelCatalog, rng: StdRng) -> Result<Self, ConfigError> {
        for index in 0..catalog.len() {
            for platform in &catalog.get(index).platforms {
                config.platform_size(&platform.image).map_err(|e| {
                    log::error!("level {} ({}): {}", index, catalog.name(index), e);
                    e
                })?;
            }
        }

        let session = Session::new(config.starting_lives, catalog.len());
        let bounds = Rect::new(0.0, 0.0, config.world_size.w, config.world_size.h);
        let hud = Hud::from_session(&session);

        let mut state = Self {
            config,
            catalog,
            session,
            world: World::new(),
            physics: ArcadePhysics::new(bounds),
            scheduler: Scheduler::new(),
            events: Events::new(),
            overlays: Overlays::new(),
            hud,
            paused: false,
            rng,
            handles: None,
            music: 0,
            pending_restart: None,
            game_over_level: None,
        };
        state.restart(0, TransitionReason::Boot)?;
        Ok(state)
    }

    pub fn level_name(&self) -> &str {
        self.catalog.name(self.session.level())
    }

    pub fn handles(&self) -> Option<&LevelHandles> {
        self.handles.as_ref()
    }

    /// Background track picked for the current level.
    pub fn music_track(&self) -> u8 {
        self.music
    }

    /// Start menu is up until the first key press.
    pub fn start_menu_visible(&self) -> bool {
        !self.session.game_started() && self.game_over_level.is_none()
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.world_size.w, self.config.world_size.h)
    }

    /// Tear the level down and build `requested` (wrapped) in its place.
    pub fn restart(&mut self, requested: usize, reason: TransitionReason) -> Result<(), ConfigError> {
        self.world.clear();
        self.scheduler.forget_entities();
        self.handles = None;
        self.pending_restart = None;
        self.game_over_level = None;
        self.paused = false;

        let level = self.session.begin_level(requested);
        let epoch = self.session.epoch();
        self.physics = ArcadePhysics::new(self.bounds());

        let desc = self.catalog.get(level);
        let handles = load_level(&mut self.world, &mut self.physics, desc, &self.config, &mut self.rng)?;
        self.handles = Some(handles);

        self.overlays.reset_for_level(level, self.config.timing.camera_flash_ms);
        self.music = self.rng.gen_range(0..self.config.music_tracks.max(1));
        self.events.cues.send(Cue::Music(self.music));
        self.events.transitions.send(TransitionEvent { level, epoch, reason });

        if !self.session.game_started() {
            self.scheduler.after_ms(self.config.timing.menu_pause_ms, epoch, Effect::PauseForMenu);
        }
        self.hud = Hud::from_session(&self.session);
        log::debug!("{:?} into {} (track {})", reason, self.catalog.name(level), self.music);
        Ok(())
    }

    fn request_restart(&mut self, level: usize, reason: TransitionReason) {
        self.pending_restart = Some((level, reason));
    }

    /// Run one frame of game simulation.
    pub fn tick(&mut self, input: &FrameInput, dt: f32) {
        self.events.clear_all();

        // =====================================================================
        // Menus: any key dismisses the game-over box or the start menu
        // =====================================================================
        if input.any_key_pressed {
            if let Some(level) = self.game_over_level.take() {
                self.overlays.set_game_over(false);
                self.session.full_reset();
                self.load_or_log(level, TransitionReason::GameOver);
                return;
            }
            if !self.session.game_started() {
                self.session.start_game();
                self.paused = false;
            }
        }

        if self.paused {
            return;
        }

        // =====================================================================
        // Physics and collisions
        // =====================================================================
        self.scheduler.advance(dt);
        self.physics.integrate(&mut self.world.bodies, dt);

        let mut ctx = CollisionContext {
            world: &mut self.world,
            physics: &mut self.physics,
            session: &mut self.session,
            scheduler: &mut self.scheduler,
            events: &mut self.events,
            overlays: &mut self.overlays,
            config: &self.config,
        };
        collision::resolve(&mut ctx, input.action_pressed);

        self.handle_input(input);
        self.update_agents();

        // =====================================================================
        // Presentation clocks, completions and timers
        // =====================================================================
        let completions = self.advance_presentation(dt);
        self.overlays.advance(dt);

        let epoch = self.session.epoch();
        for completion in completions {
            match self.scheduler.complete(completion, epoch) {
                Ok(effects) => {
                    for effect in effects {
                        self.apply(effect);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        for due in self.scheduler.take_due(epoch) {
            match due {
                Ok(effect) => self.apply(effect),
                Err(stale) => log::warn!("{}", stale),
            }
        }

        self.hud = Hud::from_session(&self.session);
        self.world.flush_despawns();

        if let Some((level, reason)) = self.pending_restart.take() {
            self.load_or_log(level, reason);
        }
    }

    fn load_or_log(&mut self, level: usize, reason: TransitionReason) {
        if let Err(e) = self.restart(level, reason) {
            log::error!("failed to load level {}: {}", level, e);
        }
    }

    fn handle_input(&mut self, input: &FrameInput) {
        if input.skip_level_pressed {
            self.paused = false;
            self.request_restart(self.session.level() + 1, TransitionReason::Skip);
        }

        let Some(hero) = self.world.hero() else {
            return;
        };
        let direction: i8 = if input.left {
            -1
        } else if input.right {
            1
        } else {
            0
        };
        if direction != 0 {
            self.overlays.dismiss_intro();
        }

        let world = &mut self.world;
        let (Some(h), Some(body)) = (world.heroes.get_mut(hero), world.bodies.get_mut(hero)) else {
            return;
        };
        h.move_horizontal(body, direction);

        if input.jump_hold_active {
            if h.jump(body) {
                self.events.cues.send(Cue::Jump);
            }
        } else {
            h.stop_jump_boost();
        }
    }

    fn update_agents(&mut self) {
        let world = &mut self.world;
        for hero in world.entities_of(Kind::Hero) {
            drive(&mut world.heroes, &mut world.bodies, &mut world.animators, hero);
            let facing = world.heroes.get(hero).map(|h| h.facing());
            if let (Some(facing), Some(sprite)) = (facing, world.sprites.get_mut(hero)) {
                sprite.facing = facing;
            }
        }
        for spider in world.entities_of(Kind::Spider) {
            drive(&mut world.spiders, &mut world.bodies, &mut world.animators, spider);
            let facing = world.spiders.get(spider).map(|s| s.facing());
            if let (Some(facing), Some(sprite)) = (facing, world.sprites.get_mut(spider)) {
                sprite.facing = facing;
            }
        }
    }

    /// Step animators and tweens, copying their output into sprites and
    /// bodies. Returns the completions that happened this tick.
    fn advance_presentation(&mut self, dt: f32) -> Vec<Completion> {
        let mut completions = Vec::new();

        for entity in self.world.entities() {
            if let Some(anim) = self.world.animators.get_mut(entity) {
                let finished = anim.advance(dt).is_some();
                let frame = anim.frame();
                if let Some(sprite) = self.world.sprites.get_mut(entity) {
                    sprite.frame = frame;
                }
                // Only death clips have anyone waiting on them
                if finished && self.is_dying(entity) {
                    completions.push(Completion::Animation(entity));
                }
            }

            if let Some(tween) = self.world.tweens.get_mut(entity) {
                let done = tween.advance(dt);
                let (position, alpha) = (tween.position(), tween.alpha());
                if let Some(body) = self.world.bodies.get_mut(entity) {
                    body.position = position;
                }
                if let (Some(alpha), Some(sprite)) = (alpha, self.world.sprites.get_mut(entity)) {
                    sprite.opacity = alpha;
                }
                if done {
                    self.world.tweens.remove(entity);
                    completions.push(Completion::Tween(entity));
                }
            }
        }

        completions
    }

    fn is_dying(&self, entity: Entity) -> bool {
        let world = &self.world;
        world
            .heroes
            .get(entity)
            .map(|h| !h.is_alive())
            .or_else(|| world.spiders.get(entity).map(|s| !s.is_alive()))
            .unwrap_or(false)
    }

    fn apply(&mut self, effect: Effect) {
        let epoch = self.session.epoch();
        let timing = self.config.timing.clone();
        log::debug!("apply {:?}", effect);

        match effect {
            Effect::HeroKilled { hero, cause } => {
                self.world.despawn(hero);
                // Drowning already took its life on contact
                if cause == DeathCause::Enemy {
                    self.session.lose_life();
                }
                match self.session.apply_death_policy() {
                    DeathOutcome::Retry { level } => match cause {
                        DeathCause::Drowned => {
                            self.overlays.show_drowned();
                            self.scheduler.after_ms(timing.drown_retry_ms, epoch, Effect::RestartLevel(level));
                        }
                        DeathCause::Enemy => self.request_restart(level, TransitionReason::Retry),
                    },
                    DeathOutcome::GameOver { level } => {
                        self.overlays.set_game_over(true);
                        self.game_over_level = Some(level);
                        self.paused = true;
                    }
                }
            }
            Effect::Despawn(entity) => self.world.despawn(entity),
            Effect::BeginExitFade => {
                self.overlays.start_fade(timing.camera_fade_ms);
                let next = self.session.level() + 1;
                self.scheduler.after_ms(timing.camera_fade_ms, epoch, Effect::RestartLevel(next));
            }
            Effect::RestartLevel(level) => {
                let reason = if level == self.session.level() {
                    TransitionReason::Retry
                } else {
                    TransitionReason::Advance
                };
                self.request_restart(level, reason);
            }
            Effect::DismissHint(serial) => {
                self.overlays.dismiss_locked_hint(serial);
            }
            Effect::PauseForMenu => {
                if !self.session.game_started() {
                    self.paused = true;
                }
            }
        }
    }
}

/// Run one agent's per-frame update against its body and animator.
fn drive<T: Updatable>(
    agents: &mut ComponentStorage<T>,
    bodies: &mut ComponentStorage<Body>,
    animators: &mut ComponentStorage<Animator>,
    entity: Entity,
) {
    if let (Some(agent), Some(body), Some(anim)) =
        (agents.get_mut(entity), bodies.get_mut(entity), animators.get_mut(entity))
    {
        agent.update(body, anim);
    }
}
