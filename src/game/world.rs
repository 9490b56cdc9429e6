//! Game World
//!
//! The World is the container for one level's worth of live objects:
//! - Entity allocation and lifetime tracking
//! - Component storage for all component types
//! - Deferred entity despawn (to avoid iterator invalidation)
//!
//! Component types are known at compile time and stored in typed fields.
//! A level restart tears the whole world down with `clear` and the loader
//! builds it again from the descriptor.

use macroquad::math::{Rect, Vec2};
use super::animation::{clips, Animator};
use super::component::ComponentStorage;
use super::entity::{Entity, EntityAllocator};
use super::hero::{Hero, HeroTuning};
use super::physics::Body;
use super::spider::{Spider, SpiderVariant};
use super::tween::Tween;

/// What an entity is. Drives collision grouping and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Hero,
    Spider,
    Platform,
    /// Invisible collider at a platform edge, only spiders collide with it
    EnemyWall,
    Decoration,
    Coin,
    Key,
    Door,
    PullDoor,
    Switch,
    Water,
}

/// Drawing state that gameplay writes and the renderer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: String,
    /// Frame for sprites without an animator (door, decoration)
    pub frame: u16,
    /// +1 normal, -1 mirrored
    pub facing: i8,
    pub opacity: f32,
    pub visible: bool,
}

impl Sprite {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into(), frame: 0, facing: 1, opacity: 1.0, visible: true }
    }

    pub fn with_frame(mut self, frame: u16) -> Self {
        self.frame = frame;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Door {
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    pub pulled: bool,
    /// The pull-door this switch removes
    pub pull_door: Entity,
}

/// The game world containing all entities and their components.
pub struct World {
    /// Entity allocator for creating/destroying entities
    entities: EntityAllocator,

    /// Entities queued for despawn at end of frame
    despawn_queue: Vec<Entity>,

    // =========================================================================
    // Core Components
    // =========================================================================

    pub kinds: ComponentStorage<Kind>,

    pub bodies: ComponentStorage<Body>,

    pub sprites: ComponentStorage<Sprite>,

    pub animators: ComponentStorage<Animator>,

    pub tweens: ComponentStorage<Tween>,

    // =========================================================================
    // Gameplay Components
    // =========================================================================

    pub heroes: ComponentStorage<Hero>,

    pub spiders: ComponentStorage<Spider>,

    pub doors: ComponentStorage<Door>,

    pub switches: ComponentStorage<Switch>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            despawn_queue: Vec::new(),

            kinds: ComponentStorage::new(),
            bodies: ComponentStorage::new(),
            sprites: ComponentStorage::new(),
            animators: ComponentStorage::new(),
            tweens: ComponentStorage::new(),

            heroes: ComponentStorage::new(),
            spiders: ComponentStorage::new(),
            doors: ComponentStorage::new(),
            switches: ComponentStorage::new(),
        }
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Spawn an entity with a kind, a body and a sprite.
    pub fn spawn(&mut self, kind: Kind, body: Body, sprite: Sprite) -> Entity {
        let entity = self.entities.allocate();
        self.kinds.insert(entity, kind);
        self.bodies.insert(entity, body);
        self.sprites.insert(entity, sprite);
        entity
    }

    /// Queue an entity for despawn at end of frame.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Immediately despawn an entity and all its components.
    /// Prefer `despawn()` during gameplay to avoid iterator issues.
    pub fn despawn_immediate(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return; // Already dead
        }

        let idx = entity.index();
        self.kinds.clear_slot(idx);
        self.bodies.clear_slot(idx);
        self.sprites.clear_slot(idx);
        self.animators.clear_slot(idx);
        self.tweens.clear_slot(idx);
        self.heroes.clear_slot(idx);
        self.spiders.clear_slot(idx);
        self.doors.clear_slot(idx);
        self.switches.clear_slot(idx);
    }

    /// Process all queued despawns. Call at end of frame.
    pub fn flush_despawns(&mut self) {
        let queue = std::mem::take(&mut self.despawn_queue);
        for entity in queue {
            self.despawn_immediate(entity);
        }
    }

    pub fn is_pending_despawn(&self, entity: Entity) -> bool {
        self.despawn_queue.contains(&entity)
    }

    /// Drop every entity (level teardown). Old handles all go stale.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.despawn_queue.clear();
        self.kinds.clear();
        self.bodies.clear();
        self.sprites.clear();
        self.animators.clear();
        self.tweens.clear();
        self.heroes.clear();
        self.spiders.clear();
        self.doors.clear();
        self.switches.clear();
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Get the number of alive entities.
    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    pub fn kind(&self, entity: Entity) -> Option<Kind> {
        if !self.is_alive(entity) {
            return None;
        }
        self.kinds.get(entity).copied()
    }

    /// Every live entity, in slot order.
    pub fn entities(&self) -> Vec<Entity> {
        self.kinds
            .iter()
            .filter_map(|(idx, _)| self.entities.entity_at(idx))
            .collect()
    }

    /// Live entities of one kind, in spawn-slot order.
    pub fn entities_of(&self, kind: Kind) -> Vec<Entity> {
        self.kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .filter_map(|(idx, _)| self.entities.entity_at(idx))
            .collect()
    }

    /// The hero, if one is alive in this level.
    pub fn hero(&self) -> Option<Entity> {
        self.heroes.iter().find_map(|(idx, _)| self.entities.entity_at(idx))
    }

    pub fn body(&self, entity: Entity) -> Option<&Body> {
        if !self.is_alive(entity) {
            return None;
        }
        self.bodies.get(entity)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<&mut Body> {
        if !self.is_alive(entity) {
            return None;
        }
        self.bodies.get_mut(entity)
    }

    // =========================================================================
    // Convenience Spawners (all positions are top-left corners)
    // =========================================================================

    pub fn spawn_hero(&mut self, rect: Rect, tuning: HeroTuning) -> Entity {
        let body = Body::new(rect.point(), rect.size()).with_world_bounds();
        let entity = self.spawn(Kind::Hero, body, Sprite::new("hero"));
        self.heroes.insert(entity, Hero::new(tuning));
        self.animators.insert(entity, Animator::new(clips::HERO_STOP));
        entity
    }

    pub fn spawn_spider(&mut self, rect: Rect, variant: SpiderVariant, speed: f32) -> Entity {
        let spider = Spider::new(variant, speed);
        let mut body = Body::new(rect.point(), rect.size()).with_world_bounds();
        spider.start(&mut body);
        let entity = self.spawn(Kind::Spider, body, Sprite::new(variant.sprite()));
        self.spiders.insert(entity, spider);
        self.animators.insert(entity, Animator::new(clips::SPIDER_CRAWL));
        entity
    }

    pub fn spawn_platform(&mut self, rect: Rect, image: &str) -> Entity {
        self.spawn(Kind::Platform, Body::fixed(rect.point(), rect.size()), Sprite::new(image))
    }

    pub fn spawn_enemy_wall(&mut self, rect: Rect) -> Entity {
        let sprite = Sprite::new("invisible-wall").hidden();
        self.spawn(Kind::EnemyWall, Body::fixed(rect.point(), rect.size()), sprite)
    }

    /// Decoration has no physics; its body is disabled and only positions it.
    pub fn spawn_decoration(&mut self, rect: Rect, frame: u16) -> Entity {
        let mut body = Body::fixed(rect.point(), rect.size());
        body.enabled = false;
        self.spawn(Kind::Decoration, body, Sprite::new("decoration").with_frame(frame))
    }

    pub fn spawn_coin(&mut self, rect: Rect) -> Entity {
        let entity = self.spawn(Kind::Coin, Body::sensor(rect.point(), rect.size()), Sprite::new("coin"));
        self.animators.insert(entity, Animator::new(clips::COIN_ROTATE));
        entity
    }

    /// Key with its endless bob; `bob` is the tween between the two extremes.
    pub fn spawn_key(&mut self, rect: Rect, bob: Tween) -> Entity {
        let entity = self.spawn(Kind::Key, Body::sensor(rect.point(), rect.size()), Sprite::new("key"));
        self.tweens.insert(entity, bob);
        entity
    }

    pub fn spawn_door(&mut self, rect: Rect) -> Entity {
        let entity = self.spawn(Kind::Door, Body::sensor(rect.point(), rect.size()), Sprite::new("door"));
        self.doors.insert(entity, Door::default());
        entity
    }

    pub fn spawn_pull_door(&mut self, rect: Rect) -> Entity {
        self.spawn(Kind::PullDoor, Body::fixed(rect.point(), rect.size()), Sprite::new("boxes"))
    }

    pub fn spawn_switch(&mut self, rect: Rect, pull_door: Entity) -> Entity {
        let sprite = Sprite::new("doorSwitch");
        let entity = self.spawn(Kind::Switch, Body::sensor(rect.point(), rect.size()), sprite);
        self.switches.insert(entity, Switch { pulled: false, pull_door });
        self.animators.insert(entity, Animator::new(clips::SWITCH_IDLE));
        entity
    }

    /// Water is solid for platforms and deadly to the hero; it never falls.
    pub fn spawn_water(&mut self, rect: Rect) -> Entity {
        self.spawn(Kind::Water, Body::fixed(rect.point(), rect.size()), Sprite::new("water"))
    }

    /// Centre of an entity's body.
    pub fn center_of(&self, entity: Entity) -> Option<Vec2> {
        self.body(entity).map(Body::center)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
