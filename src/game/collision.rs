//! Collision Resolver
//!
//! Runs once per tick after physics integration. Solid pairs are handed to
//! the physics collaborator untouched; overlap pairs are turned into game
//! actions in a fixed order:
//!
//! 1. hero vs water: drown
//! 2. hero vs coins: collect
//! 3. hero vs key: collect
//! 4. hero vs door, key held and standing: enter the door
//! 5. hero vs door, no key and standing, first level only: locked hint
//! 6. hero vs spiders: stomp or be killed
//! 7. hero vs switch with the action key: drop the pull-door
//!
//! A dying or frozen hero has a disabled body, so once one rule has taken
//! the hero out of play the later rules see no overlaps.

use crate::config::GameConfig;
use super::animation::clips;
use super::behavior::Mortal;
use super::entity::Entity;
use super::event::{Cue, DoorEvent, Events, HeroDeathEvent, PickupEvent, PickupKind, StompEvent, SwitchEvent};
use super::overlay::Overlays;
use super::physics::PhysicsWorld;
use super::schedule::{Completion, DeathCause, Effect, Scheduler};
use super::session::Session;
use super::tween::{Easing, Tween};
use super::world::{Kind, World};

/// Everything the resolver reads or mutates for one pass.
pub struct CollisionContext<'a> {
    pub world: &'a mut World,
    pub physics: &'a mut dyn PhysicsWorld,
    pub session: &'a mut Session,
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut Events,
    pub overlays: &'a mut Overlays,
    pub config: &'a GameConfig,
}

/// Solid responses. No game logic, only the physics collaborator.
pub fn collide_solids(ctx: &mut CollisionContext<'_>) {
    let platforms = ctx.world.entities_of(Kind::Platform);
    let walls = ctx.world.entities_of(Kind::EnemyWall);
    let pull_doors = ctx.world.entities_of(Kind::PullDoor);
    let water = ctx.world.entities_of(Kind::Water);

    if let Some(hero) = ctx.world.hero() {
        for &other in pull_doors.iter().chain(platforms.iter()) {
            ctx.physics.collide(&mut ctx.world.bodies, hero, other);
        }
    }

    for spider in ctx.world.entities_of(Kind::Spider) {
        for &other in platforms.iter().chain(walls.iter()).chain(pull_doors.iter()) {
            ctx.physics.collide(&mut ctx.world.bodies, spider, other);
        }
    }

    // Both sides immovable; kept so a movable hazard would still rest on platforms
    for &w in &water {
        for &p in &platforms {
            ctx.physics.collide(&mut ctx.world.bodies, p, w);
        }
    }
}

/// Overlap rules, in table order.
pub fn resolve_overlaps(ctx: &mut CollisionContext<'_>, action_pressed: bool) {
    let Some(hero) = ctx.world.hero() else {
        return;
    };

    hero_vs_water(ctx, hero);
    hero_vs_coins(ctx, hero);
    hero_vs_key(ctx, hero);
    hero_vs_door(ctx, hero);
    hero_vs_locked_door(ctx, hero);
    hero_vs_spiders(ctx, hero);
    if action_pressed {
        hero_vs_switch(ctx, hero);
    }
}

/// Full pass: solids then overlaps.
pub fn resolve(ctx: &mut CollisionContext<'_>, action_pressed: bool) {
    collide_solids(ctx);
    resolve_overlaps(ctx, action_pressed);
}

fn overlapping(ctx: &CollisionContext<'_>, hero: Entity, kind: Kind) -> Vec<Entity> {
    ctx.world
        .entities_of(kind)
        .into_iter()
        .filter(|&e| ctx.physics.overlaps(&ctx.world.bodies, hero, e))
        .collect()
}

fn hero_touching_down(ctx: &CollisionContext<'_>, hero: Entity) -> bool {
    ctx.world.body(hero).map(|b| b.touching_down()).unwrap_or(false)
}

/// Start the hero's death and register what happens when the clip ends.
fn kill_hero(ctx: &mut CollisionContext<'_>, hero: Entity, cause: DeathCause) {
    let world = &mut *ctx.world;
    let (Some(h), Some(body), Some(anim)) = (
        world.heroes.get_mut(hero),
        world.bodies.get_mut(hero),
        world.animators.get_mut(hero),
    ) else {
        return;
    };
    if !h.is_alive() {
        return;
    }
    h.die(body, anim);

    let epoch = ctx.session.epoch();
    ctx.scheduler.on_complete(Completion::Animation(hero), epoch, Effect::HeroKilled { hero, cause });
    ctx.events.hero_deaths.send(HeroDeathEvent { hero, cause });
    log::debug!("hero {} dies: {:?}", hero, cause);
}

/// Take an entity out of play now and remove it at end of tick.
fn remove(world: &mut World, entity: Entity) {
    if let Some(body) = world.body_mut(entity) {
        body.enabled = false;
    }
    world.despawn(entity);
}

fn hero_vs_water(ctx: &mut CollisionContext<'_>, hero: Entity) {
    if overlapping(ctx, hero, Kind::Water).is_empty() {
        return;
    }
    kill_hero(ctx, hero, DeathCause::Drowned);
    // Drowning costs the life on contact; the policy runs when the clip ends
    ctx.session.lose_life();
}

fn hero_vs_coins(ctx: &mut CollisionContext<'_>, hero: Entity) {
    for coin in overlapping(ctx, hero, Kind::Coin) {
        ctx.events.cues.send(Cue::Coin);
        remove(ctx.world, coin);
        ctx.session.add_coins(ctx.config.coin_reward);
        ctx.events.pickups.send(PickupEvent { item: coin, kind: PickupKind::Coin });
    }
}

fn hero_vs_key(ctx: &mut CollisionContext<'_>, hero: Entity) {
    for key in overlapping(ctx, hero, Kind::Key) {
        ctx.events.cues.send(Cue::Key);
        remove(ctx.world, key);
        ctx.session.take_key();
        ctx.events.pickups.send(PickupEvent { item: key, kind: PickupKind::Key });
    }
}

fn hero_vs_door(ctx: &mut CollisionContext<'_>, hero: Entity) {
    if !(ctx.session.has_key() && hero_touching_down(ctx, hero)) {
        return;
    }
    let Some(door) = overlapping(ctx, hero, Kind::Door).into_iter().next() else {
        return;
    };

    if let Some(d) = ctx.world.doors.get_mut(door) {
        d.open = true;
    }
    if let Some(sprite) = ctx.world.sprites.get_mut(door) {
        sprite.frame = 1;
    }
    ctx.events.cues.send(Cue::Door);

    let door_center = ctx.world.center_of(door).unwrap_or_default();
    let world = &mut *ctx.world;
    let (Some(h), Some(body)) = (world.heroes.get_mut(hero), world.bodies.get_mut(hero)) else {
        return;
    };
    h.freeze(body);

    // Slide the hero's centre onto the door's while fading out
    let from = body.position;
    let to = macroquad::math::Vec2::new(door_center.x - body.size.x * 0.5, from.y);
    let tween = Tween::once(from, to, ctx.config.timing.door_enter_ms / 1000.0, Easing::Linear)
        .with_alpha(1.0, 0.0);
    world.tweens.insert(hero, tween);

    let epoch = ctx.session.epoch();
    ctx.scheduler.on_complete(Completion::Tween(hero), epoch, Effect::BeginExitFade);
    ctx.events.door_opened.send(DoorEvent { door, opener: hero });
    log::debug!("door {} opened by {}", door, hero);
}

fn hero_vs_locked_door(ctx: &mut CollisionContext<'_>, hero: Entity) {
    if ctx.session.has_key() || ctx.session.level() != 0 || !hero_touching_down(ctx, hero) {
        return;
    }
    if overlapping(ctx, hero, Kind::Door).is_empty() {
        return;
    }
    if let Some(serial) = ctx.overlays.show_locked_hint() {
        let epoch = ctx.session.epoch();
        ctx.scheduler.after_ms(ctx.config.timing.locked_hint_ms, epoch, Effect::DismissHint(serial));
    }
}

fn hero_vs_spiders(ctx: &mut CollisionContext<'_>, hero: Entity) {
    for spider in overlapping(ctx, hero, Kind::Spider) {
        let falling = ctx.world.body(hero).map(|b| b.velocity.y > 0.0).unwrap_or(false);

        if falling {
            let world = &mut *ctx.world;
            if let (Some(s), Some(body), Some(anim)) = (
                world.spiders.get_mut(spider),
                world.bodies.get_mut(spider),
                world.animators.get_mut(spider),
            ) {
                s.die(body, anim);
            }
            if let (Some(h), Some(body)) = (world.heroes.get_mut(hero), world.bodies.get_mut(hero)) {
                h.bounce(body);
            }
            ctx.events.cues.send(Cue::Stomp);
            ctx.session.add_coins(ctx.config.stomp_reward);

            let epoch = ctx.session.epoch();
            ctx.scheduler.on_complete(Completion::Animation(spider), epoch, Effect::Despawn(spider));
            ctx.events.stomps.send(StompEvent { hero, enemy: spider });
        } else {
            kill_hero(ctx, hero, DeathCause::Enemy);
            ctx.events.cues.send(Cue::Stomp);
            // Undo any contact bookkeeping the overlap left on the spider
            if let Some(body) = ctx.world.body_mut(spider) {
                body.touching = body.was_touching;
            }
            return;
        }
    }
}

fn hero_vs_switch(ctx: &mut CollisionContext<'_>, hero: Entity) {
    for switch in overlapping(ctx, hero, Kind::Switch) {
        let Some(state) = ctx.world.switches.get_mut(switch) else {
            continue;
        };
        if state.pulled {
            continue;
        }
        state.pulled = true;
        let pull_door = state.pull_door;

        ctx.events.cues.send(Cue::Door);
        if let Some(anim) = ctx.world.animators.get_mut(switch) {
            anim.play(clips::SWITCH_PULL);
        }
        remove(ctx.world, pull_door);
        ctx.events.switch_pulled.send(SwitchEvent { switch, pull_door });
        log::debug!("switch {} pulled, pull-door {} removed", switch, pull_door);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::math::{Rect, Vec2};
    use crate::game::hero::HeroTuning;
    use crate::game::physics::{ArcadePhysics, Body};
    use crate::game::spider::SpiderVariant;

    struct Fixture {
        world: World,
        physics: ArcadePhysics,
        session: Session,
        scheduler: Scheduler,
        events: Events,
        overlays: Overlays,
        config: GameConfig,
        hero: Entity,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = World::new();
            let hero = world.spawn_hero(Rect::new(100.0, 100.0, 29.0, 42.0), HeroTuning::default());
            let mut session = Session::new(3, 3);
            session.begin_level(0);
            Self {
                world,
                physics: ArcadePhysics::new(Rect::new(0.0, 0.0, 960.0, 600.0)),
                session,
                scheduler: Scheduler::new(),
                events: Events::new(),
                overlays: Overlays::new(),
                config: GameConfig::default(),
                hero,
            }
        }

        fn run(&mut self, action_pressed: bool) {
            let mut ctx = CollisionContext {
                world: &mut self.world,
                physics: &mut self.physics,
                session: &mut self.session,
                scheduler: &mut self.scheduler,
                events: &mut self.events,
                overlays: &mut self.overlays,
                config: &self.config,
            };
            resolve_overlaps(&mut ctx, action_pressed);
        }

        fn hero_body(&mut self) -> &mut Body {
            self.world.bodies.get_mut(self.hero).unwrap()
        }

        /// A rect overlapping the hero.
        fn on_hero(&self, w: f32, h: f32) -> Rect {
            Rect::new(105.0, 110.0, w, h)
        }
    }

    #[test]
    fn test_coin_pickup() {
        let mut fx = Fixture::new();
        let coin = fx.world.spawn_coin(fx.on_hero(22.0, 22.0));

        fx.run(false);
        assert_eq!(fx.session.coins(), 1);
        assert_eq!(fx.events.cues.iter().filter(|c| **c == Cue::Coin).count(), 1);
        assert_eq!(
            fx.events.pickups.iter().copied().collect::<Vec<_>>(),
            vec![PickupEvent { item: coin, kind: PickupKind::Coin }]
        );
        assert!(fx.world.is_pending_despawn(coin));

        // Already taken: a second pass in the same tick does nothing
        fx.run(false);
        assert_eq!(fx.session.coins(), 1);

        fx.world.flush_despawns();
        assert!(!fx.world.is_alive(coin));
    }

    #[test]
    fn test_key_pickup() {
        let mut fx = Fixture::new();
        fx.world.spawn_key(fx.on_hero(34.0, 30.0), Tween::once(Vec2::ZERO, Vec2::ZERO, 1.0, Easing::Linear));
        fx.run(false);
        assert!(fx.session.has_key());
        assert_eq!(fx.events.cues.iter().copied().collect::<Vec<_>>(), vec![Cue::Key]);
        assert_eq!(fx.events.pickups.iter().map(|p| p.kind).collect::<Vec<_>>(), vec![PickupKind::Key]);
    }

    #[test]
    fn test_water_kills_and_costs_life_on_contact() {
        let mut fx = Fixture::new();
        fx.world.spawn_water(fx.on_hero(960.0, 42.0));

        fx.run(false);
        assert_eq!(fx.session.lives(), 2);
        assert!(!fx.world.heroes.get(fx.hero).unwrap().is_alive());
        assert!(!fx.world.body(fx.hero).unwrap().enabled);
        assert_eq!(fx.scheduler.pending_continuations(), 1);
        assert_eq!(
            fx.events.hero_deaths.iter().copied().collect::<Vec<_>>(),
            vec![HeroDeathEvent { hero: fx.hero, cause: DeathCause::Drowned }]
        );

        // Disabled hero: no further contacts, no second life lost
        fx.run(false);
        assert_eq!(fx.session.lives(), 2);
        assert_eq!(fx.events.hero_deaths.len(), 1);
    }

    #[test]
    fn test_stomp_kills_spider_and_bounces() {
        let mut fx = Fixture::new();
        let spider = fx.world.spawn_spider(fx.on_hero(42.0, 32.0), SpiderVariant::Spider, 100.0);
        fx.hero_body().velocity.y = 30.0;

        fx.run(false);
        assert_eq!(fx.world.body(fx.hero).unwrap().velocity.y, -200.0);
        assert_eq!(fx.session.coins(), 5);
        assert!(!fx.world.spiders.get(spider).unwrap().is_alive());
        assert!(fx.world.heroes.get(fx.hero).unwrap().is_alive());
        assert_eq!(
            fx.events.stomps.iter().copied().collect::<Vec<_>>(),
            vec![StompEvent { hero: fx.hero, enemy: spider }]
        );
        assert!(fx.events.hero_deaths.is_empty());
        assert_eq!(fx.session.lives(), 3);
    }

    #[test]
    fn test_spider_kills_grounded_hero_and_restores_contacts() {
        let mut fx = Fixture::new();
        let spider = fx.world.spawn_spider(fx.on_hero(42.0, 32.0), SpiderVariant::Dozer, 100.0);
        {
            let body = fx.world.bodies.get_mut(spider).unwrap();
            body.touching.left = true;
            body.was_touching.right = true;
        }

        fx.run(false);
        assert!(!fx.world.heroes.get(fx.hero).unwrap().is_alive());
        assert_eq!(fx.events.cues.iter().copied().collect::<Vec<_>>(), vec![Cue::Stomp]);
        assert_eq!(fx.events.hero_deaths.iter().map(|d| d.cause).collect::<Vec<_>>(), vec![DeathCause::Enemy]);
        assert!(fx.events.stomps.is_empty());
        // Life is taken when the death clip ends, not on contact
        assert_eq!(fx.session.lives(), 3);
        let body = fx.world.body(spider).unwrap();
        assert!(body.touching.right && !body.touching.left);
    }

    #[test]
    fn test_door_needs_key_and_ground_together() {
        for (has_key, grounded) in [(true, false), (false, true), (false, false), (true, true)] {
            let mut fx = Fixture::new();
            fx.session.begin_level(1);
            let door = fx.world.spawn_door(fx.on_hero(42.0, 66.0));
            if has_key {
                fx.session.take_key();
            }
            fx.hero_body().touching.down = grounded;

            fx.run(false);
            let opened = fx.world.doors.get(door).unwrap().open;
            assert_eq!(opened, has_key && grounded, "has_key={has_key} grounded={grounded}");
            assert_eq!(fx.world.heroes.get(fx.hero).unwrap().is_frozen(), opened);
            assert_eq!(fx.world.tweens.contains(fx.hero), opened);
            let events: Vec<_> = fx.events.door_opened.iter().copied().collect();
            if opened {
                assert_eq!(events, vec![DoorEvent { door, opener: fx.hero }]);
            } else {
                assert!(events.is_empty());
            }
        }
    }

    #[test]
    fn test_locked_hint_only_on_first_level() {
        let mut fx = Fixture::new();
        fx.world.spawn_door(fx.on_hero(42.0, 66.0));
        fx.hero_body().touching.down = true;

        fx.run(false);
        assert!(fx.overlays.locked_hint_visible());
        assert_eq!(fx.scheduler.pending_timers(), 1);

        // Still standing there: no extra timers
        fx.run(false);
        assert_eq!(fx.scheduler.pending_timers(), 1);

        let mut fx = Fixture::new();
        fx.session.begin_level(1);
        fx.world.spawn_door(fx.on_hero(42.0, 66.0));
        fx.hero_body().touching.down = true;
        fx.run(false);
        assert!(!fx.overlays.locked_hint_visible());
    }

    #[test]
    fn test_switch_needs_action_and_works_once() {
        let mut fx = Fixture::new();
        let pull_door = fx.world.spawn_pull_door(Rect::new(500.0, 0.0, 42.0, 84.0));
        let switch = fx.world.spawn_switch(fx.on_hero(42.0, 42.0), pull_door);

        fx.run(false);
        assert!(!fx.world.switches.get(switch).unwrap().pulled);

        fx.run(true);
        assert!(fx.world.switches.get(switch).unwrap().pulled);
        assert!(!fx.world.body(pull_door).unwrap().enabled);
        assert_eq!(fx.world.animators.get(switch).unwrap().name(), "pull");
        assert_eq!(fx.events.cues.len(), 1);
        assert_eq!(
            fx.events.switch_pulled.iter().copied().collect::<Vec<_>>(),
            vec![SwitchEvent { switch, pull_door }]
        );

        fx.run(true);
        assert_eq!(fx.events.cues.len(), 1);
        assert_eq!(fx.events.switch_pulled.len(), 1);
    }

    #[test]
    fn test_spiders_turn_at_enemy_walls_but_hero_passes() {
        let mut fx = Fixture::new();
        let wall = fx.world.spawn_enemy_wall(Rect::new(130.0, 100.0, 4.0, 42.0));
        let spider = fx.world.spawn_spider(Rect::new(300.0, 300.0, 42.0, 32.0), SpiderVariant::Spider, 100.0);
        {
            let body = fx.world.bodies.get_mut(spider).unwrap();
            body.position = Vec2::new(120.0, 105.0);
            body.prev_position = Vec2::new(85.0, 105.0);
            body.allow_gravity = false;
        }
        fx.hero_body().velocity.x = 200.0;

        let mut ctx = CollisionContext {
            world: &mut fx.world,
            physics: &mut fx.physics,
            session: &mut fx.session,
            scheduler: &mut fx.scheduler,
            events: &mut fx.events,
            overlays: &mut fx.overlays,
            config: &fx.config,
        };
        collide_solids(&mut ctx);

        assert!(fx.world.body(spider).unwrap().touching.right);
        assert!(!fx.world.body(fx.hero).unwrap().touching.any());
        assert!(fx.world.body(wall).unwrap().touching.left);
    }
}
