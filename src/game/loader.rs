//! Level instantiation
//!
//! Turns a `LevelDescriptor` into live entities. Descriptor points use the
//! anchor each object was authored with:
//! - hero, spiders, coins, key: centre
//! - door: bottom-centre
//! - platforms, pull-door, switch, water, decoration: top-left
//!
//! Every platform image is resolved before the first spawn, so a bad
//! descriptor fails without leaving a half-built world behind.

use ::rand::Rng;
use macroquad::math::{Rect, Vec2};
use crate::config::GameConfig;
use crate::world::{ConfigError, LevelDescriptor, Point};
use super::entity::Entity;
use super::physics::PhysicsWorld;
use super::spider::SpiderVariant;
use super::tween::{Easing, Tween};
use super::world::World;

/// Handles to the entities gameplay looks up directly.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelHandles {
    pub hero: Entity,
    pub spiders: Vec<Entity>,
    pub key: Entity,
    pub door: Entity,
    /// Pull-door and its switch
    pub pull_door: Option<(Entity, Entity)>,
    pub water: Option<Entity>,
}

fn centered(p: Point, size: Vec2) -> Rect {
    Rect::new(p.x - size.x * 0.5, p.y - size.y * 0.5, size.x, size.y)
}

fn bottom_centered(p: Point, size: Vec2) -> Rect {
    Rect::new(p.x - size.x * 0.5, p.y - size.y, size.x, size.y)
}

fn top_left(p: Point, size: Vec2) -> Rect {
    Rect::new(p.x, p.y, size.x, size.y)
}

/// Build `desc` into an empty `world`. Gravity is switched on last.
pub fn load_level<R: Rng + ?Sized>(
    world: &mut World,
    physics: &mut dyn PhysicsWorld,
    desc: &LevelDescriptor,
    config: &GameConfig,
    rng: &mut R,
) -> Result<LevelHandles, ConfigError> {
    let platform_rects = desc
        .platforms
        .iter()
        .map(|p| Ok(top_left(Point::new(p.x, p.y), config.platform_size(&p.image)?)))
        .collect::<Result<Vec<Rect>, ConfigError>>()?;

    let sizes = &config.sizes;

    for deco in &desc.decoration {
        world.spawn_decoration(top_left(Point::new(deco.x, deco.y), sizes.decoration.vec2()), deco.frame);
    }

    let wall = sizes.enemy_wall.vec2();
    for (platform, rect) in desc.platforms.iter().zip(&platform_rects) {
        world.spawn_platform(*rect, &platform.image);
        // Left wall hangs off the platform's left edge, right wall off its right edge
        world.spawn_enemy_wall(Rect::new(rect.x - wall.x, rect.y - wall.y, wall.x, wall.y));
        world.spawn_enemy_wall(Rect::new(rect.x + rect.w, rect.y - wall.y, wall.x, wall.y));
    }

    let pull_door = desc.pull_door().map(|(boxes, switch)| {
        let door = world.spawn_pull_door(top_left(boxes, sizes.pull_door.vec2()));
        let switch = world.spawn_switch(top_left(switch, sizes.switch.vec2()), door);
        (door, switch)
    });

    let water = desc.water.map(|p| world.spawn_water(top_left(p, sizes.water.vec2())));

    for &coin in &desc.coins {
        world.spawn_coin(centered(coin, sizes.coin.vec2()));
    }

    let key_rect = centered(desc.key, sizes.key.vec2());
    let amplitude = config.key_bob_amplitude;
    let bob = Tween::yoyo(
        Vec2::new(key_rect.x, key_rect.y - amplitude),
        Vec2::new(key_rect.x, key_rect.y + amplitude),
        config.timing.key_bob_ms / 1000.0,
        Easing::SineInOut,
    );
    let key = world.spawn_key(Rect::new(key_rect.x, key_rect.y - amplitude, key_rect.w, key_rect.h), bob);

    let door = world.spawn_door(bottom_centered(desc.door, sizes.door.vec2()));

    let spiders = desc
        .spiders
        .iter()
        .map(|&p| {
            let variant = SpiderVariant::pick(rng);
            world.spawn_spider(centered(p, sizes.spider.vec2()), variant, config.spider_speed)
        })
        .collect();

    let hero = world.spawn_hero(centered(desc.hero, sizes.hero.vec2()), config.hero);

    physics.set_gravity(config.gravity);

    log::debug!(
        "level built: {} entities ({} platforms, {} spiders, {} coins)",
        world.entity_count(),
        desc.platforms.len(),
        desc.spiders.len(),
        desc.coins.len()
    );

    Ok(LevelHandles { hero, spiders, key, door, pull_door, water })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;
    use crate::game::physics::ArcadePhysics;
    use crate::game::world::Kind;
    use crate::world::{DecorationDesc, PlatformDesc};

    fn descriptor() -> LevelDescriptor {
        LevelDescriptor {
            hero: Point::new(21.0, 525.0),
            spiders: vec![Point::new(121.0, 399.0), Point::new(800.0, 362.0)],
            platforms: vec![
                PlatformDesc { x: 0.0, y: 546.0, image: "ground".to_string() },
                PlatformDesc { x: 420.0, y: 420.0, image: "grass:4x1".to_string() },
            ],
            decoration: vec![DecorationDesc { x: 84.0, y: 504.0, frame: 1 }],
            coins: vec![Point::new(231.0, 294.0), Point::new(273.0, 294.0)],
            key: Point::new(651.0, 105.0),
            door: Point::new(169.0, 546.0),
            door_boxes: None,
            door_switch: None,
            water: None,
        }
    }

    fn build(desc: &LevelDescriptor) -> (World, ArcadePhysics, Result<LevelHandles, ConfigError>) {
        let mut world = World::new();
        let mut physics = ArcadePhysics::new(Rect::new(0.0, 0.0, 960.0, 600.0));
        let mut rng = StdRng::seed_from_u64(7);
        let result = load_level(&mut world, &mut physics, desc, &GameConfig::default(), &mut rng);
        (world, physics, result)
    }

    #[test]
    fn test_anchors() {
        let (world, _, handles) = build(&descriptor());
        let handles = handles.unwrap();

        let hero = world.body(handles.hero).unwrap();
        assert_eq!(hero.center(), Vec2::new(21.0, 525.0));

        // Door stands on its point
        let door = world.body(handles.door).unwrap().rect();
        assert_eq!(door.bottom(), 546.0);
        assert_eq!(door.center().x, 169.0);

        let platforms = world.entities_of(Kind::Platform);
        let grass = world.body(platforms[1]).unwrap().rect();
        assert_eq!(grass, Rect::new(420.0, 420.0, 168.0, 42.0));
    }

    #[test]
    fn test_every_platform_gets_two_enemy_walls() {
        let (world, _, _) = build(&descriptor());
        let walls: Vec<Rect> = world
            .entities_of(Kind::EnemyWall)
            .into_iter()
            .map(|w| world.body(w).unwrap().rect())
            .collect();
        assert_eq!(walls.len(), 4);
        assert!(walls.contains(&Rect::new(416.0, 378.0, 4.0, 42.0)));
        assert!(walls.contains(&Rect::new(588.0, 378.0, 4.0, 42.0)));
    }

    #[test]
    fn test_key_bobs_around_its_point() {
        let (mut world, _, handles) = build(&descriptor());
        let key = handles.unwrap().key;
        assert_eq!(world.center_of(key).unwrap().y, 102.0);

        let tween = world.tweens.get_mut(key).unwrap();
        tween.advance(0.8);
        assert!((tween.position().y + 15.0 - 108.0).abs() < 1e-3);
        assert!(!tween.is_finished());
    }

    #[test]
    fn test_gravity_set_after_build() {
        let (_, physics, handles) = build(&descriptor());
        assert!(handles.is_ok());
        assert_eq!(physics.gravity(), 1200.0);
    }

    #[test]
    fn test_unknown_platform_image_builds_nothing() {
        let mut desc = descriptor();
        desc.platforms.push(PlatformDesc { x: 0.0, y: 0.0, image: "lava".to_string() });

        let (world, physics, result) = build(&desc);
        assert!(matches!(result, Err(ConfigError::UnknownPlatformImage(ref name)) if name == "lava"));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(physics.gravity(), 0.0);
    }

    #[test]
    fn test_optional_pieces() {
        let mut desc = descriptor();
        desc.door_boxes = Some(Point::new(700.0, 420.0));
        desc.door_switch = Some(Point::new(630.0, 462.0));
        desc.water = Some(Point::new(0.0, 558.0));

        let (world, _, handles) = build(&desc);
        let handles = handles.unwrap();
        let (pull_door, switch) = handles.pull_door.unwrap();
        assert_eq!(world.switches.get(switch).unwrap().pull_door, pull_door);
        assert_eq!(world.body(handles.water.unwrap()).unwrap().position, Vec2::new(0.0, 558.0));

        // Boxes without a switch are ignored
        desc.door_switch = None;
        let (_, _, handles) = build(&desc);
        assert!(handles.unwrap().pull_door.is_none());
    }

    #[test]
    fn test_seeded_variants_repeat() {
        let (a, _, ha) = build(&descriptor());
        let (b, _, hb) = build(&descriptor());
        let variants = |w: &World, h: &LevelHandles| -> Vec<SpiderVariant> {
            h.spiders.iter().map(|&s| w.spiders.get(s).unwrap().variant()).collect()
        };
        assert_eq!(variants(&a, &ha.unwrap()), variants(&b, &hb.unwrap()));
    }
}
