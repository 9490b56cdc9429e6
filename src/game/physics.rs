//! Physics Bodies
//!
//! The gameplay code only talks to physics through `Body` data and the
//! `PhysicsWorld` trait: integrate, pairwise solid `collide`, and pairwise
//! `overlaps`. `ArcadePhysics` is the stock implementation: axis-aligned
//! boxes, one gravity axis, no rotation, contact flags recomputed every step.
//!
//! Coordinates are screen-style: +x right, +y down, so gravity is positive
//! and a jump is a negative vertical velocity.

use macroquad::math::{Rect, Vec2};
use super::component::ComponentStorage;
use super::entity::Entity;

/// Slack used when deciding which side two boxes met on.
const CONTACT_EPSILON: f32 = 0.5;

/// Per-side contact flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Sides {
    pub const NONE: Sides = Sides { up: false, down: false, left: false, right: false };

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Axis-aligned physics body. `position` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Position before the last integration step
    pub prev_position: Vec2,
    /// Contacts produced by `collide` this step
    pub touching: Sides,
    /// `touching` as it was at the end of the previous step
    pub was_touching: Sides,
    /// Contacts with the world bounds this step
    pub blocked: Sides,
    pub enabled: bool,
    pub immovable: bool,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
}

impl Body {
    /// Dynamic body affected by gravity.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            prev_position: position,
            touching: Sides::NONE,
            was_touching: Sides::NONE,
            blocked: Sides::NONE,
            enabled: true,
            immovable: false,
            allow_gravity: true,
            collide_world_bounds: false,
        }
    }

    /// Immovable, gravity-free body (platforms, walls, pull-door).
    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            immovable: true,
            allow_gravity: false,
            ..Self::new(position, size)
        }
    }

    /// Gravity-free body that only exists to be overlapped (pickups, door).
    pub fn sensor(position: Vec2, size: Vec2) -> Self {
        Self {
            allow_gravity: false,
            ..Self::new(position, size)
        }
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    fn prev_rect(&self) -> Rect {
        Rect::new(self.prev_position.x, self.prev_position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn touching_down(&self) -> bool {
        self.touching.down
    }
}

/// Strict AABB intersection: shared edges do not count.
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// What the gameplay layer needs from a physics engine.
pub trait PhysicsWorld {
    fn gravity(&self) -> f32;

    fn set_gravity(&mut self, gravity: f32);

    /// Advance every enabled body by `dt` seconds and reset contact flags.
    fn integrate(&mut self, bodies: &mut ComponentStorage<Body>, dt: f32);

    /// Solid response between two bodies. Returns true if they were in contact.
    fn collide(&mut self, bodies: &mut ComponentStorage<Body>, a: Entity, b: Entity) -> bool;

    /// Non-blocking proximity test. Disabled bodies never overlap.
    fn overlaps(&self, bodies: &ComponentStorage<Body>, a: Entity, b: Entity) -> bool;
}

/// Stock arcade-style implementation.
#[derive(Debug, Clone)]
pub struct ArcadePhysics {
    gravity: f32,
    bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl ArcadePhysics {
    pub fn new(bounds: Rect) -> Self {
        Self { gravity: 0.0, bounds }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn clamp_to_bounds(&self, body: &mut Body) {
        let b = self.bounds;
        if body.position.x < b.x {
            body.position.x = b.x;
            body.velocity.x = 0.0;
            body.blocked.left = true;
        } else if body.position.x + body.size.x > b.x + b.w {
            body.position.x = b.x + b.w - body.size.x;
            body.velocity.x = 0.0;
            body.blocked.right = true;
        }
        if body.position.y < b.y {
            body.position.y = b.y;
            body.velocity.y = 0.0;
            body.blocked.up = true;
        } else if body.position.y + body.size.y > b.y + b.h {
            body.position.y = b.y + b.h - body.size.y;
            body.velocity.y = 0.0;
            body.blocked.down = true;
        }
    }

    /// Pick the axis the two boxes were still apart on before this step.
    fn contact_axis(a: &Body, b: &Body) -> Axis {
        let (pa, pb) = (a.prev_rect(), b.prev_rect());
        let apart_vertically = pa.bottom() <= pb.top() + CONTACT_EPSILON
            || pa.top() >= pb.bottom() - CONTACT_EPSILON;
        let apart_horizontally = pa.right() <= pb.left() + CONTACT_EPSILON
            || pa.left() >= pb.right() - CONTACT_EPSILON;

        match (apart_vertically, apart_horizontally) {
            (true, false) => Axis::Y,
            (false, true) => Axis::X,
            _ => {
                // Corner case or already interpenetrating: least penetration wins
                let (ra, rb) = (a.rect(), b.rect());
                let pen_x = (ra.right().min(rb.right()) - ra.left().max(rb.left())).abs();
                let pen_y = (ra.bottom().min(rb.bottom()) - ra.top().max(rb.top())).abs();
                if pen_y <= pen_x { Axis::Y } else { Axis::X }
            }
        }
    }

    fn separate(a: &mut Body, b: &mut Body, axis: Axis) {
        let (ra, rb) = (a.rect(), b.rect());
        let (share_a, share_b) = match (a.immovable, b.immovable) {
            (false, true) => (1.0, 0.0),
            (true, false) => (0.0, 1.0),
            _ => (0.5, 0.5),
        };

        match axis {
            Axis::Y => {
                let a_first = a.prev_rect().center().y <= b.prev_rect().center().y;
                let pen = if a_first { ra.bottom() - rb.top() } else { rb.bottom() - ra.top() };
                let dir = if a_first { 1.0 } else { -1.0 };
                a.position.y -= dir * pen * share_a;
                b.position.y += dir * pen * share_b;
                if a_first {
                    if !a.immovable && a.velocity.y > 0.0 { a.velocity.y = 0.0; }
                    if !b.immovable && b.velocity.y < 0.0 { b.velocity.y = 0.0; }
                    a.touching.down = true;
                    b.touching.up = true;
                } else {
                    if !a.immovable && a.velocity.y < 0.0 { a.velocity.y = 0.0; }
                    if !b.immovable && b.velocity.y > 0.0 { b.velocity.y = 0.0; }
                    a.touching.up = true;
                    b.touching.down = true;
                }
            }
            Axis::X => {
                let a_first = a.prev_rect().center().x <= b.prev_rect().center().x;
                let pen = if a_first { ra.right() - rb.left() } else { rb.right() - ra.left() };
                let dir = if a_first { 1.0 } else { -1.0 };
                a.position.x -= dir * pen * share_a;
                b.position.x += dir * pen * share_b;
                if a_first {
                    if !a.immovable && a.velocity.x > 0.0 { a.velocity.x = 0.0; }
                    if !b.immovable && b.velocity.x < 0.0 { b.velocity.x = 0.0; }
                    a.touching.right = true;
                    b.touching.left = true;
                } else {
                    if !a.immovable && a.velocity.x < 0.0 { a.velocity.x = 0.0; }
                    if !b.immovable && b.velocity.x > 0.0 { b.velocity.x = 0.0; }
                    a.touching.left = true;
                    b.touching.right = true;
                }
            }
        }
    }
}

impl PhysicsWorld for ArcadePhysics {
    fn gravity(&self) -> f32 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    fn integrate(&mut self, bodies: &mut ComponentStorage<Body>, dt: f32) {
        log::trace!("physics integrate: dt={:.4} gravity={}", dt, self.gravity);
        for (_, body) in bodies.iter_mut() {
            body.was_touching = body.touching;
            body.touching = Sides::NONE;
            body.blocked = Sides::NONE;
            body.prev_position = body.position;

            if !body.enabled {
                continue;
            }
            if body.allow_gravity && !body.immovable {
                body.velocity.y += self.gravity * dt;
            }
            body.position += body.velocity * dt;

            if body.collide_world_bounds {
                self.clamp_to_bounds(body);
            }
        }
    }

    fn collide(&mut self, bodies: &mut ComponentStorage<Body>, a: Entity, b: Entity) -> bool {
        let Some((ba, bb)) = bodies.get_pair_mut(a, b) else {
            return false;
        };
        if !ba.enabled || !bb.enabled || (ba.immovable && bb.immovable) {
            return false;
        }
        if !rects_intersect(&ba.rect(), &bb.rect()) {
            return false;
        }

        let axis = Self::contact_axis(ba, bb);
        Self::separate(ba, bb, axis);
        true
    }

    fn overlaps(&self, bodies: &ComponentStorage<Body>, a: Entity, b: Entity) -> bool {
        match (bodies.get(a), bodies.get(b)) {
            (Some(ba), Some(bb)) if a != b => {
                ba.enabled && bb.enabled && rects_intersect(&ba.rect(), &bb.rect())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> ArcadePhysics {
        let mut physics = ArcadePhysics::new(Rect::new(0.0, 0.0, 960.0, 600.0));
        physics.set_gravity(1200.0);
        physics
    }

    fn e(i: u32) -> Entity {
        Entity::new(i, 0)
    }

    #[test]
    fn test_gravity_only_moves_dynamic_bodies() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        bodies.insert(e(0), Body::new(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0)));
        bodies.insert(e(1), Body::fixed(Vec2::new(50.0, 10.0), Vec2::new(10.0, 10.0)));
        bodies.insert(e(2), Body::sensor(Vec2::new(90.0, 10.0), Vec2::new(10.0, 10.0)));

        physics.integrate(&mut bodies, 0.5);

        assert_eq!(bodies.get(e(0)).unwrap().velocity.y, 600.0);
        assert_eq!(bodies.get(e(1)).unwrap().position.y, 10.0);
        assert_eq!(bodies.get(e(2)).unwrap().position.y, 10.0);
    }

    #[test]
    fn test_landing_sets_touching_down_and_stops_fall() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        // Resting exactly on the platform top
        bodies.insert(e(0), Body::new(Vec2::new(0.0, 58.0), Vec2::new(10.0, 42.0)));
        bodies.insert(e(1), Body::fixed(Vec2::new(0.0, 100.0), Vec2::new(200.0, 42.0)));

        physics.integrate(&mut bodies, 1.0 / 60.0);
        assert!(physics.collide(&mut bodies, e(0), e(1)));

        let hero = bodies.get(e(0)).unwrap();
        assert!(hero.touching.down);
        assert_eq!(hero.velocity.y, 0.0);
        assert!((hero.position.y + hero.size.y - 100.0).abs() < 1e-3);
        assert!(bodies.get(e(1)).unwrap().touching.up);
    }

    #[test]
    fn test_walking_into_wall_sets_side_flag() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        let mut spider = Body::sensor(Vec2::new(89.0, 0.0), Vec2::new(10.0, 10.0));
        spider.velocity.x = 100.0;
        bodies.insert(e(0), spider);
        bodies.insert(e(1), Body::fixed(Vec2::new(100.0, 0.0), Vec2::new(4.0, 42.0)));

        physics.integrate(&mut bodies, 1.0 / 30.0);
        assert!(physics.collide(&mut bodies, e(0), e(1)));

        let spider = bodies.get(e(0)).unwrap();
        assert!(spider.touching.right);
        assert!(!spider.touching.left);
        assert!((spider.position.x - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_world_bounds_set_blocked_not_touching() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        let mut body = Body::sensor(Vec2::new(955.0, 0.0), Vec2::new(10.0, 10.0)).with_world_bounds();
        body.velocity.x = 100.0;
        bodies.insert(e(0), body);

        physics.integrate(&mut bodies, 0.1);

        let body = bodies.get(e(0)).unwrap();
        assert!(body.blocked.right);
        assert!(!body.touching.right);
        assert_eq!(body.position.x, 950.0);
    }

    #[test]
    fn test_disabled_bodies_neither_collide_nor_overlap() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        let mut hero = Body::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        hero.enabled = false;
        bodies.insert(e(0), hero);
        bodies.insert(e(1), Body::sensor(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)));

        assert!(!physics.overlaps(&bodies, e(0), e(1)));
        assert!(!physics.collide(&mut bodies, e(0), e(1)));
    }

    #[test]
    fn test_integrate_rolls_contacts_into_was_touching() {
        let mut physics = world();
        let mut bodies = ComponentStorage::new();
        let mut body = Body::sensor(Vec2::ZERO, Vec2::new(10.0, 10.0));
        body.touching.left = true;
        bodies.insert(e(0), body);

        physics.integrate(&mut bodies, 0.016);

        let body = bodies.get(e(0)).unwrap();
        assert!(body.was_touching.left);
        assert!(!body.touching.any());
    }
}
