//! Capability traits shared by the hero and the spiders.
//!
//! Entities are plain structs composed with a `Body` and an `Animator`
//! living in the world's component storage; these traits are the only
//! behaviour they expose to the game loop.

use super::animation::Animator;
use super::physics::Body;

/// Per-frame logic that reads physics state and may steer the body.
pub trait Updatable {
    fn update(&mut self, body: &mut Body, animator: &mut Animator);
}

/// Something that can be killed: body goes inert, a death clip plays, and
/// the world removes the entity once that clip completes.
pub trait Mortal {
    fn is_alive(&self) -> bool;

    fn die(&mut self, body: &mut Body, animator: &mut Animator);
}
