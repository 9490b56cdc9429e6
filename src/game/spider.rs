//! Spider patrol agent
//!
//! Spiders walk at a constant speed and turn around whenever the physics
//! step reports a contact on the side they are heading into: a platform
//! edge wall, the pull-door, or the world bounds.

use ::rand::Rng;
use super::animation::{clips, Animator};
use super::behavior::{Mortal, Updatable};
use super::physics::Body;

/// Cosmetic sprite variant. Has no effect on behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpiderVariant {
    Spider,
    Dozer,
}

impl SpiderVariant {
    pub const ALL: [SpiderVariant; 2] = [SpiderVariant::Spider, SpiderVariant::Dozer];

    /// Uniform pick from the injected random source.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn sprite(self) -> &'static str {
        match self {
            SpiderVariant::Spider => "spider",
            SpiderVariant::Dozer => "dozer",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spider {
    variant: SpiderVariant,
    speed: f32,
    /// +1 heading right, -1 heading left
    facing: i8,
    alive: bool,
}

impl Spider {
    pub fn new(variant: SpiderVariant, speed: f32) -> Self {
        Self { variant, speed, facing: 1, alive: true }
    }

    /// Set the starting walk velocity (always to the right).
    pub fn start(&self, body: &mut Body) {
        body.velocity.x = self.speed;
    }

    pub fn variant(&self) -> SpiderVariant {
        self.variant
    }

    pub fn facing(&self) -> i8 {
        self.facing
    }

    /// Turn around on wall contact; otherwise keep walking.
    pub fn patrol(&mut self, body: &mut Body) {
        if body.touching.right || body.blocked.right {
            body.velocity.x = -self.speed;
            self.facing = -1;
        } else if body.touching.left || body.blocked.left {
            body.velocity.x = self.speed;
            self.facing = 1;
        }
    }
}

impl Updatable for Spider {
    fn update(&mut self, body: &mut Body, _animator: &mut Animator) {
        if self.alive {
            self.patrol(body);
        }
    }
}

impl Mortal for Spider {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn die(&mut self, body: &mut Body, animator: &mut Animator) {
        self.alive = false;
        body.enabled = false;
        animator.play(clips::SPIDER_DIE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;
    use macroquad::math::Vec2;

    fn spider() -> (Spider, Body) {
        let spider = Spider::new(SpiderVariant::Spider, 100.0);
        let mut body = Body::new(Vec2::ZERO, Vec2::new(42.0, 32.0));
        spider.start(&mut body);
        (spider, body)
    }

    #[test]
    fn test_starts_walking_right() {
        let (spider, body) = spider();
        assert_eq!(body.velocity.x, 100.0);
        assert_eq!(spider.facing(), 1);
    }

    #[test]
    fn test_right_contact_turns_left() {
        let (mut spider, mut body) = spider();
        body.touching.right = true;
        spider.patrol(&mut body);
        assert_eq!(body.velocity.x, -100.0);
        assert_eq!(spider.facing(), -1);
    }

    #[test]
    fn test_boundary_contact_wins_regardless_of_prior_direction() {
        for &prior in &[-100.0, 0.0, 100.0] {
            let (mut spider, mut body) = spider();
            body.velocity.x = prior;
            body.blocked.left = true;
            spider.patrol(&mut body);
            assert!(body.velocity.x > 0.0);

            body.blocked.left = false;
            body.velocity.x = prior;
            body.blocked.right = true;
            spider.patrol(&mut body);
            assert!(body.velocity.x < 0.0);
        }
    }

    #[test]
    fn test_no_contact_keeps_direction() {
        let (mut spider, mut body) = spider();
        body.velocity.x = -100.0;
        spider.patrol(&mut body);
        assert_eq!(body.velocity.x, -100.0);
    }

    #[test]
    fn test_variant_pick_is_seedable() {
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..16).map(|_| SpiderVariant::pick(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
        let all = picks(7);
        assert!(all.contains(&SpiderVariant::Spider) && all.contains(&SpiderVariant::Dozer));
    }

    #[test]
    fn test_dead_spider_stops_patrolling() {
        let (mut spider, mut body) = spider();
        let mut anim = Animator::new(clips::SPIDER_CRAWL);
        spider.die(&mut body, &mut anim);
        assert!(!body.enabled);
        assert_eq!(anim.name(), "die");

        body.touching.right = true;
        spider.update(&mut body, &mut anim);
        assert_eq!(body.velocity.x, 100.0);
    }
}
