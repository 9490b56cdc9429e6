//! Hero character state machine
//!
//! The hero's animation is recomputed from scratch every frame from the
//! body's velocity and contact flags plus the `alive` and `frozen` flags.
//! Commands (`move_horizontal`, `jump`, `bounce`, ...) only ever touch the
//! body's velocity and the hero's own flags.

use serde::{Deserialize, Serialize};
use macroquad::math::Vec2;
use super::animation::{clips, Animator, Clip};
use super::behavior::{Mortal, Updatable};
use super::physics::Body;

/// Hero movement tuning (units/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroTuning {
    pub speed: f32,
    pub jump_speed: f32,
    pub bounce_speed: f32,
}

impl Default for HeroTuning {
    fn default() -> Self {
        Self {
            speed: 200.0,
            jump_speed: 400.0,
            bounce_speed: 200.0,
        }
    }
}

/// Discrete animation state of the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeroAnim {
    Stop,
    Run,
    Jump,
    Fall,
    Die,
}

impl HeroAnim {
    pub fn clip(self) -> Clip {
        match self {
            HeroAnim::Stop => clips::HERO_STOP,
            HeroAnim::Run => clips::HERO_RUN,
            HeroAnim::Jump => clips::HERO_JUMP,
            HeroAnim::Fall => clips::HERO_FALL,
            HeroAnim::Die => clips::HERO_DIE,
        }
    }
}

/// Pick the hero animation. First matching rule wins:
/// dead, frozen, rising, airborne, running on ground, idle.
pub fn select_animation(alive: bool, frozen: bool, velocity: Vec2, touching_down: bool) -> HeroAnim {
    if !alive {
        HeroAnim::Die
    } else if frozen {
        HeroAnim::Stop
    } else if velocity.y < 0.0 {
        HeroAnim::Jump
    } else if !touching_down {
        HeroAnim::Fall
    } else if velocity.x != 0.0 {
        HeroAnim::Run
    } else {
        HeroAnim::Stop
    }
}

#[derive(Debug, Clone)]
pub struct Hero {
    tuning: HeroTuning,
    /// +1 facing right, -1 facing left
    facing: i8,
    alive: bool,
    frozen: bool,
    boosting: bool,
    anim: HeroAnim,
}

impl Hero {
    pub fn new(tuning: HeroTuning) -> Self {
        Self {
            tuning,
            facing: 1,
            alive: true,
            frozen: false,
            boosting: false,
            anim: HeroAnim::Stop,
        }
    }

    pub fn facing(&self) -> i8 {
        self.facing
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_boosting(&self) -> bool {
        self.boosting
    }

    /// Animation chosen on the last `update`.
    pub fn anim(&self) -> HeroAnim {
        self.anim
    }

    /// Animation the hero should show for the body's current state.
    pub fn animation_for(&self, body: &Body) -> HeroAnim {
        select_animation(self.alive, self.frozen, body.velocity, body.touching_down())
    }

    /// Walk left (-1), right (1) or stop (0). Ignored while frozen.
    pub fn move_horizontal(&mut self, body: &mut Body, direction: i8) {
        if self.frozen {
            return;
        }
        let direction = direction.signum();
        body.velocity.x = f32::from(direction) * self.tuning.speed;
        if direction != 0 {
            self.facing = direction;
        }
    }

    /// Start a jump from the ground, or keep a held jump going.
    ///
    /// Returns true only for a fresh take-off, so a boosted continuation
    /// does not replay the jump sound.
    pub fn jump(&mut self, body: &mut Body) -> bool {
        let can_jump = body.touching_down() && self.alive && !self.frozen;

        if can_jump || self.boosting {
            body.velocity.y = -self.tuning.jump_speed;
            self.boosting = true;
        }

        can_jump
    }

    pub fn stop_jump_boost(&mut self) {
        self.boosting = false;
    }

    /// Lock the hero in place for the door-entry sequence.
    pub fn freeze(&mut self, body: &mut Body) {
        body.enabled = false;
        self.frozen = true;
    }

    /// Small hop after stomping an enemy.
    pub fn bounce(&mut self, body: &mut Body) {
        body.velocity.y = -self.tuning.bounce_speed;
    }
}

impl Updatable for Hero {
    fn update(&mut self, body: &mut Body, animator: &mut Animator) {
        let anim = self.animation_for(body);
        animator.play_if_changed(anim.clip());
        self.anim = anim;
    }
}

impl Mortal for Hero {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn die(&mut self, body: &mut Body, animator: &mut Animator) {
        self.alive = false;
        body.enabled = false;
        self.anim = HeroAnim::Die;
        animator.play(clips::HERO_DIE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Body {
        Body::new(Vec2::new(0.0, 0.0), Vec2::new(29.0, 42.0))
    }

    fn grounded_body() -> Body {
        let mut b = body();
        b.touching.down = true;
        b
    }

    #[test]
    fn test_priority_table_exhaustive() {
        let speeds = [-50.0, 0.0, 50.0];
        for &alive in &[true, false] {
            for &frozen in &[true, false] {
                for &down in &[true, false] {
                    for &vx in &speeds {
                        for &vy in &speeds {
                            let got = select_animation(alive, frozen, Vec2::new(vx, vy), down);
                            let want = if !alive {
                                HeroAnim::Die
                            } else if frozen {
                                HeroAnim::Stop
                            } else if vy < 0.0 {
                                HeroAnim::Jump
                            } else if !down {
                                HeroAnim::Fall
                            } else if vx != 0.0 {
                                HeroAnim::Run
                            } else {
                                HeroAnim::Stop
                            };
                            assert_eq!(got, want, "alive={alive} frozen={frozen} down={down} vx={vx} vy={vy}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_running_on_ground() {
        assert_eq!(select_animation(true, false, Vec2::new(50.0, 0.0), true), HeroAnim::Run);
    }

    #[test]
    fn test_frozen_overrides_rising() {
        assert_eq!(select_animation(true, true, Vec2::new(0.0, -10.0), false), HeroAnim::Stop);
    }

    #[test]
    fn test_move_sets_velocity_and_keeps_facing_on_zero() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = body();

        hero.move_horizontal(&mut b, -1);
        assert_eq!(b.velocity.x, -200.0);
        assert_eq!(hero.facing(), -1);

        hero.move_horizontal(&mut b, 0);
        assert_eq!(b.velocity.x, 0.0);
        assert_eq!(hero.facing(), -1);

        hero.move_horizontal(&mut b, 1);
        assert_eq!(hero.facing(), 1);
    }

    #[test]
    fn test_move_ignored_while_frozen() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = body();
        b.velocity.x = 30.0;
        hero.freeze(&mut b);

        hero.move_horizontal(&mut b, -1);
        assert_eq!(b.velocity.x, 30.0);
        assert!(!b.enabled);
    }

    #[test]
    fn test_jump_from_ground_then_boost() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = grounded_body();

        assert!(hero.jump(&mut b));
        assert_eq!(b.velocity.y, -400.0);
        assert!(hero.is_boosting());

        // Airborne: boost keeps pushing but reports no fresh jump
        b.touching.down = false;
        b.velocity.y = -100.0;
        assert!(!hero.jump(&mut b));
        assert_eq!(b.velocity.y, -400.0);

        hero.stop_jump_boost();
        b.velocity.y = -100.0;
        assert!(!hero.jump(&mut b));
        assert_eq!(b.velocity.y, -100.0);
    }

    #[test]
    fn test_jump_refused_when_dead_or_frozen() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = grounded_body();
        let mut anim = Animator::new(clips::HERO_STOP);
        hero.die(&mut b, &mut anim);
        assert!(!hero.jump(&mut b));
        assert_eq!(b.velocity.y, 0.0);

        let mut hero = Hero::new(HeroTuning::default());
        let mut b = grounded_body();
        hero.freeze(&mut b);
        assert!(!hero.jump(&mut b));
    }

    #[test]
    fn test_bounce() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = body();
        b.velocity.y = 30.0;
        hero.bounce(&mut b);
        assert_eq!(b.velocity.y, -200.0);
    }

    #[test]
    fn test_update_does_not_restart_same_clip() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = grounded_body();
        b.velocity.x = 200.0;
        let mut anim = Animator::new(clips::HERO_STOP);

        hero.update(&mut b, &mut anim);
        assert_eq!(hero.anim(), HeroAnim::Run);
        let playback = anim.playback();

        anim.advance(0.1);
        hero.update(&mut b, &mut anim);
        assert_eq!(anim.playback(), playback);
    }

    #[test]
    fn test_die_disables_body_and_plays_death() {
        let mut hero = Hero::new(HeroTuning::default());
        let mut b = grounded_body();
        let mut anim = Animator::new(clips::HERO_STOP);

        hero.die(&mut b, &mut anim);
        assert!(!hero.is_alive());
        assert!(!b.enabled);
        assert_eq!(anim.name(), "die");

        hero.update(&mut b, &mut anim);
        assert_eq!(hero.anim(), HeroAnim::Die);
    }
}
