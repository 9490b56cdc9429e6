//! Property tweens
//!
//! Two motions exist in the game: the hero sliding into the door while
//! fading out (once, linear) and the key bobbing up and down (yoyo,
//! sinusoidal, forever). Both drive a body's top-left position.

use macroquad::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    SineInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SineInOut => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    Once,
    /// There and back again, forever
    Yoyo,
}

#[derive(Debug, Clone)]
pub struct Tween {
    from: Vec2,
    to: Vec2,
    alpha: Option<(f32, f32)>,
    /// Seconds for one leg
    duration: f32,
    elapsed: f32,
    easing: Easing,
    repeat: Repeat,
    finished: bool,
}

impl Tween {
    pub fn once(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            alpha: None,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            easing,
            repeat: Repeat::Once,
            finished: false,
        }
    }

    /// Oscillate between `from` and `to`, `half_period` seconds per leg.
    pub fn yoyo(from: Vec2, to: Vec2, half_period: f32, easing: Easing) -> Self {
        Self { repeat: Repeat::Yoyo, ..Self::once(from, to, half_period, easing) }
    }

    /// Also animate opacity.
    pub fn with_alpha(mut self, from: f32, to: f32) -> Self {
        self.alpha = Some((from, to));
        self
    }

    /// Advance; returns true on the step a one-shot tween completes.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }
        self.elapsed += dt;
        if self.repeat == Repeat::Once && self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.finished = true;
            return true;
        }
        false
    }

    fn progress(&self) -> f32 {
        let phase = self.elapsed / self.duration;
        let t = match self.repeat {
            Repeat::Once => phase.min(1.0),
            Repeat::Yoyo => {
                let leg = phase.floor();
                let frac = phase - leg;
                if (leg as u64) % 2 == 0 { frac } else { 1.0 - frac }
            }
        };
        self.easing.apply(t)
    }

    pub fn position(&self) -> Vec2 {
        self.from.lerp(self.to, self.progress())
    }

    pub fn alpha(&self) -> Option<f32> {
        let t = self.progress();
        self.alpha.map(|(a, b)| a + (b - a) * t)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
