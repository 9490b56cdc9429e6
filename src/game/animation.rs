//! Sprite animation playback
//!
//! Gameplay reads back exactly two things from an animation: which clip is
//! playing (so re-selecting the same clip does not restart it) and whether a
//! one-shot clip has finished. `Animator::advance` reports that finish once.

/// A named frame sequence from a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub name: &'static str,
    pub frames: &'static [u16],
    pub fps: f32,
    pub looped: bool,
}

impl Clip {
    pub const fn new(name: &'static str, frames: &'static [u16], fps: f32, looped: bool) -> Self {
        Self { name, frames, fps, looped }
    }

    /// Length of one pass through the frames, in seconds.
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 / self.fps
    }
}

/// Clips used by the game's sprites.
pub mod clips {
    use super::Clip;

    pub const HERO_STOP: Clip = Clip::new("stop", &[0], 60.0, false);
    pub const HERO_RUN: Clip = Clip::new("run", &[1, 2, 3], 8.0, true);
    pub const HERO_JUMP: Clip = Clip::new("jump", &[1], 8.0, true);
    pub const HERO_FALL: Clip = Clip::new("fall", &[2], 60.0, false);
    pub const HERO_DIE: Clip = Clip::new("die", &[1, 2, 3], 8.0, false);

    pub const SPIDER_CRAWL: Clip = Clip::new("crawl", &[0, 1, 2], 8.0, true);
    pub const SPIDER_DIE: Clip = Clip::new("die", &[0, 4, 0, 4, 0, 4, 3, 3, 3, 3, 3, 3], 12.0, false);

    pub const COIN_ROTATE: Clip = Clip::new("rotate", &[0, 1, 2, 1], 6.0, true);

    pub const SWITCH_IDLE: Clip = Clip::new("idle", &[0], 1.0, false);
    pub const SWITCH_PULL: Clip = Clip::new("pull", &[1], 1.0, false);
}

/// Playback state for one sprite.
#[derive(Debug, Clone)]
pub struct Animator {
    clip: Clip,
    elapsed: f32,
    finished: bool,
    /// Bumped on every `play`, so a finish can be tied to one playback
    playback: u32,
}

/// A one-shot clip reached its last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finished {
    pub clip: &'static str,
    pub playback: u32,
}

impl Animator {
    pub fn new(clip: Clip) -> Self {
        Self { clip, elapsed: 0.0, finished: false, playback: 0 }
    }

    /// Name of the clip currently playing.
    pub fn name(&self) -> &'static str {
        self.clip.name
    }

    pub fn playback(&self) -> u32 {
        self.playback
    }

    /// Start a clip from its first frame, even if it is already playing.
    pub fn play(&mut self, clip: Clip) {
        self.clip = clip;
        self.elapsed = 0.0;
        self.finished = false;
        self.playback = self.playback.wrapping_add(1);
    }

    /// Start a clip unless a clip with the same name is already playing.
    /// Returns true if playback (re)started.
    pub fn play_if_changed(&mut self, clip: Clip) -> bool {
        if self.clip.name == clip.name {
            return false;
        }
        self.play(clip);
        true
    }

    /// Advance the clock. Returns `Some` exactly once per one-shot playback.
    pub fn advance(&mut self, dt: f32) -> Option<Finished> {
        if self.finished {
            return None;
        }
        self.elapsed += dt;
        if !self.clip.looped && self.elapsed >= self.clip.duration() {
            self.finished = true;
            return Some(Finished { clip: self.clip.name, playback: self.playback });
        }
        None
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sprite-sheet frame to draw right now.
    pub fn frame(&self) -> u16 {
        let frames = self.clip.frames;
        if frames.is_empty() {
            return 0;
        }
        let step = (self.elapsed * self.clip.fps) as usize;
        let idx = if self.clip.looped {
            step % frames.len()
        } else {
            step.min(frames.len() - 1)
        };
        frames[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::clips::*;

    #[test]
    fn test_one_shot_finishes_exactly_once() {
        let mut anim = Animator::new(HERO_DIE);
        // 3 frames at 8 fps
        assert!(anim.advance(0.2).is_none());
        let done = anim.advance(0.2).expect("die clip should finish");
        assert_eq!(done.clip, "die");
        assert!(anim.advance(1.0).is_none());
        assert!(anim.is_finished());
    }

    #[test]
    fn test_looped_clip_never_finishes() {
        let mut anim = Animator::new(SPIDER_CRAWL);
        for _ in 0..100 {
            assert!(anim.advance(0.1).is_none());
        }
    }

    #[test]
    fn test_same_clip_does_not_restart() {
        let mut anim = Animator::new(HERO_RUN);
        anim.advance(0.2);
        let frame_before = anim.frame();

        assert!(!anim.play_if_changed(HERO_RUN));
        assert_eq!(anim.frame(), frame_before);

        assert!(anim.play_if_changed(HERO_JUMP));
        assert_eq!(anim.name(), "jump");
    }

    #[test]
    fn test_frame_sequence_wraps_for_loops() {
        let mut anim = Animator::new(COIN_ROTATE);
        let frames: Vec<u16> = (0..5)
            .map(|_| {
                let f = anim.frame();
                anim.advance(1.0 / 6.0 + 1e-4);
                f
            })
            .collect();
        assert_eq!(frames, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_replay_bumps_playback() {
        let mut anim = Animator::new(SPIDER_DIE);
        let first = anim.playback();
        anim.play(SPIDER_DIE);
        assert_ne!(anim.playback(), first);
    }
}
