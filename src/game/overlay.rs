//! Screen overlays and camera effects
//!
//! Pure state: which text boxes are up and how far along the camera flash
//! and fade are. The renderer draws from this; gameplay only toggles it.

/// A running camera effect.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraEffect {
    elapsed: f32,
    duration: f32,
}

impl CameraEffect {
    fn new(duration_ms: f32) -> Self {
        Self { elapsed: 0.0, duration: (duration_ms / 1000.0).max(f32::EPSILON) }
    }

    fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overlays {
    /// Intro text for this level index, gone after the first walk input
    intro: Option<usize>,
    locked_hint: Option<u64>,
    hint_serial: u64,
    drowned: bool,
    game_over: bool,
    flash: Option<CameraEffect>,
    fade: Option<CameraEffect>,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh overlays for a newly loaded level: intro text and a flash.
    pub fn reset_for_level(&mut self, level: usize, flash_ms: f32) {
        let serial = self.hint_serial;
        *self = Self {
            intro: Some(level),
            hint_serial: serial,
            flash: Some(CameraEffect::new(flash_ms)),
            ..Self::default()
        };
    }

    pub fn intro(&self) -> Option<usize> {
        self.intro
    }

    pub fn dismiss_intro(&mut self) {
        self.intro = None;
    }

    /// Show the locked-door hint. Returns the serial to dismiss it with, or
    /// `None` if it is already up.
    pub fn show_locked_hint(&mut self) -> Option<u64> {
        if self.locked_hint.is_some() {
            return None;
        }
        self.hint_serial += 1;
        self.locked_hint = Some(self.hint_serial);
        Some(self.hint_serial)
    }

    /// Hide the hint if `serial` is the one currently shown.
    pub fn dismiss_locked_hint(&mut self, serial: u64) -> bool {
        if self.locked_hint == Some(serial) {
            self.locked_hint = None;
            true
        } else {
            false
        }
    }

    pub fn locked_hint_visible(&self) -> bool {
        self.locked_hint.is_some()
    }

    pub fn show_drowned(&mut self) {
        self.drowned = true;
    }

    pub fn drowned(&self) -> bool {
        self.drowned
    }

    pub fn set_game_over(&mut self, shown: bool) {
        self.game_over = shown;
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn start_fade(&mut self, duration_ms: f32) {
        self.fade = Some(CameraEffect::new(duration_ms));
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(flash) = &mut self.flash {
            flash.elapsed += dt;
            if flash.elapsed >= flash.duration {
                self.flash = None;
            }
        }
        if let Some(fade) = &mut self.fade {
            // Fade holds at black until the level is replaced
            fade.elapsed += dt;
        }
    }

    /// White overlay opacity for the level-start flash.
    pub fn flash_alpha(&self) -> f32 {
        self.flash.map(|f| 1.0 - f.progress()).unwrap_or(0.0)
    }

    /// Black overlay opacity for the exit fade.
    pub fn fade_alpha(&self) -> f32 {
        self.fade.map(|f| f.progress()).unwrap_or(0.0)
    }
}
