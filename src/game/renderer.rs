//! Play Renderer
//!
//! Draws a `PlayState` with macroquad primitives: one flat-coloured
//! rectangle per sprite, then overlays and the HUD. The playfield is
//! letterboxed into the window at a uniform scale.

use macroquad::prelude::*;
use super::runtime::PlayState;
use super::world::{Kind, Sprite};

/// Back-to-front draw order.
const LAYERS: [Kind; 11] = [
    Kind::Decoration,
    Kind::Water,
    Kind::Platform,
    Kind::EnemyWall,
    Kind::PullDoor,
    Kind::Switch,
    Kind::Door,
    Kind::Coin,
    Kind::Key,
    Kind::Spider,
    Kind::Hero,
];

const TEXT_COLOR: Color = Color::new(0.1, 0.1, 0.12, 1.0);
const BOX_COLOR: Color = Color::new(0.96, 0.93, 0.84, 0.92);

/// Maps playfield units to screen pixels.
#[derive(Debug, Clone, Copy)]
struct View {
    scale: f32,
    offset: Vec2,
}

impl View {
    fn fit(world: Vec2) -> Self {
        let scale = (screen_width() / world.x).min(screen_height() / world.y).max(0.01);
        let offset = vec2(
            (screen_width() - world.x * scale) * 0.5,
            (screen_height() - world.y * scale) * 0.5,
        );
        Self { scale, offset }
    }

    fn rect(&self, r: Rect) -> Rect {
        Rect::new(
            self.offset.x + r.x * self.scale,
            self.offset.y + r.y * self.scale,
            r.w * self.scale,
            r.h * self.scale,
        )
    }

    fn point(&self, x: f32, y: f32) -> Vec2 {
        self.offset + vec2(x, y) * self.scale
    }
}

fn sprite_color(kind: Kind, sprite: &Sprite) -> Color {
    let base = match kind {
        Kind::Hero => Color::from_rgba(235, 120, 60, 255),
        Kind::Spider if sprite.image == "dozer" => Color::from_rgba(120, 70, 150, 255),
        Kind::Spider => Color::from_rgba(60, 60, 70, 255),
        Kind::Platform if sprite.image == "ground" => Color::from_rgba(110, 80, 50, 255),
        Kind::Platform => Color::from_rgba(90, 170, 70, 255),
        Kind::EnemyWall => Color::from_rgba(255, 0, 255, 255),
        Kind::Decoration => {
            let shade = 150 + (sprite.frame % 5) as u8 * 15;
            Color::from_rgba(shade, shade, 120, 160)
        }
        Kind::Coin => Color::from_rgba(250, 210, 40, 255),
        Kind::Key => Color::from_rgba(230, 190, 20, 255),
        Kind::Door if sprite.frame == 1 => Color::from_rgba(30, 20, 15, 255),
        Kind::Door => Color::from_rgba(150, 90, 40, 255),
        Kind::PullDoor => Color::from_rgba(160, 120, 80, 255),
        Kind::Switch if sprite.frame == 1 => Color::from_rgba(90, 200, 90, 255),
        Kind::Switch => Color::from_rgba(200, 60, 60, 255),
        Kind::Water => Color::from_rgba(50, 110, 220, 200),
    };
    Color { a: base.a * sprite.opacity.clamp(0.0, 1.0), ..base }
}

/// Draw the whole frame.
pub fn draw_play_state(state: &PlayState) {
    clear_background(Color::from_rgba(20, 22, 28, 255));

    let world_size = state.config.world_size.vec2();
    let view = View::fit(world_size);
    let field = view.rect(Rect::new(0.0, 0.0, world_size.x, world_size.y));
    draw_rectangle(field.x, field.y, field.w, field.h, Color::from_rgba(190, 215, 235, 255));

    draw_entities(state, &view);
    draw_overlays(state, &view, field);
    draw_hud(state, &view);
}

fn draw_entities(state: &PlayState, view: &View) {
    let world = &state.world;
    for kind in LAYERS {
        for entity in world.entities_of(kind) {
            let (Some(body), Some(sprite)) = (world.bodies.get(entity), world.sprites.get(entity)) else {
                continue;
            };
            if !sprite.visible {
                continue;
            }
            let r = view.rect(body.rect());
            let color = sprite_color(kind, sprite);
            draw_rectangle(r.x, r.y, r.w, r.h, color);

            // Facing marker for the characters
            if matches!(kind, Kind::Hero | Kind::Spider) {
                let eye_x = if sprite.facing < 0 { r.x + r.w * 0.2 } else { r.x + r.w * 0.8 };
                draw_circle(eye_x, r.y + r.h * 0.3, r.w * 0.1, Color { a: color.a, ..WHITE });
            }
        }
    }
}

/// Centered text box over the playfield.
fn text_box(view: &View, y: f32, lines: &[&str], size: f32) {
    let font_size = size * view.scale;
    let widest = lines
        .iter()
        .map(|l| measure_text(l, None, font_size as u16, 1.0).width)
        .fold(0.0, f32::max);
    let line_h = font_size * 1.3;
    let pad = 12.0 * view.scale;
    let center = view.point(480.0, y);
    let w = widest + pad * 2.0;
    let h = line_h * lines.len() as f32 + pad;

    draw_rectangle(center.x - w * 0.5, center.y, w, h, BOX_COLOR);
    for (i, line) in lines.iter().enumerate() {
        let dims = measure_text(line, None, font_size as u16, 1.0);
        let baseline = center.y + pad * 0.5 + line_h * (i as f32 + 0.8);
        draw_text(line, center.x - dims.width * 0.5, baseline, font_size, TEXT_COLOR);
    }
}

fn draw_overlays(state: &PlayState, view: &View, field: Rect) {
    let overlays = &state.overlays;

    if let Some(level) = overlays.intro() {
        let title = format!("Level {}", level + 1);
        text_box(view, 40.0, &[title.as_str(), "Find the key, then the door"], 22.0);
    }
    if overlays.locked_hint_visible() {
        text_box(view, 520.0, &["The door's locked...", "Where is that key?"], 16.0);
    }
    if overlays.drowned() {
        text_box(view, 100.0, &["Glub glub...", "You can't swim!"], 28.0);
    }
    if overlays.game_over() {
        text_box(view, 240.0, &["GAME OVER", "Press any key to play again"], 26.0);
    } else if state.start_menu_visible() {
        draw_rectangle(field.x, field.y, field.w, field.h, Color::new(0.0, 0.0, 0.0, 0.45));
        text_box(view, 220.0, &["HAILEY", "Arrows to move and jump, Space to pull", "Press any key to start"], 24.0);
    }

    // Camera: fade-in flash on load, fade-out before the next level
    let black = overlays.flash_alpha().max(overlays.fade_alpha());
    if black > 0.0 {
        draw_rectangle(field.x, field.y, field.w, field.h, Color::new(0.0, 0.0, 0.0, black));
    }
}

fn draw_hud(state: &PlayState, view: &View) {
    let hud = &state.hud;
    let size = 24.0 * view.scale;
    let icon = 18.0 * view.scale;

    let key_pos = view.point(14.0, 14.0);
    let key_color = if hud.key_frame == 1 {
        Color::from_rgba(230, 190, 20, 255)
    } else {
        Color::from_rgba(90, 90, 90, 160)
    };
    draw_rectangle(key_pos.x, key_pos.y, icon, icon, key_color);

    let coin_pos = view.point(54.0, 14.0);
    draw_circle(coin_pos.x + icon * 0.5, coin_pos.y + icon * 0.5, icon * 0.5, Color::from_rgba(250, 210, 40, 255));
    draw_text(&hud.coins_text, coin_pos.x + icon * 1.3, coin_pos.y + icon, size, TEXT_COLOR);

    let lives_pos = view.point(150.0, 14.0);
    draw_rectangle(lives_pos.x, lives_pos.y, icon * 0.7, icon, Color::from_rgba(235, 120, 60, 255));
    draw_text(&hud.lives_text, lives_pos.x + icon, lives_pos.y + icon, size, TEXT_COLOR);
}
