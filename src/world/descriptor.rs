//! Level descriptor data model
//!
//! Field names are camelCase on disk in every format, so files written for
//! the legacy JSON levels load unchanged. Every field except the pull-door pair
//! and the water hazard is required.

use serde::{Deserialize, Serialize};

/// A position on the 960x600 playfield. What the point anchors (centre,
/// bottom-centre, top-left) depends on the entity it places.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformDesc {
    pub x: f32,
    pub y: f32,
    /// Visual tag: `ground`, `grass:WxH` (in tiles) or a configured name
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationDesc {
    pub x: f32,
    pub y: f32,
    pub frame: u16,
}

/// Everything needed to build one level. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    pub hero: Point,
    pub spiders: Vec<Point>,
    pub platforms: Vec<PlatformDesc>,
    pub decoration: Vec<DecorationDesc>,
    pub coins: Vec<Point>,
    pub key: Point,
    pub door: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_boxes: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_switch: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<Point>,
}

impl LevelDescriptor {
    /// The pull-door and its switch, when the level has them.
    pub fn pull_door(&self) -> Option<(Point, Point)> {
        self.door_boxes.zip(self.door_switch)
    }

    /// Every point in the descriptor, for bulk checks.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let singles = [Some(self.hero), Some(self.key), Some(self.door), self.door_boxes, self.door_switch, self.water];
        singles
            .into_iter()
            .flatten()
            .chain(self.spiders.iter().copied())
            .chain(self.coins.iter().copied())
            .chain(self.platforms.iter().map(|p| Point::new(p.x, p.y)))
            .chain(self.decoration.iter().map(|d| Point::new(d.x, d.y)))
    }
}
