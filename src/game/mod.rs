//! Game Foundation Module
//!
//! A lightweight ECS-inspired gameplay core for a single-screen
//! key-and-door platformer.
//!
//! Key concepts:
//! - Entity: Generational index for safe entity references
//! - Component: Plain data structs attached to entities
//! - World: Container for all entities and their components
//! - Event: Decoupled communication between systems
//! - Scheduler: Timers and completion continuations tagged with the
//!   session epoch they belong to
//!
//! Design philosophy:
//! - Simple over flexible (we know what game we're making)
//! - No runtime type registration (compile-time known components)
//! - Physics sits behind a trait; the gameplay code never integrates bodies

pub mod entity;
pub mod component;
pub mod world;
pub mod event;
pub mod physics;
pub mod animation;
pub mod tween;
pub mod behavior;
pub mod hero;
pub mod spider;
pub mod session;
pub mod schedule;
pub mod overlay;
pub mod collision;
pub mod loader;
pub mod runtime;
pub mod renderer;

// Re-export main types
pub use entity::Entity;
pub use world::{Kind, World};
pub use event::{Cue, Events, PickupKind};
pub use physics::{ArcadePhysics, Body, PhysicsWorld};
pub use session::{DeathOutcome, Session};
pub use schedule::{DuplicateCompletionError, Scheduler, StaleTimer};
pub use loader::{load_level, LevelHandles};
pub use runtime::{Hud, PlayState};
pub use renderer::draw_play_state;
