//! HAILEY: a single-screen key-and-door platformer
//!
//! The gameplay core is host-agnostic: `game::PlayState` advances one tick
//! per frame from a `input::FrameInput` snapshot, and everything the
//! player sees or hears is read back out of it. The binary in `main.rs`
//! is a thin macroquad host around it.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod game;
pub mod input;
pub mod world;
