//! Input handling
//!
//! Action-based keyboard input. The game loop never polls devices itself;
//! it consumes a `FrameInput` snapshot built here once per frame.

mod actions;
mod state;

pub use actions::*;
pub use state::*;
