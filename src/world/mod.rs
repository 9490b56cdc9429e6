//! World module - declarative level descriptors
//!
//! A level is a small data file: hero spawn, spider spawns, platforms,
//! decoration, coins, one key, one door, and optionally a pull-door with
//! its switch and a water hazard. This module owns the data model, the
//! on-disk formats (JSON, RON, brotli-compressed RON) and the ordered
//! catalog of levels. Turning a descriptor into live entities is the
//! game loader's job.

mod catalog;
mod descriptor;
mod level;

pub use catalog::*;
pub use descriptor::*;
pub use level::*;
