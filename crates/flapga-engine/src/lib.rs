//! Deterministic side-scrolling avoidance game used as a fitness function.
//!
//! The engine models a playfield with a floor, a stream of paired upper/lower
//! obstacles scrolling from right to left, and any number of birds that fall under
//! gravity and flap upward on demand. Time advances in discrete ticks; nothing in
//! this crate looks at the wall clock, so a [`WorldSeed`] fully determines the
//! obstacle stream.
//!
//! - [`core`] - Value types: [`Rect`], [`Bird`], [`ObstaclePair`]
//! - [`engine`] - [`World`] state machine, [`WorldConfig`], [`ObstacleSpawner`]
//!
//! # Example
//!
//! ```
//! use flapga_engine::{Action, World, WorldConfig, WorldSeed};
//!
//! let mut world = World::with_seed(WorldConfig::default(), WorldSeed::from_bytes([7; 16]));
//! let mut bird = world.spawn_bird();
//!
//! while !world.collides(&bird) {
//!     world.tick();
//!     bird.step(Action::Nothing);
//! }
//! assert!(world.tick_count() > 0);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorldConfigError {
    #[display("ticks per second must be positive")]
    ZeroTickRate,
    #[display("playfield dimensions must be positive (width {width}, floor {floor_y})")]
    EmptyPlayfield { width: f64, floor_y: f64 },
    #[display("obstacle gap {gap} leaves no room for gap placement above floor {floor_y}")]
    EmptyGapBand { gap: f64, floor_y: f64 },
    #[display("minimum spawn interval {interval_ms} ms must be positive")]
    NonPositiveSpawnInterval { interval_ms: f64 },
    /// Obstacles would stall or drift right and never leave the playfield.
    #[display("obstacle {name} {value} must move obstacles leftwards")]
    NonLeftwardVelocity { name: &'static str, value: f64 },
}
