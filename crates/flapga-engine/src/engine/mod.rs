//! World state and the rules that advance it.
//!
//! - [`World`] - Obstacle stream, floor and ceiling; answers collision, crossing and
//!   observation queries for birds
//! - [`WorldConfig`] - Playfield geometry, physics constants and the difficulty ramp
//! - [`ObstacleSpawner`] - Spawn timing and gap placement
//! - [`WorldSeed`] - Seed for deterministic obstacle generation
//!
//! # Tick Order
//!
//! Each call to [`World::tick`]:
//!
//! 1. Spawns a new pair if the spawn interval has elapsed (the first pair spawns
//!    on the first tick)
//! 2. Removes pairs whose right edge has left the playfield
//! 3. Moves every remaining pair by its own velocity
//!
//! Birds are advanced by their owners after the world has ticked.

pub use self::{config::*, spawner::*, world::*};

mod config;
mod spawner;
mod world;
