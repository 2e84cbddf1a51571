//! Plain value types shared by the simulation.
//!
//! - [`Rect`] - Axis-aligned bounding box used for every collision test
//! - [`Bird`] - One agent's body: vertical kinematics under gravity and flap impulses
//! - [`ObstaclePair`] - Upper and lower obstacles sharing an x-coordinate and velocity

pub use self::{bird::*, obstacle::*, rect::*};

mod bird;
mod obstacle;
mod rect;
