//! Genetic training of flappy policies against the simulated playfield.
//!
//! A population of [`PolicyNetwork`](flapga_policy::PolicyNetwork)s plays the
//! same obstacle stream side by side; the number of obstacle pairs each one
//! crosses is its fitness. The [`Trainer`] then breeds the next population and
//! repeats until a stop condition holds.
//!
//! # How Training Works
//!
//! ```text
//! INIT ──→ EVALUATE ──→ STOP? ──yes──→ TERMINATE (save best-ever)
//!              ↑           │ no
//!              │           ↓
//!              └──── REPRODUCE (or hardstuck reset)
//! ```
//!
//! 1. **INIT** - Random networks, or mutated copies of a previously saved best
//! 2. **EVALUATE** - One [`Episode`]: every agent plays until it collides
//! 3. **STOP** - Generation limit, score target, time budget or a quit request
//! 4. **REPRODUCE** - Roulette selection, uniform crossover, Gaussian mutation and
//!    elitism ([`genetic`])
//!
//! The trainer is driven one tick at a time through
//! [`Trainer::advance_one_tick`], so a host can interleave rendering or pacing
//! between ticks. [`Trainer::start`] simply loops until termination.
//!
//! # Determinism
//!
//! All randomness flows from one seeded generator owned by the trainer: world
//! seeds, parent draws, crossover masks and mutation noise. Two trainers built
//! from the same [`TrainingConfig`] (with `seed` set) produce identical runs.

pub use self::{
    agent::*, config::*, evaluator::*, observer::*, stats::*, store::*, trainer::*,
};

mod agent;
mod config;
mod evaluator;
pub mod genetic;
mod observer;
mod stats;
mod store;
mod trainer;
