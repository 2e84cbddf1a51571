use std::collections::VecDeque;

use rand::Rng as _;

use crate::{Bird, ObstacleId, ObstaclePair, WorldConfig};

use super::{ObstacleSpawner, WorldSeed};

/// What a bird perceives of the world: its height and the next obstacle pair.
///
/// Coordinates are the top-left corners of the lower and upper obstacles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub bird_y: f64,
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_x: f64,
    pub upper_y: f64,
}

impl Observation {
    /// Returns the values in network input order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 5] {
        [
            self.bird_y,
            self.lower_x,
            self.lower_y,
            self.upper_x,
            self.upper_y,
        ]
    }
}

/// Shared playfield: the floor, the ceiling and the obstacle stream.
///
/// Birds are not stored here. The world only answers questions about them
/// (collision, crossing, observation), so any number of agents can be
/// evaluated against the same obstacle stream without affecting each other.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    spawner: ObstacleSpawner,
    pairs: VecDeque<ObstaclePair>,
    tick: u64,
}

impl World {
    /// Creates a world with a random seed.
    ///
    /// For a reproducible obstacle stream, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(config: WorldConfig, seed: WorldSeed) -> Self {
        let spawner = ObstacleSpawner::new(&config, seed);
        Self {
            config,
            spawner,
            pairs: VecDeque::new(),
            tick: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of ticks advanced since the world was created.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Obstacle pairs currently in play, ordered from left to right.
    pub fn pairs(&self) -> impl Iterator<Item = &ObstaclePair> + '_ {
        self.pairs.iter()
    }

    #[must_use]
    pub fn spawn_bird(&self) -> Bird {
        Bird::new(self.config.bird, self.config.floor_y)
    }

    /// Advances the obstacle stream by one tick.
    ///
    /// Spawns a pair if one is due, drops pairs that left the playfield and
    /// moves the remaining ones.
    pub fn tick(&mut self) {
        if self.spawner.is_due(self.tick, &self.config) {
            let pair = self.spawner.spawn(self.tick, &self.config);
            self.pairs.push_back(pair);
        }
        self.pairs.retain(|pair| !pair.is_off_screen());
        for pair in &mut self.pairs {
            pair.advance();
        }
        self.tick += 1;
    }

    /// Returns `true` if the bird hits an obstacle, the floor or the ceiling.
    #[must_use]
    pub fn collides(&self, bird: &Bird) -> bool {
        let rect = bird.rect();
        rect.top() <= 0.0
            || rect.bottom() >= self.config.floor_y
            || self.pairs.iter().any(|pair| pair.collides_with(rect))
    }

    /// Returns the nearest pair whose right edge has not yet passed the bird.
    #[must_use]
    pub fn next_threat(&self, bird: &Bird) -> Option<&ObstaclePair> {
        let left = bird.rect().left();
        self.pairs.iter().find(|pair| pair.right() >= left)
    }

    /// Returns the id of the first pair at or after `next` if the bird has just crossed it.
    ///
    /// Callers advance `next` past the returned id, so every pair is credited at
    /// most once per bird.
    #[must_use]
    pub fn crossed_pair(&self, bird: &Bird, next: ObstacleId) -> Option<ObstacleId> {
        self.pairs
            .iter()
            .find(|pair| pair.id() >= next)
            .filter(|pair| pair.is_crossed_by(bird.rect()))
            .map(ObstaclePair::id)
    }

    /// Builds the bird's view of the nearest threat.
    ///
    /// Falls back to the configured sentinel while no pair lies ahead.
    #[must_use]
    pub fn observe(&self, bird: &Bird) -> Observation {
        match self.next_threat(bird) {
            Some(pair) => Observation {
                bird_y: bird.y(),
                lower_x: pair.lower().x,
                lower_y: pair.lower().y,
                upper_x: pair.upper().x,
                upper_y: pair.upper().y,
            },
            None => {
                let sentinel = &self.config.no_obstacle;
                Observation {
                    bird_y: bird.y(),
                    lower_x: sentinel.lower_x,
                    lower_y: sentinel.lower_y,
                    upper_x: sentinel.upper_x,
                    upper_y: sentinel.upper_y,
                }
            }
        }
    }
}
