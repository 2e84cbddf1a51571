use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ObstacleId, ObstaclePair, WorldConfig};

/// Seed for deterministic obstacle generation.
///
/// A 128-bit seed for the random number generator that places obstacle gaps.
/// Two worlds built from the same seed and configuration produce identical
/// obstacle streams, which makes every generation of a training run
/// reproducible.
///
/// Serialized as a 32-character hexadecimal string.
///
/// # Example
///
/// ```
/// use flapga_engine::{World, WorldConfig, WorldSeed};
/// use rand::Rng as _;
///
/// let seed: WorldSeed = rand::rng().random();
/// let mut a = World::with_seed(WorldConfig::default(), seed);
/// let mut b = World::with_seed(WorldConfig::default(), seed);
/// for _ in 0..200 {
///     a.tick();
///     b.tick();
/// }
/// assert!(a.pairs().eq(b.pairs()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSeed([u8; 16]);

impl WorldSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Serialize for WorldSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for WorldSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<WorldSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> WorldSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        WorldSeed(seed)
    }
}

/// Decides when obstacle pairs spawn and where their gaps are.
///
/// Every spawn makes the game harder: later pairs move faster and appear more
/// often, until the configured caps are reached.
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    rng: Pcg32,
    next_id: ObstacleId,
    velocity: f64,
    spawn_interval_ms: f64,
    last_spawn_tick: Option<u64>,
}

impl ObstacleSpawner {
    #[must_use]
    pub fn new(config: &WorldConfig, seed: WorldSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            next_id: ObstacleId::default(),
            velocity: config.obstacles.initial_velocity,
            spawn_interval_ms: config.obstacles.initial_spawn_interval_ms,
            last_spawn_tick: None,
        }
    }

    /// Velocity the next pair will be spawned with.
    #[must_use]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Interval that must elapse after the last spawn before the next one.
    #[must_use]
    pub const fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    /// Returns `true` if a pair must spawn on `tick`.
    ///
    /// The first pair spawns immediately.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn is_due(&self, tick: u64, config: &WorldConfig) -> bool {
        match self.last_spawn_tick {
            None => true,
            Some(last) => {
                let elapsed_ms = (tick - last) as f64 * config.ms_per_tick();
                elapsed_ms > self.spawn_interval_ms
            }
        }
    }

    /// Spawns a pair at the right edge and ramps up the difficulty.
    pub fn spawn(&mut self, tick: u64, config: &WorldConfig) -> ObstaclePair {
        let (offset, span) = config.gap_band();
        let gap_top = f64::from(offset + self.rng.random_range(0..span));
        let obstacles = &config.obstacles;
        let pair = ObstaclePair::new(
            self.next_id,
            config.spawn_x(),
            gap_top,
            obstacles.gap,
            obstacles.width,
            obstacles.height,
            self.velocity,
        );

        self.next_id = self.next_id.next();
        self.last_spawn_tick = Some(tick);
        // max because velocities are negative
        self.velocity = f64::max(
            obstacles.max_velocity,
            self.velocity + obstacles.velocity_acceleration,
        );
        self.spawn_interval_ms = f64::max(
            obstacles.min_spawn_interval_ms,
            self.spawn_interval_ms + obstacles.spawn_interval_acceleration_ms,
        );

        pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> WorldSeed {
        WorldSeed::from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ])
    }

    #[test]
    fn test_seed_roundtrip_as_hex() {
        let serialized = serde_json::to_string(&seed()).unwrap();
        assert_eq!(serialized, "\"123456789abcdef01122334455667788\"");
        let deserialized: WorldSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed());
    }

    #[test]
    fn test_seed_rejects_bad_hex() {
        let too_short: Result<WorldSeed, _> = serde_json::from_str("\"abc\"");
        assert!(too_short.unwrap_err().to_string().contains("invalid hex"));
        let not_hex: Result<WorldSeed, _> =
            serde_json::from_str("\"ghijklmnopqrstuvwxyzghijklmnopqr\"");
        assert!(not_hex.unwrap_err().to_string().contains("invalid hex"));
    }

    #[test]
    fn test_first_spawn_is_immediate() {
        let config = WorldConfig::default();
        let spawner = ObstacleSpawner::new(&config, seed());
        assert!(spawner.is_due(0, &config));
    }

    #[test]
    fn test_spawn_interval_in_ticks() {
        let config = WorldConfig::default();
        let mut spawner = ObstacleSpawner::new(&config, seed());
        spawner.spawn(0, &config);
        // 1440 ms at 30 ticks/s: 43 ticks = 1433.3 ms, 44 ticks = 1466.7 ms
        assert!(!spawner.is_due(43, &config));
        assert!(spawner.is_due(44, &config));
    }

    #[test]
    fn test_difficulty_ramps_up_to_caps() {
        let config = WorldConfig::default();
        let mut spawner = ObstacleSpawner::new(&config, seed());
        let mut velocities = vec![];
        for tick in 0..100 {
            velocities.push(spawner.spawn(tick, &config).velocity());
        }
        assert_eq!(velocities[0], -5.0);
        assert!((velocities[1] - -5.2).abs() < 1e-9);
        assert!(velocities.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*velocities.last().unwrap(), -10.0);
        assert_eq!(spawner.spawn_interval_ms(), 700.0);
    }

    #[test]
    fn test_gaps_stay_in_band() {
        let config = WorldConfig::default();
        let (offset, span) = config.gap_band();
        let mut spawner = ObstacleSpawner::new(&config, seed());
        for tick in 0..500 {
            let pair = spawner.spawn(tick, &config);
            assert!(pair.gap_top() >= f64::from(offset));
            assert!(pair.gap_top() < f64::from(offset + span));
            assert!(pair.gap_bottom() < config.floor_y);
            assert_eq!(pair.x(), config.spawn_x());
        }
    }

    #[test]
    fn test_ids_increase() {
        let config = WorldConfig::default();
        let mut spawner = ObstacleSpawner::new(&config, seed());
        let a = spawner.spawn(0, &config).id();
        let b = spawner.spawn(1, &config).id();
        assert_eq!(b, a.next());
    }
}
