use serde::{Deserialize, Serialize};

use crate::{BirdPhysics, WorldConfigError};

/// Every constant of the simulated playfield.
///
/// The defaults reproduce a 288×512 window running at 30 ticks per second whose
/// floor line sits at 79 % of the window height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the visible playfield.
    pub width: f64,
    /// Y-coordinate of the floor line; also the playable height.
    pub floor_y: f64,
    /// Logical tick rate used to convert spawn intervals into ticks.
    pub ticks_per_second: u32,
    pub bird: BirdPhysics,
    pub obstacles: ObstacleConfig,
    /// Observation reported while no obstacle pair lies ahead of a bird.
    pub no_obstacle: ObstacleSentinel,
}

impl Default for WorldConfig {
    fn default() -> Self {
        const WIDTH: f64 = 288.0;
        const FLOOR_Y: f64 = 512.0 * 0.79;
        Self {
            width: WIDTH,
            floor_y: FLOOR_Y,
            ticks_per_second: 30,
            bird: BirdPhysics::default(),
            obstacles: ObstacleConfig::default(),
            no_obstacle: ObstacleSentinel {
                lower_x: WIDTH,
                lower_y: FLOOR_Y,
                upper_x: WIDTH,
                upper_y: 0.0,
            },
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        if self.ticks_per_second == 0 {
            return Err(WorldConfigError::ZeroTickRate);
        }
        if self.width <= 0.0 || self.floor_y <= 0.0 {
            return Err(WorldConfigError::EmptyPlayfield {
                width: self.width,
                floor_y: self.floor_y,
            });
        }
        if self.gap_band().1 == 0 {
            return Err(WorldConfigError::EmptyGapBand {
                gap: self.obstacles.gap,
                floor_y: self.floor_y,
            });
        }
        if self.obstacles.min_spawn_interval_ms <= 0.0 {
            return Err(WorldConfigError::NonPositiveSpawnInterval {
                interval_ms: self.obstacles.min_spawn_interval_ms,
            });
        }
        // speeds only ramp up, so each pair is at least as fast as the first
        for (name, value, leftward) in [
            ("initial_velocity", self.obstacles.initial_velocity, self.obstacles.initial_velocity < 0.0),
            ("max_velocity", self.obstacles.max_velocity, self.obstacles.max_velocity < 0.0),
            (
                "velocity_acceleration",
                self.obstacles.velocity_acceleration,
                self.obstacles.velocity_acceleration <= 0.0,
            ),
        ] {
            if !leftward {
                return Err(WorldConfigError::NonLeftwardVelocity { name, value });
            }
        }
        Ok(())
    }

    /// Returns `(offset, span)`: the top of a gap is drawn from `offset + 0..span`.
    ///
    /// The band starts at 20 % of the playable height and is 60 % of it minus the
    /// gap, so every gap stays fully inside the playfield with a margin.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn gap_band(&self) -> (u32, u32) {
        let offset = (self.floor_y * 0.2).max(0.0) as u32;
        let span = (self.floor_y * 0.6 - self.obstacles.gap).max(0.0) as u32;
        (offset, span)
    }

    /// X-coordinate at which new obstacle pairs appear.
    #[must_use]
    pub fn spawn_x(&self) -> f64 {
        self.width + self.obstacles.spawn_margin
    }

    #[must_use]
    pub fn ms_per_tick(&self) -> f64 {
        1000.0 / f64::from(self.ticks_per_second)
    }
}

/// Obstacle geometry and the difficulty ramp applied on every spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub width: f64,
    pub height: f64,
    /// Vertical distance between the upper and the lower obstacle.
    pub gap: f64,
    /// Distance beyond the right edge of the playfield at which pairs spawn.
    pub spawn_margin: f64,
    /// Horizontal velocity of the first pair (negative moves left).
    pub initial_velocity: f64,
    /// Added to the velocity after every spawn.
    pub velocity_acceleration: f64,
    /// Velocity cap; velocities never become more negative than this.
    pub max_velocity: f64,
    pub initial_spawn_interval_ms: f64,
    /// Added to the spawn interval after every spawn.
    pub spawn_interval_acceleration_ms: f64,
    pub min_spawn_interval_ms: f64,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            width: 52.0,
            height: 320.0,
            gap: 120.0,
            spawn_margin: 10.0,
            initial_velocity: -5.0,
            velocity_acceleration: -0.2,
            max_velocity: -10.0,
            initial_spawn_interval_ms: 1500.0,
            spawn_interval_acceleration_ms: -60.0,
            min_spawn_interval_ms: 700.0,
        }
    }
}

/// Fallback obstacle coordinates used while nothing threatens a bird.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSentinel {
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_x: f64,
    pub upper_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawn_x(), 298.0);
    }

    #[test]
    fn test_gap_band_keeps_gap_inside_playfield() {
        let config = WorldConfig::default();
        let (offset, span) = config.gap_band();
        assert_eq!(offset, 80);
        assert_eq!(span, 122);
        let lowest_gap_bottom = f64::from(offset + span - 1) + config.obstacles.gap;
        assert!(lowest_gap_bottom < config.floor_y);
    }

    #[test]
    fn test_oversized_gap_is_rejected() {
        let mut config = WorldConfig::default();
        config.obstacles.gap = 400.0;
        assert!(matches!(
            config.validate(),
            Err(WorldConfigError::EmptyGapBand { .. })
        ));
    }

    #[test]
    fn test_stalled_or_rightward_obstacles_are_rejected() {
        let mut config = WorldConfig::default();
        config.obstacles.initial_velocity = 0.0;
        assert_eq!(
            config.validate(),
            Err(WorldConfigError::NonLeftwardVelocity {
                name: "initial_velocity",
                value: 0.0,
            })
        );

        let mut config = WorldConfig::default();
        config.obstacles.max_velocity = 3.0;
        assert!(matches!(
            config.validate(),
            Err(WorldConfigError::NonLeftwardVelocity {
                name: "max_velocity",
                ..
            })
        ));

        let mut config = WorldConfig::default();
        config.obstacles.velocity_acceleration = 0.5;
        assert!(matches!(
            config.validate(),
            Err(WorldConfigError::NonLeftwardVelocity {
                name: "velocity_acceleration",
                ..
            })
        ));

        let mut config = WorldConfig::default();
        config.obstacles.initial_velocity = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_tick_rate_is_rejected() {
        let config = WorldConfig {
            ticks_per_second: 0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(WorldConfigError::ZeroTickRate));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "obstacles": { "gap": 100.0 } }"#).unwrap();
        assert_eq!(config.obstacles.gap, 100.0);
        assert_eq!(config.obstacles.width, 52.0);
        assert_eq!(config.width, 288.0);
    }
}
