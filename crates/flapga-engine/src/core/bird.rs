use serde::{Deserialize, Serialize};

use super::Rect;

/// The single decision a bird makes each tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Action {
    #[default]
    Nothing,
    Jump,
}

/// Vertical kinematics constants shared by every bird in a world.
///
/// All velocities are in pixels per tick, accelerations in pixels per tick².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdPhysics {
    /// Fixed horizontal position of every bird's left edge.
    pub x: f64,
    pub width: f64,
    pub height: f64,
    /// Added to the velocity each tick the bird does not flap.
    pub gravity: f64,
    /// Velocity set by a flap (negative is upward).
    pub flap_velocity: f64,
    /// Velocity a freshly spawned bird starts with.
    pub initial_velocity: f64,
    /// Terminal fall speed; gravity never pushes the velocity beyond it.
    pub max_fall_speed: f64,
}

impl Default for BirdPhysics {
    fn default() -> Self {
        Self {
            x: 57.0,
            width: 34.0,
            height: 24.0,
            gravity: 1.0,
            flap_velocity: -9.0,
            initial_velocity: -9.0,
            max_fall_speed: 10.0,
        }
    }
}

/// One agent's body in the playfield.
///
/// Birds never move horizontally; obstacles scroll past them instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    rect: Rect,
    velocity: f64,
    physics: BirdPhysics,
}

impl Bird {
    /// Creates a bird vertically centered above the floor line.
    #[must_use]
    pub fn new(physics: BirdPhysics, floor_y: f64) -> Self {
        let y = (floor_y - physics.height) / 2.0;
        Self::at(physics, y)
    }

    /// Creates a bird with its top edge at `y`.
    #[must_use]
    pub fn at(physics: BirdPhysics, y: f64) -> Self {
        Self {
            rect: Rect::new(physics.x, y, physics.width, physics.height),
            velocity: physics.initial_velocity,
            physics,
        }
    }

    #[must_use]
    pub const fn rect(&self) -> &Rect {
        &self.rect
    }

    #[must_use]
    pub const fn y(&self) -> f64 {
        self.rect.y
    }

    #[must_use]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Advances the bird by one tick.
    ///
    /// A jump replaces the current velocity with the flap velocity; otherwise
    /// gravity accumulates up to the terminal fall speed. The position is then
    /// moved by the resulting velocity.
    pub fn step(&mut self, action: Action) {
        match action {
            Action::Jump => self.velocity = self.physics.flap_velocity,
            Action::Nothing => {
                if self.velocity < self.physics.max_fall_speed {
                    self.velocity =
                        (self.velocity + self.physics.gravity).min(self.physics.max_fall_speed);
                }
            }
        }
        self.rect.y += self.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> BirdPhysics {
        BirdPhysics::default()
    }

    #[test]
    fn test_spawn_is_centered_above_floor() {
        let bird = Bird::new(physics(), 400.0);
        assert_eq!(bird.y(), (400.0 - 24.0) / 2.0);
        assert_eq!(bird.velocity(), -9.0);
        assert_eq!(bird.rect().x, 57.0);
    }

    #[test]
    fn test_gravity_accumulates_until_terminal_speed() {
        let mut bird = Bird::at(physics(), 100.0);
        let mut last_y = bird.y();
        let mut velocities = vec![];
        for _ in 0..30 {
            bird.step(Action::Nothing);
            velocities.push(bird.velocity());
            assert_eq!(bird.y(), last_y + bird.velocity());
            last_y = bird.y();
        }
        assert_eq!(velocities[0], -8.0);
        assert_eq!(velocities[1], -7.0);
        assert!(velocities.iter().all(|v| *v <= 10.0));
        assert_eq!(*velocities.last().unwrap(), 10.0);
    }

    #[test]
    fn test_jump_overrides_gravity() {
        let mut bird = Bird::at(physics(), 200.0);
        for _ in 0..20 {
            bird.step(Action::Nothing);
        }
        assert_eq!(bird.velocity(), 10.0);

        let before = bird.y();
        bird.step(Action::Jump);
        assert_eq!(bird.velocity(), -9.0);
        assert_eq!(bird.y(), before - 9.0);
    }
}
