use serde::{Deserialize, Serialize};

use super::Rect;

/// Identifier of an obstacle pair, unique and increasing within one world.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct ObstacleId(u64);

impl ObstacleId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the id assigned to the pair spawned after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// An upper and a lower obstacle separated by a vertical gap.
///
/// Both rectangles share the same x-coordinate and move together with the
/// velocity the pair was spawned with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePair {
    id: ObstacleId,
    upper: Rect,
    lower: Rect,
    velocity: f64,
}

impl ObstaclePair {
    /// Creates a pair whose gap spans `gap_top..gap_top + gap`.
    #[must_use]
    pub fn new(
        id: ObstacleId,
        x: f64,
        gap_top: f64,
        gap: f64,
        width: f64,
        height: f64,
        velocity: f64,
    ) -> Self {
        Self {
            id,
            upper: Rect::new(x, gap_top - height, width, height),
            lower: Rect::new(x, gap_top + gap, width, height),
            velocity,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    #[must_use]
    pub const fn upper(&self) -> &Rect {
        &self.upper
    }

    #[must_use]
    pub const fn lower(&self) -> &Rect {
        &self.lower
    }

    #[must_use]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub const fn x(&self) -> f64 {
        self.upper.x
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.upper.right()
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.upper.center_x()
    }

    #[must_use]
    pub fn gap_top(&self) -> f64 {
        self.upper.bottom()
    }

    #[must_use]
    pub const fn gap_bottom(&self) -> f64 {
        self.lower.y
    }

    /// Moves both obstacles by the pair's velocity.
    pub fn advance(&mut self) {
        self.upper.x += self.velocity;
        self.lower.x += self.velocity;
    }

    /// Returns `true` once the right edge has left the playfield to the left.
    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }

    #[must_use]
    pub fn collides_with(&self, rect: &Rect) -> bool {
        self.upper.intersects(rect) || self.lower.intersects(rect)
    }

    /// Returns `true` once the horizontal center of `rect` has reached the pair's center.
    #[must_use]
    pub fn is_crossed_by(&self, rect: &Rect) -> bool {
        rect.center_x() >= self.center_x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ObstaclePair {
        ObstaclePair::new(ObstacleId::new(0), 100.0, 150.0, 120.0, 52.0, 320.0, -5.0)
    }

    #[test]
    fn test_gap_geometry() {
        let pair = pair();
        assert_eq!(pair.upper().y, 150.0 - 320.0);
        assert_eq!(pair.gap_top(), 150.0);
        assert_eq!(pair.gap_bottom(), 270.0);
        assert_eq!(pair.upper().x, pair.lower().x);
    }

    #[test]
    fn test_advance_moves_both_rects() {
        let mut pair = pair();
        pair.advance();
        assert_eq!(pair.upper().x, 95.0);
        assert_eq!(pair.lower().x, 95.0);
    }

    #[test]
    fn test_off_screen_after_right_edge_passes_zero() {
        let mut pair = ObstaclePair::new(ObstacleId::new(0), -50.0, 150.0, 120.0, 52.0, 320.0, -1.0);
        assert!(!pair.is_off_screen());
        pair.advance();
        pair.advance();
        assert!(!pair.is_off_screen());
        pair.advance();
        assert!(pair.is_off_screen());
    }

    #[test]
    fn test_collision_inside_gap_is_free() {
        let pair = pair();
        let in_gap = Rect::new(110.0, 200.0, 34.0, 24.0);
        let hits_upper = Rect::new(110.0, 140.0, 34.0, 24.0);
        let hits_lower = Rect::new(110.0, 260.0, 34.0, 24.0);
        assert!(!pair.collides_with(&in_gap));
        assert!(pair.collides_with(&hits_upper));
        assert!(pair.collides_with(&hits_lower));
    }

    #[test]
    fn test_crossing_uses_centers() {
        let pair = pair();
        assert!(!pair.is_crossed_by(&Rect::new(100.0, 0.0, 34.0, 24.0)));
        assert!(pair.is_crossed_by(&Rect::new(109.0, 0.0, 34.0, 24.0)));
    }

    #[test]
    fn test_id_ordering() {
        let id = ObstacleId::new(3);
        assert!(id.next() > id);
        assert_eq!(id.to_string(), "#3");
    }
}
