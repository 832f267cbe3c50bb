use super::{FloatType, Lanes, Mask, WorldPoint, WorldVector};

/// Batch of rays, one per lane.
#[derive(Clone, Debug, Default)]
pub struct Rays {
    pub origin: Lanes<WorldPoint>,
    /// Normalized direction of the ray. Not checked.
    pub direction: Lanes<WorldVector>,
}

impl Rays {
    pub fn new(origin: Lanes<WorldPoint>, direction: Lanes<WorldVector>) -> Rays {
        assert!(
            origin.len() == direction.len(),
            "ray origins and directions must have the same width"
        );
        Rays { origin, direction }
    }

    /// Rays sharing a single origin.
    pub fn from_point(origin: WorldPoint, direction: Lanes<WorldVector>) -> Rays {
        Rays {
            origin: Lanes::splat(origin, direction.len()),
            direction,
        }
    }

    pub fn len(&self) -> usize {
        self.origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
    }

    pub fn extract(&self, mask: &Mask) -> Rays {
        Rays {
            origin: self.origin.extract(mask),
            direction: self.direction.extract(mask),
        }
    }

    pub fn point_at(&self, distance: &Lanes<FloatType>) -> Lanes<WorldPoint> {
        &self.origin + &(&self.direction * distance)
    }
}
