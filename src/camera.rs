use assert2::assert;
use bon::bon;
use itertools::iproduct;

use crate::{
    geometry::{FloatType, Lanes, Rays, ScreenSize, WorldPoint, WorldVector},
    scene::Scene,
    screen_block::ScreenBlock,
};

/// Pinhole camera looking through an image plane at z = 0.
///
/// The visible window of the image plane is 2 units wide, its height follows the aspect ratio,
/// and it is shifted up by a quarter unit.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    eye: WorldPoint,
    resolution: ScreenSize,

    /// Image plane coordinates of the top left pixel center
    top_left: WorldPoint,
    /// Image plane coordinates of the bottom right pixel center
    bottom_right: WorldPoint,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(eye: WorldPoint, resolution: ScreenSize) -> Self {
        let aspect = resolution.x as FloatType / resolution.y as FloatType;

        Camera {
            eye,
            resolution,
            top_left: WorldPoint::new(-1.0, 1.0 / aspect + 0.25, 0.0),
            bottom_right: WorldPoint::new(1.0, -1.0 / aspect + 0.25, 0.0),
        }
    }
}

impl Camera {
    /// Camera at the scene's eye position.
    pub fn for_scene(scene: &Scene, resolution: ScreenSize) -> Self {
        Camera::builder()
            .eye(scene.eye())
            .resolution(resolution)
            .build()
    }

    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn eye(&self) -> WorldPoint {
        self.eye
    }

    /// Point on the image plane that pixel (x, y) looks through.
    pub fn image_plane_point(&self, x: u32, y: u32) -> WorldPoint {
        WorldPoint::new(
            linspace(self.top_left.x, self.bottom_right.x, self.resolution.x, x),
            linspace(self.top_left.y, self.bottom_right.y, self.resolution.y, y),
            0.0,
        )
    }

    /// One ray per pixel of the block, row by row.
    pub fn primary_rays(&self, block: &ScreenBlock) -> Rays {
        assert!(block.width == self.resolution.x);
        assert!(block.max_y <= self.resolution.y);

        let directions: Lanes<WorldVector> = iproduct!(block.rows(), 0..block.width)
            .map(|(y, x)| self.image_plane_point(x, y) - self.eye)
            .collect();

        Rays::from_point(self.eye, directions.normalize())
    }
}

/// `index`-th of `count` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: FloatType, end: FloatType, count: u32, index: u32) -> FloatType {
    if count <= 1 {
        start
    } else {
        start + (end - start) * (index as FloatType / (count - 1) as FloatType)
    }
}
