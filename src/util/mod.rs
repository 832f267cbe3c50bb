mod stats;

pub use stats::Stats;

use rgb::ComponentMap as _;

use crate::geometry::{Color, FloatType};

pub type Rgb = rgb::RGB<FloatType>;

/// Maps a 0-1 linear color to pixel type compatible with module image.
/// Out of range values are clamped, NaN becomes 0.
pub fn color_to_image(color: &Color) -> image::Rgb<u8> {
    let pixel = Rgb::new(color.x, color.y, color.z)
        .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    image::Rgb([pixel.r, pixel.g, pixel.b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    #[test_case(0.0 => 0 ; "black")]
    #[test_case(1.0 => 255 ; "white")]
    #[test_case(0.5 => 128 ; "rounds half up")]
    #[test_case(0.2 => 51 ; "exact")]
    #[test_case(-3.0 => 0 ; "negative")]
    #[test_case(2.05 => 255 ; "overexposed")]
    #[test_case(FloatType::NAN => 0 ; "nan")]
    fn channel_conversion(value: FloatType) -> u8 {
        color_to_image(&Color::repeat(value)).0[0]
    }

    #[test]
    fn channel_order() {
        let pixel = color_to_image(&Color::new(1.0, 0.0, 0.2));
        assert!(pixel.0 == [255, 0, 51]);
    }
}
