//! Colours for leaves and the autumn palette
//!
//! The autumn palette is a 100 pixel wide yellow to red strip rendered once
//! per process and sampled at random columns.

use std::sync::OnceLock;
use rand::Rng;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const DARK_GREEN: Color = Color::rgb(0, 128, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GRAY: Color = Color::rgb(178, 178, 178);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components in `[0, 1]` for upload to the GPU
    pub fn to_rgb_f32(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Two-stop linear gradient
#[derive(Debug, Clone, Copy)]
pub struct Gradient {
    pub start: Color,
    pub end: Color,
}

impl Gradient {
    pub const fn new(start: Color, end: Color) -> Self {
        Self { start, end }
    }

    pub fn color_at(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(
            mix(self.start.r, self.end.r),
            mix(self.start.g, self.end.g),
            mix(self.start.b, self.end.b),
        )
    }

    /// Rasterize into a strip of `width` pixels, sampling at pixel centres
    pub fn render(&self, width: usize) -> Vec<Color> {
        (0..width)
            .map(|x| self.color_at((x as f32 + 0.5) / width as f32))
            .collect()
    }
}

pub const AUTUMN_GRADIENT: Gradient = Gradient::new(Color::YELLOW, Color::RED);
pub const AUTUMN_STRIP_WIDTH: usize = 100;

fn autumn_strip() -> &'static [Color] {
    static STRIP: OnceLock<Vec<Color>> = OnceLock::new();
    STRIP.get_or_init(|| AUTUMN_GRADIENT.render(AUTUMN_STRIP_WIDTH))
}

/// Random colour from the cached yellow to red strip
pub fn autumn_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    let strip = autumn_strip();
    strip[rng.gen_range(0..strip.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Hue in degrees `[0, 360)`, 0 for greys
    fn hue(c: Color) -> f32 {
        let [r, g, b] = c.to_rgb_f32();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta <= 0.0 {
            return 0.0;
        }

        let h = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        h * 60.0
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(AUTUMN_GRADIENT.color_at(0.0), Color::YELLOW);
        assert_eq!(AUTUMN_GRADIENT.color_at(1.0), Color::RED);
        assert_eq!(AUTUMN_GRADIENT.color_at(-3.0), Color::YELLOW);
    }

    #[test]
    fn test_strip_is_monotonic_yellow_to_red() {
        let strip = AUTUMN_GRADIENT.render(AUTUMN_STRIP_WIDTH);
        assert_eq!(strip.len(), 100);
        assert!(strip.windows(2).all(|w| w[0].g >= w[1].g));
        assert!(strip[0].g > 250);
        assert!(strip[99].g < 5);
    }

    #[test]
    fn test_autumn_colors_stay_between_stops() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let c = autumn_color(&mut rng);
            assert_eq!(c.r, 255);
            assert_eq!(c.b, 0);
            let hue = hue(c);
            assert!((0.0..=60.0).contains(&hue), "hue {} outside red..yellow", hue);
        }
    }

    #[test]
    fn test_autumn_colors_vary() {
        let mut rng = StdRng::seed_from_u64(11);
        let first = autumn_color(&mut rng);
        assert!((0..50).any(|_| autumn_color(&mut rng) != first));
    }

    #[test]
    fn test_strip_is_cached() {
        assert!(std::ptr::eq(autumn_strip(), autumn_strip()));
    }

    #[test]
    fn test_hue() {
        assert_eq!(hue(Color::RED), 0.0);
        assert!((hue(Color::YELLOW) - 60.0).abs() < 1e-3);
        assert!((hue(Color::DARK_GREEN) - 120.0).abs() < 1e-3);
        assert_eq!(hue(Color::GRAY), 0.0);
    }

    #[test]
    fn test_to_rgb_f32() {
        assert_eq!(Color::RED.to_rgb_f32(), [1.0, 0.0, 0.0]);
        assert_eq!(Color::rgb(0, 0, 255).to_rgb_f32(), [0.0, 0.0, 1.0]);
    }
}
