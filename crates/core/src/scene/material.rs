use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Colour from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Colour from hue, saturation and lightness. Hue wraps, the others clamp.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self { r: l, g: l, b: l };
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self {
            r: hue_to_rgb(q, p, h + 1.0 / 3.0),
            g: hue_to_rgb(q, p, h),
            b: hue_to_rgb(q, p, h - 1.0 / 3.0),
        }
    }

    pub fn set_hsl(&mut self, hue: f32, saturation: f32, lightness: f32) {
        *self = Self::from_hsl(hue, saturation, lightness);
    }

    /// Hue, saturation and lightness of this colour.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;

        if (max - min).abs() <= f32::EPSILON {
            return (0.0, 0.0, lightness);
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        (hue / 6.0, saturation, lightness)
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

/// Unlit surface description attached to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub opacity: f32,
    /// Screen-space size for point geometry.
    pub point_size: Option<f32>,
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            opacity: 1.0,
            point_size: None,
        }
    }

    pub fn wireframe(color: Color) -> Self {
        Self {
            wireframe: true,
            ..Self::basic(color)
        }
    }

    pub fn points(color: Color, size: f32) -> Self {
        Self {
            point_size: Some(size),
            ..Self::basic(color)
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::basic(Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4
    }

    #[test]
    fn primary_hues_at_full_saturation() {
        assert!(close(Color::from_hsl(0.0, 1.0, 0.5), Color::from_hex(0xff0000)));
        assert!(close(Color::from_hsl(1.0 / 3.0, 1.0, 0.5), Color::from_hex(0x00ff00)));
        assert!(close(Color::from_hsl(2.0 / 3.0, 1.0, 0.5), Color::from_hex(0x0000ff)));
        assert!(close(Color::from_hsl(1.0, 1.0, 0.5), Color::from_hex(0xff0000)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        let grey = Color::from_hsl(0.4, 0.0, 0.25);
        assert_eq!(grey, Color { r: 0.25, g: 0.25, b: 0.25 });
    }

    #[test]
    fn hsl_round_trips_through_rgb() {
        let color = Color::from_hsl(100.0 / 360.0, 1.0, 0.5);
        let (h, s, l) = color.to_hsl();
        assert!((h - 100.0 / 360.0).abs() < 1e-4);
        assert!((s - 1.0).abs() < 1e-4);
        assert!((l - 0.5).abs() < 1e-4);
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(Color::from_hex(0x12ab9f).to_hex(), 0x12ab9f);
        assert_eq!(Color::WHITE.to_hex(), 0xffffff);
    }
}
