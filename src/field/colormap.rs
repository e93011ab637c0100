use std::f64::consts::PI;
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::errors::FieldError;
use crate::field::grid_builder::finite_bounds;

/// 8-bit color with an opacity in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl RgbaColor {
    pub const TRANSPARENT: RgbaColor = RgbaColor {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        RgbaColor { r, g, b, alpha: 1.0 }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        RgbaColor {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// "#rrggbb" without the opacity
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Named palettes a scalar in [0, 1] is mapped through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Colormap {
    Rainbow,
    #[default]
    Viridis,
    Plasma,
    Magma,
    Turbo,
    Coolwarm,
    Cividis,
}

const VIRIDIS: [(u8, u8, u8); 5] = [
    (0x44, 0x01, 0x54),
    (0x3b, 0x52, 0x8b),
    (0x21, 0x91, 0x8c),
    (0x5e, 0xc9, 0x62),
    (0xfd, 0xe7, 0x25),
];
const PLASMA: [(u8, u8, u8); 5] = [
    (0x0d, 0x08, 0x87),
    (0x7e, 0x03, 0xa8),
    (0xcc, 0x47, 0x78),
    (0xf8, 0x95, 0x40),
    (0xf0, 0xf9, 0x21),
];
const MAGMA: [(u8, u8, u8); 5] = [
    (0x00, 0x00, 0x04),
    (0x51, 0x12, 0x7c),
    (0xb7, 0x37, 0x79),
    (0xfc, 0x89, 0x61),
    (0xfc, 0xfd, 0xbf),
];
const CIVIDIS: [(u8, u8, u8); 5] = [
    (0x00, 0x22, 0x4e),
    (0x41, 0x4d, 0x6b),
    (0x7c, 0x7b, 0x78),
    (0xbc, 0xaf, 0x6f),
    (0xfe, 0xe8, 0x38),
];
const TURBO: [(u8, u8, u8); 8] = [
    (0x30, 0x12, 0x3b),
    (0x45, 0x66, 0xd6),
    (0x36, 0xac, 0xf8),
    (0x1a, 0xe4, 0xb6),
    (0x72, 0xfe, 0x5e),
    (0xc7, 0xef, 0x34),
    (0xfa, 0xba, 0x39),
    (0x7a, 0x04, 0x03),
];
const COOLWARM: [(u8, u8, u8); 3] = [(59, 76, 192), (221, 221, 221), (180, 4, 38)];

/// piecewise linear interpolation between equally spaced stops
fn interpolate(stops: &[(u8, u8, u8)], t: f64) -> RgbaColor {
    let last = stops.len() - 1;
    let position = t * last as f64;
    let index = (position.floor() as usize).min(last.saturating_sub(1));
    let local = position - index as f64;
    let (r0, g0, b0) = stops[index];
    let (r1, g1, b1) = stops[(index + 1).min(last)];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * local).round() as u8;
    RgbaColor::rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Colormap {
    /// Parses a palette name, case-insensitive.
    pub fn from_name(name: &str) -> Result<Self, FieldError> {
        let key = name.trim().to_lowercase();
        Colormap::iter()
            .find(|map| map.to_string() == key)
            .ok_or_else(|| {
                let known: Vec<String> = Colormap::iter().map(|m| m.to_string()).collect();
                FieldError::Configuration(format!(
                    "Unknown colormap '{}', expected one of {}",
                    name,
                    known.join(", ")
                ))
            })
    }

    /// Color of the normalized value `t`; values outside [0, 1] are clipped and `NaN`
    /// gives a fully transparent color.
    pub fn color_at(&self, t: f64) -> RgbaColor {
        if t.is_nan() {
            return RgbaColor::TRANSPARENT;
        }
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Rainbow => RgbaColor::rgb(
                channel((2.0 * t - 0.5).abs()),
                channel((PI * t).sin()),
                channel((PI * t / 2.0).cos()),
            ),
            Colormap::Viridis => interpolate(&VIRIDIS, t),
            Colormap::Plasma => interpolate(&PLASMA, t),
            Colormap::Magma => interpolate(&MAGMA, t),
            Colormap::Turbo => interpolate(&TURBO, t),
            Colormap::Coolwarm => interpolate(&COOLWARM, t),
            Colormap::Cividis => interpolate(&CIVIDIS, t),
        }
    }

    /// `n` colors evenly spaced over the palette
    pub fn sample(&self, n: usize) -> Vec<RgbaColor> {
        match n {
            0 => Vec::new(),
            1 => vec![self.color_at(0.0)],
            _ => (0..n)
                .map(|i| self.color_at(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

impl FromStr for Colormap {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colormap::from_name(s)
    }
}

/// Linear mapping of [vmin, vmax] onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorNorm {
    pub vmin: f64,
    pub vmax: f64,
    pub clip: bool,
}

impl ColorNorm {
    pub fn new(vmin: f64, vmax: f64, clip: bool) -> Self {
        ColorNorm { vmin, vmax, clip }
    }

    /// Clipping norm over the finite values, `None` if no value is finite.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        finite_bounds(values).map(|(vmin, vmax)| ColorNorm::new(vmin, vmax, true))
    }

    /// `NaN` stays `NaN`; a collapsed range maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        if self.vmax == self.vmin {
            return 0.0;
        }
        let t = (value - self.vmin) / (self.vmax - self.vmin);
        if self.clip { t.clamp(0.0, 1.0) } else { t }
    }

    /// inverse of [`ColorNorm::normalize`] for unclipped values
    pub fn value_at(&self, t: f64) -> f64 {
        self.vmin + t * (self.vmax - self.vmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_names() {
        let names: Vec<String> = Colormap::iter().map(|m| m.to_string()).collect();
        assert_eq!(
            names,
            vec!["rainbow", "viridis", "plasma", "magma", "turbo", "coolwarm", "cividis"]
        );
        assert_eq!(Colormap::from_name("Viridis"), Ok(Colormap::Viridis));
        assert_eq!("coolwarm".parse::<Colormap>(), Ok(Colormap::Coolwarm));
        assert!(matches!(
            Colormap::from_name("jet"),
            Err(FieldError::Configuration(_))
        ));
    }

    #[test]
    fn test_endpoints_match_stops() {
        assert_eq!(Colormap::Viridis.color_at(0.0).to_hex(), "#440154");
        assert_eq!(Colormap::Viridis.color_at(1.0).to_hex(), "#fde725");
        assert_eq!(Colormap::Magma.color_at(1.0).to_hex(), "#fcfdbf");
        assert_eq!(Colormap::Coolwarm.color_at(0.5), RgbaColor::rgb(221, 221, 221));
    }

    #[test]
    fn test_out_of_range_is_clipped_and_nan_transparent() {
        let map = Colormap::Plasma;
        assert_eq!(map.color_at(-3.0), map.color_at(0.0));
        assert_eq!(map.color_at(7.0), map.color_at(1.0));
        assert_eq!(map.color_at(f64::NAN).alpha, 0.0);
    }

    #[test]
    fn test_rainbow_formula() {
        let c = Colormap::Rainbow.color_at(0.0);
        assert_eq!((c.r, c.g, c.b), (128, 0, 255));
        let c = Colormap::Rainbow.color_at(1.0);
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
    }

    #[test]
    fn test_sample_count() {
        let colors = Colormap::Turbo.sample(10);
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[0], Colormap::Turbo.color_at(0.0));
        assert_eq!(colors[9], Colormap::Turbo.color_at(1.0));
    }

    #[test]
    fn test_norm_from_values() {
        let values = [f64::NAN, -2.0, 0.0, 6.0];
        let norm = ColorNorm::from_values(values.iter()).unwrap();
        assert_eq!((norm.vmin, norm.vmax), (-2.0, 6.0));
        assert_relative_eq!(norm.normalize(2.0), 0.5);
        assert_relative_eq!(norm.normalize(100.0), 1.0);
        assert!(norm.normalize(f64::NAN).is_nan());
        assert_relative_eq!(norm.value_at(0.25), 0.0);
        assert!(ColorNorm::from_values([f64::NAN].iter()).is_none());
    }

    #[test]
    fn test_constant_field_norm() {
        let norm = ColorNorm::from_values([3.0, 3.0].iter()).unwrap();
        assert_eq!(norm.normalize(3.0), 0.0);
    }
}
