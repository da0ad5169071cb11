//! Named 256-entry color palettes indexed by encoded color values.
//!
//! The perceptual maps are linear interpolations between fixed anchor stops,
//! which is close enough to the published tables for screen use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of entries in every palette.
pub const PALETTE_LEN: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// CSS hex notation, e.g. `#440154`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(a: Rgb8, b: Rgb8, t: f64) -> Rgb8 {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteName {
    Greys256,
    Inferno256,
    Magma256,
    Plasma256,
    #[default]
    Viridis256,
    Cividis256,
    EightColorPalette,
    Periodic,
}

impl PaletteName {
    /// All palettes in the order the palette selector lists them.
    pub const ALL: [PaletteName; 8] = [
        PaletteName::Greys256,
        PaletteName::Inferno256,
        PaletteName::Magma256,
        PaletteName::Plasma256,
        PaletteName::Viridis256,
        PaletteName::Cividis256,
        PaletteName::EightColorPalette,
        PaletteName::Periodic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteName::Greys256 => "Greys256",
            PaletteName::Inferno256 => "Inferno256",
            PaletteName::Magma256 => "Magma256",
            PaletteName::Plasma256 => "Plasma256",
            PaletteName::Viridis256 => "Viridis256",
            PaletteName::Cividis256 => "Cividis256",
            PaletteName::EightColorPalette => "EightColorPalette",
            PaletteName::Periodic => "Periodic",
        }
    }

    /// Continuous palettes get a color bar; the banded one does not.
    pub fn is_continuous(&self) -> bool {
        !matches!(self, PaletteName::EightColorPalette)
    }

    pub fn palette(&self) -> Palette {
        Palette::build(*self)
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown palette '{name}' (expected one of: {})", valid_names())]
pub struct UnknownPalette {
    pub name: String,
}

fn valid_names() -> String {
    PaletteName::ALL
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for PaletteName {
    type Err = UnknownPalette;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaletteName::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPalette {
                name: wanted.to_string(),
            })
    }
}

/// A resolved palette: exactly [`PALETTE_LEN`] colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: PaletteName,
    colors: Vec<Rgb8>,
}

impl Palette {
    fn build(name: PaletteName) -> Self {
        let colors = match name {
            PaletteName::Greys256 => (0..PALETTE_LEN)
                .map(|i| Rgb8::new(i as u8, i as u8, i as u8))
                .collect(),
            PaletteName::Inferno256 => interpolate(&INFERNO_STOPS),
            PaletteName::Magma256 => interpolate(&MAGMA_STOPS),
            PaletteName::Plasma256 => interpolate(&PLASMA_STOPS),
            PaletteName::Viridis256 => interpolate(&VIRIDIS_STOPS),
            PaletteName::Cividis256 => interpolate(&CIVIDIS_STOPS),
            PaletteName::EightColorPalette => (0..PALETTE_LEN)
                .map(|i| Rgb8::from_hex(SPECTRAL8[i / 32]))
                .collect(),
            PaletteName::Periodic => (0..PALETTE_LEN)
                .map(|i| hsl_to_rgb8(i as f64 * 360.0 / PALETTE_LEN as f64, 0.75, 0.55))
                .collect(),
        };
        Self { name, colors }
    }

    pub fn color(&self, index: u8) -> Rgb8 {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    pub fn hex_colors(&self) -> Vec<String> {
        self.colors.iter().map(Rgb8::hex).collect()
    }
}

const SPECTRAL8: [u32; 8] = [
    0x3288bd, 0x66c2a5, 0xabdda4, 0xe6f598, 0xfee08b, 0xfdae61, 0xf46d43, 0xd53e4f,
];

// Nine evenly spaced stops per map (0, 1/8, ..., 1).
const VIRIDIS_STOPS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const INFERNO_STOPS: [u32; 9] = [
    0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf8c932, 0xfcffa4,
];
const MAGMA_STOPS: [u32; 9] = [
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const PLASMA_STOPS: [u32; 9] = [
    0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe66c5c, 0xf89540, 0xfdc527, 0xf0f921,
];
const CIVIDIS_STOPS: [u32; 9] = [
    0x00224e, 0x123570, 0x3b496c, 0x575d6d, 0x707173, 0x8a8779, 0xa69d75, 0xc4b56c, 0xfee838,
];

fn interpolate(stops: &[u32]) -> Vec<Rgb8> {
    let segments = (stops.len() - 1) as f64;
    (0..PALETTE_LEN)
        .map(|i| {
            let pos = i as f64 / (PALETTE_LEN - 1) as f64 * segments;
            let lo = (pos.floor() as usize).min(stops.len() - 2);
            Rgb8::lerp(
                Rgb8::from_hex(stops[lo]),
                Rgb8::from_hex(stops[lo + 1]),
                pos - lo as f64,
            )
        })
        .collect()
}

// HSL -> RGB conversion (linear; sufficient for chart colors)
fn hsl_to_rgb8(h_deg: f64, s: f64, l: f64) -> Rgb8 {
    let h = (h_deg % 360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    Rgb8 {
        r: (hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
        g: (hue_to_rgb(p, q, h) * 255.0).round() as u8,
        b: (hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
    }
}
