// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is required).
    #[allow(dead_code)]
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    pub fn from_f32(c: [f32; 3]) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(c[0]), q(c[1]), q(c[2]))
    }

    pub fn luma(self) -> u8 {
        ((self.r as u16 * 3 + self.g as u16 * 6 + self.b as u16) / 10) as u8
    }
}

/// A color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            rgb: Rgb::new(r, g, b),
            a,
        }
    }
}

/// The fixed swatch set offered for the rain color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeonColor {
    #[default]
    Yellow,
    Green,
    Cyan,
    Blue,
    Violet,
    Pink,
    Red,
    Orange,
}

impl NeonColor {
    pub const ALL: [NeonColor; 8] = [
        NeonColor::Yellow,
        NeonColor::Green,
        NeonColor::Cyan,
        NeonColor::Blue,
        NeonColor::Violet,
        NeonColor::Pink,
        NeonColor::Red,
        NeonColor::Orange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NeonColor::Yellow => "Yellow",
            NeonColor::Green => "Green",
            NeonColor::Cyan => "Cyan",
            NeonColor::Blue => "Blue",
            NeonColor::Violet => "Violet",
            NeonColor::Pink => "Pink",
            NeonColor::Red => "Red",
            NeonColor::Orange => "Orange",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            NeonColor::Yellow => "#EFFF00",
            NeonColor::Green => "#39FF14",
            NeonColor::Cyan => "#00FFFF",
            NeonColor::Blue => "#00BFFF",
            NeonColor::Violet => "#BF00FF",
            NeonColor::Pink => "#FF10F0",
            NeonColor::Red => "#FF073A",
            NeonColor::Orange => "#FF6600",
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            NeonColor::Yellow => Rgb::new(0xEF, 0xFF, 0x00),
            NeonColor::Green => Rgb::new(0x39, 0xFF, 0x14),
            NeonColor::Cyan => Rgb::new(0x00, 0xFF, 0xFF),
            NeonColor::Blue => Rgb::new(0x00, 0xBF, 0xFF),
            NeonColor::Violet => Rgb::new(0xBF, 0x00, 0xFF),
            NeonColor::Pink => Rgb::new(0xFF, 0x10, 0xF0),
            NeonColor::Red => Rgb::new(0xFF, 0x07, 0x3A),
            NeonColor::Orange => Rgb::new(0xFF, 0x66, 0x00),
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Matches a palette entry by hex value, ignoring case.
    pub fn from_hex(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(s.trim()))
    }

    /// Accepts either the swatch name or its hex value.
    pub fn parse(s: &str) -> Result<Self, String> {
        let t = s.trim();
        Self::from_hex(t)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|c| c.name().eq_ignore_ascii_case(t))
            })
            .ok_or_else(|| format!("invalid color: {} (see --list-colors)", s))
    }
}

impl serde::Serialize for NeonColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

impl<'de> serde::Deserialize<'de> for NeonColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NeonColor::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("not a palette color: {s}")))
    }
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.r as i32) - (b.r as i32);
    let dg = (a.g as i32) - (b.g as i32);
    let db = (a.b as i32) - (b.b as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let cube = Rgb::new(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, Rgb::new(0, 0, 0)),
        239..=255 => (231, Rgb::new(255, 255, 255)),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, Rgb::new(v, v, v))
        }
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, Rgb::new(0, 0, 0)),
        (Color::DarkGrey, Rgb::new(128, 128, 128)),
        (Color::Grey, Rgb::new(192, 192, 192)),
        (Color::White, Rgb::new(255, 255, 255)),
        (Color::DarkRed, Rgb::new(128, 0, 0)),
        (Color::Red, Rgb::new(255, 0, 0)),
        (Color::DarkGreen, Rgb::new(0, 128, 0)),
        (Color::Green, Rgb::new(0, 255, 0)),
        (Color::DarkBlue, Rgb::new(0, 0, 128)),
        (Color::Blue, Rgb::new(0, 0, 255)),
        (Color::DarkCyan, Rgb::new(0, 128, 128)),
        (Color::Cyan, Rgb::new(0, 255, 255)),
        (Color::DarkMagenta, Rgb::new(128, 0, 128)),
        (Color::Magenta, Rgb::new(255, 0, 255)),
        (Color::DarkYellow, Rgb::new(128, 128, 0)),
        (Color::Yellow, Rgb::new(255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Maps an RGB value onto what the terminal can show. Mono terminals get `None`
/// and are expected to fall back to glyph shapes.
pub fn terminal_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#FF6600"), Some(Rgb::new(255, 102, 0)));
        assert_eq!(Rgb::from_hex("#ff6600"), Some(Rgb::new(255, 102, 0)));
        assert_eq!(Rgb::from_hex("FF6600"), None);
        assert_eq!(Rgb::from_hex("#FF66"), None);
        assert_eq!(Rgb::from_hex("#GG6600"), None);
    }

    #[test]
    fn palette_hex_matches_rgb() {
        for c in NeonColor::ALL {
            assert_eq!(Rgb::from_hex(c.hex()), Some(c.rgb()), "{}", c.name());
            assert_eq!(NeonColor::from_index(c.index()), Some(c));
        }
    }

    #[test]
    fn palette_lookup_by_hex_or_name() {
        assert_eq!(NeonColor::from_hex("#00ffff"), Some(NeonColor::Cyan));
        assert_eq!(NeonColor::from_hex("#123456"), None);
        assert_eq!(NeonColor::parse("violet"), Ok(NeonColor::Violet));
        assert_eq!(NeonColor::parse("#FF073A"), Ok(NeonColor::Red));
        assert!(NeonColor::parse("mauve").is_err());
    }

    #[test]
    fn ansi256_picks_cube_and_gray() {
        assert_eq!(rgb_to_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256(Rgb::new(0, 255, 255)), 51);
        assert_eq!(rgb_to_ansi256(Rgb::new(10, 10, 10)), 232);
        assert_eq!(rgb_to_ansi256(Rgb::new(0, 0, 0)), 16);
    }

    #[test]
    fn mono_has_no_color() {
        assert_eq!(terminal_color(Rgb::new(1, 2, 3), ColorMode::Mono), None);
        assert_eq!(
            terminal_color(NeonColor::Cyan.rgb(), ColorMode::Color16),
            Some(Color::Cyan)
        );
    }
}
