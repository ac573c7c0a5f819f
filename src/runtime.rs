// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// Direction the rain falls in. The tilted variants lean 30 degrees off vertical.
#[derive(
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum Angle {
    #[default]
    Vertical,
    Left,
    Right,
}

impl Angle {
    /// Left to right, the way the panel lays the buttons out.
    pub const PANEL_ORDER: [Angle; 3] = [Angle::Left, Angle::Vertical, Angle::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Angle::Vertical => "vertical",
            Angle::Left => "left",
            Angle::Right => "right",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "vertical" => Some(Angle::Vertical),
            "left" => Some(Angle::Left),
            "right" => Some(Angle::Right),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Angle::Vertical => "Vertical",
            Angle::Left => "Left",
            Angle::Right => "Right",
        }
    }

    pub fn icon(self) -> char {
        match self {
            Angle::Vertical => '|',
            Angle::Left => '/',
            Angle::Right => '\\',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Angle;

    #[test]
    fn names_round_trip() {
        for a in Angle::PANEL_ORDER {
            assert_eq!(Angle::from_name(a.as_str()), Some(a));
        }
        assert_eq!(Angle::from_name("diagonal"), None);
        assert_eq!(Angle::from_name("Vertical"), None);
    }

    #[test]
    fn serializes_lowercase() {
        let s = serde_json::to_string(&Angle::Right).unwrap();
        assert_eq!(s, "\"right\"");
    }
}
