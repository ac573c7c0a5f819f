// Copyright (c) 2026 rezky_nightky

//! The user-tunable rain parameters and their validation.

use serde_json::Value;

use crate::palette::NeonColor;
use crate::runtime::Angle;

pub const DROP_SIZE_MIN: u8 = 1;
pub const DROP_SIZE_MAX: u8 = 8;
pub const QUANTITY_MIN: u32 = 20;
pub const QUANTITY_MAX: u32 = 400;
pub const QUANTITY_STEP: u32 = 10;
pub const SPEED_MIN: u8 = 1;
pub const SPEED_MAX: u8 = 15;

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RainConfig {
    pub drop_size: u8,
    pub color: NeonColor,
    pub quantity: u32,
    pub speed: u8,
    pub angle: Angle,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            drop_size: 2,
            color: NeonColor::ALL[0],
            quantity: 150,
            speed: 8,
            angle: Angle::Vertical,
        }
    }
}

impl RainConfig {
    /// Stroke length of every drop, in surface pixels.
    pub fn drop_length(&self) -> f32 {
        8.0 + self.drop_size as f32 * 4.0
    }

    /// Distance a drop travels per frame, in surface pixels.
    pub fn drop_speed(&self) -> f32 {
        4.0 + self.speed as f32 * 2.0
    }

    pub fn line_width(&self) -> f32 {
        (self.drop_size as f32).max(1.0)
    }

    /// True when switching from `self` to `next` invalidates the drop layout.
    /// Color is the only field that can change without a repopulate.
    pub fn affects_geometry(&self, next: &RainConfig) -> bool {
        self.quantity != next.quantity
            || self.drop_size != next.drop_size
            || self.speed != next.speed
            || self.angle != next.angle
    }

    /// Forces every numeric field into range.
    pub fn clamped(self) -> Self {
        Self {
            drop_size: self.drop_size.clamp(DROP_SIZE_MIN, DROP_SIZE_MAX),
            color: self.color,
            quantity: snap_quantity(self.quantity),
            speed: self.speed.clamp(SPEED_MIN, SPEED_MAX),
            angle: self.angle,
        }
    }

    /// Builds a config from persisted text, substituting defaults field by
    /// field. Never fails: anything unreadable yields the default config.
    pub fn from_json_lossy(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => {
                let d = Self::default();
                Self {
                    drop_size: numeric_field(
                        map.get("dropSize"),
                        DROP_SIZE_MIN as f64,
                        DROP_SIZE_MAX as f64,
                    )
                    .map_or(d.drop_size, |v| v as u8),
                    color: map
                        .get("color")
                        .and_then(Value::as_str)
                        .and_then(NeonColor::from_hex)
                        .unwrap_or(d.color),
                    quantity: numeric_field(
                        map.get("quantity"),
                        QUANTITY_MIN as f64,
                        QUANTITY_MAX as f64,
                    )
                    .map_or(d.quantity, |v| snap_quantity(v as u32)),
                    speed: numeric_field(map.get("speed"), SPEED_MIN as f64, SPEED_MAX as f64)
                        .map_or(d.speed, |v| v as u8),
                    angle: map
                        .get("angle")
                        .and_then(Value::as_str)
                        .and_then(Angle::from_name)
                        .unwrap_or(d.angle),
                }
            }
            _ => Self::default(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Clamps `q` into range and rounds it onto the `20, 30, .. 400` slider grid,
/// halves rounding up.
pub fn snap_quantity(q: u32) -> u32 {
    let q = q.clamp(QUANTITY_MIN, QUANTITY_MAX);
    let steps = (q - QUANTITY_MIN + QUANTITY_STEP / 2) / QUANTITY_STEP;
    (QUANTITY_MIN + steps * QUANTITY_STEP).min(QUANTITY_MAX)
}

/// Clamps `v` into `[min, max]`; NaN lands on `min`.
pub fn clamp_f64(v: f64, min: f64, max: f64) -> f64 {
    if v.is_nan() {
        return min;
    }
    v.max(min).min(max)
}

/// Reads a persisted number the lenient way a hand-edited file deserves:
/// numeric strings and booleans coerce, anything else counts as NaN and
/// clamps to `min`. A missing field yields `None` so the caller can use its
/// default.
fn numeric_field(v: Option<&Value>, min: f64, max: f64) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    };
    Some(clamp_f64(n, min, max).round())
}
