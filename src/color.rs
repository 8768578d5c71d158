//! Hex color arithmetic and the fixed limb palettes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Arm colors offered by the "change arm color" control.
pub const ARM_PALETTE: &[&str] = &[
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57", "#ff9ff3", "#a8e6cf", "#ffd3a5",
];

/// Leg colors offered by the "change leg color" control.
pub const LEG_PALETTE: &[&str] = &[
    "#667eea", "#764ba2", "#f093fb", "#f5576c", "#4facfe", "#00f2fe", "#43e97b", "#38f9d7",
];

pub const DEFAULT_ARM_COLOR: &str = "#c0c0c0";
pub const DEFAULT_LEG_COLOR: &str = "#b0b0b0";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color '{0}' must have exactly 6 hex digits")]
    Length(String),
    #[error("color '{0}' contains a non-hex digit")]
    Digit(String),
}

/// 24-bit RGB color parsed from `#rrggbb` (leading `#` optional).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Subtracts `round(2.55 * percent)` from every channel, clamped to 0..=255.
    /// Negative percentages lighten.
    pub fn darken(self, percent: f64) -> Rgb {
        let amt = (2.55 * percent).round() as i32;
        let ch = |c: u8| (c as i32 - amt).clamp(0, 255) as u8;
        Rgb {
            r: ch(self.r),
            g: ch(self.g),
            b: ch(self.b),
        }
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(ColorError::Length(s.to_string()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(s.to_string()));
        }
        let num = u32::from_str_radix(hex, 16).map_err(|_| ColorError::Digit(s.to_string()))?;
        Ok(Rgb {
            r: (num >> 16) as u8,
            g: ((num >> 8) & 0xff) as u8,
            b: (num & 0xff) as u8,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub fn darken_color(color: &str, percent: f64) -> Result<String, ColorError> {
    Ok(color.parse::<Rgb>()?.darken(percent).to_string())
}

/// CSS background used for limbs: the chosen color fading into a darker shade.
pub fn limb_gradient(color: &str, darken_percent: f64) -> Result<String, ColorError> {
    let shade = darken_color(color, darken_percent)?;
    Ok(format!("linear-gradient(145deg, {color}, {shade})"))
}
