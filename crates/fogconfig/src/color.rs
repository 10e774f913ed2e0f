use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ConfigError;

/// RGB triple normalised to `0.0..=1.0`, parsed from CSS-style hex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Parses `#RRGGBB` or `#RGB` (the `#` is optional, digits are case-insensitive).
    ///
    /// `field` names the config key in the returned error.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor {
            field,
            value: raw.to_string(),
        };
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
                };
                Ok(Self::from_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
            }
            3 => {
                let mut nibbles = [0u8; 3];
                for (slot, ch) in nibbles.iter_mut().zip(digits.chars()) {
                    let value = ch.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = value * 17;
                }
                Ok(Self::from_u8(nibbles[0], nibbles[1], nibbles[2]))
            }
            _ => Err(invalid()),
        }
    }

    /// Channels rounded back to 8-bit.
    pub fn to_u8(self) -> [u8; 3] {
        let quantise = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantise(self.r), quantise(self.g), quantise(self.b)]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse("color", s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
