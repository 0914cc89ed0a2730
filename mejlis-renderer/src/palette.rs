use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#RGB` and `#RRGGBB`, with or without the `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| format!("invalid color '{s}'"))?;

        match digits.as_slice() {
            [r, g, b] => Ok(Color::rgb(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(Color::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            _ => Err(format!("invalid color '{s}'")),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Segment fill colors, cycled by `(side + segment) % len`.
pub fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(0xFF, 0x6B, 0x6B),
        Color::rgb(0x6B, 0xCB, 0x77),
        Color::rgb(0x4D, 0x96, 0xFF),
        Color::rgb(0xFF, 0xD9, 0x3D),
        Color::rgb(0xA6, 0x6D, 0xD4),
        Color::rgb(0x00, 0xC9, 0xA7),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c: Color = "#4D96FF".parse().unwrap();
        assert_eq!(c, Color::rgb(0x4D, 0x96, 0xFF));
        assert_eq!(c.to_hex(), "#4D96FF");
    }

    #[test]
    fn test_short_hex() {
        assert_eq!("#888".parse::<Color>().unwrap(), Color::rgb(0x88, 0x88, 0x88));
        assert_eq!("fff".parse::<Color>().unwrap(), Color::WHITE);
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::BLACK).unwrap();
        assert_eq!(json, "\"#000000\"");
        let back: Color = serde_json::from_str("\"#00C9A7\"").unwrap();
        assert_eq!(back, default_palette()[5]);
    }
}
