//! Pixel colors

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// An RGBA color with 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PixelColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}': expected #rrggbb, #rrggbbaa or a color name")]
pub struct ColorParseError(pub String);

impl PixelColor {
    pub const BLACK: PixelColor = PixelColor::rgb(0, 0, 0);
    pub const WHITE: PixelColor = PixelColor::rgb(255, 255, 255);
    pub const RED: PixelColor = PixelColor::rgb(255, 0, 0);
    pub const GREEN: PixelColor = PixelColor::rgb(0, 255, 0);
    pub const BLUE: PixelColor = PixelColor::rgb(0, 0, 255);
    pub const GRAY: PixelColor = PixelColor::rgb(128, 128, 128);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `other`
    pub fn interpolate(&self, other: &PixelColor, t: f64) -> PixelColor {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| ((1.0 - t) * f64::from(a) + t * f64::from(b)).round() as u8;
        PixelColor {
            red: mix(self.red, other.red),
            green: mix(self.green, other.green),
            blue: mix(self.blue, other.blue),
            alpha: mix(self.alpha, other.alpha),
        }
    }

    fn named(name: &str) -> Option<PixelColor> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "gray" | "grey" => Some(Self::GRAY),
            _ => None,
        }
    }
}

impl Default for PixelColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for PixelColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ColorParseError(s.to_string());

        let Some(hex) = s.strip_prefix('#') else {
            return Self::named(s).ok_or_else(err);
        };
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(PixelColor::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl TryFrom<String> for PixelColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PixelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)?;
        if self.alpha != 255 {
            write!(f, "{:02x}", self.alpha)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff8000".parse::<PixelColor>().unwrap(), PixelColor::rgb(255, 128, 0));
        assert_eq!(
            "#00000080".parse::<PixelColor>().unwrap(),
            PixelColor::rgba(0, 0, 0, 128)
        );
    }

    #[test]
    fn test_parse_named() {
        assert_eq!("Blue".parse::<PixelColor>().unwrap(), PixelColor::BLUE);
        assert_eq!("grey".parse::<PixelColor>().unwrap(), PixelColor::GRAY);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12345".parse::<PixelColor>().is_err());
        assert!("#gg0000".parse::<PixelColor>().is_err());
        assert!("mauve".parse::<PixelColor>().is_err());
    }

    #[test]
    fn test_interpolate() {
        let mid = PixelColor::BLACK.interpolate(&PixelColor::WHITE, 0.5);
        assert_eq!(mid, PixelColor::rgb(128, 128, 128));
        assert_eq!(PixelColor::RED.interpolate(&PixelColor::BLUE, 0.0), PixelColor::RED);
    }

    #[test]
    fn test_display_round_trips() {
        let color = PixelColor::rgba(1, 2, 3, 4);
        assert_eq!(color.to_string(), "#01020304");
        assert_eq!(color.to_string().parse::<PixelColor>().unwrap(), color);
        assert_eq!(PixelColor::WHITE.to_string(), "#ffffff");
    }
}
