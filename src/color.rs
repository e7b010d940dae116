use crate::error::ColorError;
use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `rgba(r, g, b, a)`, `rgb(r, g, b)`, `#rrggbb` or `#rgb`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let s = input.trim().to_lowercase();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(input, hex);
        }

        let (body, expects_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(ColorError::Malformed(input.to_string()));
        };

        let body = body
            .strip_suffix(')')
            .ok_or_else(|| ColorError::Malformed(input.to_string()))?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if expects_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(ColorError::Malformed(input.to_string()));
        }

        let channel = |part: &str| -> Result<u8, ColorError> {
            part.parse::<u8>().map_err(|_| ColorError::Component {
                input: input.to_string(),
                component: part.to_string(),
            })
        };

        let a = if expects_alpha {
            let a = parts[3].parse::<f64>().map_err(|_| ColorError::Component {
                input: input.to_string(),
                component: parts[3].to_string(),
            })?;
            if !(0.0..=1.0).contains(&a) {
                return Err(ColorError::Component {
                    input: input.to_string(),
                    component: parts[3].to_string(),
                });
            }
            a
        } else {
            1.0
        };

        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Composite over an opaque background.
    pub fn blend_over(self, background: Rgba) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 { (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8 };
        Color::Rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

fn parse_hex(input: &str, hex: &str) -> Result<Rgba, ColorError> {
    if !hex.is_ascii() {
        return Err(ColorError::Malformed(input.to_string()));
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(ColorError::Malformed(input.to_string())),
    };
    let byte = |i: usize| -> Result<u8, ColorError> {
        u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| ColorError::Component {
            input: input.to_string(),
            component: expanded[i..i + 2].to_string(),
        })
    };
    Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, 1.0))
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s)
    }
}

// Stored in config files in the same textual form the CLI accepts
impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}
