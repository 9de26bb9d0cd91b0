//! String attribute parsing for element updates.
//!
//! Scene documents are typed, but elements can still be poked at runtime with
//! `name="value"` style updates (the viewer's property panel does this). Values
//! that fail to parse are rejected and leave the element unchanged.

use glam::Vec3;

use crate::types::Color;

/// Attribute update errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    #[error("Unknown attribute '{0}'")]
    Unknown(String),
    #[error("Invalid value '{value}' for attribute '{name}'")]
    Invalid { name: String, value: String },
}

impl AttributeError {
    pub(crate) fn invalid(name: &str, value: &str) -> Self {
        AttributeError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Parse a finite number.
pub fn parse_number(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse three whitespace-separated numbers. All three must be valid.
pub fn parse_vec3(value: &str) -> Option<Vec3> {
    let mut parts = value.split_whitespace().map(parse_number);
    let x = parts.next()??;
    let y = parts.next()??;
    let z = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}

/// Parse a color written as `0xRRGGBB`, `#RRGGBB` or a decimal integer.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    let hex = if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('#'))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        value.parse::<u32>().ok()?
    };
    (hex <= 0xFFFFFF).then(|| Color::from_hex(hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1 2 3"), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vec3("  -1.5   0 2e2 "), Some(Vec3::new(-1.5, 0.0, 200.0)));
        assert_eq!(parse_vec3("1 2"), None);
        assert_eq!(parse_vec3("1 two 3"), None);
        assert_eq!(parse_vec3("1 2 3 4"), None);
        assert_eq!(parse_vec3("NaN 0 0"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("0xFF0000"), Some(Color::from_hex(0xFF0000)));
        assert_eq!(parse_color("#00ff00"), Some(Color::from_hex(0x00FF00)));
        assert_eq!(parse_color("255"), Some(Color::from_hex(0x0000FF)));
        assert_eq!(parse_color("0x1000000"), None);
        assert_eq!(parse_color("red"), None);
    }
}
