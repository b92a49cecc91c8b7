use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ThumbError, ThumbResult};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// 24-bit sRGB color, written as `#RRGGBB`.
///
/// Formatting always yields uppercase digits. Parsing is case-insensitive and also accepts the
/// `#RGB` shorthand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl HexColor {
    /// `#FFFFFF`.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// `#000000`.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Build a color from channel bytes.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (leading `#` optional).
    pub fn parse(s: &str) -> ThumbResult<Self> {
        parse_hex(s).map_err(ThumbError::validation)
    }

    /// Draw a color by picking six hex digits independently and uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut digit = || rng.gen_range(0..16u8);
        let mut byte = || (digit() << 4) | digit();
        Self::rgb(byte(), byte(), byte())
    }

    /// Channels as an opaque RGBA8 quad.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = [b'#'; 7];
        for (i, byte) in [self.r, self.g, self.b].into_iter().enumerate() {
            out[1 + i * 2] = HEX_DIGITS[usize::from(byte >> 4)];
            out[2 + i * 2] = HEX_DIGITS[usize::from(byte & 0x0f)];
        }
        // Only ASCII bytes from HEX_DIGITS and '#'.
        f.write_str(std::str::from_utf8(&out).map_err(|_| std::fmt::Error)?)
    }
}

impl std::str::FromStr for HexColor {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> Result<HexColor, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn nibble(c: u8) -> Result<u8, String> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(format!("invalid hex digit '{}'", c as char)),
        }
    }

    let bytes = s.as_bytes();
    match bytes.len() {
        3 => {
            let r = nibble(bytes[0])?;
            let g = nibble(bytes[1])?;
            let b = nibble(bytes[2])?;
            Ok(HexColor::rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let byte = |i: usize| -> Result<u8, String> {
                Ok((nibble(bytes[i])? << 4) | nibble(bytes[i + 1])?)
            };
            Ok(HexColor::rgb(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => Err("hex color must be #RRGGBB or #RGB (case-insensitive)".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
