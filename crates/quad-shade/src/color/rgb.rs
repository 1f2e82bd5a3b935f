//! 8-bit RGB color type

use std::fmt;
use std::str::FromStr;

use crate::palette::ParseColorError;

/// A color with 8-bit red, green and blue channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel (0..=255)
    pub r: u8,
    /// Green channel (0..=255)
    pub g: u8,
    /// Blue channel (0..=255)
    pub b: u8,
}

impl Rgb {
    /// Create a new color from channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array `[R, G, B]`.
    ///
    /// # Example
    /// ```
    /// use quad_shade::Rgb;
    /// let white = Rgb::from_bytes([255, 255, 255]);
    /// assert_eq!(white.g, 255);
    /// ```
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array `[R, G, B]`.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance to another color in RGB space.
    ///
    /// Exact integer arithmetic; ordering is identical to the true Euclidean
    /// distance, so nearest-color searches never need the square root.
    #[inline]
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance to another color in RGB space.
    ///
    /// # Example
    /// ```
    /// use quad_shade::Rgb;
    /// let d = Rgb::new(10, 10, 10).distance(Rgb::new(0, 0, 0));
    /// assert!((d - 17.32).abs() < 0.01);
    /// ```
    #[inline]
    pub fn distance(self, other: Rgb) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Luma (ITU-R BT.601), the same weighting image libraries use for
    /// RGB to greyscale conversion.
    #[inline]
    pub fn luma(self) -> f32 {
        (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) as f32 / 1000.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse a color from a hex string.
    ///
    /// Accepts `#RRGGBB`, `RRGGBB`, `#RGB` and `RGB`, case-insensitive,
    /// with surrounding whitespace trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// use quad_shade::Rgb;
    ///
    /// let light: Rgb = "#AAAAAA".parse().unwrap();
    /// assert_eq!(light.r, 0xAA);
    ///
    /// let red: Rgb = "f00".parse().unwrap();
    /// assert_eq!(red, Rgb::new(255, 0, 0));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);

        let mut nibbles = [0u8; 6];
        let mut count = 0;
        for ch in digits.chars() {
            if count == nibbles.len() {
                return Err(ParseColorError::WrongDigitCount(digits.chars().count()));
            }
            nibbles[count] = ch.to_digit(16).ok_or(ParseColorError::NotHex(ch))? as u8;
            count += 1;
        }

        match (count, nibbles) {
            // Shorthand: 0xF -> 0xFF
            (3, [r, g, b, ..]) => Ok(Self::new(r * 17, g * 17, b * 17)),
            (6, [r1, r0, g1, g0, b1, b0]) => {
                Ok(Self::new((r1 << 4) | r0, (g1 << 4) | g0, (b1 << 4) | b0))
            }
            (n, _) => Err(ParseColorError::WrongDigitCount(n)),
        }
    }
}
