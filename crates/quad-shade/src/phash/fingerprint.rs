//! 64-bit perceptual fingerprint and its Hamming distance.

use std::fmt;
use std::str::FromStr;

/// A 64-bit perceptual hash.
///
/// Bit 63 corresponds to the first coefficient of the low-frequency block,
/// bit 0 to the last, so the hex form reads in the same order the hash was
/// computed.
///
/// # Example
///
/// ```
/// use quad_shade::Fingerprint;
///
/// let a: Fingerprint = "ff00000000000000".parse().unwrap();
/// let b = Fingerprint::from_bits(0x0f00_0000_0000_0001);
/// assert_eq!(a.distance(&b), 5);
/// assert_eq!(b.to_hex(), "0f00000000000001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint.
    pub const BITS: u32 = u64::BITS;

    /// Number of hex digits in the textual form.
    pub const HEX_LEN: usize = 16;

    /// The all-zero fingerprint.
    pub const ZERO: Fingerprint = Fingerprint(0);

    /// Wrap raw bits.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bits.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Hamming distance: the number of differing bits.
    #[inline]
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Lower-case hex, always [`Self::HEX_LEN`] digits.
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Error returned when a fingerprint string is not 16 hex digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFingerprintError {
    /// Wrong number of characters
    InvalidLength(usize),
    /// A character is not a hex digit
    InvalidHex,
}

impl fmt::Display for ParseFingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFingerprintError::InvalidLength(len) => write!(
                f,
                "fingerprint must be {} hex digits, got {} characters",
                Fingerprint::HEX_LEN,
                len
            ),
            ParseFingerprintError::InvalidHex => write!(f, "fingerprint is not valid hex"),
        }
    }
}

impl std::error::Error for ParseFingerprintError {}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(ParseFingerprintError::InvalidLength(s.len()));
        }
        // from_str_radix alone would accept a leading '+'
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseFingerprintError::InvalidHex);
        }
        u64::from_str_radix(s, 16)
            .map(Fingerprint)
            .map_err(|_| ParseFingerprintError::InvalidHex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let fp = Fingerprint::from_bits(0xDEAD_BEEF_0BAD_F00D);
        assert_eq!(fp.distance(&fp), 0);
    }

    #[test]
    fn test_distance_extremes() {
        assert_eq!(Fingerprint::ZERO.distance(&Fingerprint::from_bits(u64::MAX)), 64);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Fingerprint::from_bits(0b1011);
        let b = Fingerprint::from_bits(0b0110);
        assert_eq!(a.distance(&b), 3);
        assert_eq!(b.distance(&a), 3);
    }

    #[test]
    fn test_hex_round_trip() {
        let fp = Fingerprint::from_bits(0x0123_4567_89ab_cdef);
        assert_eq!(fp.to_hex(), "0123456789abcdef");
        assert_eq!(fp.to_string(), fp.to_hex());
        assert_eq!("0123456789ABCDEF".parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(
            "abc".parse::<Fingerprint>(),
            Err(ParseFingerprintError::InvalidLength(3))
        );
    }

    #[test]
    fn test_parse_rejects_sign_and_non_hex() {
        assert_eq!(
            "+123456789abcdef".parse::<Fingerprint>(),
            Err(ParseFingerprintError::InvalidHex)
        );
        assert_eq!(
            "0123456789abcdeg".parse::<Fingerprint>(),
            Err(ParseFingerprintError::InvalidHex)
        );
    }
}
