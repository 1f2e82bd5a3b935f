//! On-disk record format.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "GBRL"
//! 4       1     format version (1)
//! 5       4     width,  u32 little-endian
//! 9       4     height, u32 little-endian
//! 13      ...   runs: color u8, then length as unsigned LEB128
//! ```
//!
//! Runs continue until end of stream; there is no run count. A stream that
//! ends between a color byte and its length, or inside a length, is
//! [`RleError::Truncated`].

use std::io::{self, Read, Write};

use super::codec::{RleRecord, Run};
use super::error::RleError;

/// Leading bytes of every record file.
pub const MAGIC: [u8; 4] = *b"GBRL";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// LEB128 needs at most 10 bytes for a u64.
const MAX_VARINT_LEN: usize = 10;

impl RleRecord {
    /// Serialize the record to `writer`.
    ///
    /// Writes are issued per run; wrap files in a `BufWriter`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[FORMAT_VERSION])?;
        writer.write_all(&self.width().to_le_bytes())?;
        writer.write_all(&self.height().to_le_bytes())?;

        let mut buf = [0u8; 1 + MAX_VARINT_LEN];
        for run in self.runs() {
            buf[0] = run.color;
            let n = encode_varint(run.length, &mut buf[1..]);
            writer.write_all(&buf[..1 + n])?;
        }
        writer.flush()
    }

    /// Parse a record from `reader`, consuming it to the end.
    ///
    /// Only the framing is checked; run totals are validated by
    /// [`decode`](super::decode).
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, RleError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(RleError::BadMagic);
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != FORMAT_VERSION {
            return Err(RleError::UnsupportedVersion(version[0]));
        }

        let mut dim = [0u8; 4];
        reader.read_exact(&mut dim)?;
        let width = u32::from_le_bytes(dim);
        reader.read_exact(&mut dim)?;
        let height = u32::from_le_bytes(dim);

        let mut runs = Vec::new();
        while let Some(color) = read_byte(&mut reader)? {
            let length = read_varint(&mut reader)?;
            runs.push(Run::new(color, length));
        }

        Ok(RleRecord::new(width, height, runs))
    }

    /// Serialize into a fresh byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(13 + self.runs().len() * 2);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    /// Parse from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RleError> {
        Self::read_from(bytes)
    }
}

/// Write `value` as unsigned LEB128 into `out`, returning the byte count.
fn encode_varint(mut value: u64, out: &mut [u8]) -> usize {
    let mut i = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out[i] = byte;
            return i + 1;
        }
        out[i] = byte | 0x80;
        i += 1;
    }
}

/// Read one byte, or `None` at a clean end of stream.
fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>, RleError> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_varint<R: Read>(reader: &mut R) -> Result<u64, RleError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = read_byte(reader)?.ok_or(RleError::Truncated)?;
        let bits = (byte & 0x7F) as u64;
        let shift = 7 * i as u32;
        // The tenth byte may only carry the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && bits > 1 {
            return Err(RleError::VarintOverflow);
        }
        value |= bits << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(RleError::VarintOverflow)
}
