//! Bluetooth UUIDs
//!
//! Attribute types are identified either by a SIG-assigned 16-bit value
//! (`180f`, `2a19`, ...) or by a full 128-bit UUID. Both are stored as the
//! full 128-bit value; the short form is recovered when the UUID sits on the
//! Bluetooth base UUID.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// A 128-bit Bluetooth UUID, stored big-endian (textual order).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Uuid {
    bytes: [u8; 16],
}

/// "00000000-0000-1000-8000-00805f9b34fb"
const BASE_UUID_BYTES: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0x80, 0x5F, 0x9B, 0x34, 0xFB,
];

/// Length of the `8-4-4-4-12` textual form
const HYPHENATED_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// The 32-bit short value occupies the first four bytes of the base UUID.
const SHORT_LEN: usize = 4;

impl Uuid {
    /// Creates a UUID from 16 big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Uuid { bytes }
    }

    /// Creates a UUID from its 128-bit value, e.g.
    /// `0x12345678_1234_5678_1234_56789abcdef0`.
    pub const fn from_u128(value: u128) -> Self {
        Uuid {
            bytes: value.to_be_bytes(),
        }
    }

    /// Creates a UUID from a 16-bit SIG-assigned value.
    pub const fn from_u16(uuid16: u16) -> Self {
        let mut bytes = BASE_UUID_BYTES;
        bytes[2] = (uuid16 >> 8) as u8;
        bytes[3] = uuid16 as u8;
        Uuid { bytes }
    }

    /// Creates a UUID from a 32-bit SIG-assigned value.
    pub const fn from_u32(uuid32: u32) -> Self {
        let mut bytes = BASE_UUID_BYTES;
        bytes[0] = (uuid32 >> 24) as u8;
        bytes[1] = (uuid32 >> 16) as u8;
        bytes[2] = (uuid32 >> 8) as u8;
        bytes[3] = uuid32 as u8;
        Uuid { bytes }
    }

    /// Returns the 16 bytes in big-endian order.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Returns the 16 bytes in little-endian (on-air) order.
    pub fn to_bytes_le(&self) -> [u8; 16] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }

    fn is_sig_assigned(&self) -> bool {
        self.bytes[SHORT_LEN..] == BASE_UUID_BYTES[SHORT_LEN..]
    }

    /// Returns the 16-bit value if this is a SIG-assigned 16-bit UUID.
    pub fn as_u16(&self) -> Option<u16> {
        if self.is_sig_assigned() && self.bytes[0] == 0 && self.bytes[1] == 0 {
            Some(u16::from_be_bytes([self.bytes[2], self.bytes[3]]))
        } else {
            None
        }
    }

    /// Returns the 32-bit value if this is a SIG-assigned UUID.
    pub fn as_u32(&self) -> Option<u32> {
        if self.is_sig_assigned() {
            Some(u32::from_be_bytes([
                self.bytes[0],
                self.bytes[1],
                self.bytes[2],
                self.bytes[3],
            ]))
        } else {
            None
        }
    }

    /// Shortest textual form: `180f` for SIG-assigned 16-bit UUIDs, the full
    /// hyphenated form otherwise.
    pub fn to_short_string(&self) -> String {
        match self.as_u16() {
            Some(short) => format!("{:04x}", short),
            None => self.to_string(),
        }
    }
}

impl From<u16> for Uuid {
    fn from(uuid16: u16) -> Self {
        Uuid::from_u16(uuid16)
    }
}

impl From<u128> for Uuid {
    fn from(value: u128) -> Self {
        Uuid::from_u128(value)
    }
}

impl PartialEq<u16> for Uuid {
    fn eq(&self, other: &u16) -> bool {
        self.as_u16() == Some(*other)
    }
}

impl PartialEq<Uuid> for u16 {
    fn eq(&self, other: &Uuid) -> bool {
        other.as_u16() == Some(*self)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{}-{}-{}-{}-{}",
            hex::encode(&b[0..4]),
            hex::encode(&b[4..6]),
            hex::encode(&b[6..8]),
            hex::encode(&b[8..10]),
            hex::encode(&b[10..16])
        )
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(short) = self.as_u16() {
            write!(f, "Uuid(0x{:04X})", short)
        } else {
            write!(f, "Uuid({})", self)
        }
    }
}

/// Errors from parsing a textual UUID
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UuidParseError {
    #[error("invalid UUID length: {0} hex digits")]
    InvalidLength(usize),

    #[error("invalid UUID format")]
    InvalidFormat,

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl From<ParseIntError> for UuidParseError {
    fn from(_: ParseIntError) -> Self {
        UuidParseError::InvalidFormat
    }
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    /// Accepts `180f`, `0000180f`, and the full form either bare or with
    /// hyphens at the canonical 8-4-4-4-12 positions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().any(|c| !c.is_ascii_hexdigit() && c != '-') {
            return Err(UuidParseError::InvalidFormat);
        }
        let cleaned: String = if s.contains('-') {
            if s.len() != HYPHENATED_LEN {
                return Err(UuidParseError::InvalidFormat);
            }
            for (i, c) in s.char_indices() {
                if (c == '-') != HYPHEN_POSITIONS.contains(&i) {
                    return Err(UuidParseError::InvalidFormat);
                }
            }
            s.chars().filter(|c| *c != '-').collect()
        } else {
            s.to_string()
        };

        match cleaned.len() {
            4 => Ok(Uuid::from_u16(u16::from_str_radix(&cleaned, 16)?)),
            8 => Ok(Uuid::from_u32(u32::from_str_radix(&cleaned, 16)?)),
            32 => {
                let mut bytes = [0u8; 16];
                hex::decode_to_slice(&cleaned, &mut bytes)?;
                Ok(Uuid::from_bytes(bytes))
            }
            len => Err(UuidParseError::InvalidLength(len)),
        }
    }
}
