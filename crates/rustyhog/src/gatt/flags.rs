//! Access flags and the access-control policy shared by characteristics
//! and descriptors
//!
//! Flags decide which operations a node accepts at all. They also tell the
//! transport which link security an operation needs; the core never enforces
//! encryption itself.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags::bitflags! {
    /// Declared access flags of a characteristic or descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u16 {
        const READ = 0x0001;
        const WRITE = 0x0002;
        const NOTIFY = 0x0004;
        const INDICATE = 0x0008;
        /// Read needs an encrypted link.
        const ENCRYPT_READ = 0x0010;
        /// Write needs an encrypted link.
        const ENCRYPT_WRITE = 0x0020;
        /// Read needs a Secure Connections link.
        const SECURE_READ = 0x0040;
        /// Write needs a Secure Connections link.
        const SECURE_WRITE = 0x0080;
        /// Auxiliary descriptors (User Description) may be written.
        const WRITABLE_AUXILIARIES = 0x0100;
    }
}

/// Wire names in the order they are published.
const FLAG_NAMES: [(AccessFlags, &str); 9] = [
    (AccessFlags::READ, "read"),
    (AccessFlags::WRITE, "write"),
    (AccessFlags::NOTIFY, "notify"),
    (AccessFlags::INDICATE, "indicate"),
    (AccessFlags::ENCRYPT_READ, "encrypt-read"),
    (AccessFlags::ENCRYPT_WRITE, "encrypt-write"),
    (AccessFlags::SECURE_READ, "secure-read"),
    (AccessFlags::SECURE_WRITE, "secure-write"),
    (AccessFlags::WRITABLE_AUXILIARIES, "writable-auxiliaries"),
];

/// Link security a transport must establish before an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityLevel {
    /// No security (unencrypted)
    None,
    /// Encryption without authentication
    EncryptionOnly,
    /// LE Secure Connections with encryption and authentication
    SecureConnections,
}

/// Which kind of node a write is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Characteristic,
    Descriptor,
}

impl AccessFlags {
    pub const READ_CLASS: AccessFlags = AccessFlags::READ
        .union(AccessFlags::ENCRYPT_READ)
        .union(AccessFlags::SECURE_READ);

    pub const WRITE_CLASS: AccessFlags = AccessFlags::WRITE
        .union(AccessFlags::ENCRYPT_WRITE)
        .union(AccessFlags::SECURE_WRITE);

    /// Whether any read-class flag is declared
    pub fn is_readable(&self) -> bool {
        self.intersects(Self::READ_CLASS)
    }

    /// Whether any write-class flag is declared. Descriptors additionally
    /// accept `writable-auxiliaries`.
    pub fn is_writable(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Characteristic => self.intersects(Self::WRITE_CLASS),
            NodeKind::Descriptor => {
                self.intersects(Self::WRITE_CLASS | AccessFlags::WRITABLE_AUXILIARIES)
            }
        }
    }

    /// Whether notifications or indications can be enabled
    pub fn can_notify(&self) -> bool {
        self.intersects(AccessFlags::NOTIFY | AccessFlags::INDICATE)
    }

    /// Security the transport must enforce for reads
    pub fn read_security(&self) -> SecurityLevel {
        if self.contains(AccessFlags::SECURE_READ) {
            SecurityLevel::SecureConnections
        } else if self.contains(AccessFlags::ENCRYPT_READ) {
            SecurityLevel::EncryptionOnly
        } else {
            SecurityLevel::None
        }
    }

    /// Security the transport must enforce for writes
    pub fn write_security(&self) -> SecurityLevel {
        if self.contains(AccessFlags::SECURE_WRITE) {
            SecurityLevel::SecureConnections
        } else if self.contains(AccessFlags::ENCRYPT_WRITE) {
            SecurityLevel::EncryptionOnly
        } else {
            SecurityLevel::None
        }
    }

    /// Wire names of the declared flags, in publication order
    pub fn names(&self) -> Vec<String> {
        FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Parse a list of wire names
    pub fn from_names<'a, I>(names: I) -> Result<Self, UnknownFlag>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .try_fold(AccessFlags::empty(), |acc, name| {
                Ok(acc | name.parse::<AccessFlags>()?)
            })
    }
}

/// A flag name outside the supported set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown access flag: {0}")]
pub struct UnknownFlag(pub String);

impl FromStr for AccessFlags {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FLAG_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(flag, _)| *flag)
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

impl fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}
