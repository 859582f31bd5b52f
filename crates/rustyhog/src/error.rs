//! Error types for the rustyhog library
//!
//! Every failure an attribute operation can report is a [`GattError`]. Errors
//! are returned to the caller of the single operation that failed and never
//! touch any other attribute.

use crate::gatt::ObjectPath;
use thiserror::Error;

/// ATT "Write Not Permitted"
pub const ATT_ERROR_WRITE_NOT_PERMITTED: u8 = 0x03;
/// ATT "Invalid PDU"
pub const ATT_ERROR_INVALID_PDU: u8 = 0x04;
/// ATT "Request Not Supported"
pub const ATT_ERROR_REQUEST_NOT_SUPPORTED: u8 = 0x06;
/// ATT "Attribute Not Found"
pub const ATT_ERROR_ATTRIBUTE_NOT_FOUND: u8 = 0x0A;
/// ATT "Invalid Attribute Value Length"
pub const ATT_ERROR_INVALID_ATTRIBUTE_VALUE_LENGTH: u8 = 0x0D;
/// ATT "Unlikely Error"
pub const ATT_ERROR_UNLIKELY: u8 = 0x0E;
/// First application error code, used for rejected control commands
pub const ATT_ERROR_APPLICATION_ERROR_START: u8 = 0x80;

/// Errors returned by GATT attribute operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GattError {
    #[error("Operation not supported")]
    NotSupported,

    #[error("Operation not permitted")]
    NotPermitted,

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid value length: expected {expected}, got {actual}")]
    InvalidValueLength { expected: usize, actual: usize },

    #[error("Command rejected: 0x{0:02x}")]
    CommandRejected(u8),

    #[error("No object at path {0}")]
    DoesNotExist(ObjectPath),

    #[error("Path already registered: {0}")]
    AlreadyRegistered(ObjectPath),
}

impl GattError {
    /// Error name the platform bus reports this error as
    pub fn dbus_name(&self) -> &'static str {
        match self {
            GattError::NotSupported => "org.bluez.Error.NotSupported",
            GattError::NotPermitted => "org.bluez.Error.NotPermitted",
            GattError::InvalidArguments(_) => "org.freedesktop.DBus.Error.InvalidArgs",
            GattError::InvalidValueLength { .. } => "org.bluez.Error.InvalidValueLength",
            GattError::CommandRejected(_) => "org.bluez.Error.Failed",
            GattError::DoesNotExist(_) => "org.bluez.Error.DoesNotExist",
            GattError::AlreadyRegistered(_) => "org.bluez.Error.AlreadyExists",
        }
    }

    /// ATT error code a transport answers with on the air
    pub fn att_error_code(&self) -> u8 {
        match self {
            GattError::NotSupported => ATT_ERROR_REQUEST_NOT_SUPPORTED,
            GattError::NotPermitted => ATT_ERROR_WRITE_NOT_PERMITTED,
            GattError::InvalidArguments(_) => ATT_ERROR_INVALID_PDU,
            GattError::InvalidValueLength { .. } => ATT_ERROR_INVALID_ATTRIBUTE_VALUE_LENGTH,
            GattError::CommandRejected(_) => ATT_ERROR_APPLICATION_ERROR_START,
            GattError::DoesNotExist(_) => ATT_ERROR_ATTRIBUTE_NOT_FOUND,
            GattError::AlreadyRegistered(_) => ATT_ERROR_UNLIKELY,
        }
    }
}

/// Result type for GATT attribute operations
pub type GattResult<T> = Result<T, GattError>;

/// Check that a written payload has exactly `expected` bytes
pub(crate) fn expect_len(value: &[u8], expected: usize) -> GattResult<()> {
    if value.len() != expected {
        return Err(GattError::InvalidValueLength {
            expected,
            actual: value.len(),
        });
    }
    Ok(())
}
