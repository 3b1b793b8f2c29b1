use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::OplockError;
use crate::OplockResult;

/// Completion codes reported to the caller of an oplock operation.
#[repr(u32)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TryFromPrimitive, Copy)]
pub enum NTStatus {
    StatusSuccess = 0x0,
    StatusPending = 0x103,
    OplockBreakInProgress = 0x108,
    InvalidHandle = 0xC0000008,
    InvalidParameter = 0xC000000D,
    ObjectNameNotFound = 0xC0000034,
    OplockNotGranted = 0xC00000E2,
    InvalidOplockProtocol = 0xC00000E3,
}

impl NTStatus {
    pub fn from_code(code: u32) -> OplockResult<Self> {
        Self::try_from_primitive(code)
            .map_err(|_e| OplockError::invalid_request(format!("unknown status code {:#010x}", code)))
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Severity bits `11` mark an error status.
    pub fn is_error(&self) -> bool {
        self.code() >> 30 == 0x3
    }
}

impl From<&OplockError> for NTStatus {
    fn from(value: &OplockError) -> Self {
        match value {
            OplockError::AlreadyExclusive(_) | OplockError::NotGranted(_) => Self::OplockNotGranted,
            OplockError::BreakInProgress(_) => Self::OplockBreakInProgress,
            OplockError::UnknownFileIdentity(_) => Self::ObjectNameNotFound,
            OplockError::UnknownHandle(_) => Self::InvalidHandle,
            OplockError::InvalidRequest(_) => Self::InvalidParameter,
            OplockError::InvalidOplockProtocol(_) => Self::InvalidOplockProtocol,
        }
    }
}

impl<T> From<&OplockResult<T>> for NTStatus {
    fn from(value: &OplockResult<T>) -> Self {
        match value {
            Ok(_) => Self::StatusSuccess,
            Err(e) => e.into(),
        }
    }
}
