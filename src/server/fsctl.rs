use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::nt_status::NTStatus;
use oplock_core::OplockResult;

use crate::oplock::{OplockLevel, PendingToken};

/// File system control codes that drive the oplock package.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive)]
pub enum FsControlCode {
    RequestOplockLevel1 = 0x00090000,
    RequestOplockLevel2 = 0x00090004,
    RequestBatchOplock = 0x00090008,
    OplockBreakAcknowledge = 0x0009000C,
    OplockBreakAckNo2 = 0x00090050,
    RequestFilterOplock = 0x0009005C,
}

impl FsControlCode {
    pub fn from_code(code: u32) -> OplockResult<Self> {
        Self::try_from_primitive(code)
            .map_err(|_e| OplockError::invalid_request(format!("unsupported fsctl {:#010x}", code)))
    }

    pub fn requested_level(&self) -> Option<OplockLevel> {
        match self {
            Self::RequestOplockLevel1 => Some(OplockLevel::Exclusive),
            Self::RequestOplockLevel2 => Some(OplockLevel::Level2),
            Self::RequestBatchOplock => Some(OplockLevel::Batch),
            Self::RequestFilterOplock => Some(OplockLevel::Filter),
            Self::OplockBreakAcknowledge | Self::OplockBreakAckNo2 => None,
        }
    }
}

#[derive(Debug)]
pub enum FsControlOutcome {
    /// The request stays outstanding until the returned token is signaled
    Pending(PendingToken),
    Completed,
}

impl FsControlOutcome {
    pub fn status(&self) -> NTStatus {
        match self {
            Self::Pending(_) => NTStatus::StatusPending,
            Self::Completed => NTStatus::StatusSuccess,
        }
    }

    pub fn into_token(self) -> Option<PendingToken> {
        match self {
            Self::Pending(token) => Some(token),
            Self::Completed => None,
        }
    }
}
