use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::OplockResult;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive)]
pub enum OplockLevel {
    None = 0x0,
    Level2 = 0x1,
    Exclusive = 0x8,
    Batch = 0x9,
    Filter = 0xA,
}

impl OplockLevel {
    pub fn from_code(code: u8) -> OplockResult<Self> {
        Self::try_from_primitive(code)
            .map_err(|_e| OplockError::invalid_request(format!("unknown oplock level {:#x}", code)))
    }

    /// Exclusive, batch and filter grants admit exactly one holder.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::Batch | Self::Filter)
    }

    /// Whether a break of this level may leave the holder with shared read caching.
    pub fn can_downgrade(&self) -> bool {
        matches!(self, Self::Exclusive | Self::Batch)
    }
}

/// Why a grant was broken. The discriminant is the value reported as the
/// I/O status information of the completed oplock request.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive)]
pub enum BreakReason {
    BrokenToLevel2 = 0x7,
    BrokenToNone = 0x8,
}

impl BreakReason {
    pub fn information(&self) -> usize {
        *self as usize
    }

    pub fn level_after(&self) -> OplockLevel {
        match self {
            Self::BrokenToLevel2 => OplockLevel::Level2,
            Self::BrokenToNone => OplockLevel::None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantState {
    Granted,
    Broken,
    Released,
}
