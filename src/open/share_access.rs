use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::OplockResult;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ShareAccess: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const DELETE = 0x4;
    }
}

impl ShareAccess {
    pub fn from_code(code: u32) -> OplockResult<Self> {
        Self::from_bits(code)
            .ok_or_else(|| OplockError::invalid_request(format!("invalid share access {:#x}", code)))
    }
}
