use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::OplockResult;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CreateOptions: u32 {
        const DIRECTORY_FILE            = 0x000001;
        const WRITE_THROUGH             = 0x000002;
        const SEQUENTIAL_ONLY           = 0x000004;
        const NO_INTERMEDIATE_BUFFERING = 0x000008;
        const SYNCHRONOUS_IO_ALERT      = 0x000010;
        const SYNCHRONOUS_IO_NONALERT   = 0x000020;
        const NON_DIRECTORY_FILE        = 0x000040;
        const COMPLETE_IF_OPLOCKED      = 0x000100;
        const NO_EA_KNOWLEDGE           = 0x000200;
        const OPEN_REMOTE_INSTANCE      = 0x000400;
        const RANDOM_ACCESS             = 0x000800;
        const DELETE_ON_CLOSE           = 0x001000;
        const OPEN_BY_FILE_ID           = 0x002000;
        const OPEN_FOR_BACKUP_INTENT    = 0x004000;
        const NO_COMPRESSION            = 0x008000;
        const OPEN_REQUIRING_OPLOCK     = 0x010000;
        const DISALLOW_EXCLUSIVE        = 0x020000;
        const RESERVE_OPFILTER          = 0x100000; // Treated like any other open
        const OPEN_REPARSE_POINT        = 0x200000;
        const OPEN_NO_RECALL            = 0x400000;
        const OPEN_FOR_FREE_SPACE_QUERY = 0x800000;
    }
}

impl CreateOptions {
    pub fn from_code(code: u32) -> OplockResult<Self> {
        let options = Self::from_bits_truncate(code);
        if options.contains(Self::DIRECTORY_FILE | Self::NON_DIRECTORY_FILE) {
            return Err(OplockError::invalid_request("open cannot be both a directory and a non-directory file"));
        }
        Ok(options)
    }

    pub fn is_directory(&self) -> bool {
        self.contains(Self::DIRECTORY_FILE)
    }

    pub fn is_synchronous(&self) -> bool {
        self.intersects(Self::SYNCHRONOUS_IO_ALERT | Self::SYNCHRONOUS_IO_NONALERT)
    }
}
