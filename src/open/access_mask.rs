use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FileAccessMask: u32 {
        const FILE_READ_DATA         = 0x00000001;
        const FILE_WRITE_DATA        = 0x00000002;
        const FILE_APPEND_DATA       = 0x00000004;
        const FILE_READ_EA           = 0x00000008;
        const FILE_WRITE_EA          = 0x00000010;
        const FILE_EXECUTE           = 0x00000020;
        const FILE_DELETE_CHILD      = 0x00000040;
        const FILE_READ_ATTRIBUTES   = 0x00000080;
        const FILE_WRITE_ATTRIBUTES  = 0x00000100;
        const DELETE                 = 0x00010000;
        const READ_CONTROL           = 0x00020000;
        const WRITE_DAC              = 0x00040000;
        const WRITE_OWNER            = 0x00080000;
        const SYNCHRONIZE            = 0x00100000;
        const ACCESS_SYSTEM_SECURITY = 0x01000000;
        const MAXIMUM_ALLOWED        = 0x02000000;
        const GENERIC_ALL            = 0x10000000;
        const GENERIC_EXECUTE        = 0x20000000;
        const GENERIC_WRITE          = 0x40000000;
        const GENERIC_READ           = 0x80000000;
    }
}

impl FileAccessMask {
    const ATTRIBUTE_ACCESS: Self = Self::FILE_READ_ATTRIBUTES
        .union(Self::FILE_WRITE_ATTRIBUTES)
        .union(Self::READ_CONTROL)
        .union(Self::SYNCHRONIZE);

    const DATA_WRITE_ACCESS: Self = Self::FILE_WRITE_DATA
        .union(Self::FILE_APPEND_DATA)
        .union(Self::FILE_WRITE_EA)
        .union(Self::DELETE)
        .union(Self::MAXIMUM_ALLOWED)
        .union(Self::GENERIC_WRITE)
        .union(Self::GENERIC_ALL);

    pub fn from_code(code: u32) -> Self {
        Self::from_bits_truncate(code)
    }

    /// Opens that only touch attributes or security never invalidate cached data.
    pub fn is_attribute_only(&self) -> bool {
        self.difference(Self::ATTRIBUTE_ACCESS).is_empty()
    }

    pub fn writes_data(&self) -> bool {
        self.intersects(Self::DATA_WRITE_ACCESS)
    }
}
