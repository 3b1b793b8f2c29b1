use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of the underlying file, independent of any handle opened on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileIdentity {
    pub volume_id: u64,
    pub file_id: u64,
}

impl FileIdentity {
    pub const fn new(volume_id: u64, file_id: u64) -> Self {
        Self { volume_id, file_id }
    }
}

impl Display for FileIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}:{:#x}", self.volume_id, self.file_id)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<HandleId> for u64 {
    fn from(value: HandleId) -> Self {
        value.0
    }
}

impl Display for HandleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
